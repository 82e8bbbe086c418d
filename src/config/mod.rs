//! Configuration module for handling environment variables and .env files

use crate::client::{
    ClientConfig, Credentials, Error, RedditClient, Result, DEFAULT_BASE_URL,
    DEFAULT_READONLY_BASE_URL, DEFAULT_TOKEN_URL,
};
use log::info;
use std::env;
use std::time::Duration;

/// Application configuration derived from environment variables and .env file
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Reddit API credentials
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    // Reddit API settings
    pub user_agent: Option<String>,
    pub base_url: String,
    pub readonly_base_url: String,
    pub token_url: String,
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            user_agent: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            readonly_base_url: DEFAULT_READONLY_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn load() -> Self {
        // Try to load .env file, but continue even if it doesn't exist
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(_) => info!("No .env file found, using system environment variables only"),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.client_id = var("REDDIT_CLIENT_ID");
        config.client_secret = var("REDDIT_CLIENT_SECRET");
        config.username = var("REDDIT_USERNAME");
        config.password = var("REDDIT_PASSWORD");
        config.user_agent = var("REDDIT_USER_AGENT");

        if let Some(base_url) = var("REDDIT_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(readonly_base_url) = var("REDDIT_READONLY_BASE_URL") {
            config.readonly_base_url = readonly_base_url;
        }
        if let Some(token_url) = var("REDDIT_TOKEN_URL") {
            config.token_url = token_url;
        }

        // Timeout - parse as u64 if provided
        if let Some(timeout) = var("REDDIT_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse::<u64>().ok();
        }

        config
    }

    pub fn require_client_id(&self) -> Result<String> {
        self.client_id
            .clone()
            .ok_or(Error::MissingConfig("REDDIT_CLIENT_ID"))
    }

    pub fn require_client_secret(&self) -> Result<String> {
        self.client_secret
            .clone()
            .ok_or(Error::MissingConfig("REDDIT_CLIENT_SECRET"))
    }

    pub fn require_username(&self) -> Result<String> {
        self.username
            .clone()
            .ok_or(Error::MissingConfig("REDDIT_USERNAME"))
    }

    pub fn require_password(&self) -> Result<String> {
        self.password
            .clone()
            .ok_or(Error::MissingConfig("REDDIT_PASSWORD"))
    }

    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some()
    }

    /// Credentials for an authenticated client. The secret may be empty for
    /// installed apps; username and password select the password grant.
    pub fn credentials(&self) -> Result<Credentials> {
        let mut credentials = Credentials::new(
            self.require_client_id()?,
            self.client_secret.clone().unwrap_or_default(),
        );
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            credentials = credentials.with_user(username.clone(), password.clone());
        }
        Ok(credentials)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            readonly_base_url: self.readonly_base_url.clone(),
            token_url: self.token_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Authenticated client when a client id is configured, read-only otherwise.
    pub fn create_client(&self) -> Result<RedditClient> {
        if self.has_credentials() {
            RedditClient::new(self.credentials()?, self.client_config())
        } else {
            info!("No REDDIT_CLIENT_ID configured, using the read-only API");
            RedditClient::readonly(self.client_config())
        }
    }

    /// Like [`create_client`](Self::create_client) but fails without credentials.
    pub fn create_authenticated_client(&self) -> Result<RedditClient> {
        RedditClient::new(self.credentials()?, self.client_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]);
        assert!(!config.has_credentials());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(matches!(
            config.require_client_id(),
            Err(Error::MissingConfig("REDDIT_CLIENT_ID"))
        ));
        assert!(config.create_client().unwrap().is_readonly());
    }

    #[test]
    fn credentials_pick_up_user_when_both_parts_present() {
        let config = config_from(&[
            ("REDDIT_CLIENT_ID", "id"),
            ("REDDIT_CLIENT_SECRET", "secret"),
            ("REDDIT_USERNAME", "alice"),
            ("REDDIT_PASSWORD", "pw"),
            ("REDDIT_TIMEOUT_SECS", "15"),
        ]);
        let creds = config.credentials().unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.username.as_deref(), Some("alice"));
        assert_eq!(
            config.client_config().timeout,
            Some(Duration::from_secs(15))
        );
        assert!(!config.create_client().unwrap().is_readonly());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("REDDIT_CLIENT_ID", "  "), ("REDDIT_BASE_URL", "")]);
        assert!(!config.has_credentials());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn username_without_password_uses_client_credentials() {
        let config = config_from(&[("REDDIT_CLIENT_ID", "id"), ("REDDIT_USERNAME", "alice")]);
        assert!(config.credentials().unwrap().username.is_none());
    }
}

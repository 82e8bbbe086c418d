use super::error::{Error, Result};
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Tokens this close to expiry are treated as already expired. Short-lived
/// tokens use half their lifetime instead.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Used when the token endpoint leaves out `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Credentials used to obtain a bearer token.
///
/// With a username and password the password grant is used (script apps);
/// otherwise the client-credentials grant.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    fn grant_params(&self) -> Vec<(&'static str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => vec![
                ("grant_type", "password"),
                ("username", username.as_str()),
                ("password", password.as_str()),
            ],
            _ => vec![("grant_type", "client_credentials")],
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Token {
    pub access_token: String,
    /// Unix timestamp, seconds.
    pub expires_at: i64,
    refresh_at: i64,
}

impl Token {
    /// A token issued at `issued_at` that lives for `expires_in` seconds.
    pub fn new(access_token: impl Into<String>, issued_at: i64, expires_in: i64) -> Self {
        let margin = EXPIRY_MARGIN_SECS.min(expires_in / 2);
        Self {
            access_token: access_token.into(),
            expires_at: issued_at + expires_in,
            refresh_at: issued_at + expires_in - margin,
        }
    }

    pub fn is_valid(&self) -> bool {
        Utc::now().timestamp() < self.refresh_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    error: Option<String>,
}

/// Owns the credentials and the current bearer token; refreshes on demand.
pub struct TokenManager {
    credentials: Credentials,
    token_url: Url,
    token: Mutex<Option<Token>>,
}

impl TokenManager {
    pub fn new(credentials: Credentials, token_url: Url) -> Self {
        Self {
            credentials,
            token_url,
            token: Mutex::new(None),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.username.as_deref()
    }

    /// Return a valid bearer token, fetching a new one when absent or expiring.
    ///
    /// The lock is held across the token call so that concurrent requests
    /// wait for a single refresh instead of each starting their own.
    ///
    /// `timeout` bounds the token call the same way it bounds the API call.
    pub async fn bearer(&self, http: &Client, timeout: Option<Duration>) -> Result<String> {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
            debug!("Access token expired, refreshing");
        }

        let token = self.fetch(http, timeout).await?;
        let bearer = token.access_token.clone();
        *slot = Some(token);
        Ok(bearer)
    }

    /// Drop the current token so the next request fetches a fresh one.
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    async fn fetch(&self, http: &Client, timeout: Option<Duration>) -> Result<Token> {
        let auth = base64::encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));

        let mut builder = http
            .post(self.token_url.clone())
            .header("Authorization", format!("Basic {}", auth))
            .form(&self.credentials.grant_params());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let res = builder
            .send()
            .await
            .map_err(|source| Error::Transport {
                method: reqwest::Method::POST,
                url: self.token_url.clone(),
                source,
            })?;

        let status = res.status();
        let body = res.bytes().await.map_err(|source| Error::Transport {
            method: reqwest::Method::POST,
            url: self.token_url.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(Error::Authentication(format!(
                "HTTP {}: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let json: TokenResponse = serde_json::from_slice(&body).map_err(|e| Error::Json {
            message: e.to_string(),
            data: body.to_vec(),
        })?;

        // Reddit answers a bad password with 200 and an `error` field
        if let Some(error) = json.error {
            return Err(Error::Authentication(error));
        }

        let access_token = json.access_token.ok_or_else(|| {
            Error::Authentication("no access token in token response".to_string())
        })?;

        let expires_in = json.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        debug!(
            "Access token obtained, expires in {}s, scopes: {:?}",
            expires_in, json.scope
        );

        Ok(Token::new(access_token, Utc::now().timestamp(), expires_in))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_grant_when_user_present() {
        let creds = Credentials::new("id", "secret").with_user("alice", "hunter2");
        let params = creds.grant_params();
        assert_eq!(params[0], ("grant_type", "password"));
        assert!(params.contains(&("username", "alice")));
        assert!(params.contains(&("password", "hunter2")));
    }

    #[test]
    fn client_credentials_grant_otherwise() {
        let creds = Credentials::new("id", "secret");
        assert_eq!(
            creds.grant_params(),
            vec![("grant_type", "client_credentials")]
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::new("id", "s3cr3t").with_user("alice", "hunter2");
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("s3cr3t"));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("alice"));
    }

    #[test]
    fn token_validity_respects_margin() {
        let now = Utc::now().timestamp();
        let fresh = Token::new("a", now, 3600);
        // issued an hour ago, 60 seconds left
        let expiring = Token::new("b", now - 3540, 3600);
        assert!(fresh.is_valid());
        assert!(!expiring.is_valid());
        assert_eq!(fresh.expires_at, now + 3600);
    }

    #[test]
    fn short_lived_token_uses_half_its_lifetime_as_margin() {
        let now = Utc::now().timestamp();
        assert!(Token::new("a", now, 120).is_valid());
        assert!(Token::new("b", now, 300).is_valid());
        assert!(!Token::new("c", now - 70, 120).is_valid());
    }
}

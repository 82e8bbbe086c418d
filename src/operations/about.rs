use super::{format_timestamp, truncate};
use crate::client::{RedditClient, Result};
use crate::models::Subreddit;
use log::{debug, info};

/// Result of a subreddit lookup
#[derive(Debug)]
pub struct AboutResult {
    pub subreddit: Subreddit,
    /// Formatted output (for CLI display)
    pub formatted_output: String,
}

/// Operation for fetching a subreddit's about page
pub struct AboutOperation {
    subreddit: String,
    client: RedditClient,
}

impl AboutOperation {
    pub fn with_client(subreddit: impl Into<String>, client: RedditClient) -> Self {
        let subreddit = subreddit.into();
        let subreddit = subreddit
            .strip_prefix("r/")
            .map(str::to_string)
            .unwrap_or(subreddit);
        Self { subreddit, client }
    }

    pub async fn execute(&self) -> Result<AboutResult> {
        info!("Fetching about page for r/{}", self.subreddit);

        let path = format!("r/{}/about", self.subreddit);
        let subreddit: Subreddit = self.client.get_typed(&path, None).await?;
        let formatted_output = format_about(&subreddit);

        Ok(AboutResult {
            subreddit,
            formatted_output,
        })
    }
}

fn format_about(sub: &Subreddit) -> String {
    let mut output = format!("{} - {}\n", sub.display_name_prefixed, sub.title);
    output.push_str(&format!("Thing ID: {}\n", sub.name));
    if let Some(subscribers) = sub.subscribers {
        output.push_str(&format!("Subscribers: {}", subscribers));
        if let Some(active) = sub.active_user_count.or(sub.accounts_active) {
            output.push_str(&format!(" | Active: {}", active));
        }
        output.push('\n');
    }
    output.push_str(&format!(
        "Created: {} UTC\n",
        format_timestamp(sub.created_utc, chrono_tz::UTC, "%Y-%m-%d")
    ));
    output.push_str(&format!("Type: {}", sub.subreddit_type));
    if sub.over18 {
        output.push_str(" [NSFW]");
    }
    output.push('\n');
    if !sub.public_description.is_empty() {
        output.push_str(&format!("\n{}\n", truncate(&sub.public_description, 500)));
    }
    output
}

/// CLI handler function for the about command
pub async fn handle_about_command(subreddit: String, client: RedditClient) -> Result<()> {
    let operation = AboutOperation::with_client(subreddit, client);
    match operation.execute().await {
        Ok(result) => {
            print!("{}", result.formatted_output);
            Ok(())
        }
        Err(err) => {
            debug!("Error fetching subreddit: {}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;

    #[test]
    fn subreddit_prefix_is_optional() {
        let client = RedditClient::readonly(ClientConfig::default()).unwrap();
        let op = AboutOperation::with_client("r/rust", client);
        assert_eq!(op.subreddit, "rust");
    }

    #[test]
    fn about_output_lists_counts() {
        let sub = Subreddit {
            name: "t5_2qh1i".to_string(),
            display_name_prefixed: "r/rust".to_string(),
            title: "The Rust Programming Language".to_string(),
            subscribers: Some(300_000),
            active_user_count: Some(1_200),
            subreddit_type: "public".to_string(),
            created_utc: 1_262_304_000.0,
            ..Default::default()
        };
        let output = format_about(&sub);
        assert!(output.starts_with("r/rust - The Rust Programming Language\n"));
        assert!(output.contains("Subscribers: 300000 | Active: 1200\n"));
        assert!(output.contains("Created: 2010-01-01 UTC\n"));
    }
}

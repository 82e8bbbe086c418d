use super::ApiResponse;
use crate::client::{form_body, Error, RedditClient, Result};
use log::{debug, info};
use serde::Deserialize;

/// Configuration options for submitting a self post
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Subreddit name, without the `r/` prefix
    pub subreddit: String,
    pub title: String,
    /// Markdown body of the post
    pub text: String,
    /// Anti-CSRF token, needed only for cookie sessions
    pub modhash: Option<String>,
}

/// Result of a post submission
#[derive(Debug)]
pub struct SubmitResult {
    /// Whether Reddit accepted the post
    pub success: bool,
    /// URL of the created post (if successful)
    pub url: Option<String>,
    /// Fullname of the created post (if successful)
    pub name: Option<String>,
    /// Formatted message for CLI output
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    url: Option<String>,
    name: Option<String>,
}

/// Operation for submitting a self post
pub struct SubmitOperation {
    options: SubmitOptions,
    client: RedditClient,
}

impl SubmitOperation {
    pub fn with_client(options: SubmitOptions, client: RedditClient) -> Self {
        Self { options, client }
    }

    pub async fn execute(&self) -> Result<SubmitResult> {
        info!(
            "Submitting post to r/{} with title: {}",
            self.options.subreddit, self.options.title
        );

        let form = form_body(&[
            ("api_type", "json"),
            ("kind", "self"),
            ("sr", self.options.subreddit.as_str()),
            ("text", self.options.text.as_str()),
            ("title", self.options.title.as_str()),
        ]);
        let body: ApiResponse<SubmitData> = self
            .client
            .post_form_json("api/submit", form, self.options.modhash.as_deref())
            .await?;

        let errors = body.json.error_messages();
        if !errors.is_empty() {
            return Ok(SubmitResult {
                success: false,
                url: None,
                name: None,
                message: format!("Reddit rejected the post: {}", errors.join("; ")),
            });
        }

        let data = body.json.data.unwrap_or(SubmitData {
            url: None,
            name: None,
        });
        let message = match &data.url {
            Some(url) => format!("Post submitted successfully! URL: {}", url),
            None => "Post submitted successfully!".to_string(),
        };

        Ok(SubmitResult {
            success: true,
            url: data.url,
            name: data.name,
            message,
        })
    }
}

/// CLI handler function for the submit command
pub async fn handle_submit_command(options: SubmitOptions, client: RedditClient) -> Result<()> {
    let operation = SubmitOperation::with_client(options, client);
    match operation.execute().await {
        Ok(result) => {
            if result.success {
                println!("{}", result.message);
                Ok(())
            } else {
                Err(Error::internal(result.message))
            }
        }
        Err(err) => {
            debug!("Error submitting post: {}", err);
            Err(err)
        }
    }
}

use super::ApiResponse;
use crate::client::{form_body, Error, RedditClient, Result};
use crate::models::{Comment, Thing};
use log::{debug, info};
use serde::Deserialize;

/// Configuration options for creating a comment on Reddit
#[derive(Debug, Clone)]
pub struct CommentOptions {
    /// The fullname of the parent thing (post or comment) to comment on
    /// Format is "t3_" followed by post ID for posts, or "t1_" followed by comment ID for comments
    pub thing_id: String,
    /// Text content of the comment
    pub text: String,
    pub modhash: Option<String>,
}

/// Result of a comment creation operation
#[derive(Debug)]
pub struct CommentResult {
    /// Whether the comment was successfully created
    pub success: bool,
    /// The created comment, as echoed back by Reddit
    pub comment: Option<Comment>,
    /// Formatted message for CLI output
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
struct CommentData {
    #[serde(default)]
    things: Vec<Thing>,
}

/// Operation for creating a comment on a post or another comment
pub struct CommentOperation {
    options: CommentOptions,
    client: RedditClient,
}

impl CommentOperation {
    pub fn with_client(options: CommentOptions, client: RedditClient) -> Self {
        Self { options, client }
    }

    pub async fn execute(&self) -> Result<CommentResult> {
        info!(
            "Creating a new comment on thing_id: {}",
            self.options.thing_id
        );

        let form = form_body(&[
            ("api_type", "json"),
            ("text", self.options.text.as_str()),
            ("thing_id", self.options.thing_id.as_str()),
        ]);
        let body: ApiResponse<CommentData> = self
            .client
            .post_form_json("api/comment", form, self.options.modhash.as_deref())
            .await?;

        let errors = body.json.error_messages();
        if !errors.is_empty() {
            return Ok(CommentResult {
                success: false,
                comment: None,
                message: format!(
                    "Error creating comment: {}\n\nNote: Commenting requires OAuth authentication with the 'submit' scope.",
                    errors.join("; ")
                ),
            });
        }

        let comment = body
            .json
            .data
            .unwrap_or_default()
            .things
            .into_iter()
            .find_map(|thing| Comment::try_from(thing).ok());

        let message = match &comment {
            Some(c) => format!(
                "Comment created successfully! ID: {} https://reddit.com{}",
                c.name, c.permalink
            ),
            None => "Comment created successfully!".to_string(),
        };

        Ok(CommentResult {
            success: true,
            comment,
            message,
        })
    }
}

/// CLI handler function for comment command with client
pub async fn handle_comment_command(options: CommentOptions, client: RedditClient) -> Result<()> {
    let operation = CommentOperation::with_client(options, client);
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
            debug!("Error executing comment operation: {}", err);
            Err(err)
        }
    }
}

use super::format_timestamp;
use crate::client::{Error, RedditClient, Result};
use crate::models::Account;
use log::{debug, info};

/// Operation for fetching the authenticated account
pub struct IdentityOperation {
    client: RedditClient,
}

impl IdentityOperation {
    pub fn with_client(client: RedditClient) -> Self {
        Self { client }
    }

    /// `api/v1/me` returns the account object itself, not a `t2` envelope.
    pub async fn execute(&self) -> Result<Account> {
        if self.client.is_readonly() {
            return Err(Error::MissingConfig("REDDIT_CLIENT_ID"));
        }
        info!("Fetching the authenticated account");
        self.client.get("api/v1/me", None).await
    }
}

pub fn format_account(account: &Account) -> String {
    format!(
        "u/{} ({})\nLink karma: {} | Comment karma: {}\nCreated: {} UTC\n",
        account.name,
        account.id,
        account.link_karma,
        account.comment_karma,
        format_timestamp(account.created_utc, chrono_tz::UTC, "%Y-%m-%d"),
    )
}

/// CLI handler function for the me command
pub async fn handle_identity_command(client: RedditClient) -> Result<()> {
    let operation = IdentityOperation::with_client(client);
    match operation.execute().await {
        Ok(account) => {
            print!("{}", format_account(&account));
            Ok(())
        }
        Err(err) => {
            debug!("Error fetching account: {}", err);
            Err(err)
        }
    }
}

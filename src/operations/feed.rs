use super::{format_timestamp, parse_timezone, truncate};
use crate::client::{RedditClient, Result};
use crate::models::{Comment, Link, Listing, ListingOptions, Thing};
use chrono_tz::Tz;
use log::{debug, info};

/// Configuration options for fetching a listing
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Listing path, e.g. `r/rust/new`, `user/spez/comments` or a comment page
    /// such as `r/rust/comments/abc`
    pub path: String,
    /// The number of items to retrieve
    pub limit: Option<u32>,
    /// Fullname to page after
    pub after: Option<String>,
    /// Display items in a brief, one-line format
    pub brief: bool,
    /// IANA timezone used for timestamps
    pub timezone: String,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            path: "r/all/new".to_string(),
            limit: Some(10),
            after: None,
            brief: false,
            timezone: "America/Los_Angeles".to_string(),
        }
    }
}

/// Result of a listing fetch
#[derive(Debug)]
pub struct FeedResult {
    /// Number of top-level children across all listings
    pub item_count: usize,
    /// Cursor for the next page
    pub after: Option<String>,
    /// Formatted output (for CLI display)
    pub formatted_output: String,
    /// One listing for a feed; a comment page gives the post and its comments.
    pub listings: Vec<Listing>,
}

/// Operation for fetching a listing from Reddit
pub struct FeedOperation {
    options: FeedOptions,
    client: RedditClient,
}

impl FeedOperation {
    pub fn with_client(options: FeedOptions, client: RedditClient) -> Self {
        Self { options, client }
    }

    pub async fn execute(&self) -> Result<FeedResult> {
        let tz = parse_timezone(&self.options.timezone)?;
        info!(
            "Fetching {} items from {}",
            self.options
                .limit
                .map(|l| l.to_string())
                .unwrap_or_else(|| "default".to_string()),
            self.options.path
        );

        let query = ListingOptions {
            limit: self.options.limit,
            after: self.options.after.clone(),
            ..Default::default()
        };
        let listings = self
            .client
            .get_listings(&self.options.path, Some(&query))
            .await?;
        let item_count: usize = listings.iter().map(Listing::len).sum();
        let after = listings.iter().rev().find_map(|l| l.after.clone());

        let mut output = String::new();
        if item_count == 0 {
            output.push_str("No items found.\n");
        } else {
            output.push_str(&format!("Found {} items\n", item_count));
            if self.options.brief {
                format_brief_output(&listings, tz, &mut output);
                output.push_str("\nType Legend:\n");
                output.push_str("[T] = Text post\n");
                output.push_str("[V] = Video\n");
                output.push_str("[I] = Image\n");
                output.push_str("[G] = Gallery\n");
                output.push_str("[L] = Link\n");
                output.push_str("[C] = Comment\n");
            } else {
                format_detailed_output(&listings, tz, &mut output);
            }
        }

        if let Some(after) = &after {
            output.push_str(&format!("\nNext page: --after {}\n", after));
        }

        Ok(FeedResult {
            item_count,
            after,
            formatted_output: output,
            listings,
        })
    }
}

fn format_brief_output(listings: &[Listing], tz: Tz, output: &mut String) {
    let mut index = 0;
    for listing in listings {
        brief_children(&listing.children, tz, 0, &mut index, output);
    }
}

/// Replies are indented under their parent comment.
fn brief_children(children: &[Thing], tz: Tz, depth: usize, index: &mut usize, output: &mut String) {
    for child in children {
        *index += 1;
        let line = match child {
            Thing::Link(link) => brief_link(link, tz),
            Thing::Comment(comment) => brief_comment(comment, tz),
            other => format!(
                "[{}] {}",
                other.kind(),
                other.name().unwrap_or("(unnamed)")
            ),
        };
        output.push_str(&format!("{:2}. {}{}\n", index, "  ".repeat(depth), line));

        if let Thing::Comment(comment) = child {
            if let Some(replies) = &comment.replies {
                brief_children(&replies.children, tz, depth + 1, index, output);
            }
        }
    }
}

fn brief_link(link: &Link, tz: Tz) -> String {
    let content = if link.is_self {
        let text = link.selftext.trim();
        if text.is_empty() {
            "[No content]".to_string()
        } else {
            format!("\"{}\"", truncate(&text.replace('\n', " "), 30))
        }
    } else {
        let url = link
            .url
            .strip_prefix("https://")
            .or_else(|| link.url.strip_prefix("http://"))
            .unwrap_or(&link.url);
        truncate(url, 30)
    };

    format!(
        "[{}] [{}] {} ({}) r/{} | ID: {} | https://reddit.com{}",
        link.type_indicator(),
        format_timestamp(link.created_utc, tz, "%H:%M"),
        truncate(&link.title, 30),
        content,
        link.subreddit,
        link.name,
        link.permalink
    )
}

fn brief_comment(comment: &Comment, tz: Tz) -> String {
    format!(
        "[C] [{}] u/{}: \"{}\" r/{} | ID: {}",
        format_timestamp(comment.created_utc, tz, "%H:%M"),
        comment.author,
        truncate(&comment.body.replace('\n', " "), 40),
        comment.subreddit,
        comment.name
    )
}

fn format_detailed_output(listings: &[Listing], tz: Tz, output: &mut String) {
    for listing in listings {
        detailed_children(&listing.children, tz, output);
    }
}

fn detailed_children(children: &[Thing], tz: Tz, output: &mut String) {
    for child in children {
        match child {
            Thing::Link(link) => {
                output.push_str("\n============ POST =============\n");
                output.push_str(&format!(
                    "[{}] [{}]\n",
                    format_timestamp(link.created_utc, tz, "%Y-%m-%d %H:%M:%S"),
                    tz.name()
                ));
                output.push_str(&format!(
                    "Thing ID: {} (use this for commenting)\n",
                    link.name
                ));
                output.push_str(&link.format_summary());
                output.push_str("\n================================\n\n");
            }
            Thing::Comment(comment) => {
                output.push_str("\n=========== COMMENT ===========\n");
                output.push_str(&format!(
                    "[{}] [{}]\n",
                    format_timestamp(comment.created_utc, tz, "%Y-%m-%d %H:%M:%S"),
                    tz.name()
                ));
                output.push_str(&format!(
                    "Thing ID: {} (reply to {})\n",
                    comment.name, comment.parent_id
                ));
                output.push_str(&format!(
                    "u/{} in r/{} | Score: {}\n\n{}\n",
                    comment.author, comment.subreddit, comment.score, comment.body
                ));
                output.push_str("================================\n\n");
                if let Some(replies) = &comment.replies {
                    detailed_children(&replies.children, tz, output);
                }
            }
            other => {
                output.push_str(&format!(
                    "\n[{}] {}\n",
                    other.kind(),
                    other.name().unwrap_or("(unnamed)")
                ));
            }
        }
    }
}

/// CLI handler function for the listing command
pub async fn handle_feed_command(options: FeedOptions, client: RedditClient) -> Result<()> {
    let operation = FeedOperation::with_client(options, client);
    match operation.execute().await {
        Ok(result) => {
            print!("{}", result.formatted_output);
            Ok(())
        }
        Err(err) => {
            debug!("Error fetching listing: {}", err);
            Err(err)
        }
    }
}

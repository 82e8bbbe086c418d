use super::{Listing, Thing};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// `replies` is either `""` or a nested `Listing` thing.
fn deserialize_replies<'de, D>(deserializer: D) -> Result<Option<Box<Listing>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) if s.is_empty() => Ok(None),
        value => {
            let thing: Thing = serde_json::from_value(value).map_err(D::Error::custom)?;
            match thing {
                Thing::Listing(listing) => Ok(Some(listing)),
                other => Err(D::Error::custom(format!(
                    "replies must be a Listing, found {}",
                    other.kind()
                ))),
            }
        }
    }
}

fn serialize_replies<S>(replies: &Option<Box<Listing>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match replies {
        Some(listing) => Thing::Listing(listing.clone()).serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

/// A comment posted by a user (`t1`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: String,
    pub name: String,
    pub author: String,
    pub author_flair_css_class: Option<String>,
    pub author_flair_text: Option<String>,
    pub approved_by: Option<String>,
    pub banned_by: Option<String>,
    pub body: String,
    pub body_html: String,
    pub distinguished: Option<String>,
    /// `false` or the edit timestamp.
    pub edited: serde_json::Value,
    pub gilded: i64,
    pub likes: Option<bool>,
    pub link_author: Option<String>,
    pub link_id: String,
    pub link_title: Option<String>,
    pub link_url: Option<String>,
    pub num_reports: Option<i64>,
    pub parent_id: String,
    pub permalink: String,
    #[serde(
        deserialize_with = "deserialize_replies",
        serialize_with = "serialize_replies"
    )]
    pub replies: Option<Box<Listing>>,
    pub saved: bool,
    pub score: i64,
    pub ups: i64,
    pub downs: i64,
    pub subreddit: String,
    pub subreddit_name_prefixed: String,
    pub subreddit_id: String,
    pub created: f64,
    pub created_utc: f64,
}

/// A user account (`t2`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub comment_karma: i64,
    pub link_karma: i64,
    pub has_mail: Option<bool>,
    pub has_mod_mail: Option<bool>,
    pub has_verified_email: Option<bool>,
    pub inbox_count: Option<i64>,
    pub is_friend: bool,
    pub is_gold: bool,
    pub is_mod: bool,
    pub modhash: Option<String>,
    pub over_18: bool,
    pub created: f64,
    pub created_utc: f64,
}

/// A submitted post (`t3`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub id: String,
    pub name: String,
    pub title: String,
    pub author: String,
    pub author_fullname: Option<String>,
    pub permalink: String,
    pub url: String,
    pub domain: String,
    pub created: f64,
    pub created_utc: f64,

    pub is_self: bool,
    pub selftext: String,
    pub selftext_html: Option<String>,
    pub is_video: bool,
    pub is_original_content: bool,
    pub thumbnail: String,
    pub media: Option<serde_json::Value>,
    pub media_embed: Option<serde_json::Value>,

    pub score: i64,
    pub ups: i64,
    pub downs: i64,
    pub likes: Option<bool>,
    pub upvote_ratio: f64,
    pub num_comments: i64,

    pub subreddit: String,
    pub subreddit_id: String,
    pub subreddit_name_prefixed: String,

    pub archived: bool,
    pub clicked: bool,
    pub hidden: bool,
    pub locked: bool,
    pub saved: bool,
    pub stickied: bool,
    pub spoiler: bool,
    pub over_18: bool,
    pub distinguished: Option<String>,
    pub edited: serde_json::Value,

    pub link_flair_text: Option<String>,
    pub link_flair_css_class: Option<String>,
    pub author_flair_text: Option<String>,
    pub author_flair_css_class: Option<String>,

    // Everything else Reddit sends along
    #[serde(flatten)]
    pub additional_fields: HashMap<String, serde_json::Value>,
}

impl Link {
    /// Format a post for display with important metadata
    pub fn format_summary(&self) -> String {
        let mut content = format!(
            "Title: {}\nAuthor: u/{}\nSubreddit: r/{}\nScore: {} ({}% upvoted) | Comments: {}\n",
            self.title,
            self.author,
            self.subreddit,
            self.score,
            (self.upvote_ratio * 100.0) as i64,
            self.num_comments,
        );

        let mut flags = Vec::new();
        if self.is_self {
            flags.push("Self Post");
        }
        if self.over_18 {
            flags.push("NSFW");
        }
        if self.spoiler {
            flags.push("Spoiler");
        }
        if self.is_video {
            flags.push("Video");
        }
        if self.is_original_content {
            flags.push("OC");
        }
        if self.stickied {
            flags.push("Stickied");
        }
        if self.locked {
            flags.push("Locked");
        }
        if !flags.is_empty() {
            content.push_str(&format!("Flags: [{}]\n", flags.join(", ")));
        }

        if let Some(flair) = self.link_flair_text.as_deref().filter(|f| !f.is_empty()) {
            content.push_str(&format!("Flair: {}\n", flair));
        }

        if self.is_self && !self.selftext.is_empty() {
            let text: String = if self.selftext.chars().count() > 500 {
                format!("{}...", self.selftext.chars().take(500).collect::<String>())
            } else {
                self.selftext.clone()
            };
            content.push_str("\nContent:\n---------\n");
            content.push_str(&text);
            content.push_str("\n---------\n");
        }

        content.push_str(&format!(
            "\nPermalink: https://reddit.com{}",
            self.permalink
        ));
        if !self.is_self && self.url != format!("https://reddit.com{}", self.permalink) {
            content.push_str(&format!("\nExternal URL: {}", self.url));
        }

        content
    }

    /// Get a short summary for the post (title, author, score)
    pub fn format_short_summary(&self) -> String {
        format!(
            "[{} | {} pts] {} - by u/{}",
            self.subreddit_name_prefixed, self.score, self.title, self.author
        )
    }

    /// One-character post type used by the brief listing output.
    pub fn type_indicator(&self) -> char {
        if self.is_self {
            'T'
        } else if self.is_video {
            'V'
        } else if self.url.contains("reddit.com/gallery") {
            'G'
        } else if self.url.contains("i.redd.it") || self.url.contains("imgur.com") {
            'I'
        } else {
            'L'
        }
    }
}

/// A private message (`t4`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: String,
    pub name: String,
    pub author: Option<String>,
    pub dest: Option<String>,
    pub body: String,
    pub body_html: String,
    pub context: String,
    pub first_message_name: Option<String>,
    pub likes: Option<bool>,
    pub link_title: Option<String>,
    pub new: bool,
    pub parent_id: Option<String>,
    #[serde(
        deserialize_with = "deserialize_replies",
        serialize_with = "serialize_replies"
    )]
    pub replies: Option<Box<Listing>>,
    pub subject: String,
    pub subreddit: Option<String>,
    pub was_comment: bool,
    pub created: f64,
    pub created_utc: f64,
}

/// Information about a subreddit (`t5`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subreddit {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub display_name_prefixed: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub description_html: Option<String>,
    pub public_description: String,
    pub header_img: Option<String>,
    pub header_title: Option<String>,
    pub accounts_active: Option<i64>,
    pub active_user_count: Option<i64>,
    pub subscribers: Option<i64>,
    pub comment_score_hide_mins: i64,
    pub over18: bool,
    pub public_traffic: bool,
    pub submission_type: Option<String>,
    pub submit_link_label: Option<String>,
    pub submit_text_label: Option<String>,
    pub subreddit_type: String,
    pub user_is_banned: Option<bool>,
    pub user_is_contributor: Option<bool>,
    pub user_is_moderator: Option<bool>,
    pub user_is_subscriber: Option<bool>,
    pub created: f64,
    pub created_utc: f64,
}

/// An award (`t6`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Award {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon_url: String,
    pub count: i64,
}

/// Comment ids left out of a comment tree (`more`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct More {
    pub id: String,
    pub name: String,
    pub parent_id: String,
    pub depth: i64,
    pub count: i64,
    pub children: Vec<String>,
}

/// A moderation log entry (`modaction`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModAction {
    pub id: String,
    pub action: String,
    #[serde(rename = "mod")]
    pub moderator: String,
    pub mod_id36: String,
    pub subreddit: String,
    pub sr_id36: String,
    pub details: Option<String>,
    pub description: Option<String>,
    pub target_fullname: Option<String>,
    pub target_author: Option<String>,
    pub target_permalink: Option<String>,
    pub target_title: Option<String>,
    pub target_body: Option<String>,
    pub created_utc: f64,
}

/// A wiki page (`wikipage`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiPage {
    pub content_md: String,
    pub content_html: String,
    pub may_revise: bool,
    pub reason: Option<String>,
    pub revision_date: i64,
    pub revision_id: Option<String>,
    /// The account that made the last revision, itself a `t2` thing.
    pub revision_by: Option<Thing>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiSubreddit {
    pub name: String,
}

/// A custom feed (`LabeledMulti`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multi {
    pub name: String,
    pub display_name: String,
    pub path: String,
    pub owner: String,
    pub description_md: String,
    pub visibility: String,
    pub over_18: bool,
    pub num_subscribers: i64,
    pub subreddits: Vec<MultiSubreddit>,
    pub created_utc: f64,
}

//! Operations module provides functionality for interacting with Reddit

pub mod about;
pub mod comment;
pub mod feed;
pub mod identity;
pub mod submit;

use crate::client::{Error, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;

/// Body returned by the `api_type=json` write endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub json: ApiJson<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiJson<T> {
    /// Each error is `[code, message, field]`.
    #[serde(default)]
    pub errors: Vec<Vec<serde_json::Value>>,
    pub data: Option<T>,
}

impl<T> ApiJson<T> {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.as_str())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(": ")
            })
            .collect()
    }
}

pub(crate) fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| Error::internal(format!("unknown timezone {:?}: {}", name, e)))
}

pub(crate) fn format_timestamp(created_utc: f64, tz: Tz, pattern: &str) -> String {
    match DateTime::from_timestamp(created_utc as i64, 0) {
        Some(utc) => utc.with_timezone(&tz).format(pattern).to_string(),
        None => "unknown".to_string(),
    }
}

/// Cut `text` to `max` characters, marking the cut with "...".
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate("ünïcödé ünïcödé", 10), "ünïcödé...");
    }

    #[test]
    fn timestamps_render_in_requested_zone() {
        let tz = parse_timezone("America/Los_Angeles").unwrap();
        // 2024-01-01T00:00:00Z
        assert_eq!(
            format_timestamp(1_704_067_200.0, tz, "%Y-%m-%d %H:%M"),
            "2023-12-31 16:00"
        );
        assert!(parse_timezone("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn api_errors_flatten_to_messages() {
        let body: ApiResponse<serde_json::Value> = serde_json::from_str(
            r#"{"json":{"errors":[["SUBREDDIT_NOEXIST","that subreddit doesn't exist","sr"]]}}"#,
        )
        .unwrap();
        assert_eq!(
            body.json.error_messages(),
            vec!["SUBREDDIT_NOEXIST: that subreddit doesn't exist: sr"]
        );
        assert!(body.json.data.is_none());
    }
}

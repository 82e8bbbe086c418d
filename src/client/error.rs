//! Error type shared by every request that goes through the client.

use super::rate::Rate;
use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

/// What the client knew about a response when it turned it into an error.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub message: String,
}

impl std::fmt::Display for ResponseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (status {}) {}",
            self.method,
            self.url,
            self.status.as_u16(),
            self.message
        )
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Request construction or local encoding failed before anything was sent.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A payload could not be decoded (or encoded). `data` holds the offending bytes.
    #[error("json error: {message}")]
    Json { message: String, data: Vec<u8> },

    #[error("response error: {0}")]
    Response(ResponseContext),

    /// The rate budget is exhausted. Callers may wait until `rate.reset` and resubmit.
    #[error("rate limit error: {context} (remaining {}, used {})", .rate.remaining, .rate.used)]
    RateLimit { context: ResponseContext, rate: Rate },

    #[error("transport error: {method} {url}: {source}")]
    Transport {
        method: Method,
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),
}

impl Error {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn internal_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }

    /// The rate snapshot that caused a rate-limit error.
    pub fn rate(&self) -> Option<&Rate> {
        match self {
            Error::RateLimit { rate, .. } => Some(rate),
            _ => None,
        }
    }

    /// HTTP status attached to response and rate-limit errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Response(context) | Error::RateLimit { context, .. } => Some(context.status),
            Error::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Raw bytes that failed to decode.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Error::Json { data, .. } => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(status: u16) -> ResponseContext {
        ResponseContext {
            method: Method::GET,
            url: Url::parse("https://oauth.reddit.com/r/rust/about").unwrap(),
            status: StatusCode::from_u16(status).unwrap(),
            message: "nope".to_string(),
        }
    }

    #[test]
    fn response_error_display_carries_method_url_and_status() {
        let err = Error::Response(context(404));
        let text = err.to_string();
        assert!(text.contains("GET"));
        assert!(text.contains("https://oauth.reddit.com/r/rust/about"));
        assert!(text.contains("404"));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn rate_limit_error_exposes_snapshot() {
        let rate = Rate {
            remaining: 0,
            used: 600,
            reset: None,
        };
        let err = Error::RateLimit {
            context: context(429),
            rate: rate.clone(),
        };
        assert!(err.is_rate_limited());
        assert_eq!(err.rate(), Some(&rate));
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn json_error_keeps_offending_bytes() {
        let err = Error::Json {
            message: "expected value".to_string(),
            data: b"<html>".to_vec(),
        };
        assert_eq!(err.data(), Some(&b"<html>"[..]));
        assert_eq!(err.status(), None);
    }
}

//! Rate-limit bookkeeping from the `x-ratelimit-*` response headers.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use reqwest::header::HeaderMap;
use std::sync::Mutex;

pub const HEADER_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RATELIMIT_USED: &str = "x-ratelimit-used";
pub const HEADER_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// The rate budget reported by the most recent response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rate {
    /// Requests the client may still make in the current window.
    pub remaining: i64,
    /// Requests the client has made in the current window.
    pub used: i64,
    /// When the window resets, if the server said so.
    pub reset: Option<DateTime<Utc>>,
}

impl Rate {
    /// Parse the three rate headers. Missing or malformed headers leave the
    /// corresponding field at its zero value.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_headers_at(headers, Utc::now())
    }

    pub(crate) fn from_headers_at(headers: &HeaderMap, now: DateTime<Utc>) -> Self {
        let mut rate = Rate::default();

        if let Some(remaining) = header_str(headers, HEADER_RATELIMIT_REMAINING) {
            // Reddit sends this one as a float, e.g. "598.0"
            rate.remaining = remaining.parse::<f64>().map(|v| v as i64).unwrap_or(0);
        }
        if let Some(used) = header_str(headers, HEADER_RATELIMIT_USED) {
            rate.used = used.parse().unwrap_or(0);
        }
        if let Some(reset) = header_str(headers, HEADER_RATELIMIT_RESET) {
            let seconds = reset.parse::<i64>().unwrap_or(0);
            if seconds != 0 {
                rate.reset = DateTime::from_timestamp(now.timestamp(), 0)
                    .map(|truncated| truncated + Duration::seconds(seconds));
            }
        }

        rate
    }

    /// True while the budget is spent and the window has not reset yet.
    pub fn is_exhausted_at(&self, now: DateTime<Utc>) -> bool {
        match self.reset {
            Some(reset) => self.remaining == 0 && now < reset,
            None => false,
        }
    }
}

/// True when the response itself says the budget is spent, whatever its status.
pub fn headers_signal_exhaustion(headers: &HeaderMap) -> bool {
    header_str(headers, HEADER_RATELIMIT_REMAINING)
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v == 0.0)
        .unwrap_or(false)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Shared rate record. The lock is only ever held for a copy in or out.
#[derive(Debug, Default)]
pub struct RateLimiter {
    rate: Mutex<Rate>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Rate {
        match self.rate.lock() {
            Ok(rate) => rate.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, rate: Rate) {
        debug!(
            "Rate updated: remaining={} used={} reset={:?}",
            rate.remaining, rate.used, rate.reset
        );
        match self.rate.lock() {
            Ok(mut current) => *current = rate,
            Err(poisoned) => *poisoned.into_inner() = rate,
        }
    }

    /// Returns the blocking snapshot when a request should not be sent at all.
    pub fn check_before_send(&self) -> Option<Rate> {
        self.check_before_send_at(Utc::now())
    }

    pub(crate) fn check_before_send_at(&self, now: DateTime<Utc>) -> Option<Rate> {
        let rate = self.snapshot();
        if rate.is_exhausted_at(now) {
            Some(rate)
        } else {
            None
        }
    }
}

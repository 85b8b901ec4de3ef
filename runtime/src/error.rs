// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fatal harvest errors.
//!
//! Only page-level and credential-level failures live here. Field and record
//! extraction problems never become an error value: the extractor logs them
//! and substitutes a default, and an exhausted locator cascade simply yields
//! no containers.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Everything that can abort a harvest.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("no stored session at {}; capture a session bundle first", path.display())]
    AuthMissing { path: PathBuf },

    #[error("session bundle at {} is unreadable: {reason}", path.display())]
    AuthUnreadable { path: PathBuf, reason: String },

    #[error("stored session is {age_days} day(s) old (limit {max_age_days}); capture a fresh one")]
    AuthExpired { age_days: i64, max_age_days: i64 },

    #[error("stored session claims a capture time in the future ({captured_at}); capture a fresh one")]
    AuthFromFuture { captured_at: DateTime<Utc> },

    #[error("session cookies were rejected: redirected to login at {url}")]
    SessionRejected { url: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("invalid filter criteria: {0}")]
    InvalidCriteria(String),

    #[error("invalid selector table: {0}")]
    Selectors(String),
}

impl HarvestError {
    /// Whether the error stems from the credential bundle rather than the page.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthMissing { .. }
                | Self::AuthUnreadable { .. }
                | Self::AuthExpired { .. }
                | Self::AuthFromFuture { .. }
                | Self::SessionRejected { .. }
        )
    }
}

/// Crate-wide result alias.
pub type HarvestResult<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_classification() {
        let missing = HarvestError::AuthMissing {
            path: PathBuf::from("auth.json"),
        };
        assert!(missing.is_auth());
        assert!(missing.to_string().contains("auth.json"));

        let nav = HarvestError::Navigation {
            url: "https://x.com/home".into(),
            reason: "net::ERR_NAME_NOT_RESOLVED".into(),
        };
        assert!(!nav.is_auth());
        assert!(nav.to_string().contains("https://x.com/home"));
    }

    #[test]
    fn test_expired_message_mentions_limit() {
        let err = HarvestError::AuthExpired {
            age_days: 9,
            max_age_days: 7,
        };
        assert_eq!(
            err.to_string(),
            "stored session is 9 day(s) old (limit 7); capture a fresh one"
        );
    }
}

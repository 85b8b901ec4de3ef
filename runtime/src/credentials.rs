// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Session credentials: the cookie and user-agent bundle a harvest runs under.
//!
//! Capturing a session (an interactive login) happens elsewhere; this module
//! only loads, validates and discards a stored bundle. The on-disk format is
//!
//! ```json
//! { "cookies": [{ "name": "...", "value": "...", "domain": ".x.com", "path": "/" }],
//!   "userAgent": "Mozilla/5.0 ...",
//!   "loginTime": "2026-10-11T09:12:44.118Z" }
//! ```
//!
//! Extra cookie attributes (`expires`, `httpOnly`, `sameSite`, ...) written by
//! other browser tooling are ignored.

use crate::error::{HarvestError, HarvestResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// Bundles older than this many days are considered stale.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// One browser cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

/// Cookies plus the user agent they were issued to, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBundle {
    pub cookies: Vec<Cookie>,
    pub user_agent: String,
    #[serde(rename = "loginTime")]
    pub captured_at: DateTime<Utc>,
}

impl CredentialBundle {
    /// Whole days elapsed since capture.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.captured_at).num_days()
    }

    /// A bundle is valid while strictly younger than `max_age_days`. A capture
    /// time after `now` is never valid.
    pub fn is_valid(&self, now: DateTime<Utc>, max_age_days: i64) -> bool {
        let age = now - self.captured_at;
        age >= Duration::zero() && age < Duration::days(max_age_days)
    }

    /// Fail with [`HarvestError::AuthFromFuture`] or [`HarvestError::AuthExpired`]
    /// unless the bundle is valid.
    pub fn ensure_valid(&self, now: DateTime<Utc>, max_age_days: i64) -> HarvestResult<()> {
        if self.captured_at > now {
            return Err(HarvestError::AuthFromFuture {
                captured_at: self.captured_at,
            });
        }
        if self.is_valid(now, max_age_days) {
            Ok(())
        } else {
            Err(HarvestError::AuthExpired {
                age_days: self.age_days(now),
                max_age_days,
            })
        }
    }

    /// Copy of the bundle with domain-less cookies pinned to `base`'s host.
    pub fn scoped_to(&self, base: &Url) -> CredentialBundle {
        let host = base.host_str().unwrap_or_default();
        let cookies = self
            .cookies
            .iter()
            .map(|c| Cookie {
                domain: if c.domain.is_empty() {
                    host.to_string()
                } else {
                    c.domain.clone()
                },
                ..c.clone()
            })
            .collect();
        CredentialBundle {
            cookies,
            user_agent: self.user_agent.clone(),
            captured_at: self.captured_at,
        }
    }
}

/// Source of credential bundles.
pub trait SessionProvider: Send + Sync {
    /// Load the current bundle. Missing or unreadable bundles are errors.
    fn load(&self) -> HarvestResult<CredentialBundle>;

    /// Load the bundle and check its age before anything touches the network.
    fn load_valid(&self, now: DateTime<Utc>, max_age_days: i64) -> HarvestResult<CredentialBundle> {
        let bundle = self.load()?;
        bundle.ensure_valid(now, max_age_days)?;
        Ok(bundle)
    }
}

/// Snapshot of the stored session for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub path: PathBuf,
    pub present: bool,
    pub captured_at: Option<DateTime<Utc>>,
    pub age_days: Option<i64>,
    pub cookie_count: usize,
    pub valid: bool,
}

/// Bundle stored as JSON on disk.
#[derive(Debug, Clone)]
pub struct FileSessionProvider {
    path: PathBuf,
}

impl FileSessionProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the stored bundle. Returns whether one existed.
    pub fn clear(&self) -> HarvestResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("removed session bundle {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HarvestError::AuthUnreadable {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Describe the stored bundle without failing on absence or staleness.
    pub fn status(&self, now: DateTime<Utc>, max_age_days: i64) -> SessionStatus {
        match self.load() {
            Ok(bundle) => SessionStatus {
                path: self.path.clone(),
                present: true,
                captured_at: Some(bundle.captured_at),
                age_days: Some(bundle.age_days(now)),
                cookie_count: bundle.cookies.len(),
                valid: bundle.is_valid(now, max_age_days),
            },
            Err(_) => SessionStatus {
                path: self.path.clone(),
                present: self.path.exists(),
                captured_at: None,
                age_days: None,
                cookie_count: 0,
                valid: false,
            },
        }
    }
}

impl SessionProvider for FileSessionProvider {
    fn load(&self) -> HarvestResult<CredentialBundle> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HarvestError::AuthMissing {
                    path: self.path.clone(),
                })
            }
            Err(e) => {
                return Err(HarvestError::AuthUnreadable {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        };
        serde_json::from_str(&data).map_err(|e| HarvestError::AuthUnreadable {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const STORED: &str = r#"{
        "cookies": [
            { "name": "auth_token", "value": "abc", "domain": ".x.com", "path": "/",
              "expires": 1790000000, "httpOnly": true, "secure": true, "sameSite": "None" },
            { "name": "ct0", "value": "def", "domain": ".x.com" }
        ],
        "userAgent": "Mozilla/5.0 (X11; Linux x86_64)",
        "loginTime": "2026-10-11T09:12:44.118Z"
    }"#;

    fn captured() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 11, 9, 12, 44).unwrap() + Duration::milliseconds(118)
    }

    #[test]
    fn test_load_stored_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, STORED).unwrap();

        let bundle = FileSessionProvider::new(&path).load().unwrap();
        assert_eq!(bundle.cookies.len(), 2);
        assert_eq!(bundle.cookies[0].name, "auth_token");
        assert_eq!(bundle.cookies[1].path, "/");
        assert_eq!(bundle.user_agent, "Mozilla/5.0 (X11; Linux x86_64)");
        assert_eq!(bundle.captured_at, captured());
    }

    #[test]
    fn test_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FileSessionProvider::new(dir.path().join("none.json"));
        assert!(matches!(missing.load(), Err(HarvestError::AuthMissing { .. })));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let corrupt = FileSessionProvider::new(&path);
        assert!(matches!(corrupt.load(), Err(HarvestError::AuthUnreadable { .. })));
    }

    #[test]
    fn test_validity_window() {
        let bundle: CredentialBundle = serde_json::from_str(STORED).unwrap();
        let six_days = captured() + Duration::days(6);
        let seven_days = captured() + Duration::days(7);
        assert!(bundle.is_valid(six_days, DEFAULT_MAX_AGE_DAYS));
        assert!(!bundle.is_valid(seven_days, DEFAULT_MAX_AGE_DAYS));

        let err = bundle.ensure_valid(seven_days, DEFAULT_MAX_AGE_DAYS).unwrap_err();
        assert!(matches!(
            err,
            HarvestError::AuthExpired {
                age_days: 7,
                max_age_days: 7
            }
        ));
    }

    #[test]
    fn test_future_capture_time_is_rejected() {
        let bundle: CredentialBundle = serde_json::from_str(STORED).unwrap();
        let before_capture = captured() - Duration::days(365);
        assert!(!bundle.is_valid(before_capture, DEFAULT_MAX_AGE_DAYS));
        assert!(!bundle.is_valid(captured() - Duration::seconds(1), DEFAULT_MAX_AGE_DAYS));
        assert!(bundle.is_valid(captured(), DEFAULT_MAX_AGE_DAYS));

        let err = bundle
            .ensure_valid(before_capture, DEFAULT_MAX_AGE_DAYS)
            .unwrap_err();
        assert!(err.is_auth());
        assert!(matches!(err, HarvestError::AuthFromFuture { captured_at } if captured_at == captured()));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, STORED).unwrap();
        let provider = FileSessionProvider::new(&path);
        assert!(!provider.status(before_capture, DEFAULT_MAX_AGE_DAYS).valid);
        assert!(matches!(
            provider.load_valid(before_capture, DEFAULT_MAX_AGE_DAYS),
            Err(HarvestError::AuthFromFuture { .. })
        ));
    }

    #[test]
    fn test_load_valid_checks_age_before_returning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, STORED).unwrap();
        let provider = FileSessionProvider::new(&path);

        assert!(provider
            .load_valid(captured() + Duration::hours(1), DEFAULT_MAX_AGE_DAYS)
            .is_ok());
        assert!(provider
            .load_valid(captured() + Duration::days(30), DEFAULT_MAX_AGE_DAYS)
            .is_err());
    }

    #[test]
    fn test_scoped_to_fills_missing_domains() {
        let mut bundle: CredentialBundle = serde_json::from_str(STORED).unwrap();
        bundle.cookies[1].domain.clear();
        let scoped = bundle.scoped_to(&Url::parse("https://x.com").unwrap());
        assert_eq!(scoped.cookies[0].domain, ".x.com");
        assert_eq!(scoped.cookies[1].domain, "x.com");
        assert_eq!(scoped.user_agent, bundle.user_agent);
    }

    #[test]
    fn test_status_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, STORED).unwrap();
        let provider = FileSessionProvider::new(&path);

        let status = provider.status(captured() + Duration::days(2), DEFAULT_MAX_AGE_DAYS);
        assert!(status.present);
        assert!(status.valid);
        assert_eq!(status.age_days, Some(2));
        assert_eq!(status.cookie_count, 2);

        assert!(provider.clear().unwrap());
        assert!(!provider.clear().unwrap());
        let gone = provider.status(captured(), DEFAULT_MAX_AGE_DAYS);
        assert!(!gone.present);
        assert!(!gone.valid);
    }
}

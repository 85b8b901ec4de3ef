// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harvest configuration.
//!
//! All tunables travel in one explicit [`HarvestConfig`] value that is handed
//! to the session provider, the query builder and the harvester at
//! construction time. Nothing reads ambient globals after startup.

use crate::credentials::DEFAULT_MAX_AGE_DAYS;
use std::path::PathBuf;
use url::Url;

/// Environment variable naming the session bundle file.
pub const AUTH_FILE_ENV: &str = "HARVEST_AUTH_FILE";

/// Bundle file looked up in the working directory.
pub const CWD_AUTH_FILE: &str = "twitter-auth.json";

/// Default site root.
pub const DEFAULT_BASE_URL: &str = "https://x.com";

/// Consecutive empty passes that end a harvest.
pub const DEFAULT_STALL_THRESHOLD: u32 = 3;

/// Everything a harvest needs besides the criteria.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Stored session bundle.
    pub auth_file: PathBuf,
    /// Site root that navigation targets are resolved against.
    pub base_url: Url,
    /// Run the browser without a window.
    pub headless: bool,
    /// Explicit browser binary; discovered when `None`.
    pub chromium_path: Option<PathBuf>,
    /// Bound on loading the navigation target.
    pub navigation_timeout_ms: u64,
    /// Bound on waiting for the first record container to render.
    pub ready_timeout_ms: u64,
    /// Pause after navigation before the readiness wait.
    pub initial_settle_ms: u64,
    /// Pause after each scroll for new content to render.
    pub scroll_settle_ms: u64,
    /// Lower bound of the scroll budget.
    pub min_scroll_budget: u32,
    /// Scroll budget per requested record.
    pub scroll_budget_factor: u32,
    /// Consecutive passes without a new record that end the harvest.
    pub stall_threshold: u32,
    /// Age at which a session bundle stops being accepted.
    pub session_max_age_days: i64,
    /// Replacement selector table; the embedded one when `None`.
    pub selectors_file: Option<PathBuf>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            auth_file: resolve_auth_file(None),
            base_url: default_base_url(),
            headless: true,
            chromium_path: None,
            navigation_timeout_ms: 15_000,
            ready_timeout_ms: 20_000,
            initial_settle_ms: 3_000,
            scroll_settle_ms: 1_000,
            min_scroll_budget: 20,
            scroll_budget_factor: 2,
            stall_threshold: DEFAULT_STALL_THRESHOLD,
            session_max_age_days: DEFAULT_MAX_AGE_DAYS,
            selectors_file: None,
        }
    }
}

impl HarvestConfig {
    /// Scroll budget for a harvest of `limit` records.
    pub fn scroll_budget(&self, limit: usize) -> u32 {
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);
        limit
            .saturating_mul(self.scroll_budget_factor)
            .max(self.min_scroll_budget)
    }

    /// Configuration with every wait set to zero, for scripted pages.
    pub fn immediate() -> Self {
        Self {
            initial_settle_ms: 0,
            scroll_settle_ms: 0,
            ..Self::default()
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

/// Resolve the session bundle path.
///
/// Priority: explicit path, `HARVEST_AUTH_FILE`, `./twitter-auth.json` when it
/// exists, then `~/.cortex/harvest-auth.json`.
pub fn resolve_auth_file(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(AUTH_FILE_ENV) {
        if !env_path.is_empty() {
            return PathBuf::from(env_path);
        }
    }

    let cwd = PathBuf::from(CWD_AUTH_FILE);
    if cwd.exists() {
        return cwd;
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".cortex")
        .join("harvest-auth.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarvestConfig::default();
        assert_eq!(config.base_url.as_str(), "https://x.com/");
        assert!(config.headless);
        assert_eq!(config.stall_threshold, 3);
        assert_eq!(config.session_max_age_days, 7);
    }

    #[test]
    fn test_scroll_budget() {
        let config = HarvestConfig::default();
        assert_eq!(config.scroll_budget(1), 20);
        assert_eq!(config.scroll_budget(10), 20);
        assert_eq!(config.scroll_budget(50), 100);
        assert_eq!(config.scroll_budget(usize::MAX), u32::MAX);
    }

    #[test]
    fn test_explicit_auth_file_wins() {
        assert_eq!(
            resolve_auth_file(Some("/tmp/custom-auth.json")),
            PathBuf::from("/tmp/custom-auth.json")
        );
    }

    #[test]
    fn test_immediate_has_no_waits() {
        let config = HarvestConfig::immediate();
        assert_eq!(config.initial_settle_ms, 0);
        assert_eq!(config.scroll_settle_ms, 0);
        assert_eq!(config.navigation_timeout_ms, 15_000);
    }
}

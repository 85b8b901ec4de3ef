// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Filter criteria describing the slice of the feed a harvest should return.
//!
//! Criteria are built once per invocation and only read afterwards: the
//! query builder, the pagination controller and the post-filter all take
//! `&FilterCriteria`.

use crate::error::{HarvestError, HarvestResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Result count used when the caller does not ask for one.
pub const DEFAULT_LIMIT: usize = 10;

/// What to harvest and which records to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Author handle, with or without a leading `@`.
    pub author: Option<String>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Hashtag, with or without a leading `#`.
    pub hashtag: Option<String>,
    /// Language code such as `en` or `ja`.
    pub lang: Option<String>,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub include_replies: bool,
    pub include_retweets: bool,
    pub verified_only: bool,
    pub min_likes: u64,
    /// Read the bookmark view instead of a timeline or search.
    pub bookmarks: bool,
    /// Maximum number of records returned. Must be positive.
    pub limit: usize,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            author: None,
            search: None,
            hashtag: None,
            lang: None,
            since: None,
            until: None,
            include_replies: false,
            include_retweets: false,
            verified_only: false,
            min_likes: 0,
            bookmarks: false,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FilterCriteria {
    /// Reject criteria no harvest can satisfy.
    pub fn validate(&self) -> HarvestResult<()> {
        if self.limit == 0 {
            return Err(HarvestError::InvalidCriteria(
                "limit must be a positive integer".into(),
            ));
        }
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(HarvestError::InvalidCriteria(format!(
                    "since ({since}) is after until ({until})"
                )));
            }
        }
        if let Some(author) = &self.author {
            if normalize_handle(author).is_empty() {
                return Err(HarvestError::InvalidCriteria("author handle is empty".into()));
            }
        }
        Ok(())
    }

    /// Author handle without the leading `@`, if one was given.
    pub fn author_handle(&self) -> Option<String> {
        self.author
            .as_deref()
            .map(normalize_handle)
            .filter(|h| !h.is_empty())
    }

    /// Search term, ignoring blank input.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Hashtag literal with exactly one leading `#`.
    pub fn hashtag_literal(&self) -> Option<String> {
        self.hashtag
            .as_deref()
            .map(|h| h.trim().trim_start_matches('#'))
            .filter(|h| !h.is_empty())
            .map(|h| format!("#{h}"))
    }
}

/// Strip whitespace and leading `@` characters from a handle.
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_string()
}

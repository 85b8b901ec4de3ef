// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Navigation targets built from filter criteria.
//!
//! Target selection is pure: bookmarks win, then search (any search term,
//! with or without an author), then an author's timeline, then the home
//! feed. The base URL comes from [`HarvestConfig`](crate::config::HarvestConfig)
//! rather than a hard-coded host.

use crate::criteria::FilterCriteria;
use serde::Serialize;
use url::Url;

/// The view a harvest loads before extracting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum NavigationTarget {
    Home,
    Bookmarks,
    Timeline { handle: String },
    Search { query: String },
}

/// Builds navigation targets and their URLs against a fixed base.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base: Url,
}

impl QueryBuilder {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Pick the navigation target for `criteria`.
    pub fn build_target(&self, criteria: &FilterCriteria) -> NavigationTarget {
        build_target(criteria)
    }

    /// Absolute URL of `target`.
    pub fn url_for(&self, target: &NavigationTarget) -> Url {
        let mut url = self.base.clone();
        match target {
            NavigationTarget::Home => url.set_path("/home"),
            NavigationTarget::Bookmarks => url.set_path("/i/bookmarks"),
            NavigationTarget::Timeline { handle } => url.set_path(&format!("/{handle}")),
            NavigationTarget::Search { query } => {
                url.set_path("/search");
                url.query_pairs_mut()
                    .clear()
                    .append_pair("q", query)
                    .append_pair("src", "typed_query")
                    .append_pair("f", "live");
            }
        }
        url
    }
}

/// Pick the navigation target for `criteria`.
pub fn build_target(criteria: &FilterCriteria) -> NavigationTarget {
    if criteria.bookmarks {
        return NavigationTarget::Bookmarks;
    }
    if criteria.search_term().is_some() {
        return NavigationTarget::Search {
            query: build_search_query(criteria),
        };
    }
    match criteria.author_handle() {
        Some(handle) => NavigationTarget::Timeline { handle },
        None => NavigationTarget::Home,
    }
}

/// Search query string, terms in fixed order: search term, `from:`,
/// `since:`, `until:`, hashtag, `lang:`, reply and retweet exclusions,
/// `filter:verified`.
pub fn build_search_query(criteria: &FilterCriteria) -> String {
    let mut terms: Vec<String> = Vec::new();

    if let Some(search) = criteria.search_term() {
        terms.push(search.to_string());
    }
    if let Some(handle) = criteria.author_handle() {
        terms.push(format!("from:{handle}"));
    }
    if let Some(since) = criteria.since {
        terms.push(format!("since:{}", since.format("%Y-%m-%d")));
    }
    if let Some(until) = criteria.until {
        terms.push(format!("until:{}", until.format("%Y-%m-%d")));
    }
    if let Some(tag) = criteria.hashtag_literal() {
        terms.push(tag);
    }
    if let Some(lang) = criteria.lang.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        terms.push(format!("lang:{lang}"));
    }
    if !criteria.include_replies {
        terms.push("-filter:replies".into());
    }
    if !criteria.include_retweets {
        terms.push("-filter:retweets".into());
    }
    if criteria.verified_only {
        terms.push("filter:verified".into());
    }

    terms.join(" ")
}

// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Resilient element location over a rendered-document snapshot.
//!
//! Every lookup (record containers and each field inside a container) is a
//! prioritized matcher list: an ordered cascade of CSS selectors, most
//! specific first. The first pattern that yields a match wins; a cascade that
//! runs out of patterns yields nothing rather than an error, so a markup
//! change that breaks one field degrades that field only.
//!
//! The cascades are data, not code. They are loaded from
//! `record_selectors.json` (embedded at compile time via `include_str!`) or
//! from a replacement table on disk, then compiled once into a [`Locator`].
//! Patterns that fail to parse are skipped with a warning.
//!
//! Like the rest of the `scraper` API, everything here is synchronous and
//! borrows from a parsed [`Html`], which is `!Send`: parse, locate and extract
//! inside one synchronous call and hand back owned records.

use crate::error::{HarvestError, HarvestResult};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Built-in selector table, embedded so there is no runtime file I/O.
const BUILTIN_SELECTORS: &str = include_str!("record_selectors.json");

// ── Declarative table ──────────────────────────────────────────────────────

/// Serialized form of the selector cascades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorTable {
    /// Record container patterns, most specific first.
    pub container: Vec<String>,
    #[serde(default)]
    pub fields: FieldSelectors,
    #[serde(default)]
    pub media: MediaPolicy,
}

/// Per-field cascades. A missing field compiles to an empty cascade and
/// always resolves to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSelectors {
    pub text: Vec<String>,
    pub author: Vec<String>,
    pub author_link: Vec<String>,
    pub timestamp: Vec<String>,
    pub verified: Vec<String>,
    pub likes: Vec<String>,
    pub retweets: Vec<String>,
    pub replies: Vec<String>,
    pub social_context: Vec<String>,
    pub nested_record: Vec<String>,
    pub media: Vec<String>,
}

/// Which media sources count as record attachments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaPolicy {
    /// Hosts accepted for image sources.
    pub hosts: Vec<String>,
    /// Hosts accepted for video sources.
    pub video_hosts: Vec<String>,
    /// Path fragments that mark profile or banner imagery.
    pub excluded_path_fragments: Vec<String>,
}

// ── Compiled cascades ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Pattern {
    source: String,
    selector: Selector,
}

/// An ordered cascade of selectors for one lookup.
#[derive(Debug, Clone)]
pub struct MatcherList {
    patterns: Vec<Pattern>,
}

impl MatcherList {
    /// Compile `sources`, skipping (and logging) any that fail to parse.
    pub fn compile(name: &'static str, sources: &[String]) -> Self {
        let patterns = sources
            .iter()
            .filter_map(|source| match Selector::parse(source) {
                Ok(selector) => Some(Pattern {
                    source: source.clone(),
                    selector,
                }),
                Err(e) => {
                    warn!("skipping invalid {name} selector {source:?}: {e:?}");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern sources in priority order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }

    /// All matches of the first pattern that matches anything in `doc`.
    pub fn locate<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        for pattern in &self.patterns {
            let hits: Vec<ElementRef<'a>> = doc.select(&pattern.selector).collect();
            if !hits.is_empty() {
                return hits;
            }
        }
        Vec::new()
    }

    /// All matches under `scope` of the first pattern that matches anything.
    pub fn all_in<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for pattern in &self.patterns {
            let hits: Vec<ElementRef<'a>> = scope.select(&pattern.selector).collect();
            if !hits.is_empty() {
                return hits;
            }
        }
        Vec::new()
    }

    /// First descendant of `scope` matched by the highest-priority pattern.
    pub fn first_in<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.first_where(scope, |_| true)
    }

    /// Like [`first_in`](Self::first_in), but a match only counts when
    /// `accept` approves it; rejected matches fall through to later
    /// elements and then to later patterns.
    pub fn first_where<'a, F>(&self, scope: ElementRef<'a>, accept: F) -> Option<ElementRef<'a>>
    where
        F: Fn(&ElementRef<'a>) -> bool,
    {
        self.patterns
            .iter()
            .find_map(|pattern| scope.select(&pattern.selector).find(|el| accept(el)))
    }

    /// Whether any pattern matches a descendant of `scope`.
    pub fn any_in(&self, scope: ElementRef<'_>) -> bool {
        self.first_in(scope).is_some()
    }

    /// Match count per pattern over the whole document.
    pub fn hits_per_pattern(&self, doc: &Html) -> Vec<PatternHits> {
        self.patterns
            .iter()
            .map(|p| PatternHits {
                pattern: p.source.clone(),
                count: doc.select(&p.selector).count(),
            })
            .collect()
    }
}

/// Diagnostic: how many elements one pattern matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternHits {
    pub pattern: String,
    pub count: usize,
}

/// Compiled cascades for containers and every record field.
#[derive(Debug, Clone)]
pub struct Locator {
    pub containers: MatcherList,
    pub text: MatcherList,
    pub author: MatcherList,
    pub author_link: MatcherList,
    pub timestamp: MatcherList,
    pub verified: MatcherList,
    pub likes: MatcherList,
    pub retweets: MatcherList,
    pub replies: MatcherList,
    pub social_context: MatcherList,
    pub nested_record: MatcherList,
    pub media: MatcherList,
    pub media_policy: MediaPolicy,
}

impl Locator {
    /// Locator for the built-in selector table.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_SELECTORS).expect("embedded selector table is valid")
    }

    /// Compile a selector table given as JSON.
    pub fn from_json(json: &str) -> HarvestResult<Self> {
        let table: SelectorTable =
            serde_json::from_str(json).map_err(|e| HarvestError::Selectors(e.to_string()))?;
        Self::compile(&table)
    }

    /// Load and compile a selector table from disk.
    pub fn from_file(path: &Path) -> HarvestResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            HarvestError::Selectors(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Compile a selector table. Fails only when no container pattern is
    /// usable, since nothing could ever be extracted.
    pub fn compile(table: &SelectorTable) -> HarvestResult<Self> {
        let containers = MatcherList::compile("container", &table.container);
        if containers.is_empty() {
            return Err(HarvestError::Selectors(
                "no usable container pattern".into(),
            ));
        }
        let f = &table.fields;
        Ok(Self {
            containers,
            text: MatcherList::compile("text", &f.text),
            author: MatcherList::compile("author", &f.author),
            author_link: MatcherList::compile("author_link", &f.author_link),
            timestamp: MatcherList::compile("timestamp", &f.timestamp),
            verified: MatcherList::compile("verified", &f.verified),
            likes: MatcherList::compile("likes", &f.likes),
            retweets: MatcherList::compile("retweets", &f.retweets),
            replies: MatcherList::compile("replies", &f.replies),
            social_context: MatcherList::compile("social_context", &f.social_context),
            nested_record: MatcherList::compile("nested_record", &f.nested_record),
            media: MatcherList::compile("media", &f.media),
            media_policy: table.media.clone(),
        })
    }

    /// Candidate record containers, in document order, from the first
    /// container pattern that matches at least once. Empty when none does.
    pub fn locate_record_containers<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        self.containers.locate(doc)
    }

    /// Per-pattern container hit counts, for debugging markup drift.
    pub fn diagnose(&self, doc: &Html) -> Vec<PatternHits> {
        self.containers.hits_per_pattern(doc)
    }

    /// All container patterns as one selector group, used to wait for the
    /// feed to render.
    pub fn container_selector_group(&self) -> String {
        self.containers.sources().collect::<Vec<_>>().join(", ")
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::builtin()
    }
}

// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Record extraction: a pure transformation from a rendered-document
//! snapshot to normalized [`ContentRecord`]s.
//!
//! The browser only supplies HTML; everything interesting (field cascades,
//! counter parsing, entity scanning, fingerprinting) happens here against a
//! parsed [`Html`], so it is unit-testable without a live page.
//!
//! # Fault tolerance
//!
//! Each field resolves independently. A field whose cascade finds nothing
//! takes its default (empty string, zero, `false`, capture time); a field
//! whose markup is present but unparsable logs a warning and takes the same
//! default. The only whole-record rejection is an empty body: containers
//! without text are promoted or placeholder slots, not posts.

pub mod entities;
pub mod media;

use crate::locator::Locator;
use crate::record::fingerprint::fingerprint;
use crate::record::{Author, ContentRecord, Engagement, Flags};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

/// Outcome of extracting one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Containers the locator matched.
    pub containers: usize,
    /// Records extracted from them, in document order.
    pub records: Vec<ContentRecord>,
}

/// Parse `html` and extract every record it contains.
///
/// `captured_at` stands in for records whose markup lacks a timestamp.
pub fn extract_snapshot(locator: &Locator, html: &str, captured_at: DateTime<Utc>) -> Snapshot {
    let doc = Html::parse_document(html);
    let containers = locator.locate_record_containers(&doc);

    if containers.is_empty() {
        debug!(
            "no record containers matched; pattern hits: {:?}",
            locator.diagnose(&doc)
        );
    }

    let records = containers
        .iter()
        .filter_map(|container| extract(locator, *container, captured_at))
        .collect();

    Snapshot {
        containers: containers.len(),
        records,
    }
}

/// Turn one container into a record, or `None` when its body is empty.
pub fn extract(
    locator: &Locator,
    container: ElementRef<'_>,
    captured_at: DateTime<Utc>,
) -> Option<ContentRecord> {
    let text = resolve_text(locator, container);
    if text.is_empty() {
        debug!("discarding container without body text");
        return None;
    }

    let (handle, display_name) = resolve_author(locator, container);
    let timestamp = resolve_timestamp(locator, container);
    let verified = locator.verified.any_in(container);

    let engagement = Engagement {
        likes: resolve_counter(locator, container, Counter::Likes),
        retweets: resolve_counter(locator, container, Counter::Retweets),
        replies: resolve_counter(locator, container, Counter::Replies),
    };

    let flags = Flags {
        is_retweet: locator.social_context.any_in(container),
        is_reply: locator.nested_record.any_in(container),
    };

    Some(ContentRecord {
        id: fingerprint(&handle, timestamp, &text),
        entities: entities::scan(&text),
        media: media::collect(locator, container),
        author: Author {
            handle,
            display_name,
            verified,
        },
        created_at: timestamp.unwrap_or(captured_at),
        engagement,
        flags,
        text,
    })
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

fn resolve_text(locator: &Locator, container: ElementRef<'_>) -> String {
    locator
        .text
        .first_where(container, |el| !element_text(el).trim().is_empty())
        .map(|el| element_text(&el).trim().to_string())
        .unwrap_or_default()
}

/// Handle and display name from the author block.
///
/// The handle is the last path segment of the block's profile link (the
/// block itself when it is a link). The display name is the block text up
/// to the first `@`.
fn resolve_author(locator: &Locator, container: ElementRef<'_>) -> (String, String) {
    let Some(block) = locator.author.first_in(container) else {
        debug!("author block not found");
        return (String::new(), String::new());
    };

    let href = block
        .value()
        .attr("href")
        .or_else(|| {
            locator
                .author_link
                .first_in(block)
                .and_then(|a| a.value().attr("href"))
        })
        .unwrap_or_default();
    let handle = handle_from_href(href);
    if handle.is_empty() {
        debug!("author link missing or without a path: {href:?}");
    }

    let block_text = element_text(&block);
    let display_name = block_text
        .split('@')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    (handle, display_name)
}

/// Last non-empty path segment of a profile link, without a leading `@`.
pub fn handle_from_href(href: &str) -> String {
    let path = href.split(|c| c == '?' || c == '#').next().unwrap_or_default();
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .filter(|segment| !segment.ends_with(':'))
        .map(|segment| segment.trim_start_matches('@').to_string())
        .unwrap_or_default()
}

fn resolve_timestamp(locator: &Locator, container: ElementRef<'_>) -> Option<DateTime<Utc>> {
    let raw = locator
        .timestamp
        .first_in(container)
        .and_then(|el| el.value().attr("datetime"))?;

    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!("unparsable timestamp {raw:?}, using capture time: {e}");
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Counter {
    Likes,
    Retweets,
    Replies,
}

fn resolve_counter(locator: &Locator, container: ElementRef<'_>, counter: Counter) -> u64 {
    let matcher = match counter {
        Counter::Likes => &locator.likes,
        Counter::Retweets => &locator.retweets,
        Counter::Replies => &locator.replies,
    };
    matcher
        .first_in(container)
        .map(|el| parse_counter(&element_text(&el)))
        .unwrap_or(0)
}

/// Parse a visible counter by keeping its digits. Empty or oversized
/// counters are zero.
pub fn parse_counter(text: &str) -> u64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or_else(|e| {
        warn!("unparsable counter {text:?}: {e}");
        0
    })
}

// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harvested post records.
//!
//! A [`ContentRecord`] is produced by the extractor, owned by the harvest
//! session while pagination runs, and handed to the caller as immutable
//! output. Serialization follows the camelCase JSON layout consumers of the
//! CLI expect (`createdAt`, `displayName`, `isRetweet`, ...).

pub mod fingerprint;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One harvested post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Deterministic content fingerprint, see [`fingerprint::fingerprint`].
    pub id: String,
    /// Trimmed body text. Never empty for records that leave the extractor.
    pub text: String,
    pub author: Author,
    /// Source timestamp, or the capture time when the markup had none.
    pub created_at: DateTime<Utc>,
    pub engagement: Engagement,
    pub media: Vec<MediaItem>,
    pub entities: Entities,
    pub flags: Flags,
}

/// Author reference resolved from the record's author block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Handle without the leading `@`; empty when no profile link resolved.
    pub handle: String,
    pub display_name: String,
    pub verified: bool,
}

/// Visible engagement counters. Unparsable counters are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
}

/// Kind of an attached media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// A media attachment, in the order it was encountered in the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// Hashtags and mentions found in the text, without their `#`/`@` prefix.
///
/// Order of first appearance; repeated tokens are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    pub is_retweet: bool,
    pub is_reply: bool,
}

impl ContentRecord {
    /// Number of likes, the counter the post-filter thresholds on.
    pub fn likes(&self) -> u64 {
        self.engagement.likes
    }
}

//! Hashtag and mention tokens scanned from record text.

use crate::record::Entities;
use regex::Regex;
use std::sync::LazyLock;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("valid regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("valid regex"));

/// `#`-prefixed word sequences, prefix stripped, in order of appearance.
pub fn hashtags(text: &str) -> Vec<String> {
    capture_all(&HASHTAG_RE, text)
}

/// `@`-prefixed word sequences, prefix stripped, in order of appearance.
pub fn mentions(text: &str) -> Vec<String> {
    capture_all(&MENTION_RE, text)
}

/// Both entity lists for `text`. Repeats are kept.
pub fn scan(text: &str) -> Entities {
    Entities {
        hashtags: hashtags(text),
        mentions: mentions(text),
    }
}

fn capture_all(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

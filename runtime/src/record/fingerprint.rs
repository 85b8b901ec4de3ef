//! Content fingerprints for cross-pass deduplication.
//!
//! The id is `<handle>_<time>_<text>`:
//! - `time` is the source timestamp in epoch milliseconds, base 36, or `0`
//!   when the markup carried no machine-readable timestamp;
//! - `text` is the first [`TEXT_PREFIX_CHARS`] characters of the body with
//!   everything but alphanumerics and `_` removed, lowercased.
//!
//! Capture time never enters the id, so the same rendered post observed on
//! two passes always yields the same id.

use chrono::{DateTime, Utc};

/// How many leading body characters feed the text component.
pub const TEXT_PREFIX_CHARS: usize = 20;

/// Compute the fingerprint id of a record.
pub fn fingerprint(handle: &str, timestamp: Option<DateTime<Utc>>, text: &str) -> String {
    let time = timestamp
        .map(|ts| to_base36(ts.timestamp_millis()))
        .unwrap_or_else(|| "0".to_string());
    format!("{handle}_{time}_{}", text_key(text))
}

/// Normalized text component of the fingerprint.
pub fn text_key(text: &str) -> String {
    text.chars()
        .take(TEXT_PREFIX_CHARS)
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn to_base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }
    let negative = value < 0;
    let mut n = value.unsigned_abs();
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if negative {
        out.push(b'-');
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

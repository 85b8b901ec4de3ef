//! Output rendering for the harvest binary.
//!
//! Results go to stdout; logs and human-facing errors go to stderr.

use crate::record::ContentRecord;
use clap::ValueEnum;
use serde::Serialize;

/// How `get` and `extract` print records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RecordFormat {
    #[default]
    Json,
    Text,
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("  Error: failed to serialize output: {e}"),
    }
}

/// Print records in the requested format.
pub fn print_records(records: &[ContentRecord], format: RecordFormat) {
    match format {
        RecordFormat::Json => print_json(records),
        RecordFormat::Text => print!("{}", render_text(records)),
    }
}

/// One block per record, separated by blank lines.
pub fn render_text(records: &[ContentRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let badge = if record.author.verified { " [verified]" } else { "" };
        out.push_str(&format!(
            "@{} ({}){} {}\n",
            record.author.handle,
            record.author.display_name,
            badge,
            record.created_at.format("%Y-%m-%d %H:%M UTC")
        ));
        out.push_str(&record.text);
        out.push('\n');
        out.push_str(&format!(
            "likes {}  retweets {}  replies {}",
            record.engagement.likes, record.engagement.retweets, record.engagement.replies
        ));
        if !record.media.is_empty() {
            out.push_str(&format!("  media {}", record.media.len()));
        }
        out.push_str("\n\n");
    }
    out
}

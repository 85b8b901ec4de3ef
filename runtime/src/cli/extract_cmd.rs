//! `harvest extract`: run the extractor over a saved page, no browser.
//!
//! Useful when the site's markup drifts: save the rendered feed, then iterate
//! on a `--selectors` table until records come back.

use crate::cli::get_cmd::FilterArgs;
use crate::cli::output::{self, RecordFormat};
use crate::extract::extract_snapshot;
use crate::filter;
use crate::locator::Locator;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use scraper::Html;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Saved HTML of a rendered feed
    pub file: PathBuf,
    /// Post-filter flags; navigation-only flags (--from, --search, --lang, --hashtag, --bookmark) are ignored
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Replacement selector table (JSON)
    #[arg(long)]
    pub selectors: Option<PathBuf>,
    /// Print per-pattern container hits instead of records
    #[arg(long)]
    pub diagnose: bool,
    /// Output format for records
    #[arg(long, value_enum, default_value_t = RecordFormat::Json)]
    pub format: RecordFormat,
}

pub async fn run(args: &ExtractArgs, json: bool) -> Result<()> {
    let html = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let locator = match &args.selectors {
        Some(path) => Locator::from_file(path)?,
        None => Locator::builtin(),
    };

    if args.diagnose {
        let hits = locator.diagnose(&Html::parse_document(&html));
        if json {
            output::print_json(&hits);
        } else {
            for hit in &hits {
                println!("{:>5}  {}", hit.count, hit.pattern);
            }
        }
        return Ok(());
    }

    let criteria = args.filter.criteria();
    criteria.validate()?;

    let snapshot = extract_snapshot(&locator, &html, Utc::now());
    let mut records = filter::apply(snapshot.records, &criteria);
    records.truncate(criteria.limit);

    if json {
        output::print_json(&records);
    } else {
        output::print_records(&records, args.format);
        eprintln!(
            "  {} record(s) from {} container(s)",
            records.len(),
            snapshot.containers
        );
    }
    Ok(())
}

//! `harvest get`: run one harvest against a live Chromium page.

use crate::cli::output::{self, RecordFormat};
use crate::config::{resolve_auth_file, HarvestConfig};
use crate::credentials::{FileSessionProvider, SessionProvider};
use crate::criteria::{FilterCriteria, DEFAULT_LIMIT};
use crate::harvest::Harvester;
use crate::renderer::chromium::{ChromiumRenderer, LaunchOptions};
use crate::renderer::Renderer;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use std::path::PathBuf;
use tracing::warn;

/// Criteria flags shared by `get` and `extract`.
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Author handle whose timeline to read (with or without @)
    #[arg(long)]
    pub from: Option<String>,
    /// Keep records created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,
    /// Keep records created before this date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,
    /// Maximum number of records
    #[arg(long, short = 'n', default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,
    /// Free-text search term
    #[arg(long)]
    pub search: Option<String>,
    /// Read the bookmark view
    #[arg(long)]
    pub bookmark: bool,
    /// Include replies
    #[arg(long)]
    pub replies: bool,
    /// Include retweets
    #[arg(long)]
    pub retweets: bool,
    /// Language code (e.g. "en", "ja")
    #[arg(long)]
    pub lang: Option<String>,
    /// Only keep records from verified authors
    #[arg(long)]
    pub verified: bool,
    /// Minimum like count
    #[arg(long, default_value_t = 0)]
    pub min_likes: u64,
    /// Hashtag to search for (with or without #)
    #[arg(long)]
    pub hashtag: Option<String>,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            author: self.from.clone(),
            search: self.search.clone(),
            hashtag: self.hashtag.clone(),
            lang: self.lang.clone(),
            since: self.since,
            until: self.until,
            include_replies: self.replies,
            include_retweets: self.retweets,
            verified_only: self.verified,
            min_likes: self.min_likes,
            bookmarks: self.bookmark,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Output format for records
    #[arg(long, value_enum, default_value_t = RecordFormat::Json)]
    pub format: RecordFormat,
    /// Session bundle file (default: $HARVEST_AUTH_FILE, ./twitter-auth.json, ~/.cortex/harvest-auth.json)
    #[arg(long)]
    pub auth_file: Option<String>,
    /// Run Chromium with a visible window
    #[arg(long)]
    pub show_browser: bool,
    /// Replacement selector table (JSON)
    #[arg(long)]
    pub selectors: Option<PathBuf>,
}

impl GetArgs {
    pub fn config(&self) -> HarvestConfig {
        HarvestConfig {
            auth_file: resolve_auth_file(self.auth_file.as_deref()),
            headless: !self.show_browser,
            selectors_file: self.selectors.clone(),
            ..HarvestConfig::default()
        }
    }
}

/// Validate, check the session, launch Chromium and harvest.
pub async fn run(args: &GetArgs, json: bool) -> Result<()> {
    let criteria = args.filter.criteria();
    criteria.validate()?;

    let config = args.config();
    let provider = FileSessionProvider::new(&config.auth_file);
    // Fail on a missing or stale session before paying for a browser launch.
    provider.load_valid(Utc::now(), config.session_max_age_days)?;

    let harvester = Harvester::new(config.clone(), Box::new(provider))?;
    let renderer = ChromiumRenderer::launch(&LaunchOptions::from_config(&config)).await?;
    let mut page = renderer
        .new_context()
        .await
        .context("failed to open a browser tab")?;

    let outcome = harvester.run(page.as_mut(), &criteria).await;

    if let Err(e) = page.close().await {
        warn!("closing browser tab failed: {e:#}");
    }
    renderer.shutdown().await?;

    let report = outcome?;
    if json {
        output::print_json(&report);
    } else {
        output::print_records(&report.records, args.format);
        eprintln!(
            "  {} record(s), {} ({} pass(es), {} scroll(s))",
            report.records.len(),
            report.stop_reason,
            report.passes,
            report.scrolls
        );
    }
    Ok(())
}

// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harvest entry point.
//!
//! A [`Harvester`] turns [`FilterCriteria`] into an ordered, deduplicated,
//! limit-bounded list of [`ContentRecord`]s by driving a [`RenderContext`]:
//!
//! 1. validate the criteria and load a valid credential bundle (before any
//!    navigation, so stale sessions fail fast);
//! 2. install the credentials and navigate to the target view;
//! 3. wait for the first record container to render;
//! 4. run the [`Pagination`] state machine until it reaches `Done`.
//!
//! Page-level and credential-level failures abort with a [`HarvestError`].
//! Field- and record-level failures never do.

pub mod pagination;
pub mod session;

pub use pagination::{Pagination, PaginationState, StopReason};
pub use session::HarvestSession;

use crate::config::HarvestConfig;
use crate::credentials::SessionProvider;
use crate::criteria::FilterCriteria;
use crate::error::{HarvestError, HarvestResult};
use crate::extract::extract_snapshot;
use crate::locator::Locator;
use crate::query::QueryBuilder;
use crate::record::ContentRecord;
use crate::renderer::RenderContext;
use chrono::Utc;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Paths of the login wall the site redirects rejected sessions to. Matched
/// on whole segments so handles like `loginradius` are not walls.
const LOGIN_PATHS: &[&str] = &["/login", "/i/flow/login"];

/// Records plus how the run ended.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestReport {
    pub records: Vec<ContentRecord>,
    pub stop_reason: StopReason,
    pub passes: u32,
    pub scrolls: u32,
}

/// Runs harvests against whatever page it is handed.
pub struct Harvester {
    config: HarvestConfig,
    provider: Box<dyn SessionProvider>,
    locator: Locator,
    query: QueryBuilder,
}

impl Harvester {
    /// Build a harvester; loads `config.selectors_file` when set.
    pub fn new(config: HarvestConfig, provider: Box<dyn SessionProvider>) -> HarvestResult<Self> {
        let locator = match &config.selectors_file {
            Some(path) => Locator::from_file(path)?,
            None => Locator::builtin(),
        };
        Ok(Self::with_locator(config, provider, locator))
    }

    pub fn with_locator(
        config: HarvestConfig,
        provider: Box<dyn SessionProvider>,
        locator: Locator,
    ) -> Self {
        let query = QueryBuilder::new(config.base_url.clone());
        Self {
            config,
            provider,
            locator,
            query,
        }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Harvest records matching `criteria`. Never returns more than
    /// `criteria.limit` records.
    pub async fn harvest(
        &self,
        page: &mut dyn RenderContext,
        criteria: &FilterCriteria,
    ) -> HarvestResult<Vec<ContentRecord>> {
        Ok(self.run(page, criteria).await?.records)
    }

    /// Like [`Harvester::harvest`], also reporting why the run stopped.
    pub async fn run(
        &self,
        page: &mut dyn RenderContext,
        criteria: &FilterCriteria,
    ) -> HarvestResult<HarvestReport> {
        criteria.validate()?;
        let bundle = self
            .provider
            .load_valid(Utc::now(), self.config.session_max_age_days)?;

        page.apply_credentials(&bundle.scoped_to(self.query.base()))
            .await
            .map_err(|e| HarvestError::Browser(format!("failed to apply session: {e:#}")))?;

        self.open_target(page, criteria).await?;

        let mut session = HarvestSession::new(criteria.limit);
        let mut pager = Pagination::new(
            self.config.scroll_budget(criteria.limit),
            self.config.stall_threshold,
        );
        let timeout_ms = self.config.navigation_timeout_ms;

        let stop_reason = loop {
            match pager.advance(&session) {
                PaginationState::Extracting => {
                    let html = bounded("page snapshot", timeout_ms, page.get_html()).await?;
                    let snapshot = extract_snapshot(&self.locator, &html, Utc::now());
                    debug!(
                        containers = snapshot.containers,
                        records = snapshot.records.len(),
                        "snapshot extracted"
                    );
                    session.admit(snapshot.records, criteria);
                }
                PaginationState::ScrollingMore => {
                    bounded("scroll", timeout_ms, page.scroll_to_bottom()).await?;
                    page.wait_for(self.config.scroll_settle_ms).await;
                    session.record_scroll();
                }
                PaginationState::Done(reason) => break reason,
                PaginationState::Idle | PaginationState::Deciding => {}
            }
        };

        let passes = session.passes();
        let scrolls = session.scrolls();
        let records = session.into_records();
        info!(
            records = records.len(),
            passes,
            scrolls,
            "harvest finished: {stop_reason}"
        );

        Ok(HarvestReport {
            records,
            stop_reason,
            passes,
            scrolls,
        })
    }

    /// Navigate to the criteria's target and wait for content to render.
    async fn open_target(
        &self,
        page: &mut dyn RenderContext,
        criteria: &FilterCriteria,
    ) -> HarvestResult<()> {
        let target = self.query.build_target(criteria);
        let url = self.query.url_for(&target);
        info!(%url, ?target, "navigating");

        let nav = page
            .navigate(url.as_str(), self.config.navigation_timeout_ms)
            .await
            .map_err(|e| HarvestError::Navigation {
                url: url.to_string(),
                reason: format!("{e:#}"),
            })?;
        debug!(final_url = %nav.final_url, load_ms = nav.load_time_ms, "navigation complete");
        reject_login_wall(&nav.final_url)?;

        page.wait_for(self.config.initial_settle_ms).await;

        let settled_url = page
            .get_url()
            .await
            .map_err(|e| HarvestError::Browser(format!("failed to read page URL: {e:#}")))?;
        reject_login_wall(&settled_url)?;

        let selector = self.locator.container_selector_group();
        let ready_ms = self.config.ready_timeout_ms;
        let ready = bounded(
            "record containers",
            ready_ms,
            page.wait_for_selector(&selector, ready_ms),
        )
        .await?;
        if !ready {
            return Err(HarvestError::Timeout {
                what: "record containers".to_string(),
                timeout_ms: ready_ms,
            });
        }
        Ok(())
    }
}

/// Fail with [`HarvestError::SessionRejected`] when `url` is the login wall.
fn reject_login_wall(url: &str) -> HarvestResult<()> {
    let on_login = Url::parse(url)
        .map(|u| is_login_path(u.path()))
        .unwrap_or(false);
    if on_login {
        Err(HarvestError::SessionRejected {
            url: url.to_string(),
        })
    } else {
        Ok(())
    }
}

fn is_login_path(path: &str) -> bool {
    LOGIN_PATHS.iter().any(|p| {
        path.strip_prefix(p)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Await one page operation under a deadline.
async fn bounded<T, F>(what: &str, timeout_ms: u64, fut: F) -> HarvestResult<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(HarvestError::Browser(format!("{what} failed: {e:#}"))),
        Err(_) => Err(HarvestError::Timeout {
            what: what.to_string(),
            timeout_ms,
        }),
    }
}

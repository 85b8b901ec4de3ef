//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). The harvester
//! only ever talks to a `RenderContext`; it takes it by `&mut`, so one page
//! cannot serve two harvests at once.

pub mod chromium;
pub mod scripted;

use crate::credentials::CredentialBundle;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Interval between readiness probes while waiting for a selector.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Install session cookies and the user-agent override. Must run before
    /// navigating.
    async fn apply_credentials(&mut self, bundle: &CredentialBundle) -> Result<()>;
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the full page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;

    /// Wait until `selector` matches an element. `Ok(false)` on timeout.
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<bool> {
        let probe = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.execute_js(&probe).await?.as_bool().unwrap_or(false) {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    /// Scroll the viewport to the end of the document.
    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.execute_js("window.scrollTo(0, document.body.scrollHeight); true")
            .await?;
        Ok(())
    }

    /// Let asynchronous content settle for `ms` milliseconds.
    async fn wait_for(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

//! In-memory page that replays a fixed sequence of HTML frames.
//!
//! Frame 0 is what the page shows after navigation. Each `scroll_to_bottom`
//! advances one frame; past the last frame the page keeps serving it, like a
//! feed with nothing left to load. No script is ever evaluated.

use super::{NavigationResult, RenderContext};
use crate::credentials::CredentialBundle;
use anyhow::{bail, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};

/// Replays captured frames in place of a live browser tab.
#[derive(Debug, Clone, Default)]
pub struct ScriptedContext {
    frames: Vec<String>,
    position: usize,
    url: String,
    landing_url: Option<String>,
    navigation_failure: Option<String>,
    credentials: Option<CredentialBundle>,
    navigations: Vec<String>,
    scrolls: usize,
}

impl ScriptedContext {
    pub fn new(frames: Vec<String>) -> Self {
        Self {
            frames,
            url: "about:blank".to_string(),
            ..Self::default()
        }
    }

    /// Land on `url` after every navigation, whatever was requested.
    pub fn redirect_to(mut self, url: impl Into<String>) -> Self {
        self.landing_url = Some(url.into());
        self
    }

    /// Make every navigation fail with `reason`.
    pub fn fail_navigation(mut self, reason: impl Into<String>) -> Self {
        self.navigation_failure = Some(reason.into());
        self
    }

    /// URLs requested so far, in order.
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls
    }

    /// Bundle installed by the last `apply_credentials`.
    pub fn credentials(&self) -> Option<&CredentialBundle> {
        self.credentials.as_ref()
    }

    fn current_frame(&self) -> &str {
        let last = self.frames.len().saturating_sub(1);
        self.frames
            .get(self.position.min(last))
            .map(String::as_str)
            .unwrap_or("<html><body></body></html>")
    }
}

fn frame_matches(html: &str, selector: &str) -> Result<bool> {
    let selector =
        Selector::parse(selector).map_err(|e| anyhow::anyhow!("invalid selector: {e:?}"))?;
    let doc = Html::parse_document(html);
    let found = doc.select(&selector).next().is_some();
    Ok(found)
}

#[async_trait]
impl RenderContext for ScriptedContext {
    async fn apply_credentials(&mut self, bundle: &CredentialBundle) -> Result<()> {
        self.credentials = Some(bundle.clone());
        Ok(())
    }

    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        self.navigations.push(url.to_string());
        if let Some(reason) = &self.navigation_failure {
            bail!("{reason}");
        }
        self.position = 0;
        self.url = self.landing_url.clone().unwrap_or_else(|| url.to_string());
        Ok(NavigationResult {
            final_url: self.url.clone(),
            status: 200,
            load_time_ms: 0,
        })
    }

    async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn get_html(&self) -> Result<String> {
        Ok(self.current_frame().to_string())
    }

    async fn get_url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout_ms: u64) -> Result<bool> {
        frame_matches(self.current_frame(), selector)
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.scrolls += 1;
        self.position += 1;
        Ok(())
    }

    async fn wait_for(&self, _ms: u64) {}

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

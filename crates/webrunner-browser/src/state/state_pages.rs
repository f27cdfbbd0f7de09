//! BrowserState page operations: working-page cache, navigation wrappers,
//! screenshots, script evaluation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::{error, info};

use crate::driver::{DriverError, Page, ScreenshotOptions};
use crate::error::BrowserError;

use super::state_core::{BrowserState, StateInner};

/// Page dimensions as seen from inside the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
    pub content_height: u32,
}

impl BrowserState {
    /// Navigate the session to `url`, acquiring a page first if needed.
    pub async fn goto(&self, url: &str) -> Result<Arc<dyn Page>, BrowserError> {
        self.get_or_create_page(Some(url)).await
    }

    /// Current working page, revalidated against the context's live pages.
    ///
    /// When a newer page exists (opened out-of-band), it is promoted to
    /// working page and its recording path is booked under the new index.
    /// Returns nothing when the context is absent or has no pages.
    pub async fn get_working_page(&self) -> Option<Arc<dyn Page>> {
        let mut inner = self.inner.lock().await;
        Self::working_page_locked(&mut inner).await
    }

    /// Cache `page` as the working page, recording its video path at `index`
    /// (first write wins).
    pub async fn set_working_page(&self, page: Arc<dyn Page>, index: usize) {
        let mut inner = self.inner.lock().await;
        Self::set_working_page_locked(&mut inner, page, index).await;
    }

    pub(super) async fn working_page_locked(inner: &mut StateInner) -> Option<Arc<dyn Page>> {
        let context = inner.context.clone()?;
        let cached = inner.page.clone()?;
        let pages = context.pages().await;
        let last = pages.last()?.clone();
        if cached.target_id() == last.target_id() {
            return Some(cached);
        }
        Self::set_working_page_locked(inner, last.clone(), pages.len() - 1).await;
        Some(last)
    }

    pub(super) async fn set_working_page_locked(
        inner: &mut StateInner,
        page: Arc<dyn Page>,
        index: usize,
    ) {
        if let Some(video_path) = page.video_path().await {
            inner.artifacts.record_video_path(index, video_path);
        }
        inner.page = Some(page);
    }

    /// Ask the working page to stop loading via `window.stop()`.
    pub async fn stop_page_loading(&self) -> Result<(), BrowserError> {
        let mut inner = self.inner.lock().await;
        let page = Self::assert_page_locked(&mut inner).await?;
        page.evaluate("window.stop()").await.map_err(|e| {
            error!(error = %e, "error while stopping page load");
            BrowserError::FailedToStopLoadingPage {
                url: page.url(),
                message: e.to_string(),
            }
        })?;
        Ok(())
    }

    /// Reload the working page and wait for it to settle.
    pub async fn reload_page(&self) -> Result<(), BrowserError> {
        let mut inner = self.inner.lock().await;
        let page = Self::assert_page_locked(&mut inner).await?;
        info!(url = page.url(), "reloading page");
        let started = Instant::now();
        page.reload(self.config().navigation_timeout).await.map_err(|e| {
            error!(error = %e, "error while reloading page");
            BrowserError::FailedToReloadPage {
                url: page.url(),
                message: e.to_string(),
            }
        })?;
        info!(
            loading_time_ms = started.elapsed().as_millis() as u64,
            "page reloaded"
        );
        sleep(self.config().settle_delay).await;
        Ok(())
    }

    /// Capture the working page as a PNG.
    pub async fn take_screenshot(
        &self,
        options: &ScreenshotOptions,
    ) -> Result<Vec<u8>, BrowserError> {
        let mut inner = self.inner.lock().await;
        let page = Self::assert_page_locked(&mut inner).await?;
        Ok(page.screenshot(options).await?)
    }

    /// Evaluate a script on the working page.
    ///
    /// A leading `return window.` prefix is stripped so expression-style
    /// snippets written for injected helpers keep working.
    pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        const STRIP_RETURN: &str = "return window.";
        let mut inner = self.inner.lock().await;
        let page = Self::assert_page_locked(&mut inner).await?;
        let script = script.strip_prefix(STRIP_RETURN).unwrap_or(script);
        Ok(page.evaluate(script).await?)
    }

    /// Resize the working page viewport.
    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<(), BrowserError> {
        let mut inner = self.inner.lock().await;
        let page = Self::assert_page_locked(&mut inner).await?;
        Ok(page.set_viewport(width, height).await?)
    }

    /// Viewport and content dimensions reported by the page itself.
    pub async fn viewport_size(&self) -> Result<ViewportSize, BrowserError> {
        let value = self
            .evaluate("[window.innerWidth, window.innerHeight, document.documentElement.scrollHeight]")
            .await?;
        let (width, height, content_height) = serde_json::from_value::<(u32, u32, u32)>(value)
            .map_err(|e| DriverError::Evaluate(format!("unexpected viewport payload: {e}")))?;
        Ok(ViewportSize {
            width,
            height,
            content_height,
        })
    }
}

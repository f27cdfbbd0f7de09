//! BrowserState core: struct definition, state fixing, recovery, close.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::artifacts::{BrowserArtifacts, VideoArtifact};
use crate::config::BrowserConfig;
use crate::context::RunContext;
use crate::driver::{BrowserContext, CleanupFn, DriverLauncher, DriverRuntime, Page};
use crate::error::BrowserError;
use crate::factory::BrowserContextFactory;

/// Mutable resources owned by one session.
pub(super) struct StateInner {
    pub(super) runtime: Option<Arc<dyn DriverRuntime>>,
    pub(super) context: Option<Arc<dyn BrowserContext>>,
    pub(super) page: Option<Arc<dyn Page>>,
    pub(super) artifacts: BrowserArtifacts,
    pub(super) cleanup: Option<CleanupFn>,
}

/// Lifecycle of a single session's browser context and its working page.
///
/// Operations serialize on an internal mutex held for the duration of each
/// call, so concurrent callers of the same session cannot race the
/// working-page cache or the artifact indices. States for different sessions
/// are fully independent.
pub struct BrowserState {
    launcher: Arc<dyn DriverLauncher>,
    factory: Arc<BrowserContextFactory>,
    config: BrowserConfig,
    run_context: RunContext,
    pub(super) inner: Mutex<StateInner>,
}

impl BrowserState {
    pub fn new(
        launcher: Arc<dyn DriverLauncher>,
        factory: Arc<BrowserContextFactory>,
        config: BrowserConfig,
        run_context: RunContext,
    ) -> Self {
        Self {
            launcher,
            factory,
            config,
            run_context,
            inner: Mutex::new(StateInner {
                runtime: None,
                context: None,
                page: None,
                artifacts: BrowserArtifacts::default(),
                cleanup: None,
            }),
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn run_context(&self) -> &RunContext {
        &self.run_context
    }

    /// Snapshot of this session's artifacts.
    pub async fn artifacts(&self) -> BrowserArtifacts {
        self.inner.lock().await.artifacts.clone()
    }

    /// Replace the video artifact bookkeeping, e.g. after an external store
    /// assigned artifact ids.
    pub async fn set_video_artifacts(&self, artifacts: Vec<VideoArtifact>) {
        self.inner.lock().await.artifacts.video_artifacts = artifacts;
    }

    /// Bring the state to page-ready: start the runtime and create a context
    /// when absent, then acquire a working page. Page creation (and the
    /// optional navigation that follows it) is retried with a fixed backoff;
    /// after the final attempt the original error propagates. Idempotent
    /// once a working page exists.
    pub async fn check_and_fix_state(&self, url: Option<&str>) -> Result<(), BrowserError> {
        let mut inner = self.inner.lock().await;
        self.check_and_fix_state_locked(&mut inner, url).await
    }

    pub(super) async fn check_and_fix_state_locked(
        &self,
        inner: &mut StateInner,
        url: Option<&str>,
    ) -> Result<(), BrowserError> {
        let runtime = match inner.runtime.clone() {
            Some(runtime) => runtime,
            None => {
                info!("starting browser driver runtime");
                let runtime = self.launcher.launch().await?;
                inner.runtime = Some(runtime.clone());
                runtime
            }
        };

        if inner.context.is_none() {
            info!("creating browser context");
            let created = self
                .factory
                .create_context(runtime, url, &self.config, &self.run_context)
                .await?;
            inner.context = Some(created.context);
            inner.artifacts = created.artifacts;
            inner.cleanup = created.cleanup;
            info!("browser context is ready");
        }

        if Self::working_page_locked(inner).await.is_some() {
            return Ok(());
        }

        let Some(context) = inner.context.clone() else {
            return Err(BrowserError::MissingBrowserStatePage);
        };

        let mut attempt: u32 = 0;
        loop {
            match self.acquire_page_locked(inner, &context, url).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    attempt += 1;
                    error!(%err, attempt, "failed to create or navigate a new page");
                    if attempt >= self.config.retry.max_attempts {
                        return Err(err);
                    }
                    sleep(self.config.retry.backoff).await;
                    info!(attempt, "retrying page creation");
                }
            }
        }
    }

    /// One page-acquisition attempt: create a page, make it the working
    /// page, enforce the single-active-page policy, then navigate when a
    /// target was given.
    async fn acquire_page_locked(
        &self,
        inner: &mut StateInner,
        context: &Arc<dyn BrowserContext>,
        url: Option<&str>,
    ) -> Result<(), BrowserError> {
        info!("creating a new page");
        let page = context.new_page().await?;
        Self::set_working_page_locked(inner, page.clone(), 0).await;
        Self::close_other_pages_locked(inner).await?;
        info!("a new page is created");

        if let Some(url) = url {
            info!(url, "navigating new page");
            let started = Instant::now();
            page.goto(url, self.config.navigation_timeout).await.map_err(|e| {
                warn!(url, error = %e, "error while navigating to url");
                BrowserError::FailedToNavigateToUrl {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            })?;
            info!(
                url,
                loading_time_ms = started.elapsed().as_millis() as u64,
                "page loaded"
            );
            sleep(self.config.settle_delay).await;
        }
        Ok(())
    }

    /// Return the working page, (re)acquiring browser resources as needed.
    ///
    /// A network-level failure during the first fix closes the context and
    /// retries once with the URL; a page rejected by the factory's validator
    /// triggers one more close-and-recreate cycle.
    pub async fn get_or_create_page(
        &self,
        url: Option<&str>,
    ) -> Result<Arc<dyn Page>, BrowserError> {
        let mut inner = self.inner.lock().await;

        if let Some(page) = Self::working_page_locked(&mut inner).await {
            return Ok(page);
        }

        if let Err(err) = self.check_and_fix_state_locked(&mut inner, url).await {
            if !err.is_network_error() {
                return Err(err);
            }
            warn!(%err, "network error while fixing browser state, recreating context");
            Self::close_current_page_locked(&mut inner).await;
            self.check_and_fix_state_locked(&mut inner, url).await?;
        }
        let page = Self::assert_page_locked(&mut inner).await?;

        if !self.factory.validate_page(page.as_ref()).await {
            info!("browser context failed validation, recreating");
            Self::close_current_page_locked(&mut inner).await;
            self.check_and_fix_state_locked(&mut inner, url).await?;
            return Self::assert_page_locked(&mut inner).await;
        }

        Ok(page)
    }

    pub(super) async fn assert_page_locked(
        inner: &mut StateInner,
    ) -> Result<Arc<dyn Page>, BrowserError> {
        match Self::working_page_locked(inner).await {
            Some(page) => Ok(page),
            None => {
                error!("browser state has no working page");
                Err(BrowserError::MissingBrowserStatePage)
            }
        }
    }

    /// Close sibling pages of the current working page.
    pub(super) async fn close_other_pages_locked(
        inner: &mut StateInner,
    ) -> Result<(), BrowserError> {
        let Some(context) = inner.context.clone() else {
            return Ok(());
        };
        let Some(current) = inner.page.clone() else {
            return Ok(());
        };
        let current_id = current.target_id();
        for page in context.pages().await {
            if page.target_id() != current_id {
                page.close().await?;
            }
        }
        Ok(())
    }

    /// Close every page and the context, returning the context slot to
    /// uninitialized. The driver runtime stays up.
    pub(super) async fn close_current_page_locked(inner: &mut StateInner) {
        if let Err(err) = Self::close_other_pages_locked(inner).await {
            warn!(%err, "failed to close sibling pages");
        }
        if let Some(context) = inner.context.take() {
            if let Err(err) = context.close().await {
                warn!(%err, "failed to close browser context");
            }
        }
        inner.page = None;
    }

    /// Close the current page and its context, keeping the runtime alive so
    /// a later [`check_and_fix_state`](Self::check_and_fix_state) can start
    /// over.
    pub async fn close_current_open_page(&self) {
        let mut inner = self.inner.lock().await;
        Self::close_current_page_locked(&mut inner).await;
    }

    /// Flush the trace recording for this session into `out`.
    pub async fn stop_tracing(&self, out: &Path) -> Result<(), BrowserError> {
        let inner = self.inner.lock().await;
        if let Some(context) = &inner.context {
            context.stop_tracing(out).await?;
        }
        Ok(())
    }

    /// Release the browser resources. Context close and runtime stop are
    /// best-effort and only run when `close_browser_on_completion` is set;
    /// the registered cleanup hook runs exactly once.
    pub async fn close(&self, close_browser_on_completion: bool) {
        let mut inner = self.inner.lock().await;
        info!("closing browser state");
        if !close_browser_on_completion {
            return;
        }
        if let Some(context) = inner.context.take() {
            if let Err(err) = context.close().await {
                warn!(%err, "failed to close browser context");
            }
            info!("browser context and its pages are closed");
            if let Some(cleanup) = inner.cleanup.take() {
                cleanup();
                info!("browser cleanup hook executed");
            }
        }
        inner.page = None;
        if let Some(runtime) = inner.runtime.take() {
            info!("stopping browser driver runtime");
            if let Err(err) = runtime.stop().await {
                warn!(%err, "failed to stop driver runtime");
            }
        }
    }
}

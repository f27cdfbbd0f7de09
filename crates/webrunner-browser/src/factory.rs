//! Browser context factory: flavor registry, build policy, page validation.
//!
//! A flavor key ("chromium-headless", "chromium-headful", or anything an
//! embedder registers) maps to a [`ContextCreator`] strategy. The factory
//! also owns the optional page validator used to detect poisoned contexts
//! (e.g. a bot-detection interstitial) before the core commits to them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::artifacts::BrowserArtifacts;
use crate::config::BrowserConfig;
use crate::context::RunContext;
use crate::driver::{
    BrowserContext, CleanupFn, ContextOptions, DriverError, DriverRuntime, Page,
};
use crate::error::BrowserError;

/// Everything a creator hands back for a fresh context.
pub struct CreatedContext {
    pub context: Arc<dyn BrowserContext>,
    pub artifacts: BrowserArtifacts,
    pub cleanup: Option<CleanupFn>,
}

/// Strategy building a concrete browser context for one flavor.
#[async_trait]
pub trait ContextCreator: Send + Sync {
    async fn create(
        &self,
        runtime: Arc<dyn DriverRuntime>,
        config: &BrowserConfig,
        run_context: &RunContext,
    ) -> Result<CreatedContext, DriverError>;
}

/// Pluggable check deciding whether a freshly acquired page is usable.
/// The default (no validator installed) accepts everything.
#[async_trait]
pub trait PageValidator: Send + Sync {
    async fn validate(&self, page: &dyn Page) -> bool;
}

/// Registry of context creators keyed by flavor.
pub struct BrowserContextFactory {
    creators: DashMap<String, Arc<dyn ContextCreator>>,
    validator: RwLock<Option<Arc<dyn PageValidator>>>,
}

impl BrowserContextFactory {
    /// Create a factory with the builtin chromium flavors registered.
    pub fn new() -> Self {
        let factory = Self {
            creators: DashMap::new(),
            validator: RwLock::new(None),
        };
        factory.register_type("chromium-headless", Arc::new(ChromiumCreator { headless: true }));
        factory.register_type("chromium-headful", Arc::new(ChromiumCreator { headless: false }));
        factory
    }

    /// Register (or replace) the creator for a flavor.
    pub fn register_type(&self, browser_type: &str, creator: Arc<dyn ContextCreator>) {
        self.creators.insert(browser_type.to_string(), creator);
    }

    /// Whether a creator is registered for `browser_type`.
    #[must_use]
    pub fn supports(&self, browser_type: &str) -> bool {
        self.creators.contains_key(browser_type)
    }

    /// Install the page validator.
    pub fn set_validator(&self, validator: Arc<dyn PageValidator>) {
        *self.validator.write() = Some(validator);
    }

    /// Run the configured validator against a page.
    pub async fn validate_page(&self, page: &dyn Page) -> bool {
        let validator = self.validator.read().clone();
        match validator {
            Some(validator) => validator.validate(page).await,
            None => true,
        }
    }

    /// Create a context for the configured flavor, eagerly navigating its
    /// most recent page to `url` when one is supplied.
    ///
    /// An unregistered flavor fails with [`BrowserError::UnknownBrowserType`];
    /// any other failure (including the eager navigation) is wrapped into
    /// [`BrowserError::UnknownErrorWhileCreatingBrowserContext`] with the
    /// original cause attached.
    pub async fn create_context(
        &self,
        runtime: Arc<dyn DriverRuntime>,
        url: Option<&str>,
        config: &BrowserConfig,
        run_context: &RunContext,
    ) -> Result<CreatedContext, BrowserError> {
        let browser_type = config.browser_type.as_str();
        let creator = self
            .creators
            .get(browser_type)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BrowserError::UnknownBrowserType(browser_type.to_string()))?;

        let created = creator
            .create(runtime, config, run_context)
            .await
            .map_err(|source| BrowserError::UnknownErrorWhileCreatingBrowserContext {
                browser_type: browser_type.to_string(),
                source,
            })?;

        if let Some(url) = url {
            // Eager first-page navigation is part of context creation, not
            // page acquisition; its failure is a creation failure.
            if let Some(page) = created.context.pages().await.last() {
                page.goto(url, config.navigation_timeout).await.map_err(|source| {
                    BrowserError::UnknownErrorWhileCreatingBrowserContext {
                        browser_type: browser_type.to_string(),
                        source,
                    }
                })?;
            }
        }

        debug!(browser_type, "browser context created");
        Ok(created)
    }
}

impl Default for BrowserContextFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble the standard context options for one session.
///
/// Artifacts land under `<video_root>/<UTC date>/`; the HAR file is named by
/// the run's artifact subdirectory. The profile directory is a fresh tempdir
/// removed by the returned cleanup hook once the context is closed.
pub fn build_context_options(
    headless: bool,
    config: &BrowserConfig,
    run_context: &RunContext,
) -> Result<(ContextOptions, BrowserArtifacts, CleanupFn), DriverError> {
    let day_dir = config
        .video_root
        .join(Utc::now().format("%Y-%m-%d").to_string());
    let har_path = day_dir.join(format!("{}.har", run_context.artifact_subdir()));

    let profile_dir = tempfile::Builder::new()
        .prefix("webrunner_browser_")
        .tempdir()
        .map_err(|e| DriverError::Launch(format!("failed to create profile dir: {e}")))?;

    let options = ContextOptions {
        headless,
        user_data_dir: profile_dir.path().to_path_buf(),
        locale: config.locale.clone(),
        timezone_id: config.timezone_id.clone(),
        color_scheme: config.color_scheme.clone(),
        args: vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disk-cache-size=1".to_string(),
            "--start-maximized".to_string(),
        ],
        ignore_default_args: vec!["--enable-automation".to_string()],
        record_har_path: Some(har_path.clone()),
        record_video_dir: Some(day_dir),
        traces_dir: config.traces_dir.clone(),
        viewport: config.viewport,
    };

    let artifacts = BrowserArtifacts {
        video_artifacts: Vec::new(),
        har_path: Some(har_path),
        traces_dir: config.traces_dir.clone(),
    };

    // Dropping the tempdir handle removes the profile directory; deferring
    // the drop to the cleanup hook keeps it alive for the context's lifetime.
    let cleanup: CleanupFn = Box::new(move || drop(profile_dir));

    Ok((options, artifacts, cleanup))
}

/// Builtin chromium creator shared by the headless and headful flavors.
struct ChromiumCreator {
    headless: bool,
}

#[async_trait]
impl ContextCreator for ChromiumCreator {
    async fn create(
        &self,
        runtime: Arc<dyn DriverRuntime>,
        config: &BrowserConfig,
        run_context: &RunContext,
    ) -> Result<CreatedContext, DriverError> {
        let (options, artifacts, cleanup) =
            build_context_options(self.headless, config, run_context)?;
        let context = runtime.new_context(&options).await?;
        Ok(CreatedContext {
            context,
            artifacts,
            cleanup: Some(cleanup),
        })
    }
}

//! Driver seam: the traits this crate drives and an embedder implements.
//!
//! The core never talks to a concrete browser library. It drives whatever
//! sits behind these traits — a Playwright bridge, a CDP client, a fake in
//! tests. Every method is a suspension point; none of them spawn threads.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker substring Chromium-family drivers put into network-level failures.
pub const NETWORK_ERROR_MARKER: &str = "net::ERR";

/// Errors surfaced by the driver implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Driver runtime could not be started.
    #[error("failed to launch driver: {0}")]
    Launch(String),

    /// Context creation was rejected by the driver.
    #[error("failed to create context: {0}")]
    Context(String),

    /// Page creation or navigation failed.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Script evaluation failed inside the page.
    #[error("script evaluation failed: {0}")]
    Evaluate(String),

    /// Screenshot capture failed.
    #[error("screenshot failed: {0}")]
    Screenshot(String),

    /// The page is gone (crashed or closed out-of-band).
    #[error("page is closed")]
    PageClosed,

    /// A driver call exceeded its deadline.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Any other driver-level failure.
    #[error("driver error: {0}")]
    Protocol(String),
}

impl DriverError {
    /// Whether the failure looks like a network-level error (DNS failure,
    /// refused connection, aborted load) rather than a driver defect.
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        self.to_string().contains(NETWORK_ERROR_MARKER)
    }
}

/// Viewport dimensions applied to new contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Options handed to the driver when creating a browser context.
#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub headless: bool,
    /// Isolated per-session profile directory.
    pub user_data_dir: PathBuf,
    pub locale: String,
    pub timezone_id: String,
    pub color_scheme: String,
    /// Extra command-line switches for the browser process.
    pub args: Vec<String>,
    /// Default switches the driver must drop.
    pub ignore_default_args: Vec<String>,
    pub record_har_path: Option<PathBuf>,
    pub record_video_dir: Option<PathBuf>,
    pub traces_dir: Option<PathBuf>,
    pub viewport: Viewport,
}

/// Screenshot capture options.
#[derive(Debug, Clone, Default)]
pub struct ScreenshotOptions {
    pub full_page: bool,
    pub omit_background: bool,
    /// Also write the capture to this path when set.
    pub path: Option<PathBuf>,
}

/// Cleanup hook released exactly once when a context is finally closed.
pub type CleanupFn = Box<dyn FnOnce() + Send>;

/// Starts the driver runtime. One runtime is started per [`BrowserState`].
///
/// [`BrowserState`]: crate::BrowserState
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn DriverRuntime>, DriverError>;
}

/// A running driver able to spawn browser contexts.
#[async_trait]
pub trait DriverRuntime: Send + Sync {
    async fn new_context(
        &self,
        options: &ContextOptions,
    ) -> Result<Arc<dyn BrowserContext>, DriverError>;

    async fn stop(&self) -> Result<(), DriverError>;
}

/// One isolated browser profile with its own pages.
#[async_trait]
pub trait BrowserContext: Send + Sync {
    async fn new_page(&self) -> Result<Arc<dyn Page>, DriverError>;

    /// Live pages in creation order; the last entry is the most recent.
    async fn pages(&self) -> Vec<Arc<dyn Page>>;

    /// Flush the trace recording into `out`, when tracing was enabled.
    async fn stop_tracing(&self, out: &Path) -> Result<(), DriverError>;

    async fn close(&self) -> Result<(), DriverError>;
}

/// A single page within a context.
#[async_trait]
pub trait Page: Send + Sync {
    /// Stable identifier, unique within the owning context.
    fn target_id(&self) -> String;

    fn url(&self) -> String;

    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    async fn reload(&self, timeout: Duration) -> Result<(), DriverError>;

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError>;

    async fn screenshot(&self, options: &ScreenshotOptions) -> Result<Vec<u8>, DriverError>;

    async fn set_viewport(&self, width: u32, height: u32) -> Result<(), DriverError>;

    async fn close(&self) -> Result<(), DriverError>;

    /// Path of this page's video recording, when recording is enabled.
    async fn video_path(&self) -> Option<PathBuf>;
}

//! Session configuration and timing knobs.

use std::path::PathBuf;
use std::time::Duration;

use crate::driver::Viewport;

/// Bounded retry policy for page acquisition.
///
/// The backoff is fixed, not exponential; tests shrink it to keep the suite
/// fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

/// Configuration shared by every session a manager owns.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Context flavor to create (e.g. "chromium-headless", "chromium-headful").
    pub browser_type: String,
    pub viewport: Viewport,
    pub locale: String,
    pub timezone_id: String,
    pub color_scheme: String,
    /// Root under which per-day video and HAR directories are created.
    pub video_root: PathBuf,
    /// Directory for trace archives; tracing is off when absent.
    pub traces_dir: Option<PathBuf>,
    /// Deadline for a single navigation or reload driver call.
    pub navigation_timeout: Duration,
    /// Delay after a successful navigation or reload while the page settles.
    pub settle_delay: Duration,
    /// Overall budget for one session cleanup.
    pub cleanup_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser_type: "chromium-headful".to_string(),
            viewport: Viewport {
                width: 1920,
                height: 1080,
            },
            locale: "en-US".to_string(),
            timezone_id: "America/New_York".to_string(),
            color_scheme: "no-preference".to_string(),
            video_root: PathBuf::from("video"),
            traces_dir: None,
            navigation_timeout: Duration::from_secs(120),
            settle_delay: Duration::from_secs(5),
            cleanup_timeout: Duration::from_secs(180),
            retry: RetryPolicy::default(),
        }
    }
}

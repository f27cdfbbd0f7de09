//! Shared fake driver for behavior tests.
//!
//! The fakes stand in for the real driver behind the trait seam. Failures
//! are scripted through [`Script`]: a number of context/page creations to
//! refuse, plus queues of errors for navigation and evaluation calls.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use webrunner_browser::{
    BrowserConfig, BrowserContext, BrowserContextFactory, ContextOptions, DriverError,
    DriverLauncher, DriverRuntime, Page, RetryPolicy, ScreenshotOptions,
};

/// Scripted failure injection shared by every fake in a harness.
#[derive(Default)]
pub struct Script {
    /// Refuse this many context creations before succeeding.
    pub context_failures: AtomicU32,
    /// Refuse this many page creations before succeeding.
    pub page_failures: AtomicU32,
    /// Errors returned by successive `goto` calls, in order.
    pub goto_errors: Mutex<VecDeque<DriverError>>,
    /// Errors returned by successive `evaluate` calls, in order.
    pub eval_errors: Mutex<VecDeque<DriverError>>,
}

impl Script {
    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

pub struct FakePage {
    id: String,
    url: Mutex<String>,
    video: Option<PathBuf>,
    script: Arc<Script>,
    pub closed: AtomicBool,
    /// Value returned by `evaluate` when no error is scripted.
    pub eval_result: Mutex<serde_json::Value>,
    /// Scripts evaluated against this page, in order.
    pub evaluated: Mutex<Vec<String>>,
}

#[async_trait]
impl Page for FakePage {
    fn target_id(&self) -> String {
        self.id.clone()
    }

    fn url(&self) -> String {
        self.url.lock().clone()
    }

    async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), DriverError> {
        if let Some(err) = self.script.goto_errors.lock().pop_front() {
            return Err(err);
        }
        *self.url.lock() = url.to_string();
        Ok(())
    }

    async fn reload(&self, _timeout: Duration) -> Result<(), DriverError> {
        if let Some(err) = self.script.goto_errors.lock().pop_front() {
            return Err(err);
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError> {
        self.evaluated.lock().push(script.to_string());
        if let Some(err) = self.script.eval_errors.lock().pop_front() {
            return Err(err);
        }
        Ok(self.eval_result.lock().clone())
    }

    async fn screenshot(&self, _options: &ScreenshotOptions) -> Result<Vec<u8>, DriverError> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn set_viewport(&self, _width: u32, _height: u32) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn video_path(&self) -> Option<PathBuf> {
        self.video.clone()
    }
}

pub struct FakeContext {
    script: Arc<Script>,
    video_dir: Option<PathBuf>,
    pages: Mutex<Vec<Arc<FakePage>>>,
    page_counter: AtomicU64,
    pub new_page_calls: AtomicU32,
    pub closed: AtomicBool,
    pub traced_to: Mutex<Option<PathBuf>>,
}

impl FakeContext {
    fn new(script: Arc<Script>, video_dir: Option<PathBuf>) -> Arc<Self> {
        let context = Arc::new(Self {
            script,
            video_dir,
            pages: Mutex::new(Vec::new()),
            page_counter: AtomicU64::new(0),
            new_page_calls: AtomicU32::new(0),
            closed: AtomicBool::new(false),
            traced_to: Mutex::new(None),
        });
        // A persistent context starts out with one initial page.
        context.make_page();
        context
    }

    fn make_page(&self) -> Arc<FakePage> {
        let n = self.page_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("page_{n}");
        let video = self.video_dir.as_ref().map(|dir| dir.join(format!("{id}.webm")));
        let page = Arc::new(FakePage {
            id,
            url: Mutex::new("about:blank".to_string()),
            video,
            script: self.script.clone(),
            closed: AtomicBool::new(false),
            eval_result: Mutex::new(serde_json::Value::Null),
            evaluated: Mutex::new(Vec::new()),
        });
        self.pages.lock().push(page.clone());
        page
    }

    /// Live (not closed) pages as their concrete type.
    pub fn live_pages(&self) -> Vec<Arc<FakePage>> {
        self.pages
            .lock()
            .iter()
            .filter(|page| !page.closed.load(Ordering::SeqCst))
            .cloned()
            .collect()
    }

    /// Close every page out-of-band, as a crashed renderer would.
    pub fn kill_all_pages(&self) {
        for page in self.pages.lock().iter() {
            page.closed.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl BrowserContext for FakeContext {
    async fn new_page(&self) -> Result<Arc<dyn Page>, DriverError> {
        self.new_page_calls.fetch_add(1, Ordering::SeqCst);
        if Script::take_failure(&self.script.page_failures) {
            return Err(DriverError::Protocol("page creation refused".to_string()));
        }
        Ok(self.make_page())
    }

    async fn pages(&self) -> Vec<Arc<dyn Page>> {
        self.live_pages()
            .into_iter()
            .map(|page| page as Arc<dyn Page>)
            .collect()
    }

    async fn stop_tracing(&self, out: &Path) -> Result<(), DriverError> {
        if let Some(parent) = out.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::write(out, b"fake-trace")
            .map_err(|e| DriverError::Protocol(format!("trace write failed: {e}")))?;
        *self.traced_to.lock() = Some(out.to_path_buf());
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.kill_all_pages();
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeRuntime {
    script: Arc<Script>,
    pub contexts: Mutex<Vec<Arc<FakeContext>>>,
    pub profile_dirs: Mutex<Vec<PathBuf>>,
    pub stopped: AtomicBool,
}

#[async_trait]
impl DriverRuntime for FakeRuntime {
    async fn new_context(
        &self,
        options: &ContextOptions,
    ) -> Result<Arc<dyn BrowserContext>, DriverError> {
        if Script::take_failure(&self.script.context_failures) {
            return Err(DriverError::Context("context creation refused".to_string()));
        }
        self.profile_dirs.lock().push(options.user_data_dir.clone());
        let context = FakeContext::new(self.script.clone(), options.record_video_dir.clone());
        self.contexts.lock().push(context.clone());
        Ok(context)
    }

    async fn stop(&self) -> Result<(), DriverError> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeLauncher {
    pub runtime: Arc<FakeRuntime>,
    pub launches: AtomicU32,
}

#[async_trait]
impl DriverLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Arc<dyn DriverRuntime>, DriverError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(self.runtime.clone() as Arc<dyn DriverRuntime>)
    }
}

/// A scripted driver plus the factory wired for tests.
pub struct Harness {
    pub script: Arc<Script>,
    pub runtime: Arc<FakeRuntime>,
    pub launcher: Arc<FakeLauncher>,
    pub factory: Arc<BrowserContextFactory>,
}

impl Harness {
    pub fn new() -> Self {
        let script = Arc::new(Script::default());
        let runtime = Arc::new(FakeRuntime {
            script: script.clone(),
            contexts: Mutex::new(Vec::new()),
            profile_dirs: Mutex::new(Vec::new()),
            stopped: AtomicBool::new(false),
        });
        let launcher = Arc::new(FakeLauncher {
            runtime: runtime.clone(),
            launches: AtomicU32::new(0),
        });
        Self {
            script,
            runtime,
            launcher,
            factory: Arc::new(BrowserContextFactory::new()),
        }
    }

    /// The n-th context the runtime handed out.
    pub fn context(&self, index: usize) -> Arc<FakeContext> {
        self.runtime.contexts.lock()[index].clone()
    }

    pub fn context_count(&self) -> usize {
        self.runtime.contexts.lock().len()
    }
}

/// Test config: headless flavor, no settle delays, millisecond retry backoff.
pub fn test_config() -> BrowserConfig {
    BrowserConfig {
        browser_type: "chromium-headless".to_string(),
        video_root: std::env::temp_dir().join("webrunner-test-videos"),
        settle_delay: Duration::ZERO,
        cleanup_timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        },
        ..Default::default()
    }
}

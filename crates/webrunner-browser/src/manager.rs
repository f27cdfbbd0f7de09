//! Session registry: one [`BrowserState`] per task or workflow run.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::artifacts::VideoArtifact;
use crate::config::BrowserConfig;
use crate::context::RunContext;
use crate::driver::DriverLauncher;
use crate::error::BrowserError;
use crate::factory::BrowserContextFactory;
use crate::state::BrowserState;

/// Registry of live browser sessions.
///
/// Constructed explicitly at process start and passed by reference; several
/// independent registries can coexist (useful in tests). All state lives in
/// this value — there is no global.
pub struct BrowserSessionManager {
    launcher: Arc<dyn DriverLauncher>,
    factory: Arc<BrowserContextFactory>,
    config: BrowserConfig,
    sessions: RwLock<HashMap<String, Arc<BrowserState>>>,
    /// Lazily created state for ad-hoc (sessionless) use.
    shared: Mutex<Option<Arc<BrowserState>>>,
}

impl BrowserSessionManager {
    pub fn new(
        launcher: Arc<dyn DriverLauncher>,
        factory: Arc<BrowserContextFactory>,
        config: BrowserConfig,
    ) -> Self {
        Self {
            launcher,
            factory,
            config,
            sessions: RwLock::new(HashMap::new()),
            shared: Mutex::new(None),
        }
    }

    fn new_state(&self, run_context: &RunContext) -> Arc<BrowserState> {
        Arc::new(BrowserState::new(
            self.launcher.clone(),
            self.factory.clone(),
            self.config.clone(),
            run_context.clone(),
        ))
    }

    /// Ad-hoc browser state: runtime, context and page are acquired on the
    /// first call and reused afterwards.
    pub async fn get_or_init(
        &self,
        url: Option<&str>,
        run_context: &RunContext,
    ) -> Result<Arc<BrowserState>, BrowserError> {
        let mut shared = self.shared.lock().await;
        if let Some(state) = shared.as_ref() {
            return Ok(state.clone());
        }
        info!("initializing shared browser state");
        let state = self.new_state(run_context);
        state.get_or_create_page(url).await?;
        *shared = Some(state.clone());
        Ok(state)
    }

    /// Browser state for `key`, registered lazily on first use. The
    /// underlying browser resources are only acquired when the state is
    /// first driven.
    pub async fn get_or_create_for_session(
        &self,
        key: &str,
        run_context: &RunContext,
    ) -> Arc<BrowserState> {
        let mut sessions = self.sessions.write().await;
        if let Some(state) = sessions.get(key) {
            return state.clone();
        }
        info!(session = key, "registering browser session");
        let state = self.new_state(run_context);
        sessions.insert(key.to_string(), state.clone());
        state
    }

    /// Pure lookup.
    pub async fn get_for_session(&self, key: &str) -> Option<Arc<BrowserState>> {
        self.sessions.read().await.get(key).cloned()
    }

    /// Number of registered sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Attach externally assigned video artifacts to a session, looked up by
    /// `primary` first with `secondary` as fallback.
    pub async fn set_video_artifacts_for_session(
        &self,
        primary: &str,
        secondary: Option<&str>,
        artifacts: Vec<VideoArtifact>,
    ) -> Result<(), BrowserError> {
        let state = match self.get_for_session(primary).await {
            Some(state) => state,
            None => {
                let fallback = match secondary {
                    Some(secondary) => self.get_for_session(secondary).await,
                    None => None,
                };
                fallback.ok_or_else(|| BrowserError::MissingBrowserState(primary.to_string()))?
            }
        };
        state.set_video_artifacts(artifacts).await;
        Ok(())
    }

    /// Read the recorded videos for `state` into memory. A missing file is
    /// skipped, leaving that entry's data empty; a session without any
    /// recording only logs a warning.
    pub async fn get_video_artifacts(&self, state: &BrowserState) -> Vec<VideoArtifact> {
        let mut artifacts = state.artifacts().await.video_artifacts;
        if artifacts.is_empty() {
            warn!("browser state has no video artifacts");
            return artifacts;
        }
        for artifact in &mut artifacts {
            let Some(path) = artifact.video_path.clone() else {
                continue;
            };
            match tokio::fs::read(&path).await {
                Ok(data) => artifact.video_data = data,
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to read video recording");
                }
            }
        }
        artifacts
    }

    /// Read the HAR capture for `state`. Best-effort: no recorded path or an
    /// unreadable file yields empty bytes, never an error.
    pub async fn get_har_data(&self, state: &BrowserState) -> Vec<u8> {
        let Some(path) = state.artifacts().await.har_path else {
            warn!("browser state has no HAR capture path");
            return Vec::new();
        };
        match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read HAR capture");
                Vec::new()
            }
        }
    }

    /// Tear down one session: flush its trace, close its browser resources
    /// and drop it from the registry, all within the configured cleanup
    /// budget. Cleaning an unknown key is a no-op; a timeout degrades to a
    /// warning.
    pub async fn cleanup_for_session(&self, key: &str, close_browser_on_completion: bool) {
        let Some(state) = self.sessions.write().await.remove(key) else {
            info!(session = key, "no browser state to clean up");
            return;
        };
        let budget = state.config().cleanup_timeout;
        let teardown = Self::teardown(key, &state, close_browser_on_completion);
        if timeout(budget, teardown).await.is_err() {
            warn!(
                session = key,
                budget_secs = budget.as_secs(),
                "browser cleanup timed out"
            );
        }
    }

    async fn teardown(key: &str, state: &BrowserState, close_browser_on_completion: bool) {
        let artifacts = state.artifacts().await;
        if let Some(traces_dir) = artifacts.traces_dir {
            let out = traces_dir.join(format!("{key}.zip"));
            info!(session = key, path = %out.display(), "flushing trace");
            if let Err(err) = state.stop_tracing(&out).await {
                warn!(session = key, %err, "failed to flush trace");
            }
        }
        state.close(close_browser_on_completion).await;
        info!(session = key, "browser session cleaned up");
    }

    /// Close every session (and the ad-hoc state) and empty the registry.
    /// Intended for process shutdown.
    pub async fn close_all(&self) {
        let drained: Vec<(String, Arc<BrowserState>)> =
            self.sessions.write().await.drain().collect();
        for (key, state) in drained {
            Self::teardown(&key, &state, true).await;
        }
        if let Some(state) = self.shared.lock().await.take() {
            state.close(true).await;
        }
    }
}

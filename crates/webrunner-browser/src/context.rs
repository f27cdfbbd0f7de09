//! Explicit per-run execution context.

use uuid::Uuid;

/// Identifiers for the task or workflow run a session belongs to.
///
/// Passed explicitly wherever artifact paths are derived; there is no
/// ambient or global context.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub request_id: Option<String>,
    pub organization_id: Option<String>,
    pub task_id: Option<String>,
    pub workflow_id: Option<String>,
    pub workflow_run_id: Option<String>,
    pub max_steps_override: Option<u32>,
}

impl RunContext {
    pub fn for_task(task_id: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id.into()),
            ..Default::default()
        }
    }

    /// Subdirectory for this run's artifacts: the task id, else the request
    /// id, else a freshly generated unique id.
    #[must_use]
    pub fn artifact_subdir(&self) -> String {
        if let Some(task_id) = &self.task_id {
            task_id.clone()
        } else if let Some(request_id) = &self.request_id {
            request_id.clone()
        } else {
            Uuid::new_v4().to_string()
        }
    }
}

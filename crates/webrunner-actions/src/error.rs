//! Action layer errors.

use thiserror::Error;

/// Errors produced while turning raw LLM records into typed actions.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The record names an action kind outside the closed taxonomy.
    #[error("unsupported action type: {0}")]
    UnsupportedActionType(String),

    /// A recognized action kind is missing or violating a required field.
    #[error("invalid action: {0}")]
    Validation(String),
}

impl ActionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

//! Browser session error taxonomy.

use thiserror::Error;

use crate::driver::{DriverError, NETWORK_ERROR_MARKER};

/// Errors surfaced by the session manager, context factory and browser state.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No creator registered for the requested context flavor.
    #[error("unknown browser type {0}")]
    UnknownBrowserType(String),

    /// A creator failed in an unexpected way; carries the original cause.
    #[error("unknown error while creating browser context for {browser_type}: {source}")]
    UnknownErrorWhileCreatingBrowserContext {
        browser_type: String,
        #[source]
        source: DriverError,
    },

    /// A session key was expected in the registry but is absent.
    #[error("browser state for session {0} is missing")]
    MissingBrowserState(String),

    /// The operation requires a working page but none exists.
    #[error("browser state has no working page")]
    MissingBrowserStatePage,

    #[error("failed to navigate to url {url}: {message}")]
    FailedToNavigateToUrl { url: String, message: String },

    #[error("failed to reload page {url}: {message}")]
    FailedToReloadPage { url: String, message: String },

    #[error("failed to stop loading page {url}: {message}")]
    FailedToStopLoadingPage { url: String, message: String },

    /// Driver failure outside the wrapped cases above.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl BrowserError {
    /// Whether a network-level marker appears in this error or its cause.
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        match self {
            Self::Driver(source)
            | Self::UnknownErrorWhileCreatingBrowserContext { source, .. } => {
                source.is_network_error()
            }
            Self::FailedToNavigateToUrl { message, .. } => message.contains(NETWORK_ERROR_MARKER),
            _ => false,
        }
    }
}

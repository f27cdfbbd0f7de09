//! Browser session lifecycle management for LLM-driven web agents.
//!
//! ```text
//! ┌───────────────────────┐  session key  ┌──────────────────┐
//! │ BrowserSessionManager │ ─────────────►│   BrowserState   │
//! │  (registry, cleanup)  │               │ (context + page) │
//! └───────────────────────┘               └────────┬─────────┘
//!                                                  │ traits
//!                                         ┌────────▼─────────┐
//!                                         │  Browser driver  │
//!                                         │  (collaborator)  │
//!                                         └──────────────────┘
//! ```
//!
//! The manager maps task/workflow identifiers to [`BrowserState`] values.
//! Each state owns one browser context, keeps a single working page alive
//! across transient failures, and books video/HAR/trace artifacts for its
//! session. Contexts come out of the pluggable [`BrowserContextFactory`];
//! the driver itself sits behind the traits in [`driver`] and is provided by
//! the embedder.
//!
//! Operations against one state serialize internally; operations against
//! different sessions are independent and safe to run concurrently.

mod artifacts;
mod config;
mod context;
pub mod driver;
mod error;
mod factory;
mod manager;
mod state;
pub mod tagging;

pub use artifacts::{BrowserArtifacts, VideoArtifact};
pub use config::{BrowserConfig, RetryPolicy};
pub use context::RunContext;
pub use driver::{
    BrowserContext, CleanupFn, ContextOptions, DriverError, DriverLauncher, DriverRuntime, Page,
    ScreenshotOptions, Viewport,
};
pub use error::BrowserError;
pub use factory::{
    build_context_options, BrowserContextFactory, ContextCreator, CreatedContext, PageValidator,
};
pub use manager::BrowserSessionManager;
pub use state::{BrowserState, ViewportSize};

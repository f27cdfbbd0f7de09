//! Browser state: lifecycle of one session's context and working page.
//!
//! A [`BrowserState`] walks a single session through
//! uninitialized → context-ready → page-ready, recovering from transient
//! page-creation failures with a bounded retry loop and from network-level
//! navigation failures by recreating the whole context. At most one page is
//! treated as active; siblings opened out-of-band are either promoted (when
//! newer) or closed.

mod state_core;
mod state_pages;

pub use state_core::BrowserState;
pub use state_pages::ViewportSize;

//! Umbrella crate for the webrunner components.
//!
//! [`browser`] manages browser sessions: context lifecycle, working-page
//! recovery and per-session artifacts. [`actions`] turns raw LLM action
//! records into a closed set of typed commands. An agent loop wires the two
//! together: it reads a screenshot or tagged DOM from a session, asks the
//! LLM for the next step, parses the response into actions and dispatches
//! them onto the session's working page.

pub use webrunner_actions as actions;
pub use webrunner_browser as browser;

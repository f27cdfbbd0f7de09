//! Typed action taxonomy and parser for LLM-issued browser commands.
//!
//! An LLM emits loosely structured JSON records describing what it wants the
//! browser to do next. This crate converts those records into a closed set of
//! validated [`Action`] values before anything touches a live page:
//!
//! - [`parse_action`] turns one untyped record into an [`Action`], coercing
//!   numeric element ids to strings and mapping a missing `action_type` to an
//!   explicit [`Action::NullAction`].
//! - [`parse_actions`] runs a whole batch with per-item failure isolation:
//!   unsupported or malformed records are logged and skipped, never aborting
//!   the batch.

mod error;
mod parser;
mod types;

pub use error::ActionError;
pub use parser::{parse_action, parse_actions};
pub use types::{Action, ActionCommon, ActionType, SelectOption, UserDefinedError};

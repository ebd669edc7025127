//! Data model for the hooksmith configuration pipeline
//!
//! This crate holds:
//! - The hook schema: events, matcher patterns, actions, entries
//! - The root configuration document and its JSON form
//! - Base error types shared by the workspace
//!
//! Everything here is pure data: no filesystem access, no side effects.

pub mod action;
pub mod document;
pub mod entry;
pub mod error;
pub mod event;
pub mod matcher;

pub use action::{ActionKind, DEFAULT_COMMAND_TIMEOUT_SECS, HookAction, PROMPT_TIMEOUT_SECS};
pub use document::ConfigurationDocument;
pub use entry::{DEFAULT_PRIORITY, HookEntry};
pub use error::{Error, Result};
pub use event::HookEvent;
pub use matcher::{MatcherError, MatcherPattern};

//! Error types for the pipeline components
//!
//! Generator and Merger failures are structured values returned to the
//! immediate caller; nothing here is thrown past a component boundary.
//! The Validator never fails — it returns a report.

use crate::validate::ValidationReport;
use hooksmith_core::{HookEvent, MatcherError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the generator
#[derive(Error, Debug)]
pub enum GenerateError {
    /// The event requires a matcher but none was supplied
    #[error("Event '{event}' requires a matcher (use '*' to target everything)")]
    MatcherRequired {
        /// The matcher-capable event
        event: HookEvent,
    },

    /// The event does not accept a matcher but one was supplied
    #[error("Event '{event}' does not accept a matcher")]
    MatcherNotAllowed {
        /// The matcher-less event
        event: HookEvent,
    },

    /// The action payload is empty or whitespace-only
    #[error("Action payload must not be empty")]
    EmptyPayload,

    /// The supplied matcher pattern is malformed
    #[error("Invalid matcher pattern '{pattern}': {source}")]
    InvalidMatcher {
        /// The offending pattern
        pattern: String,
        /// The parse failure
        #[source]
        source: MatcherError,
    },

    /// The requested template key is not a builtin template
    #[error("Unknown template '{key}' (known templates: {known})")]
    UnknownTemplate {
        /// The unrecognized key
        key: String,
        /// Comma-separated list of known keys
        known: String,
    },
}

/// Errors produced by the merger
#[derive(Error, Debug)]
pub enum MergeError {
    /// The persisted store could not be read
    #[error("Failed to read store {path}")]
    StoreRead {
        /// The store path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The persisted store holds bytes that do not parse as a document
    ///
    /// When a forensic backup of the raw bytes was written, `backup`
    /// points at it. The store itself is left untouched.
    #[error("Existing document at {path} is corrupt: {source}")]
    CorruptExistingDocument {
        /// The store path
        path: PathBuf,
        /// Forensic backup of the raw bytes, if one was written
        backup: Option<PathBuf>,
        /// The parse failure
        #[source]
        source: hooksmith_core::Error,
    },

    /// The backup file could not be written
    #[error("Failed to write backup {path}")]
    BackupWrite {
        /// The backup path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The merged document failed validation; nothing was written
    #[error("Merged document failed validation with {} error(s)", report.errors.len())]
    PostMergeValidationFailed {
        /// The full validation report
        report: ValidationReport,
    },

    /// The atomic swap into the store path failed; the store is unchanged
    #[error("Failed to commit merged document to {path}")]
    CommitIoFailure {
        /// The store path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Interactive resolution supplied the wrong number of decisions
    #[error("Expected {expected} conflict decision(s), got {got}")]
    DecisionMismatch {
        /// Conflicts detected by analysis
        expected: usize,
        /// Decisions supplied by the caller
        got: usize,
    },

    /// Document serialization or other shared failure
    #[error(transparent)]
    Document(#[from] hooksmith_core::Error),
}

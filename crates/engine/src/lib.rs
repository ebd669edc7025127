//! Pipeline engine for hooksmith
//!
//! This crate implements the three pipeline components:
//! - Generation of schema-valid hook entries from typed inputs
//! - Validation of configuration documents against cross-field rules
//! - Conflict-aware merging into the persisted store, with backups and
//!   an atomic commit
//!
//! Data flows strictly generator → validator → merger → persisted store;
//! the merger is the only component that touches the long-lived file.

pub mod error;
pub mod generate;
pub mod merge;
pub mod store;
pub mod validate;

pub use error::{GenerateError, MergeError};
pub use generate::{ActionSpec, GenerateRequest, Template, builtin_templates, generate, template};
pub use merge::{
    AppliedConflict, ConflictDecision, MergeConflict, MergeOutcome, MergePolicy, MergeResult,
    Merger, analyze, merge_documents,
};
pub use store::{BackupRecord, ConfigStore};
pub use validate::{
    Finding, FindingKind, PathLookup, RealPathLookup, ValidationReport, validate,
};

// Re-export the data model so callers can depend on the engine alone
pub use hooksmith_core::{
    ActionKind, ConfigurationDocument, HookAction, HookEntry, HookEvent, MatcherPattern,
};

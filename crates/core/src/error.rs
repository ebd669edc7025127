//! Base error types for hooksmith
//!
//! This module provides the foundation error types that all crates can use.

use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be parsed as a configuration document
    #[error("Failed to parse document: {0}")]
    Parse(#[source] serde_json::Error),

    /// Document could not be serialized
    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

//! Matcher patterns for targeting hook entries
//!
//! A matcher selects which tool (or context) an entry applies to. Four
//! pattern forms are recognized:
//!
//! - `*` — matches every tool
//! - `Write` — exact token
//! - `Write|Edit|MultiEdit` — alternation of exact tokens
//! - `mcp__github/*` — everything under a namespace prefix
//!
//! Patterns are stored verbatim in entries; this module parses them for
//! validation and implements the selection semantics.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when a matcher pattern is malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatcherError {
    /// The pattern is empty or whitespace-only
    #[error("matcher pattern must not be empty")]
    Empty,

    /// An alternation contains an empty branch, e.g. `Write||Edit`
    #[error("matcher pattern '{pattern}' contains an empty alternation branch")]
    EmptyBranch {
        /// The offending pattern
        pattern: String,
    },

    /// A prefix pattern has no namespace before `/*`, i.e. the bare `/*`
    #[error("matcher pattern '{pattern}' has an empty prefix before '/*'")]
    EmptyPrefix {
        /// The offending pattern
        pattern: String,
    },
}

/// A parsed matcher pattern
///
/// Entries carry the raw pattern string; this form exists for validation
/// and matching only and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherPattern {
    /// `*` — matches any tool
    Any,
    /// A single exact token
    Exact(String),
    /// Alternation of exact tokens, `A|B|C`
    Alternation(Vec<String>),
    /// Namespace prefix, `ns/*` — matches every tool under `ns/`
    Prefix(String),
}

impl MatcherPattern {
    /// Parse a pattern string into its structured form
    pub fn parse(pattern: &str) -> Result<Self, MatcherError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(MatcherError::Empty);
        }

        if trimmed == "*" {
            return Ok(Self::Any);
        }

        if trimmed.contains('|') {
            let branches: Vec<String> = trimmed.split('|').map(str::to_string).collect();
            if branches.iter().any(|b| b.trim().is_empty()) {
                return Err(MatcherError::EmptyBranch {
                    pattern: pattern.to_string(),
                });
            }
            return Ok(Self::Alternation(branches));
        }

        if let Some(prefix) = trimmed.strip_suffix("/*") {
            if prefix.is_empty() {
                return Err(MatcherError::EmptyPrefix {
                    pattern: pattern.to_string(),
                });
            }
            return Ok(Self::Prefix(prefix.to_string()));
        }

        Ok(Self::Exact(trimmed.to_string()))
    }

    /// Check whether this pattern selects the given tool name
    ///
    /// Prefix patterns match tools strictly under the namespace
    /// (`ns/*` matches `ns/anything` but not `ns` itself).
    #[must_use]
    pub fn matches(&self, tool: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(token) => token == tool,
            Self::Alternation(branches) => branches.iter().any(|b| b == tool),
            Self::Prefix(prefix) => tool
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1),
        }
    }
}

impl fmt::Display for MatcherPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Exact(token) => f.write_str(token),
            Self::Alternation(branches) => f.write_str(&branches.join("|")),
            Self::Prefix(prefix) => write!(f, "{prefix}/*"),
        }
    }
}

impl FromStr for MatcherPattern {
    type Err = MatcherError;

    fn from_str(s: &str) -> Result<Self, MatcherError> {
        Self::parse(s)
    }
}

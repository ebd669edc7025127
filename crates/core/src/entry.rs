//! Hook entries
//!
//! An entry binds a trigger event to an ordered sequence of actions,
//! optionally scoped by a matcher pattern. Entries are identified within
//! one event's sequence by their `(matcher, description)` pair; two
//! entries with the same identity but different content form a merge
//! conflict.

use crate::HookAction;
use serde::{Deserialize, Serialize};

/// Default execution priority for entries
pub const DEFAULT_PRIORITY: i32 = 100;

/// One unit of hook configuration
///
/// Invariants (enforced by the generator and checked by the validator):
/// `matcher` is present for matcher-capable events and absent otherwise;
/// `hooks` is non-empty. Lower `priority` executes first; ties are broken
/// by insertion order (stable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookEntry {
    /// Matcher pattern, present only for matcher-capable events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,

    /// Human-readable purpose of the entry
    pub description: String,

    /// Execution priority (lower runs first)
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Whether the entry is active
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Ordered sequence of actions to execute
    pub hooks: Vec<HookAction>,
}

impl HookEntry {
    /// The identity key used for conflict detection within one event
    #[must_use]
    pub fn identity(&self) -> (Option<&str>, &str) {
        (self.matcher.as_deref(), &self.description)
    }

    /// Whether another entry shares this entry's identity key
    #[must_use]
    pub fn collides_with(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }

    /// Whether another entry with the same identity differs in content
    ///
    /// Two entries that collide but do not differ are the same entry; the
    /// merger drops the incoming copy without recording a conflict.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        self.priority != other.priority || self.enabled != other.enabled || self.hooks != other.hooks
    }
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_enabled() -> bool {
    true
}

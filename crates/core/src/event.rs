//! Hook trigger events
//!
//! The schema recognizes a fixed, closed set of eight events. Four of them
//! target a specific tool or context via a matcher pattern; the other four
//! fire unconditionally and reject matchers.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trigger event that hook entries bind to
///
/// Serialized in kebab-case, e.g. `before-tool-use`. The set is closed:
/// documents containing any other event name fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    /// Fires before a tool invocation (matcher-capable)
    BeforeToolUse,
    /// Fires after a tool invocation completes (matcher-capable)
    AfterToolUse,
    /// Fires before context compaction (matcher-capable)
    BeforeCompact,
    /// Fires when a session starts (matcher-capable)
    SessionStart,
    /// Fires when a prompt is submitted
    PromptSubmit,
    /// Fires on notifications
    Notification,
    /// Fires when the agent stops
    Stop,
    /// Fires when a subagent stops
    SubagentStop,
}

impl HookEvent {
    /// All recognized events, in schema order
    pub const ALL: [Self; 8] = [
        Self::BeforeToolUse,
        Self::AfterToolUse,
        Self::BeforeCompact,
        Self::SessionStart,
        Self::PromptSubmit,
        Self::Notification,
        Self::Stop,
        Self::SubagentStop,
    ];

    /// Whether entries for this event carry a matcher pattern
    ///
    /// Matcher-less events reject any matcher, including `"*"`.
    #[must_use]
    pub fn supports_matcher(self) -> bool {
        matches!(
            self,
            Self::BeforeToolUse | Self::AfterToolUse | Self::BeforeCompact | Self::SessionStart
        )
    }

    /// The serialized (kebab-case) name of this event
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeToolUse => "before-tool-use",
            Self::AfterToolUse => "after-tool-use",
            Self::BeforeCompact => "before-compact",
            Self::SessionStart => "session-start",
            Self::PromptSubmit => "prompt-submit",
            Self::Notification => "notification",
            Self::Stop => "stop",
            Self::SubagentStop => "subagent-stop",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| {
                let known = Self::ALL.map(Self::as_str).join(", ");
                Error::Message(format!("Unrecognized event '{s}' (expected one of: {known})"))
            })
    }
}

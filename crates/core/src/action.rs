//! Hook actions
//!
//! An action is one executable unit attached to a hook entry: either a
//! command line or a prompt text, with an execution timeout in seconds.
//! The serialized form is a tagged object matching the persisted schema:
//!
//! ```json
//! { "type": "command", "command": "cargo fmt --all", "timeout": 600 }
//! { "type": "prompt", "prompt": "Summarize open work.", "timeout": 300 }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default timeout for command actions, in seconds
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u32 = 600;

/// Fixed timeout for prompt actions, in seconds
///
/// Prompts use a fixed execution model; caller-supplied timeouts are
/// normalized to this value by the generator.
pub const PROMPT_TIMEOUT_SECS: u32 = 300;

/// The kind of an action's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// A shell command line
    Command,
    /// A prompt text handed to the agent
    Prompt,
}

impl ActionKind {
    /// The serialized name of this kind
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Prompt => "prompt",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executable unit of a hook entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HookAction {
    /// A command invocation
    Command {
        /// The command line to execute
        command: String,

        /// Execution timeout in seconds
        #[serde(default = "default_command_timeout")]
        timeout: u32,
    },

    /// A prompt invocation
    Prompt {
        /// The prompt text
        prompt: String,

        /// Execution timeout in seconds
        #[serde(default = "default_prompt_timeout")]
        timeout: u32,
    },
}

impl HookAction {
    /// Build a command action, applying the default timeout if absent
    pub fn command(payload: impl Into<String>, timeout: Option<u32>) -> Self {
        Self::Command {
            command: payload.into(),
            timeout: timeout.unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }

    /// Build a prompt action with the fixed prompt timeout
    pub fn prompt(payload: impl Into<String>) -> Self {
        Self::Prompt {
            prompt: payload.into(),
            timeout: PROMPT_TIMEOUT_SECS,
        }
    }

    /// The kind of this action
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Command { .. } => ActionKind::Command,
            Self::Prompt { .. } => ActionKind::Prompt,
        }
    }

    /// The command line or prompt text
    #[must_use]
    pub fn payload(&self) -> &str {
        match self {
            Self::Command { command, .. } => command,
            Self::Prompt { prompt, .. } => prompt,
        }
    }

    /// Execution timeout in seconds
    #[must_use]
    pub fn timeout(&self) -> u32 {
        match self {
            Self::Command { timeout, .. } | Self::Prompt { timeout, .. } => *timeout,
        }
    }
}

fn default_command_timeout() -> u32 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

fn default_prompt_timeout() -> u32 {
    PROMPT_TIMEOUT_SECS
}

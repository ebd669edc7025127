//! Hook entry generation
//!
//! Builds one well-formed, schema-valid entry from typed inputs. Pure:
//! same inputs always yield the same entry, no filesystem access.

use crate::error::GenerateError;
use hooksmith_core::{
    ActionKind, DEFAULT_PRIORITY, HookAction, HookEntry, HookEvent, MatcherPattern,
};

/// The action half of a generation request
#[derive(Debug, Clone)]
pub struct ActionSpec {
    /// Command or prompt
    pub kind: ActionKind,

    /// The command line or prompt text
    pub payload: String,

    /// Timeout in seconds; commands default when absent, prompts always
    /// use the fixed prompt timeout
    pub timeout: Option<u32>,
}

impl ActionSpec {
    /// A command action spec
    pub fn command(payload: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Command,
            payload: payload.into(),
            timeout: None,
        }
    }

    /// A prompt action spec
    pub fn prompt(payload: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Prompt,
            payload: payload.into(),
            timeout: None,
        }
    }

    /// Set an explicit timeout (ignored for prompt actions)
    #[must_use]
    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }
}

/// Typed inputs for [`generate`]
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// The trigger event
    pub event: HookEvent,

    /// Matcher pattern; required for matcher-capable events, rejected
    /// for matcher-less ones
    pub matcher: Option<String>,

    /// The action to attach
    pub action: ActionSpec,

    /// Description; a deterministic summary is derived when absent
    pub description: Option<String>,

    /// Execution priority (lower runs first)
    pub priority: i32,

    /// Whether the entry starts enabled
    pub enabled: bool,
}

impl GenerateRequest {
    /// A request with default priority, enabled, no matcher, derived
    /// description
    #[must_use]
    pub fn new(event: HookEvent, action: ActionSpec) -> Self {
        Self {
            event,
            matcher: None,
            action,
            description: None,
            priority: DEFAULT_PRIORITY,
            enabled: true,
        }
    }

    /// Set the matcher pattern
    #[must_use]
    pub fn with_matcher(mut self, matcher: impl Into<String>) -> Self {
        self.matcher = Some(matcher.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Build a schema-valid hook entry from a request
///
/// Prompt actions ignore any caller-supplied timeout; the fixed prompt
/// timeout applies. The resulting entry always carries exactly one action.
pub fn generate(request: &GenerateRequest) -> Result<HookEntry, GenerateError> {
    let matcher = match (request.event.supports_matcher(), normalized_matcher(request)) {
        (true, None) => {
            return Err(GenerateError::MatcherRequired {
                event: request.event,
            });
        }
        (false, Some(_)) => {
            return Err(GenerateError::MatcherNotAllowed {
                event: request.event,
            });
        }
        (true, Some(pattern)) => {
            MatcherPattern::parse(pattern).map_err(|source| GenerateError::InvalidMatcher {
                pattern: pattern.to_string(),
                source,
            })?;
            Some(pattern.to_string())
        }
        (false, None) => None,
    };

    let payload = request.action.payload.trim();
    if payload.is_empty() {
        return Err(GenerateError::EmptyPayload);
    }

    let action = match request.action.kind {
        ActionKind::Command => HookAction::command(payload, request.action.timeout),
        ActionKind::Prompt => HookAction::prompt(payload),
    };

    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map_or_else(
            || derived_description(request.action.kind, payload),
            str::to_string,
        );

    Ok(HookEntry {
        matcher,
        description,
        priority: request.priority,
        enabled: request.enabled,
        hooks: vec![action],
    })
}

fn normalized_matcher(request: &GenerateRequest) -> Option<&str> {
    request
        .matcher
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
}

/// Derive a short description from the action when none was supplied
fn derived_description(kind: ActionKind, payload: &str) -> String {
    match kind {
        ActionKind::Command => {
            let head = payload.split_whitespace().next().unwrap_or(payload);
            format!("run {head}")
        }
        ActionKind::Prompt => {
            let snippet: Vec<&str> = payload.split_whitespace().take(6).collect();
            format!("prompt: {}", snippet.join(" "))
        }
    }
}

// ======================================================================

/// A builtin generation template: a pre-filled request the caller may
/// adjust before generating
#[derive(Debug, Clone, Copy)]
pub struct Template {
    /// The lookup key
    pub key: &'static str,
    /// One-line summary shown in listings
    pub summary: &'static str,
    /// The trigger event
    pub event: HookEvent,
    /// The matcher pattern, for matcher-capable events
    pub matcher: Option<&'static str>,
    /// The action kind
    pub kind: ActionKind,
    /// The action payload
    pub payload: &'static str,
    /// The entry description
    pub description: &'static str,
}

const BUILTIN_TEMPLATES: &[Template] = &[
    Template {
        key: "auto-formatter",
        summary: "Format the workspace after file edits",
        event: HookEvent::AfterToolUse,
        matcher: Some("Write|Edit"),
        kind: ActionKind::Command,
        payload: "cargo fmt --all",
        description: "format after edits",
    },
    Template {
        key: "secret-detector",
        summary: "Scan pending writes for leaked secrets",
        event: HookEvent::BeforeToolUse,
        matcher: Some("Write|Edit"),
        kind: ActionKind::Command,
        payload: "gitleaks protect --staged --no-banner",
        description: "scan writes for secrets",
    },
    Template {
        key: "session-notes",
        summary: "Load session context on startup",
        event: HookEvent::SessionStart,
        matcher: Some("*"),
        kind: ActionKind::Prompt,
        payload: "Review NOTES.md and summarize any open work before starting.",
        description: "load session context",
    },
    Template {
        key: "stop-summary",
        summary: "Summarize the session when the agent stops",
        event: HookEvent::Stop,
        matcher: None,
        kind: ActionKind::Prompt,
        payload: "Summarize what changed this session and list any follow-ups.",
        description: "summarize on stop",
    },
];

/// All builtin templates
#[must_use]
pub fn builtin_templates() -> &'static [Template] {
    BUILTIN_TEMPLATES
}

/// The keys of all builtin templates
#[must_use]
pub fn template_keys() -> Vec<&'static str> {
    BUILTIN_TEMPLATES.iter().map(|t| t.key).collect()
}

/// Resolve a template key to a pre-filled generation request
pub fn template(key: &str) -> Result<GenerateRequest, GenerateError> {
    let found = BUILTIN_TEMPLATES
        .iter()
        .find(|t| t.key == key)
        .ok_or_else(|| GenerateError::UnknownTemplate {
            key: key.to_string(),
            known: template_keys().join(", "),
        })?;

    let action = ActionSpec {
        kind: found.kind,
        payload: found.payload.to_string(),
        timeout: None,
    };

    Ok(GenerateRequest {
        event: found.event,
        matcher: found.matcher.map(str::to_string),
        action,
        description: Some(found.description.to_string()),
        priority: DEFAULT_PRIORITY,
        enabled: true,
    })
}

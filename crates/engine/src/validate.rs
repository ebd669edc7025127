//! Document validation
//!
//! Checks a configuration document against the hook schema and cross-field
//! rules. The validator performs no I/O of its own: script-path existence
//! is delegated to an injected [`PathLookup`] capability, keeping the
//! component deterministic and testable with a fake.

use hooksmith_core::{ConfigurationDocument, HookAction, HookEntry, HookEvent, MatcherPattern};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Script file extensions that mark a command payload as script-backed
const SCRIPT_EXTENSIONS: [&str; 6] = ["sh", "bash", "zsh", "py", "rb", "pl"];

/// Filesystem capability injected by the caller
///
/// The validator only ever asks whether a path exists. Tests supply a
/// closure; production callers use [`RealPathLookup`].
pub trait PathLookup {
    /// Whether the path exists on the caller's filesystem
    fn exists(&self, path: &Path) -> bool;
}

/// Path lookup backed by the real filesystem
pub struct RealPathLookup;

impl PathLookup for RealPathLookup {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F> PathLookup for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// The category of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    /// Matcher absent on a matcher-capable event
    MatcherRequired,
    /// Matcher present on a matcher-less event
    MatcherNotAllowed,
    /// Matcher pattern fails to parse
    InvalidMatcher,
    /// Entry has an empty action sequence
    NoActions,
    /// Action payload is empty or whitespace-only
    EmptyPayload,
    /// Action timeout is zero
    InvalidTimeout,
    /// Command payload references a script path that does not exist
    ScriptNotFound,
    /// Duplicate `(event, matcher, description)` triple (warning)
    DuplicateEntry,
}

impl FindingKind {
    /// Stable kebab-case name for display
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MatcherRequired => "matcher-required",
            Self::MatcherNotAllowed => "matcher-not-allowed",
            Self::InvalidMatcher => "invalid-matcher",
            Self::NoActions => "no-actions",
            Self::EmptyPayload => "empty-payload",
            Self::InvalidTimeout => "invalid-timeout",
            Self::ScriptNotFound => "script-not-found",
            Self::DuplicateEntry => "duplicate-entry",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding, anchored to an entry
#[derive(Debug, Clone)]
pub struct Finding {
    /// The event whose sequence holds the entry
    pub event: HookEvent,
    /// Index of the entry within the event's sequence
    pub entry_index: usize,
    /// Category of the finding
    pub kind: FindingKind,
    /// Human-readable detail
    pub detail: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}: {}",
            self.event, self.entry_index, self.kind, self.detail
        )
    }
}

/// The outcome of validating a document
///
/// A document is valid for persistence iff `errors` is empty; warnings
/// never block validity but must be surfaced to the caller.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Findings that block persistence
    pub errors: Vec<Finding>,
    /// Findings the caller should surface but may proceed past
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    /// Whether the document may be persisted
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, event: HookEvent, entry_index: usize, kind: FindingKind, detail: String) {
        self.errors.push(Finding {
            event,
            entry_index,
            kind,
            detail,
        });
    }

    fn warning(&mut self, event: HookEvent, entry_index: usize, kind: FindingKind, detail: String) {
        self.warnings.push(Finding {
            event,
            entry_index,
            kind,
            detail,
        });
    }
}

/// Validate a whole document
///
/// Event recognition and field types are enforced earlier, at the serde
/// parse layer; this checks the cross-field rules the schema cannot
/// express.
pub fn validate(document: &ConfigurationDocument, lookup: &dyn PathLookup) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (&event, entries) in &document.events {
        let mut seen: HashMap<(Option<&str>, &str), usize> = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            check_entry(event, index, entry, lookup, &mut report);

            match seen.get(&entry.identity()) {
                Some(&first) => {
                    report.warning(
                        event,
                        index,
                        FindingKind::DuplicateEntry,
                        format!(
                            "duplicates entry {first} (matcher {:?}, description {:?})",
                            entry.matcher, entry.description
                        ),
                    );
                }
                None => {
                    seen.insert(entry.identity(), index);
                }
            }
        }
    }

    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated document"
    );

    report
}

fn check_entry(
    event: HookEvent,
    index: usize,
    entry: &HookEntry,
    lookup: &dyn PathLookup,
    report: &mut ValidationReport,
) {
    check_matcher(event, index, entry, report);

    if entry.hooks.is_empty() {
        report.error(
            event,
            index,
            FindingKind::NoActions,
            "entry has no actions".to_string(),
        );
    }

    for (action_index, action) in entry.hooks.iter().enumerate() {
        check_action(event, index, action_index, action, lookup, report);
    }
}

fn check_matcher(event: HookEvent, index: usize, entry: &HookEntry, report: &mut ValidationReport) {
    let matcher = entry.matcher.as_deref().map(str::trim).filter(|m| !m.is_empty());

    if event.supports_matcher() {
        match matcher {
            None => report.error(
                event,
                index,
                FindingKind::MatcherRequired,
                format!("event '{event}' requires a matcher"),
            ),
            Some(pattern) => {
                if let Err(err) = MatcherPattern::parse(pattern) {
                    report.error(event, index, FindingKind::InvalidMatcher, err.to_string());
                }
            }
        }
    } else if entry.matcher.is_some() {
        report.error(
            event,
            index,
            FindingKind::MatcherNotAllowed,
            format!("event '{event}' does not accept a matcher"),
        );
    }
}

fn check_action(
    event: HookEvent,
    index: usize,
    action_index: usize,
    action: &HookAction,
    lookup: &dyn PathLookup,
    report: &mut ValidationReport,
) {
    let payload = action.payload().trim();
    if payload.is_empty() {
        report.error(
            event,
            index,
            FindingKind::EmptyPayload,
            format!("action {action_index} has an empty payload"),
        );
        return;
    }

    if action.timeout() == 0 {
        report.error(
            event,
            index,
            FindingKind::InvalidTimeout,
            format!("action {action_index} has a zero timeout"),
        );
    }

    if let HookAction::Command { .. } = action
        && let Some(script) = script_path(payload)
        && !lookup.exists(Path::new(script))
    {
        report.error(
            event,
            index,
            FindingKind::ScriptNotFound,
            format!("script '{script}' does not exist"),
        );
    }
}

/// The script path referenced by a command payload, if any
///
/// Only the first token (the executable) is considered, and only when it
/// looks like a path: contains a separator or carries a script extension.
/// Plain program names (`cargo`, `gitleaks`) are resolved by the shell at
/// execution time and are not checked here.
fn script_path(payload: &str) -> Option<&str> {
    let token = payload.split_whitespace().next()?;

    let has_separator = token.contains('/');
    let has_script_extension = Path::new(token)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext));

    (has_separator || has_script_extension).then_some(token)
}

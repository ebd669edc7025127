//! Conflict-aware merging
//!
//! Folds an incoming document into the persisted store: detects
//! record-level collisions, applies a resolution policy, re-validates the
//! merged result, and commits transactionally with a backup of the prior
//! state. The merger is the only component that touches the long-lived
//! configuration file; callers needing concurrent safety serialize access
//! externally.

use crate::error::MergeError;
use crate::store::{BackupRecord, ConfigStore};
use crate::validate::{self, PathLookup, ValidationReport};
use hooksmith_core::{ConfigurationDocument, Error as CoreError, HookEntry, HookEvent};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Document-level resolution policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Colliding incoming entries are dropped
    KeepExisting,
    /// Colliding incoming entries replace the existing ones
    Replace,
    /// Colliding incoming entries are appended as distinct entries
    KeepBoth,
    /// Return the conflicts without committing; the caller resolves them
    /// and completes the merge with per-conflict decisions
    Interactive,
}

impl MergePolicy {
    /// The kebab-case name used on the CLI surface
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeepExisting => "keep-existing",
            Self::Replace => "replace",
            Self::KeepBoth => "keep-both",
            Self::Interactive => "interactive",
        }
    }

    /// The uniform per-conflict decision this policy implies, if any
    #[must_use]
    pub fn decision(self) -> Option<ConflictDecision> {
        match self {
            Self::KeepExisting => Some(ConflictDecision::KeepExisting),
            Self::Replace => Some(ConflictDecision::Replace),
            Self::KeepBoth => Some(ConflictDecision::KeepBoth),
            Self::Interactive => None,
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "keep-existing" => Ok(Self::KeepExisting),
            "replace" => Ok(Self::Replace),
            "keep-both" => Ok(Self::KeepBoth),
            "interactive" => Ok(Self::Interactive),
            other => Err(CoreError::Message(format!(
                "Unknown merge policy '{other}' (expected keep-existing, replace, keep-both, or interactive)"
            ))),
        }
    }
}

/// Resolution applied to a single conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Keep the existing entry, drop the incoming one
    KeepExisting,
    /// Replace the existing entry with the incoming one
    Replace,
    /// Keep both entries
    KeepBoth,
}

impl ConflictDecision {
    /// Human-readable name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeepExisting => "keep-existing",
            Self::Replace => "replace",
            Self::KeepBoth => "keep-both",
        }
    }
}

impl fmt::Display for ConflictDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected collision between an incoming and an existing entry
///
/// Both entries share an `(event, matcher, description)` identity.
#[derive(Debug, Clone)]
pub struct MergeConflict {
    /// The event whose sequence collided
    pub event: HookEvent,
    /// Index of the existing entry at detection time
    pub existing_index: usize,
    /// The entry already in the store
    pub existing: HookEntry,
    /// The entry arriving from the incoming document
    pub incoming: HookEntry,
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matcher = self.incoming.matcher.as_deref().unwrap_or("-");
        write!(
            f,
            "{} / {} / \"{}\"",
            self.event, matcher, self.incoming.description
        )
    }
}

/// A conflict together with the decision that resolved it
#[derive(Debug, Clone)]
pub struct AppliedConflict {
    /// The detected conflict
    pub conflict: MergeConflict,
    /// The decision that was applied
    pub decision: ConflictDecision,
}

/// The outcome of a committed merge
#[derive(Debug)]
pub struct MergeResult {
    /// The merged document, as committed
    pub document: ConfigurationDocument,
    /// Conflicts encountered, with the decision applied to each
    pub applied: Vec<AppliedConflict>,
    /// Backup of the prior store content; `None` when the store did not
    /// exist before the merge
    pub backup: Option<BackupRecord>,
}

/// The outcome of a merge invocation
#[derive(Debug)]
pub enum MergeOutcome {
    /// The merge was validated and committed
    Committed(MergeResult),
    /// Policy was interactive and conflicts exist; nothing was written.
    /// Complete the merge with [`Merger::merge_resolved`].
    NeedsResolution(Vec<MergeConflict>),
}

/// Detect the conflicts a merge would encounter, committing nothing
#[must_use]
pub fn analyze(
    existing: &ConfigurationDocument,
    incoming: &ConfigurationDocument,
) -> Vec<MergeConflict> {
    let (_, applied) = merge_documents(existing, incoming, |_| ConflictDecision::KeepExisting);
    applied.into_iter().map(|a| a.conflict).collect()
}

/// Merge two documents in memory, resolving conflicts via `decide`
///
/// Non-colliding incoming entries are inserted in priority order (stable).
/// The conflict sequence is deterministic: incoming entries are visited in
/// document order, so the same inputs always produce the same conflicts in
/// the same order regardless of the decisions taken.
pub fn merge_documents(
    existing: &ConfigurationDocument,
    incoming: &ConfigurationDocument,
    mut decide: impl FnMut(&MergeConflict) -> ConflictDecision,
) -> (ConfigurationDocument, Vec<AppliedConflict>) {
    let mut merged = existing.clone();
    let mut applied = Vec::new();

    for (&event, entries) in &incoming.events {
        for entry in entries {
            let collision = merged
                .entries_for(event)
                .iter()
                .position(|candidate| candidate.collides_with(entry));

            let Some(index) = collision else {
                merged.insert_sorted(event, entry.clone());
                continue;
            };

            let conflict = MergeConflict {
                event,
                existing_index: index,
                existing: merged.entries_for(event)[index].clone(),
                incoming: entry.clone(),
            };
            let decision = decide(&conflict);

            match decision {
                ConflictDecision::KeepExisting => {}
                ConflictDecision::Replace => {
                    let mut repositioned = None;
                    if let Some(sequence) = merged.events.get_mut(&event) {
                        let priority_changed = sequence[index].priority != entry.priority;
                        sequence[index] = entry.clone();
                        if priority_changed {
                            repositioned = Some(sequence.remove(index));
                        }
                    }
                    // Reposition only the replaced entry; the rest of the
                    // sequence keeps its order
                    if let Some(moved) = repositioned {
                        merged.insert_sorted(event, moved);
                    }
                }
                ConflictDecision::KeepBoth => merged.insert_sorted(event, entry.clone()),
            }

            applied.push(AppliedConflict { conflict, decision });
        }
    }

    (merged, applied)
}

/// Owner of the read-modify-write transaction against one store path
///
/// Not internally synchronized: at most one merger may act on a given
/// path at a time. Callers needing concurrent safety take a lock around
/// the whole merge call.
pub struct Merger<'a> {
    store: ConfigStore,
    lookup: &'a dyn PathLookup,
    start_fresh: bool,
}

impl<'a> Merger<'a> {
    /// A merger for the store at `store_path`, validating with `lookup`
    pub fn new(store_path: impl Into<PathBuf>, lookup: &'a dyn PathLookup) -> Self {
        Self {
            store: ConfigStore::new(store_path),
            lookup,
            start_fresh: false,
        }
    }

    /// When the existing store is corrupt, merge from the incoming
    /// document alone instead of refusing
    ///
    /// Has no effect on a healthy store. The corrupt bytes are still
    /// backed up before the commit.
    #[must_use]
    pub fn start_fresh(mut self, start_fresh: bool) -> Self {
        self.start_fresh = start_fresh;
        self
    }

    /// The underlying store handle
    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Merge `incoming` into the store under a document-level policy
    ///
    /// With `MergePolicy::Interactive` and at least one conflict, returns
    /// [`MergeOutcome::NeedsResolution`] without writing anything.
    pub fn merge(
        &self,
        incoming: &ConfigurationDocument,
        policy: MergePolicy,
    ) -> Result<MergeOutcome, MergeError> {
        match policy.decision() {
            Some(decision) => self
                .merge_with(incoming, |_| decision)
                .map(MergeOutcome::Committed),
            None => {
                let conflicts = self.conflicts(incoming)?;
                if conflicts.is_empty() {
                    self.merge_with(incoming, |_| ConflictDecision::KeepExisting)
                        .map(MergeOutcome::Committed)
                } else {
                    Ok(MergeOutcome::NeedsResolution(conflicts))
                }
            }
        }
    }

    /// Complete an interactive merge with one decision per conflict
    ///
    /// Decisions align with the conflict order returned by the
    /// `NeedsResolution` phase; a count mismatch aborts before any write.
    pub fn merge_resolved(
        &self,
        incoming: &ConfigurationDocument,
        decisions: &[ConflictDecision],
    ) -> Result<MergeResult, MergeError> {
        let conflicts = self.conflicts(incoming)?;
        if conflicts.len() != decisions.len() {
            return Err(MergeError::DecisionMismatch {
                expected: conflicts.len(),
                got: decisions.len(),
            });
        }

        let mut next = 0;
        self.merge_with(incoming, move |_| {
            let decision = decisions[next];
            next += 1;
            decision
        })
    }

    /// The conflicts a merge of `incoming` would encounter
    pub fn conflicts(&self, incoming: &ConfigurationDocument) -> Result<Vec<MergeConflict>, MergeError> {
        let existing = self.read_existing(true)?;
        Ok(analyze(&existing, incoming))
    }

    /// Compute the merged document and its validation report without
    /// writing anything (no backup, no commit)
    pub fn preview(
        &self,
        incoming: &ConfigurationDocument,
        mut decide: impl FnMut(&MergeConflict) -> ConflictDecision,
    ) -> Result<(ConfigurationDocument, Vec<AppliedConflict>, ValidationReport), MergeError> {
        let existing = self.read_existing(false)?;
        let (document, applied) = merge_documents(&existing, incoming, &mut decide);
        let report = validate::validate(&document, self.lookup);
        Ok((document, applied, report))
    }

    fn merge_with(
        &self,
        incoming: &ConfigurationDocument,
        mut decide: impl FnMut(&MergeConflict) -> ConflictDecision,
    ) -> Result<MergeResult, MergeError> {
        let raw = self.store.read_raw()?;
        let existing = self.parse_existing(raw.as_deref(), true)?;

        let (document, applied) = merge_documents(&existing, incoming, &mut decide);

        // Defense in depth: never trust that a clean incoming document
        // guarantees a clean merged result
        let report = validate::validate(&document, self.lookup);
        if !report.is_valid() {
            return Err(MergeError::PostMergeValidationFailed { report });
        }

        let backup = match raw {
            Some(bytes) => Some(self.store.write_backup(&bytes)?),
            None => None,
        };

        self.store.commit(&document)?;

        tracing::info!(
            path = %self.store.path().display(),
            entries = document.total_entries(),
            conflicts = applied.len(),
            "merge committed"
        );

        Ok(MergeResult {
            document,
            applied,
            backup,
        })
    }

    fn read_existing(&self, forensic_backup: bool) -> Result<ConfigurationDocument, MergeError> {
        let raw = self.store.read_raw()?;
        self.parse_existing(raw.as_deref(), forensic_backup)
    }

    /// Parse the store's raw bytes, handling the corrupt-store contract:
    /// back the raw bytes up for forensic recovery and refuse to merge
    /// unless the caller opted into starting fresh.
    fn parse_existing(
        &self,
        raw: Option<&[u8]>,
        forensic_backup: bool,
    ) -> Result<ConfigurationDocument, MergeError> {
        let Some(bytes) = raw else {
            return Ok(ConfigurationDocument::new());
        };

        let parsed = std::str::from_utf8(bytes)
            .map_err(|err| CoreError::Message(format!("store is not valid UTF-8: {err}")))
            .and_then(|text| ConfigurationDocument::from_json_str(text));

        match parsed {
            Ok(document) => Ok(document),
            Err(_) if self.start_fresh => {
                tracing::warn!(
                    path = %self.store.path().display(),
                    "existing store is corrupt; starting fresh from incoming"
                );
                Ok(ConfigurationDocument::new())
            }
            Err(source) => {
                let backup = if forensic_backup {
                    Some(self.store.write_backup(bytes)?.path)
                } else {
                    None
                };
                Err(MergeError::CorruptExistingDocument {
                    path: self.store.path().to_path_buf(),
                    backup,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use hooksmith_core::HookAction;

    fn entry(matcher: Option<&str>, description: &str, priority: i32, command: &str) -> HookEntry {
        HookEntry {
            matcher: matcher.map(str::to_string),
            description: description.to_string(),
            priority,
            enabled: true,
            hooks: vec![HookAction::command(command, None)],
        }
    }

    fn single(event: HookEvent, e: HookEntry) -> ConfigurationDocument {
        ConfigurationDocument::from_entry(event, e)
    }

    #[test]
    fn test_merge_into_empty_is_identity() {
        let incoming = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );

        let (merged, applied) =
            merge_documents(&ConfigurationDocument::new(), &incoming, |_| {
                ConflictDecision::KeepExisting
            });

        assert_eq!(merged, incoming);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_non_colliding_entries_append() {
        let existing = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );
        let incoming = single(
            HookEvent::AfterToolUse,
            entry(Some("Edit"), "lint", 200, "cargo clippy"),
        );

        let (merged, applied) =
            merge_documents(&existing, &incoming, |_| ConflictDecision::KeepExisting);

        assert_eq!(merged.entries_for(HookEvent::AfterToolUse).len(), 2);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_incoming_lower_priority_lands_first() {
        let existing = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );
        let incoming = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "lint", 50, "cargo clippy"),
        );

        let (merged, _) =
            merge_documents(&existing, &incoming, |_| ConflictDecision::KeepExisting);

        let descriptions: Vec<&str> = merged
            .entries_for(HookEvent::AfterToolUse)
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["lint", "format"]);
    }

    #[test]
    fn test_collision_keep_existing() {
        let existing = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );
        let incoming = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 50, "rustfmt src/main.rs"),
        );

        let (merged, applied) =
            merge_documents(&existing, &incoming, |_| ConflictDecision::KeepExisting);

        assert_eq!(merged, existing);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].decision, ConflictDecision::KeepExisting);
    }

    #[test]
    fn test_collision_replace_takes_incoming_content_and_priority() {
        let existing = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );
        let incoming = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 50, "rustfmt src/main.rs"),
        );

        let (merged, applied) =
            merge_documents(&existing, &incoming, |_| ConflictDecision::Replace);

        let entries = merged.entries_for(HookEvent::AfterToolUse);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].priority, 50);
        assert_eq!(entries[0].hooks[0].payload(), "rustfmt src/main.rs");
        assert_eq!(applied.len(), 1);
    }

    #[test]
    fn test_collision_keep_both_orders_by_priority() {
        let existing = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );
        let incoming = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 50, "rustfmt src/main.rs"),
        );

        let (merged, _) = merge_documents(&existing, &incoming, |_| ConflictDecision::KeepBoth);

        let entries = merged.entries_for(HookEvent::AfterToolUse);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].priority, 50);
        assert_eq!(entries[1].priority, 100);
    }

    #[test]
    fn test_replace_preserves_position_when_priority_unchanged() {
        let mut existing = ConfigurationDocument::new();
        existing.push(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );
        existing.push(
            HookEvent::AfterToolUse,
            entry(Some("Edit"), "lint", 100, "cargo clippy"),
        );

        let incoming = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "rustfmt src/lib.rs"),
        );

        let (merged, _) = merge_documents(&existing, &incoming, |_| ConflictDecision::Replace);

        let entries = merged.entries_for(HookEvent::AfterToolUse);
        assert_eq!(entries[0].description, "format");
        assert_eq!(entries[0].hooks[0].payload(), "rustfmt src/lib.rs");
        assert_eq!(entries[1].description, "lint");
    }

    #[test]
    fn test_self_merge_keep_both_doubles() {
        let mut document = ConfigurationDocument::new();
        document.push(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );
        document.push(
            HookEvent::Stop,
            entry(None, "summarize", 100, "notify-send done"),
        );

        let (merged, applied) =
            merge_documents(&document, &document, |_| ConflictDecision::KeepBoth);

        assert_eq!(merged.total_entries(), document.total_entries() * 2);
        assert_eq!(applied.len(), document.total_entries());
    }

    #[test]
    fn test_self_merge_keep_existing_and_replace_are_idempotent() {
        let mut document = ConfigurationDocument::new();
        document.push(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );
        document.push(
            HookEvent::Stop,
            entry(None, "summarize", 100, "notify-send done"),
        );

        for decision in [ConflictDecision::KeepExisting, ConflictDecision::Replace] {
            let (merged, _) = merge_documents(&document, &document, |_| decision);
            assert_eq!(merged, document);
        }
    }

    #[test]
    fn test_analyze_reports_without_mutating() {
        let existing = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 100, "cargo fmt --all"),
        );
        let incoming = single(
            HookEvent::AfterToolUse,
            entry(Some("Write"), "format", 50, "rustfmt src/main.rs"),
        );

        let conflicts = analyze(&existing, &incoming);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].existing.priority, 100);
        assert_eq!(conflicts[0].incoming.priority, 50);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "keep-existing".parse::<MergePolicy>().unwrap(),
            MergePolicy::KeepExisting
        );
        assert_eq!("replace".parse::<MergePolicy>().unwrap(), MergePolicy::Replace);
        assert_eq!("keep-both".parse::<MergePolicy>().unwrap(), MergePolicy::KeepBoth);
        assert_eq!(
            "interactive".parse::<MergePolicy>().unwrap(),
            MergePolicy::Interactive
        );
        assert!("merge".parse::<MergePolicy>().is_err());
    }

    #[test]
    fn test_conflict_display() {
        let conflict = MergeConflict {
            event: HookEvent::AfterToolUse,
            existing_index: 0,
            existing: entry(Some("Write"), "format", 100, "cargo fmt --all"),
            incoming: entry(Some("Write"), "format", 50, "rustfmt src/main.rs"),
        };
        assert_eq!(conflict.to_string(), "after-tool-use / Write / \"format\"");
    }
}

//! End-to-end pipeline tests: generate → validate → merge → store
//!
//! Exercises the full transaction against a real temporary filesystem,
//! including the corrupt-store and failed-commit recovery guarantees.

#![allow(clippy::unwrap_used, clippy::panic)]

use hooksmith_engine::{
    ActionSpec, ConfigStore, ConfigurationDocument, ConflictDecision, GenerateRequest, HookEvent,
    MergeError, MergeOutcome, MergePolicy, Merger, generate, validate,
};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn any_path(_: &Path) -> bool {
    true
}

fn sha256(bytes: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().to_vec()
}

fn format_entry(priority: i32, command: &str) -> ConfigurationDocument {
    let request = GenerateRequest {
        event: HookEvent::AfterToolUse,
        matcher: Some("Write".to_string()),
        action: ActionSpec::command(command),
        description: Some("format".to_string()),
        priority,
        enabled: true,
    };
    ConfigurationDocument::from_entry(HookEvent::AfterToolUse, generate(&request).unwrap())
}

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("hooks.json")
}

fn backups_in(dir: &TempDir) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(".backup-"))
        })
        .collect();
    paths.sort();
    paths
}

#[test]
fn generated_entries_validate_cleanly() {
    // Every valid (event, matcher, action) combination accepted by the
    // generator must survive validation with zero errors
    for event in HookEvent::ALL {
        let matcher = event.supports_matcher().then(|| "*".to_string());
        let request = GenerateRequest {
            event,
            matcher,
            action: ActionSpec::command("cargo fmt --all"),
            description: None,
            priority: 100,
            enabled: true,
        };
        let entry = generate(&request).unwrap();
        let document = ConfigurationDocument::from_entry(event, entry);

        let report = validate(&document, &any_path);
        assert!(report.is_valid(), "event {event} produced errors");
    }
}

#[test]
fn merge_into_missing_store_creates_it_without_backup() {
    let dir = TempDir::new().unwrap();
    let merger = Merger::new(store_path(&dir), &any_path);

    let incoming = format_entry(100, "cargo fmt --all");
    let outcome = merger.merge(&incoming, MergePolicy::KeepExisting).unwrap();

    let MergeOutcome::Committed(result) = outcome else {
        panic!("expected a committed merge");
    };
    assert!(result.applied.is_empty());
    assert!(result.backup.is_none());
    assert_eq!(result.document, incoming);

    let written = fs::read_to_string(store_path(&dir)).unwrap();
    let parsed = ConfigurationDocument::from_json_str(&written).unwrap();
    assert_eq!(parsed, incoming);
    assert!(backups_in(&dir).is_empty());
}

#[test]
fn merge_writes_backup_of_prior_state() {
    let dir = TempDir::new().unwrap();
    let merger = Merger::new(store_path(&dir), &any_path);

    let first = format_entry(100, "cargo fmt --all");
    merger.merge(&first, MergePolicy::KeepExisting).unwrap();
    let prior_bytes = fs::read(store_path(&dir)).unwrap();

    let second = ConfigurationDocument::from_entry(
        HookEvent::Stop,
        generate(&GenerateRequest::new(
            HookEvent::Stop,
            ActionSpec::prompt("Summarize the session."),
        ))
        .unwrap(),
    );
    let outcome = merger.merge(&second, MergePolicy::KeepExisting).unwrap();

    let MergeOutcome::Committed(result) = outcome else {
        panic!("expected a committed merge");
    };
    let backup = result.backup.unwrap();
    assert_eq!(fs::read(&backup.path).unwrap(), prior_bytes);

    // The merged store holds both events
    let merged = ConfigurationDocument::from_json_str(
        &fs::read_to_string(store_path(&dir)).unwrap(),
    )
    .unwrap();
    assert_eq!(merged.total_entries(), 2);
}

#[test]
fn replace_scenario_takes_incoming_priority_and_command() {
    let dir = TempDir::new().unwrap();
    let merger = Merger::new(store_path(&dir), &any_path);

    merger
        .merge(&format_entry(100, "cargo fmt --all"), MergePolicy::KeepExisting)
        .unwrap();

    let incoming = format_entry(50, "rustfmt src/main.rs");
    let outcome = merger.merge(&incoming, MergePolicy::Replace).unwrap();

    let MergeOutcome::Committed(result) = outcome else {
        panic!("expected a committed merge");
    };
    let entries = result.document.entries_for(HookEvent::AfterToolUse);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].priority, 50);
    assert_eq!(entries[0].hooks[0].payload(), "rustfmt src/main.rs");
}

#[test]
fn keep_existing_scenario_leaves_store_unchanged() {
    let dir = TempDir::new().unwrap();
    let merger = Merger::new(store_path(&dir), &any_path);

    merger
        .merge(&format_entry(100, "cargo fmt --all"), MergePolicy::KeepExisting)
        .unwrap();
    let before = fs::read(store_path(&dir)).unwrap();

    merger
        .merge(&format_entry(50, "rustfmt src/main.rs"), MergePolicy::KeepExisting)
        .unwrap();
    let after = fs::read(store_path(&dir)).unwrap();

    assert_eq!(sha256(&before), sha256(&after));
}

#[test]
fn keep_both_scenario_orders_by_priority() {
    let dir = TempDir::new().unwrap();
    let merger = Merger::new(store_path(&dir), &any_path);

    merger
        .merge(&format_entry(100, "cargo fmt --all"), MergePolicy::KeepExisting)
        .unwrap();
    let outcome = merger
        .merge(&format_entry(50, "rustfmt src/main.rs"), MergePolicy::KeepBoth)
        .unwrap();

    let MergeOutcome::Committed(result) = outcome else {
        panic!("expected a committed merge");
    };
    let entries = result.document.entries_for(HookEvent::AfterToolUse);
    assert_eq!(entries.len(), 2);
    // Execution order: priority 50 first, then 100
    assert_eq!(entries[0].priority, 50);
    assert_eq!(entries[0].hooks[0].payload(), "rustfmt src/main.rs");
    assert_eq!(entries[1].priority, 100);
    assert_eq!(entries[1].hooks[0].payload(), "cargo fmt --all");
}

#[test]
fn interactive_policy_returns_conflicts_without_writing() {
    let dir = TempDir::new().unwrap();
    let merger = Merger::new(store_path(&dir), &any_path);

    merger
        .merge(&format_entry(100, "cargo fmt --all"), MergePolicy::KeepExisting)
        .unwrap();
    let before = fs::read(store_path(&dir)).unwrap();
    let backups_before = backups_in(&dir).len();

    let incoming = format_entry(50, "rustfmt src/main.rs");
    let outcome = merger.merge(&incoming, MergePolicy::Interactive).unwrap();

    let MergeOutcome::NeedsResolution(conflicts) = outcome else {
        panic!("expected unresolved conflicts");
    };
    assert_eq!(conflicts.len(), 1);
    assert_eq!(fs::read(store_path(&dir)).unwrap(), before);
    assert_eq!(backups_in(&dir).len(), backups_before);

    // Completing with per-conflict decisions commits
    let result = merger
        .merge_resolved(&incoming, &[ConflictDecision::Replace])
        .unwrap();
    assert_eq!(
        result.document.entries_for(HookEvent::AfterToolUse)[0].priority,
        50
    );
}

#[test]
fn resolved_merge_rejects_wrong_decision_count() {
    let dir = TempDir::new().unwrap();
    let merger = Merger::new(store_path(&dir), &any_path);

    merger
        .merge(&format_entry(100, "cargo fmt --all"), MergePolicy::KeepExisting)
        .unwrap();

    let incoming = format_entry(50, "rustfmt src/main.rs");
    let err = merger.merge_resolved(&incoming, &[]).unwrap_err();
    assert!(matches!(
        err,
        MergeError::DecisionMismatch {
            expected: 1,
            got: 0
        }
    ));
}

#[test]
fn corrupt_store_is_backed_up_and_left_untouched() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let corrupt = b"{\"after-tool-use\": [".to_vec();
    fs::write(&path, &corrupt).unwrap();

    let merger = Merger::new(&path, &any_path);
    let err = merger
        .merge(&format_entry(100, "cargo fmt --all"), MergePolicy::KeepExisting)
        .unwrap_err();

    let MergeError::CorruptExistingDocument { backup, .. } = err else {
        panic!("expected a corrupt-store error");
    };
    let backup = backup.unwrap();
    assert_eq!(fs::read(&backup).unwrap(), corrupt);
    assert_eq!(fs::read(&path).unwrap(), corrupt);
}

#[test]
fn corrupt_store_with_start_fresh_merges_incoming_only() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let corrupt = b"not json at all".to_vec();
    fs::write(&path, &corrupt).unwrap();

    let incoming = format_entry(100, "cargo fmt --all");
    let merger = Merger::new(&path, &any_path).start_fresh(true);
    let outcome = merger.merge(&incoming, MergePolicy::KeepExisting).unwrap();

    let MergeOutcome::Committed(result) = outcome else {
        panic!("expected a committed merge");
    };
    assert_eq!(result.document, incoming);

    // The corrupt bytes survive in the pre-commit backup
    let backup = result.backup.unwrap();
    assert_eq!(fs::read(&backup.path).unwrap(), corrupt);

    let merged =
        ConfigurationDocument::from_json_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(merged, incoming);
}

#[test]
fn failed_swap_discards_the_temporary_artifact() {
    // Occupying the store path with a directory makes the final rename
    // fail; nothing may be left behind in the parent
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    fs::create_dir(&path).unwrap();

    let store = ConfigStore::new(&path);
    let err = store
        .commit(&format_entry(100, "cargo fmt --all"))
        .unwrap_err();
    assert!(matches!(err, MergeError::CommitIoFailure { .. }));
    assert!(path.is_dir());

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path() != path)
        .collect();
    assert!(leftovers.is_empty(), "temporary artifact survived: {leftovers:?}");
}

#[test]
fn failed_commit_leaves_store_bytes_identical() {
    let dir = TempDir::new().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    let path = locked.join("hooks.json");

    // Seed the store while the directory is still writable
    let merger = Merger::new(&path, &any_path);
    merger
        .merge(&format_entry(100, "cargo fmt --all"), MergePolicy::KeepExisting)
        .unwrap();
    let hash_before = sha256(&fs::read(&path).unwrap());

    let mut permissions = fs::metadata(&locked).unwrap().permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&locked, permissions.clone()).unwrap();

    // Permission bits do not constrain every user (root); only force the
    // failure when they actually hold
    let probe = locked.join(".probe");
    if fs::write(&probe, b"x").is_ok() {
        fs::remove_file(&probe).ok();
        permissions.set_readonly(false);
        fs::set_permissions(&locked, permissions).unwrap();
        return;
    }

    let result = merger.merge(&format_entry(50, "rustfmt src/main.rs"), MergePolicy::Replace);

    // Restore permissions before asserting so TempDir can clean up
    permissions.set_readonly(false);
    fs::set_permissions(&locked, permissions).unwrap();

    match result {
        Err(MergeError::BackupWrite { .. } | MergeError::CommitIoFailure { .. }) => {}
        other => panic!("expected an I/O failure, got {other:?}"),
    }
    assert_eq!(sha256(&fs::read(&path).unwrap()), hash_before);
}

#[test]
fn post_merge_validation_failure_aborts_without_write() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);

    let merger = Merger::new(&path, &any_path);
    merger
        .merge(&format_entry(100, "cargo fmt --all"), MergePolicy::KeepExisting)
        .unwrap();
    let before = fs::read(&path).unwrap();
    let backups_before = backups_in(&dir).len();

    // A script-backed command whose path is denied by the lookup makes
    // the merged document invalid
    let script_incoming = format_entry(50, "./scripts/format.sh");
    let strict = |path: &Path| !path.to_string_lossy().contains("format.sh");
    let strict_merger = Merger::new(&path, &strict);
    let err = strict_merger
        .merge(&script_incoming, MergePolicy::KeepBoth)
        .unwrap_err();

    assert!(matches!(err, MergeError::PostMergeValidationFailed { .. }));
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(backups_in(&dir).len(), backups_before);
}

#[test]
fn clean_documents_never_fail_post_merge_validation() {
    let dir = TempDir::new().unwrap();
    let merger = Merger::new(store_path(&dir), &any_path);

    let mut existing = ConfigurationDocument::new();
    for event in HookEvent::ALL {
        let matcher = event.supports_matcher().then(|| "*".to_string());
        let request = GenerateRequest {
            event,
            matcher,
            action: ActionSpec::command("cargo check"),
            description: Some(format!("check on {event}")),
            priority: 100,
            enabled: true,
        };
        existing.push(event, generate(&request).unwrap());
    }
    merger.merge(&existing, MergePolicy::KeepExisting).unwrap();

    let incoming = format_entry(50, "cargo fmt --all");
    for policy in [MergePolicy::KeepExisting, MergePolicy::Replace, MergePolicy::KeepBoth] {
        let outcome = merger.merge(&incoming, policy).unwrap();
        assert!(matches!(outcome, MergeOutcome::Committed(_)));
    }
}

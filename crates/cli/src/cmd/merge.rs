//! Merge command
//!
//! Folds an incoming document into the persisted store. Conflicts are
//! resolved by a document-level policy, or interactively one conflict at
//! a time. The store is only ever replaced atomically, with a timestamped
//! backup of its prior content.

use anyhow::{Context, Result, bail};
use clap::Args;
use hooksmith_core::{ConfigurationDocument, HookEntry};
use hooksmith_engine::{
    ConflictDecision, MergeConflict, MergeOutcome, MergePolicy, MergeResult, Merger,
    RealPathLookup,
};
use owo_colors::OwoColorize;
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Arguments for the merge command
#[derive(Debug, Args)]
pub struct MergeCommand {
    /// Path of the incoming document
    #[arg(value_name = "INCOMING")]
    pub incoming: PathBuf,

    /// Path of the persisted store (defaults to the user config dir)
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Resolution policy: keep-existing, replace, keep-both, interactive
    #[arg(long, default_value = "interactive")]
    pub policy: String,

    /// Report conflicts and the would-be result without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// When the existing store is corrupt, merge from the incoming
    /// document alone (the corrupt bytes are still backed up)
    #[arg(long)]
    pub start_fresh: bool,

    /// Skip the commit confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Run the merge command
pub fn run(cmd: &MergeCommand) -> Result<()> {
    let store_path = crate::resolve_store_path(cmd.store.as_deref())?;
    let policy: MergePolicy = cmd.policy.parse()?;

    let content = fs::read_to_string(&cmd.incoming)
        .with_context(|| format!("Failed to read {}", cmd.incoming.display()))?;
    let incoming = ConfigurationDocument::from_json_str(&content)
        .with_context(|| format!("Failed to parse {}", cmd.incoming.display()))?;

    tracing::debug!(
        incoming = %cmd.incoming.display(),
        store = %store_path.display(),
        policy = %policy,
        "starting merge"
    );

    let lookup = RealPathLookup;
    let merger = Merger::new(&store_path, &lookup).start_fresh(cmd.start_fresh);

    if cmd.dry_run {
        return dry_run(&merger, &incoming, policy);
    }

    let is_tty = std::io::stdin().is_terminal();
    if policy == MergePolicy::Interactive && !is_tty {
        bail!(
            "interactive policy needs a terminal; pass --policy keep-existing, replace, or keep-both"
        );
    }

    if !cmd.yes && is_tty {
        use dialoguer::{Confirm, theme::ColorfulTheme};

        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Merge {} entries into {}?",
                incoming.total_entries(),
                store_path.display()
            ))
            .default(true)
            .interact()
            .context("Failed to read user input")?;

        if !confirmed {
            bail!("merge aborted");
        }
    }

    match merger.merge(&incoming, policy)? {
        MergeOutcome::Committed(result) => {
            print_result(&result, &store_path);
            Ok(())
        }
        MergeOutcome::NeedsResolution(conflicts) => {
            let decisions = prompt_decisions(&conflicts)?;
            let result = merger.merge_resolved(&incoming, &decisions)?;
            print_result(&result, &store_path);
            Ok(())
        }
    }
}

/// Compute and report the merge without touching the store
fn dry_run(merger: &Merger<'_>, incoming: &ConfigurationDocument, policy: MergePolicy) -> Result<()> {
    let decision = policy.decision().unwrap_or(ConflictDecision::KeepExisting);
    let (document, applied, report) = merger.preview(incoming, |_| decision)?;

    println!("{}", "Dry run - nothing will be written.".bold());

    if applied.is_empty() {
        println!("No conflicts.");
    } else {
        println!("{} conflict(s):", applied.len());
        for item in &applied {
            if policy == MergePolicy::Interactive {
                println!("  {} (resolve interactively)", item.conflict);
            } else {
                println!("  {} → {}", item.conflict, item.decision.to_string().cyan());
            }
        }
    }

    for warning in &report.warnings {
        println!("{} {warning}", "warning:".yellow().bold());
    }
    for error in &report.errors {
        println!("{} {error}", "error:".red().bold());
    }

    if report.is_valid() {
        println!(
            "Result: {} entries across {} event(s)",
            document.total_entries(),
            document.events.len()
        );
    } else {
        println!(
            "{}",
            "The merge would abort: the result fails validation.".red()
        );
    }

    Ok(())
}

/// Ask the user to resolve each conflict in turn
fn prompt_decisions(conflicts: &[MergeConflict]) -> Result<Vec<ConflictDecision>> {
    use dialoguer::{Select, theme::ColorfulTheme};

    println!(
        "\n{} {} conflict(s) need resolution",
        "Conflicts:".yellow().bold(),
        conflicts.len()
    );

    let options = [
        "Keep existing - drop the incoming entry",
        "Replace - take the incoming entry",
        "Keep both - append the incoming entry",
        "Abort - leave the store untouched",
    ];
    let theme = ColorfulTheme::default();

    let mut decisions = Vec::with_capacity(conflicts.len());
    for (index, conflict) in conflicts.iter().enumerate() {
        println!(
            "\n{} {}",
            format!("[{}/{}]", index + 1, conflicts.len()).bold(),
            conflict
        );
        print_side("existing", &conflict.existing);
        print_side("incoming", &conflict.incoming);

        let selection = Select::with_theme(&theme)
            .with_prompt("Resolve conflict")
            .items(&options)
            .default(0)
            .interact()
            .context("Failed to read user input")?;

        match selection {
            0 => decisions.push(ConflictDecision::KeepExisting),
            1 => decisions.push(ConflictDecision::Replace),
            2 => decisions.push(ConflictDecision::KeepBoth),
            _ => bail!("merge aborted"),
        }
    }

    Ok(decisions)
}

fn print_side(label: &str, entry: &HookEntry) {
    let payload = entry
        .hooks
        .first()
        .map_or("(no actions)", |action| action.payload());
    println!(
        "  {}: priority {}, {}{}",
        label.bold(),
        entry.priority,
        payload.dimmed(),
        if entry.enabled { "" } else { " [disabled]" }
    );
}

fn print_result(result: &MergeResult, store_path: &std::path::Path) {
    for item in &result.applied {
        println!(
            "{} {} → {}",
            "conflict:".yellow(),
            item.conflict,
            item.decision.to_string().cyan()
        );
    }

    if let Some(backup) = &result.backup {
        println!("Backup: {}", backup.path.display().cyan());
    }

    println!(
        "{} {} entries across {} event(s) committed to {}",
        "Merged:".green().bold(),
        result.document.total_entries(),
        result.document.events.len(),
        store_path.display()
    );
}

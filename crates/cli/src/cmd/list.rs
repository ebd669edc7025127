//! List command
//!
//! Shows the entries in the persisted store, grouped by event, in simple
//! colored output, a table, or JSON.

use anyhow::{Context, Result, bail};
use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use hooksmith_core::{ConfigurationDocument, HookEntry, HookEvent};
use owo_colors::OwoColorize;
use std::fs;
use std::path::PathBuf;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Path of the persisted store (defaults to the user config dir)
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Output format (simple, table, json)
    #[arg(short, long, default_value = "simple")]
    pub format: String,

    /// Only show entries for one event
    #[arg(long, value_name = "EVENT")]
    pub event: Option<String>,
}

/// Run the list command
pub fn run(cmd: &ListCommand) -> Result<()> {
    let store_path = crate::resolve_store_path(cmd.store.as_deref())?;

    if !store_path.exists() {
        println!("{}", "No hook configuration found.".yellow());
        println!(
            "Create one with: hooksmith generate ... --out entry.json && hooksmith merge entry.json"
        );
        return Ok(());
    }

    let content = fs::read_to_string(&store_path)
        .with_context(|| format!("Failed to read {}", store_path.display()))?;
    let document = ConfigurationDocument::from_json_str(&content)
        .with_context(|| format!("Failed to parse {}", store_path.display()))?;

    let filter = cmd
        .event
        .as_deref()
        .map(str::parse::<HookEvent>)
        .transpose()?;
    let selected = selected_events(&document, filter);

    match cmd.format.as_str() {
        "json" => print_json(&selected)?,
        "table" => print_table(&selected),
        "simple" => print_simple(&store_path, &selected),
        other => bail!("Unknown format '{other}' (expected simple, table, or json)"),
    }

    Ok(())
}

/// The events to display, honoring the optional event filter
fn selected_events(
    document: &ConfigurationDocument,
    filter: Option<HookEvent>,
) -> Vec<(HookEvent, Vec<HookEntry>)> {
    document
        .events
        .iter()
        .filter(|(event, _)| filter.is_none_or(|wanted| **event == wanted))
        .map(|(event, entries)| (*event, entries.clone()))
        .collect()
}

fn print_json(selected: &[(HookEvent, Vec<HookEntry>)]) -> Result<()> {
    let value: serde_json::Map<String, serde_json::Value> = selected
        .iter()
        .map(|(event, entries)| {
            Ok((
                event.as_str().to_string(),
                serde_json::to_value(entries).map_err(hooksmith_core::Error::Serialize)?,
            ))
        })
        .collect::<Result<_>>()?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_table(selected: &[(HookEvent, Vec<HookEntry>)]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(["Event", "Matcher", "Description", "Priority", "Enabled", "Actions"]);

    for (event, entries) in selected {
        for entry in entries {
            let actions = entry
                .hooks
                .iter()
                .map(|action| format!("{}: {} ({}s)", action.kind(), action.payload(), action.timeout()))
                .collect::<Vec<_>>()
                .join("\n");
            table.add_row([
                event.as_str().to_string(),
                entry.matcher.clone().unwrap_or_else(|| "-".to_string()),
                entry.description.clone(),
                entry.priority.to_string(),
                entry.enabled.to_string(),
                actions,
            ]);
        }
    }

    println!("{table}");
}

fn print_simple(store_path: &std::path::Path, selected: &[(HookEvent, Vec<HookEntry>)]) {
    println!("Store: {}", store_path.display().cyan());

    let total: usize = selected.iter().map(|(_, entries)| entries.len()).sum();
    if total == 0 {
        println!("{}", "No entries.".yellow());
        return;
    }

    for (event, entries) in selected {
        if entries.is_empty() {
            continue;
        }
        println!("\n{} ({} entries)", event.to_string().bold(), entries.len());
        for entry in entries {
            let matcher = entry.matcher.as_deref().unwrap_or("-");
            if entry.enabled {
                println!(
                    "  • {} (matcher: {}, priority: {})",
                    entry.description.green(),
                    matcher,
                    entry.priority
                );
            } else {
                println!(
                    "  • {} (matcher: {}, priority: {}) {}",
                    entry.description.dimmed(),
                    matcher,
                    entry.priority,
                    "[disabled]".dimmed()
                );
            }
        }
    }
}

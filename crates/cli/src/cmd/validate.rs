//! Validate command
//!
//! Checks a document file against the hook schema and prints every
//! finding. Exit code 0 means the document is valid for persistence;
//! warnings alone never fail the command.

use anyhow::{Context, Result, bail};
use clap::Args;
use hooksmith_core::ConfigurationDocument;
use hooksmith_engine::{RealPathLookup, validate};
use owo_colors::OwoColorize;
use std::fs;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Path of the document to validate
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

/// Run the validate command
pub fn run(cmd: &ValidateCommand) -> Result<()> {
    let content = fs::read_to_string(&cmd.path)
        .with_context(|| format!("Failed to read {}", cmd.path.display()))?;
    let document = ConfigurationDocument::from_json_str(&content)
        .with_context(|| format!("Failed to parse {}", cmd.path.display()))?;

    let report = validate(&document, &RealPathLookup);

    for warning in &report.warnings {
        println!("{} {warning}", "warning:".yellow().bold());
    }
    for error in &report.errors {
        println!("{} {error}", "error:".red().bold());
    }

    if !report.is_valid() {
        bail!(
            "document failed validation with {} error(s)",
            report.errors.len()
        );
    }

    println!(
        "{} {} entries across {} event(s), {} warning(s)",
        "Valid:".green().bold(),
        document.total_entries(),
        document.events.len(),
        report.warnings.len()
    );

    Ok(())
}

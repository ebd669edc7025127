//! Hooksmith CLI library
//!
//! This library contains all the CLI logic for hooksmith, making it
//! reusable for testing and integration with other tools.

pub mod cmd;
pub mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Hooksmith - a pipeline for declarative automation-hook configuration
#[derive(Parser)]
#[command(name = "hooksmith")]
#[command(about = "Generate, validate, and merge automation-hook configuration")]
#[command(version)]
#[command(long_about = "Generate, validate, and merge automation-hook configuration

A small pipeline for declarative hook documents: build well-formed
entries from typed inputs, check them against the schema, and fold them
into a persisted store with conflict resolution, backups, and an atomic
commit.

Typical flow:
  • hooksmith generate --event after-tool-use --matcher Write \\
        --command 'cargo fmt --all' --out new-hook.json
  • hooksmith validate new-hook.json
  • hooksmith merge new-hook.json --store ~/.config/hooksmith/hooks.json")]
pub struct Cli {
    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "HOOKSMITH_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the hooksmith CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a single-entry hook document
    Generate(cmd::generate::GenerateCommand),

    /// Validate a configuration document
    Validate(cmd::validate::ValidateCommand),

    /// Merge an incoming document into the persisted store
    Merge(cmd::merge::MergeCommand),

    /// List entries in the persisted store
    List(cmd::list::ListCommand),
}

/// # Errors
///
/// Returns an error if:
/// - Logging initialization fails
/// - The requested command fails (invalid input, validation errors,
///   merge abort, or I/O failure)
pub fn run(cli: Cli) -> Result<()> {
    // Initialize logging based on verbosity
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Generate(generate_cmd) => cmd::generate::run(&generate_cmd),
        Commands::Validate(validate_cmd) => cmd::validate::run(&validate_cmd),
        Commands::Merge(merge_cmd) => cmd::merge::run(&merge_cmd),
        Commands::List(list_cmd) => cmd::list::run(&list_cmd),
    }
}

/// Resolve the store path: explicit flag, or the default location under
/// the user configuration directory
pub(crate) fn resolve_store_path(store: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = store {
        return Ok(path.to_path_buf());
    }

    dirs::config_dir()
        .map(|dir| dir.join("hooksmith").join("hooks.json"))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Could not determine the config directory. Please specify --store."
            )
        })
}

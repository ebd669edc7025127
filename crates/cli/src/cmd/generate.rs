//! Generate command
//!
//! Builds a single-entry document from flags (or a builtin template),
//! validates it, and prints it or writes it to a file. The output is a
//! complete document suitable for `hooksmith merge`.

use anyhow::{Context, Result, bail};
use clap::Args;
use hooksmith_core::{ConfigurationDocument, HookEvent};
use hooksmith_engine::{
    ActionSpec, GenerateRequest, RealPathLookup, builtin_templates, generate, template, validate,
};
use owo_colors::OwoColorize;
use std::fs;
use std::path::PathBuf;

/// Arguments for the generate command
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Trigger event (e.g. after-tool-use)
    #[arg(long, value_name = "EVENT")]
    pub event: Option<String>,

    /// Matcher pattern for matcher-capable events (e.g. "Write|Edit", "*")
    #[arg(long, value_name = "PATTERN")]
    pub matcher: Option<String>,

    /// Command-line payload
    #[arg(long, value_name = "CMD", conflicts_with = "prompt")]
    pub command: Option<String>,

    /// Prompt payload
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Entry description (derived from the payload when omitted)
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// Execution priority (lower runs first)
    #[arg(long, default_value_t = 100)]
    pub priority: i32,

    /// Command timeout in seconds (prompts use a fixed timeout)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u32>,

    /// Generate the entry disabled
    #[arg(long)]
    pub disabled: bool,

    /// Start from a builtin template; explicit flags override its fields
    #[arg(long, value_name = "KEY")]
    pub template: Option<String>,

    /// List builtin templates and exit
    #[arg(long)]
    pub templates: bool,

    /// Write the document to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Run the generate command
pub fn run(cmd: &GenerateCommand) -> Result<()> {
    if cmd.templates {
        print_templates();
        return Ok(());
    }

    let request = build_request(cmd)?;
    let event = request.event;
    let entry = generate(&request)?;
    let document = ConfigurationDocument::from_entry(event, entry);

    // Fail fast: check the output exactly as the merger will before commit
    let report = validate(&document, &RealPathLookup);
    for warning in &report.warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
    if !report.is_valid() {
        for error in &report.errors {
            eprintln!("{} {error}", "error:".red().bold());
        }
        bail!(
            "generated entry failed validation with {} error(s)",
            report.errors.len()
        );
    }

    let rendered = document.to_json_string()?;
    match &cmd.out {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "Wrote".green().bold(), path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Build the generation request from flags, starting from a template when
/// one was named
fn build_request(cmd: &GenerateCommand) -> Result<GenerateRequest> {
    let mut request = match &cmd.template {
        Some(key) => template(key)?,
        None => {
            let event_name = cmd
                .event
                .as_deref()
                .context("--event is required unless --template is given")?;
            let event: HookEvent = event_name.parse()?;
            // A placeholder action; the override block below fills it in
            GenerateRequest::new(event, ActionSpec::command(""))
        }
    };

    if let Some(event_name) = &cmd.event {
        request.event = event_name.parse()?;
    }
    if let Some(matcher) = &cmd.matcher {
        request.matcher = Some(matcher.clone());
    }
    match (&cmd.command, &cmd.prompt) {
        (Some(command), None) => request.action = ActionSpec::command(command),
        (None, Some(prompt)) => request.action = ActionSpec::prompt(prompt),
        (None, None) if cmd.template.is_none() => {
            bail!("one of --command or --prompt is required unless --template is given");
        }
        _ => {}
    }
    if let Some(timeout) = cmd.timeout {
        request.action.timeout = Some(timeout);
    }
    if let Some(description) = &cmd.description {
        request.description = Some(description.clone());
    }
    request.priority = cmd.priority;
    request.enabled = !cmd.disabled;

    Ok(request)
}

fn print_templates() {
    println!("{}", "Builtin templates:".bold());
    for t in builtin_templates() {
        let matcher = t.matcher.unwrap_or("-");
        println!(
            "  {} - {}\n    event: {}, matcher: {}, {}: {}",
            t.key.green(),
            t.summary,
            t.event.to_string().cyan(),
            matcher.cyan(),
            t.kind,
            t.payload.dimmed()
        );
    }
}

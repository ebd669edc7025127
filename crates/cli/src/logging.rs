//! Logging configuration for the hooksmith CLI
//!
//! Provides terminal output and optional file logging using tracing.

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging (and timestamps on stdout)
/// * `log_file` - Optional path to write logs to a file
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    // Allows overriding with the RUST_LOG env var
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "hooksmith={level},hooksmith_engine={level},hooksmith_core={level}"
        ))
    })?;

    let base = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false);

    // Timestamps only add noise in normal mode
    let stdout_layer = if verbose {
        base.compact().with_ansi(true).with_filter(env_filter).boxed()
    } else {
        base.without_time()
            .compact()
            .with_ansi(true)
            .with_filter(env_filter)
            .boxed()
    };

    let registry = tracing_subscriber::registry().with(stdout_layer);

    match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .with_filter(EnvFilter::try_new("debug")?);

            registry.with(file_layer).init();
        }
        None => registry.init(),
    }

    Ok(())
}

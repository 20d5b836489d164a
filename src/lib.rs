//! dupfunnel - duplicate file finder
//!
//! Finds files with identical content under one or more roots using a
//! three-stage funnel: files are grouped by size, then by a hash of their
//! first kilobyte, then by a hash of their full content. Each stage only
//! looks at files that still share a bucket with another file.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::CommandFactory;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::FileHasher;

/// Run the application, writing results to stdout.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, none of the given
/// paths exist, the scan is interrupted, or results cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let color = !cli.no_color && stdout.is_terminal();
    let mut out = stdout.lock();
    run_app_to(cli, &mut out, color)
}

/// Run the application, writing results to `out`.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_to<W: Write>(cli: Cli, out: &mut W, color: bool) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    if cli.print_config {
        write!(out, "{}", config.to_toml()?)?;
        return Ok(ExitCode::Success);
    }

    if cli.paths.is_empty() {
        writeln!(out, "{}", Cli::command().render_help())?;
        writeln!(out, "Pass the paths to check as arguments.")?;
        return Ok(ExitCode::Success);
    }

    let handler = signal::install_handler()?;

    let mut finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_walker_config(config.walker_config())
        .with_shutdown_flag(handler.get_flag());

    let show_progress = !cli.quiet && !cli.no_progress && cli.output == OutputFormat::Text;
    if show_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new()));
    }

    let hasher = FileHasher::new(config.hash.algorithm());
    let finder = DuplicateFinder::new(finder_config, hasher);
    let (set, summary) = finder.find_duplicates(&cli.paths)?;

    for err in &summary.errors {
        log::warn!("Skipped: {}", err);
    }

    let exit_code = if set.is_empty() {
        ExitCode::NoDuplicates
    } else if summary.has_errors() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    match cli.output {
        OutputFormat::Text => {
            let mut text = TextOutput::new(&set).with_color(color);
            if !cli.quiet {
                text = text.with_summary(&summary);
            }
            text.write_to(out).context("Failed to write results")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&config.hash.to_string(), &set, &summary, exit_code)
                .write_to(out, true)
                .context("Failed to write JSON results")?;
        }
    }

    Ok(exit_code)
}

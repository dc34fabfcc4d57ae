//! Slack Notify - posts a Slack message when a wrapped task finishes.
//!
//! Wrap a future, a closure, or (through the `slack-notify` binary) a whole
//! command; once it returns or fails, one message with the outcome and the
//! elapsed time is posted to the configured channel.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod message;
pub mod notifier;
pub mod outcome;
pub mod slack;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::error::AppError;

pub use crate::config::{Mention, NotificationConfig};
pub use crate::notifier::{Notified, Notifier};
pub use crate::outcome::ExecutionOutcome;

/// Runs the wrapped command described by the CLI and returns the exit code
/// the process should end with.
pub async fn run(cli: Cli) -> Result<i32> {
    setup_logging(cli.log_level())?;

    let notifier = build_notifier(&cli).context("Failed to configure Slack notifier")?;

    let (program, args) = cli
        .command
        .split_first()
        .context("No command given")?;
    let name = Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.clone());

    info!(command = %cli.command_line(), channel = %notifier.config().channel(), "Running command");

    match notifier.run(&name, command::execute(program, args)).await {
        Ok(()) => Ok(0),
        Err(e) => {
            debug!(error = %e, "Command failed");
            Ok(e.exit_code())
        }
    }
}

/// Assembles the notifier from the config file and flags.
fn build_notifier(cli: &Cli) -> Result<Notifier, AppError> {
    let file = cli.file_config()?;
    let config = NotificationConfig::from_file(&file)?;
    let notifier = Notifier::with_options(config, &file.client)?.with_command(cli.command_line());
    Ok(notifier)
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so the wrapped command keeps stdout to itself.
fn setup_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(())
}

//! Command-line interface definitions.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{loader, FileConfig};
use crate::error::ConfigError;

/// Runs a command and posts a Slack message when it finishes.
#[derive(Parser, Debug)]
#[command(name = "slack-notify", version, about, long_about = None)]
pub struct Cli {
    /// Path to a YAML configuration file.
    #[arg(short, long, env = "SLACK_NOTIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Channel to post to (e.g. '#general').
    #[arg(long)]
    pub channel: Option<String>,

    /// Mention to include: 'channel', 'here', or a user id. Repeatable.
    #[arg(short, long = "mention")]
    pub mentions: Vec<String>,

    /// Bot token. Defaults to the SLACK_API_TOKEN environment variable.
    #[arg(long)]
    pub token: Option<String>,

    /// Base URL of the Slack Web API.
    #[arg(long)]
    pub api_base: Option<String>,

    /// HTTP request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Command to run, followed by its arguments.
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

impl Cli {
    /// Returns the log level based on verbosity flags.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Loads the config file, if any, and applies the flags on top.
    pub fn file_config(&self) -> Result<FileConfig, ConfigError> {
        let mut file = match &self.config {
            Some(path) => loader::load_from_path(path)?,
            None => FileConfig::default(),
        };

        if let Some(channel) = &self.channel {
            file.channel = Some(channel.clone());
        }
        if !self.mentions.is_empty() {
            file.mentions = self.mentions.clone();
        }
        if let Some(token) = &self.token {
            file.token = Some(token.clone());
        }
        if let Some(api_base) = &self.api_base {
            file.client.api_base = api_base.clone();
        }
        if let Some(timeout) = self.timeout {
            file.client.timeout_seconds = timeout;
        }

        Ok(file)
    }

    /// The command line as it is shown in the message.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

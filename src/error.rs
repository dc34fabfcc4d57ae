//! Error types for the Slack notifier.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Mention '{mention}' is not valid. Only 'channel', 'here', or a user id ('U...') is acceptable"
    )]
    InvalidMention { mention: String },

    #[error("Channel must not be empty")]
    EmptyChannel,

    #[error("Failed to read config file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {message}")]
    ParseFailed { path: PathBuf, message: String },
}

/// Notification sending errors.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("No Slack token given and {var} is not set")]
    MissingCredential { var: &'static str },

    #[error("Slack rejected the credential: {0}")]
    Authentication(String),

    #[error("Slack API returned an error: {0}")]
    SlackApi(String),

    #[error("Slack API responded with HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors from running a wrapped child command.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to start '{program}': {message}")]
    SpawnFailed { program: String, message: String },

    #[error("'{program}' exited with code {code}")]
    ExitedWithCode { program: String, code: i32 },

    #[error("'{program}' was terminated by signal {signal}")]
    Signaled { program: String, signal: i32 },
}

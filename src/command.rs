//! Child process execution for the `slack-notify` binary.

use tokio::process::Command;
use tracing::debug;

use crate::error::CommandError;

/// Exit code used when the command could not be started.
pub const SPAWN_FAILED_CODE: i32 = 127;

/// Runs `program` with `args`, inheriting stdio, and waits for it.
///
/// A non-zero exit or a termination by signal is an error.
pub async fn execute(program: &str, args: &[String]) -> Result<(), CommandError> {
    let mut cmd = Command::new(program);
    cmd.args(args);

    debug!(cmd = ?cmd, "Running wrapped command");

    let status = cmd
        .status()
        .await
        .map_err(|e| CommandError::SpawnFailed {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    if status.success() {
        return Ok(());
    }

    match status.code() {
        Some(code) => Err(CommandError::ExitedWithCode {
            program: program.to_string(),
            code,
        }),
        None => Err(CommandError::Signaled {
            program: program.to_string(),
            signal: terminating_signal(&status),
        }),
    }
}

#[cfg(unix)]
fn terminating_signal(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().unwrap_or(0)
}

#[cfg(not(unix))]
fn terminating_signal(_status: &std::process::ExitStatus) -> i32 {
    0
}

impl CommandError {
    /// Exit code the wrapper should exit with, shell-style.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::SpawnFailed { .. } => SPAWN_FAILED_CODE,
            CommandError::ExitedWithCode { code, .. } => *code,
            CommandError::Signaled { signal, .. } => 128 + signal,
        }
    }
}

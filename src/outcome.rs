//! Timing and result of one wrapped execution.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// What happened during one run of a wrapped function.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Wall-clock time the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time the run finished.
    pub finished_at: DateTime<Utc>,
    /// Monotonic time spent in the run.
    pub elapsed: Duration,
    /// Description of the failure, if the run failed.
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// Whether the run returned normally.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Start marker for a run in progress.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started_at: DateTime<Utc>,
    started: Instant,
}

impl Stopwatch {
    /// Records the start time.
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Records the end time and produces the outcome.
    pub fn finish(self, error: Option<String>) -> ExecutionOutcome {
        let elapsed = self.started.elapsed();
        ExecutionOutcome {
            started_at: self.started_at,
            finished_at: Utc::now().max(self.started_at),
            elapsed,
            error,
        }
    }
}

/// Formats a duration as `H:MM:SS.mmm`, with a leading day count when the
/// duration spans one or more days.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let clock = format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

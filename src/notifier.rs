//! Wraps work so that a Slack message reports how it ended.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, error, info};

use crate::config::{ClientOptions, NotificationConfig};
use crate::error::NotificationError;
use crate::message::{compose, RunContext};
use crate::outcome::{ExecutionOutcome, Stopwatch};
use crate::slack::{MessageSender, SlackClient};

/// Sends one Slack message per wrapped run, after the run finishes.
///
/// The wrapped result is always handed back untouched. If the message
/// cannot be sent, the failure is logged and the run's own result wins.
///
/// ```no_run
/// # async fn example() -> anyhow::Result<()> {
/// use slack_notify::{NotificationConfig, Notifier};
///
/// let config = NotificationConfig::new("#general")?.with_mention("channel")?;
/// let notifier = Notifier::new(config)?;
///
/// let answer = notifier
///     .run("main", async { Ok::<_, std::io::Error>(42) })
///     .await?;
/// assert_eq!(answer, 42);
/// # Ok(())
/// # }
/// ```
pub struct Notifier<S = SlackClient> {
    /// Destination and credential settings.
    config: NotificationConfig,
    /// Transport for the message.
    sender: S,
    /// Command line shown in the message.
    command: String,
    /// Host name shown in the message footer.
    host: String,
}

impl Notifier<SlackClient> {
    /// Creates a notifier posting to the public Slack API.
    pub fn new(config: NotificationConfig) -> Result<Self, NotificationError> {
        Self::with_options(config, &ClientOptions::default())
    }

    /// Creates a notifier with custom HTTP client options.
    pub fn with_options(
        config: NotificationConfig,
        options: &ClientOptions,
    ) -> Result<Self, NotificationError> {
        Ok(Self::with_sender(config, SlackClient::new(options)?))
    }
}

impl<S: MessageSender> Notifier<S> {
    /// Creates a notifier delivering through `sender`.
    pub fn with_sender(config: NotificationConfig, sender: S) -> Self {
        Self {
            config,
            sender,
            command: current_command(),
            host: hostname(),
        }
    }

    /// Overrides the command line reported in messages.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Notification settings in use.
    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Awaits `work`, reports its outcome, and returns its result.
    pub async fn run<T, E, Fut>(&self, function: &str, work: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let watch = Stopwatch::start();
        let result = work.await;
        let error = result.as_ref().err().map(describe_error);
        self.report(function, &watch.finish(error)).await;
        result
    }

    /// Calls `work` inline, reports its outcome, and returns its result.
    ///
    /// A panic in `work` is reported as a failure and then resumed.
    pub async fn run_fn<T, E, F>(&self, function: &str, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        let watch = Stopwatch::start();
        match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(result) => {
                let error = result.as_ref().err().map(describe_error);
                self.report(function, &watch.finish(error)).await;
                result
            }
            Err(payload) => {
                let error = format!("panic: {}", panic_message(payload.as_ref()));
                self.report(function, &watch.finish(Some(error))).await;
                panic::resume_unwind(payload)
            }
        }
    }

    /// Wraps `f` so every call through [`Notified::call`] is reported.
    pub fn wrap<F>(&self, function: impl Into<String>, f: F) -> Notified<'_, S, F> {
        Notified {
            notifier: self,
            function: function.into(),
            f,
        }
    }

    /// Posts the message for `outcome`, returning any delivery error.
    pub async fn send(
        &self,
        function: &str,
        outcome: &ExecutionOutcome,
    ) -> Result<(), NotificationError> {
        let token = self.config.resolve_token()?;
        let context = RunContext {
            function: function.to_string(),
            command: self.command.clone(),
            host: self.host.clone(),
        };
        let message = compose(&self.config, &context, outcome);
        self.sender.post_message(&token, &message).await
    }

    /// Sends the message and logs, rather than returns, a delivery failure.
    async fn report(&self, function: &str, outcome: &ExecutionOutcome) {
        let elapsed_ms = outcome.elapsed.as_millis() as u64;
        if outcome.succeeded() {
            info!(function, elapsed_ms, "Execution succeeded");
        } else {
            info!(function, elapsed_ms, error = ?outcome.error, "Execution failed");
        }

        match self.send(function, outcome).await {
            Ok(()) => debug!(function, channel = %self.config.channel(), "Notification delivered"),
            Err(e) => error!(
                function,
                channel = %self.config.channel(),
                error = %e,
                "Could not send a notification"
            ),
        }
    }
}

/// A function bound to a [`Notifier`], taking the same argument.
pub struct Notified<'a, S, F> {
    notifier: &'a Notifier<S>,
    function: String,
    f: F,
}

impl<'a, S: MessageSender, F> Notified<'a, S, F> {
    /// Calls the wrapped function with `args` and reports the outcome.
    pub async fn call<A, T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.notifier.run(&self.function, (self.f)(args)).await
    }

    /// Name reported for this function.
    pub fn name(&self) -> &str {
        &self.function
    }
}

/// The error's message. The alternate form carries the cause chain for
/// errors that render one there (`anyhow::Error` joins it with `: `).
fn describe_error<E: Display>(err: &E) -> String {
    format!("{:#}", err)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Program name followed by its arguments.
fn current_command() -> String {
    let mut args = std::env::args_os().map(|a| a.to_string_lossy().to_string());
    let program = match args.next() {
        Some(path) => match Path::new(&path).file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => path.clone(),
        },
        None => String::new(),
    };

    std::iter::once(program)
        .chain(args)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best-effort host name for the message footer.
fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

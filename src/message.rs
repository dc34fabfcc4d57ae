//! Slack `chat.postMessage` payload construction.

use serde::Serialize;

use crate::config::NotificationConfig;
use crate::outcome::{format_elapsed, ExecutionOutcome};

/// Attachment color for successful runs.
const SUCCESS_COLOR: &str = "#36a64f";
/// Attachment color for failed runs.
const FAILURE_COLOR: &str = "#cf0301";

/// Slack caps section text at 3000 characters; leave room for the markup.
const MAX_SECTION_BODY_LEN: usize = 2900;

/// Body of a `chat.postMessage` request.
#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage {
    pub channel: String,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// Colored attachment holding the detail blocks.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub fallback: String,
    pub color: String,
    pub blocks: Vec<Block>,
}

/// Block Kit layout block.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Section { text: TextObject },
    Divider,
    Context { elements: Vec<TextObject> },
}

/// `mrkdwn` text object.
#[derive(Debug, Clone, Serialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    kind: &'static str,
    pub text: String,
}

impl TextObject {
    fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: "mrkdwn",
            text: text.into(),
        }
    }
}

impl Block {
    fn section(text: impl Into<String>) -> Self {
        Block::Section {
            text: TextObject::mrkdwn(text),
        }
    }
}

/// Where and what ran, shown in the message details.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Name of the wrapped function.
    pub function: String,
    /// Command line of the process (or child command).
    pub command: String,
    /// Host the run happened on.
    pub host: String,
}

/// Builds the message describing `outcome`.
pub fn compose(
    config: &NotificationConfig,
    context: &RunContext,
    outcome: &ExecutionOutcome,
) -> SlackMessage {
    let headline = if outcome.succeeded() {
        "Execution succeeded!"
    } else {
        "Execution failed!"
    };

    let prefix = config
        .mentions()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    let text = if prefix.is_empty() {
        format!("*{}* (at function `{}`)", headline, context.function)
    } else {
        format!("{} *{}* (at function `{}`)", prefix, headline, context.function)
    };

    let mut blocks = vec![
        Block::section(format!(
            "*Command*```{}```",
            truncate(&context.command, MAX_SECTION_BODY_LEN)
        )),
        Block::section(format!("*Time elapsed*\n{}", format_elapsed(outcome.elapsed))),
    ];

    if let Some(error) = &outcome.error {
        blocks.push(Block::section(format!(
            "*Error message*\n```{}```",
            truncate(error, MAX_SECTION_BODY_LEN)
        )));
    }

    blocks.push(Block::Divider);
    blocks.push(Block::Context {
        elements: vec![TextObject::mrkdwn(format!(
            "Sent from *slack-notify* at {}",
            context.host
        ))],
    });

    SlackMessage {
        channel: config.channel().to_string(),
        text,
        attachments: vec![Attachment {
            fallback: "Details about the execution results.".to_string(),
            color: if outcome.succeeded() {
                SUCCESS_COLOR
            } else {
                FAILURE_COLOR
            }
            .to_string(),
            blocks,
        }],
    }
}

/// Truncates a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Stopwatch;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn context() -> RunContext {
        RunContext {
            function: "main".into(),
            command: "python train.py --epochs 10".into(),
            host: "gpu-box".into(),
        }
    }

    fn outcome(error: Option<&str>) -> ExecutionOutcome {
        let mut outcome = Stopwatch::start().finish(error.map(String::from));
        outcome.elapsed = Duration::from_millis(61_250);
        outcome
    }

    #[test]
    fn success_message_layout() {
        let config = NotificationConfig::new("#general").unwrap();
        let message = compose(&config, &context(), &outcome(None));
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["channel"], "#general");
        assert_eq!(value["text"], "*Execution succeeded!* (at function `main`)");

        let attachment = &value["attachments"][0];
        assert_eq!(attachment["color"], "#36a64f");
        assert_eq!(attachment["fallback"], "Details about the execution results.");

        let blocks = attachment["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(
            blocks[0],
            json!({"type": "section", "text": {"type": "mrkdwn", "text": "*Command*```python train.py --epochs 10```"}})
        );
        assert_eq!(blocks[1]["text"]["text"], "*Time elapsed*\n0:01:01.250");
        assert_eq!(blocks[2], json!({"type": "divider"}));
        assert_eq!(blocks[3]["type"], "context");
        assert_eq!(
            blocks[3]["elements"][0]["text"],
            "Sent from *slack-notify* at gpu-box"
        );
    }

    #[test]
    fn failure_message_includes_error_block() {
        let config = NotificationConfig::new("#general").unwrap();
        let message = compose(&config, &context(), &outcome(Some("IoError: disk full")));
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["text"], "*Execution failed!* (at function `main`)");
        let attachment = &value["attachments"][0];
        assert_eq!(attachment["color"], "#cf0301");

        let blocks = attachment["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 5);
        assert_eq!(
            blocks[2]["text"]["text"],
            "*Error message*\n```IoError: disk full```"
        );
        assert_eq!(blocks[3]["type"], "divider");
    }

    #[test]
    fn mentions_prefix_the_text() {
        let config = NotificationConfig::new("#general")
            .unwrap()
            .with_mentions(["channel", "U0AB12"])
            .unwrap();
        let message = compose(&config, &context(), &outcome(None));
        assert_eq!(
            message.text,
            "<!channel> <@U0AB12> *Execution succeeded!* (at function `main`)"
        );
    }

    #[test]
    fn no_mentions_means_no_markup() {
        let config = NotificationConfig::new("#general").unwrap();
        let message = compose(&config, &context(), &outcome(Some("x")));
        assert!(!message.text.contains("<!"));
        assert!(!message.text.contains("<@"));
    }

    #[test]
    fn long_errors_are_truncated() {
        let config = NotificationConfig::new("#general").unwrap();
        let long = "é".repeat(5000);
        let message = compose(&config, &context(), &outcome(Some(long.as_str())));
        let value: Value = serde_json::to_value(&message).unwrap();
        let text = value["attachments"][0]["blocks"][2]["text"]["text"]
            .as_str()
            .unwrap();
        assert!(text.chars().count() <= 3000);
        assert!(text.ends_with("...```"));
    }

    #[test]
    fn long_commands_are_truncated() {
        let config = NotificationConfig::new("#general").unwrap();
        let context = RunContext {
            command: format!("python train.py {}", "--flag ".repeat(600)),
            ..context()
        };
        let message = compose(&config, &context, &outcome(None));
        let value: Value = serde_json::to_value(&message).unwrap();
        let text = value["attachments"][0]["blocks"][0]["text"]["text"]
            .as_str()
            .unwrap();
        assert!(text.chars().count() <= 3000);
        assert!(text.starts_with("*Command*```python train.py --flag"));
        assert!(text.ends_with("...```"));
    }
}

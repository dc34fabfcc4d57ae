//! Slack Web API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::config::ClientOptions;
use crate::error::NotificationError;
use crate::message::SlackMessage;

/// Slack error codes that mean the token itself was refused.
const AUTH_ERRORS: &[&str] = &[
    "not_authed",
    "invalid_auth",
    "account_inactive",
    "token_revoked",
    "token_expired",
];

/// Something that can deliver a message to Slack.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Posts `message` authenticated with `token`.
    async fn post_message(&self, token: &str, message: &SlackMessage)
        -> Result<(), NotificationError>;
}

/// Posts messages through `chat.postMessage`.
pub struct SlackClient {
    /// Full URL of the `chat.postMessage` method.
    endpoint: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl SlackClient {
    /// Creates a client from the given options.
    pub fn new(options: &ClientOptions) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self {
            endpoint: format!("{}/chat.postMessage", options.api_base.trim_end_matches('/')),
            client,
        })
    }

    /// URL messages are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MessageSender for SlackClient {
    async fn post_message(
        &self,
        token: &str,
        message: &SlackMessage,
    ) -> Result<(), NotificationError> {
        debug!(channel = %message.channel, "Sending a notification to Slack");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(message)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Slack API request failed");
            return Err(NotificationError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: ApiResponse = response.json().await?;
        body.into_result()?;

        info!(channel = %message.channel, "Slack notification sent");
        Ok(())
    }
}

/// Envelope every Web API method responds with.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warning: Option<String>,
}

impl ApiResponse {
    fn into_result(self) -> Result<(), NotificationError> {
        if let Some(warning) = &self.warning {
            warn!(warning = %warning, "Slack API returned a warning");
        }

        if self.ok {
            return Ok(());
        }

        let code = self.error.unwrap_or_else(|| "unknown_error".to_string());
        if AUTH_ERRORS.contains(&code.as_str()) {
            Err(NotificationError::Authentication(code))
        } else {
            Err(NotificationError::SlackApi(code))
        }
    }
}

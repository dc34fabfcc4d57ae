//! Configuration data structures.

use serde::{Deserialize, Serialize};

/// Default base URL of the Slack Web API.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Root structure of the optional YAML config file.
///
/// Every field may be omitted; command-line flags fill in or override
/// whatever the file leaves out.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Channel the message is posted to (e.g. `#general` or a channel id).
    #[serde(default)]
    pub channel: Option<String>,

    /// Who to ping: `channel`, `here`, or user ids (`U...`).
    #[serde(default)]
    pub mentions: Vec<String>,

    /// Bot token. Falls back to `SLACK_API_TOKEN` when absent.
    #[serde(default)]
    pub token: Option<String>,

    /// HTTP client settings.
    #[serde(flatten)]
    pub client: ClientOptions,
}

/// Settings for the HTTP client talking to Slack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientOptions {
    /// Base URL of the Web API, without trailing slash.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

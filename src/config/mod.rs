//! Notification settings: destination channel, mentions, and credential.

pub mod loader;
pub mod model;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ConfigError, NotificationError};
pub use model::{ClientOptions, FileConfig};

/// Environment variable holding the default bot token.
pub const TOKEN_ENV_VAR: &str = "SLACK_API_TOKEN";

/// A Slack mention that pings a channel, the active members, or one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mention {
    /// `@channel`: everyone in the channel.
    Channel,
    /// `@here`: active members of the channel.
    Here,
    /// A user by id (`U...`).
    User(String),
}

fn mention_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(channel|here|U[0-9A-Z]+)$").expect("valid regex"))
}

impl FromStr for Mention {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !mention_pattern().is_match(s) {
            return Err(ConfigError::InvalidMention {
                mention: s.to_string(),
            });
        }

        Ok(match s {
            "channel" => Mention::Channel,
            "here" => Mention::Here,
            user => Mention::User(user.to_string()),
        })
    }
}

impl fmt::Display for Mention {
    /// Renders the mention in Slack's message markup.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mention::Channel => write!(f, "<!channel>"),
            Mention::Here => write!(f, "<!here>"),
            Mention::User(id) => write!(f, "<@{}>", id),
        }
    }
}

/// Reads an environment variable.
pub(crate) type EnvLookup = fn(&str) -> Option<String>;

fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Where a notification goes, who it pings, and which token sends it.
#[derive(Clone)]
pub struct NotificationConfig {
    channel: String,
    mentions: Vec<Mention>,
    token: Option<String>,
    env: EnvLookup,
}

impl NotificationConfig {
    /// Creates a config for `channel` with no mentions and the token taken
    /// from the environment.
    pub fn new(channel: impl Into<String>) -> Result<Self, ConfigError> {
        let channel = channel.into();
        if channel.trim().is_empty() {
            return Err(ConfigError::EmptyChannel);
        }

        Ok(Self {
            channel,
            mentions: Vec::new(),
            token: None,
            env: process_env,
        })
    }

    /// Adds one mention, validating it.
    pub fn with_mention(mut self, mention: &str) -> Result<Self, ConfigError> {
        self.mentions.push(mention.parse()?);
        Ok(self)
    }

    /// Adds several mentions, failing on the first invalid one.
    pub fn with_mentions<I, S>(mut self, mentions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for mention in mentions {
            self.mentions.push(mention.as_ref().parse()?);
        }
        Ok(self)
    }

    /// Sets an explicit token that takes precedence over the environment.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Builds a config from a parsed config file.
    pub fn from_file(file: &FileConfig) -> Result<Self, ConfigError> {
        let channel = file.channel.clone().ok_or(ConfigError::EmptyChannel)?;
        let mut config = Self::new(channel)?.with_mentions(&file.mentions)?;
        config.token = file.token.clone();
        Ok(config)
    }

    /// Destination channel.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Configured mentions, in order.
    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    /// Resolves the token to send with: the explicit one, else the
    /// environment variable as it is right now.
    pub fn resolve_token(&self) -> Result<String, NotificationError> {
        resolve_token_with(self.token.as_deref(), self.env)
    }

    /// Replaces the environment the token fallback is read from.
    #[cfg(test)]
    pub(crate) fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("channel", &self.channel)
            .field("mentions", &self.mentions)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Token resolution with an injectable environment lookup.
pub(crate) fn resolve_token_with<F>(explicit: Option<&str>, lookup: F) -> Result<String, NotificationError>
where
    F: FnOnce(&str) -> Option<String>,
{
    if let Some(token) = explicit {
        return Ok(token.to_string());
    }

    lookup(TOKEN_ENV_VAR)
        .filter(|token| !token.is_empty())
        .ok_or(NotificationError::MissingCredential { var: TOKEN_ENV_VAR })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_mentions() {
        assert_eq!("channel".parse::<Mention>().unwrap(), Mention::Channel);
        assert_eq!("here".parse::<Mention>().unwrap(), Mention::Here);
        assert_eq!(
            "U012AB3CD".parse::<Mention>().unwrap(),
            Mention::User("U012AB3CD".to_string())
        );
    }

    #[test]
    fn rejects_invalid_mentions() {
        for bad in ["everyone", "u123", "U", "channelx", "@here", ""] {
            let err = bad.parse::<Mention>().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidMention { ref mention } if mention == bad),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn renders_slack_markup() {
        assert_eq!(Mention::Channel.to_string(), "<!channel>");
        assert_eq!(Mention::Here.to_string(), "<!here>");
        assert_eq!(Mention::User("U1".into()).to_string(), "<@U1>");
    }

    #[test]
    fn empty_channel_is_rejected() {
        assert!(matches!(
            NotificationConfig::new("  "),
            Err(ConfigError::EmptyChannel)
        ));
    }

    #[test]
    fn builder_collects_mentions_in_order() {
        let config = NotificationConfig::new("#general")
            .unwrap()
            .with_mention("here")
            .unwrap()
            .with_mentions(["U1", "channel"])
            .unwrap();
        assert_eq!(config.channel(), "#general");
        assert_eq!(
            config.mentions(),
            &[Mention::Here, Mention::User("U1".into()), Mention::Channel]
        );
    }

    #[test]
    fn explicit_token_wins_over_environment() {
        let token = resolve_token_with(Some("xoxb-explicit"), |_| Some("xoxb-env".into())).unwrap();
        assert_eq!(token, "xoxb-explicit");
    }

    #[test]
    fn environment_token_used_when_none_given() {
        let token = resolve_token_with(None, |var| {
            assert_eq!(var, "SLACK_API_TOKEN");
            Some("xoxb-env".into())
        })
        .unwrap();
        assert_eq!(token, "xoxb-env");
    }

    #[test]
    fn missing_token_is_missing_credential() {
        let err = resolve_token_with(None, |_| None).unwrap_err();
        assert!(matches!(
            err,
            NotificationError::MissingCredential { var: "SLACK_API_TOKEN" }
        ));

        let err = resolve_token_with(None, |_| Some(String::new())).unwrap_err();
        assert!(matches!(err, NotificationError::MissingCredential { .. }));
    }

    #[test]
    fn from_file_requires_channel() {
        let file = FileConfig::default();
        assert!(matches!(
            NotificationConfig::from_file(&file),
            Err(ConfigError::EmptyChannel)
        ));
    }

    #[test]
    fn from_file_carries_token_and_mentions() {
        let file = FileConfig {
            channel: Some("#ml".into()),
            mentions: vec!["channel".into()],
            token: Some("xoxb-file".into()),
            ..FileConfig::default()
        };
        let config = NotificationConfig::from_file(&file).unwrap();
        assert_eq!(config.mentions(), &[Mention::Channel]);
        assert_eq!(config.resolve_token().unwrap(), "xoxb-file");
    }

    #[test]
    fn config_falls_back_to_environment() {
        let config = NotificationConfig::new("#ml")
            .unwrap()
            .with_env(|var| (var == "SLACK_API_TOKEN").then(|| "xoxb-env".to_string()));
        assert_eq!(config.resolve_token().unwrap(), "xoxb-env");

        let config = config.with_token("xoxb-explicit");
        assert_eq!(config.resolve_token().unwrap(), "xoxb-explicit");

        let config = NotificationConfig::new("#ml").unwrap().with_env(|_| None);
        assert!(matches!(
            config.resolve_token(),
            Err(NotificationError::MissingCredential { .. })
        ));
    }
}

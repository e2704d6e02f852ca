//! Configuration, read from the environment at startup.

use crate::error::ConfigError;

/// Bot configuration.
///
/// Both values are required; the process refuses to start without them.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token.
    pub bot_token: String,
    /// Chat id that receives every completed application.
    pub admin_chat_id: i64,
}

impl BotConfig {
    /// Load configuration from `BOT_TOKEN` and `ADMIN_CHAT_ID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup("BOT_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("BOT_TOKEN".into()))?;

        let admin_raw =
            lookup("ADMIN_CHAT_ID").ok_or_else(|| ConfigError::MissingEnvVar("ADMIN_CHAT_ID".into()))?;
        let admin_chat_id = admin_raw
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "ADMIN_CHAT_ID".into(),
                message: e.to_string(),
            })?;

        Ok(Self {
            bot_token,
            admin_chat_id,
        })
    }
}

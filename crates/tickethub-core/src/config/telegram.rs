//! Telegram bot configuration.

use serde::{Deserialize, Serialize};

/// Telegram bot integration configuration.
///
/// When `bot_token` is empty the bot integration is disabled entirely:
/// no polling, no notifications, and the dev login endpoint is enabled
/// instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. Empty disables the integration (dev mode).
    #[serde(default)]
    pub bot_token: String,
    /// Bot username, used to build `t.me/<bot>?start=<token>` links.
    #[serde(default)]
    pub bot_username: String,
    /// Telegram user ID of the designated administrator.
    #[serde(default)]
    pub admin_telegram_id: i64,
    /// Bot API base URL (overridable for tests).
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Long-poll timeout in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,
    /// Backoff after a failed poll, in seconds.
    #[serde(default = "default_poll_backoff")]
    pub poll_backoff_seconds: u64,
}

impl TelegramConfig {
    /// Whether the bot integration is enabled.
    pub fn enabled(&self) -> bool {
        !self.bot_token.is_empty()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            bot_username: String::new(),
            admin_telegram_id: 0,
            api_base: default_api_base(),
            poll_timeout_seconds: default_poll_timeout(),
            poll_backoff_seconds: default_poll_backoff(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    25
}

fn default_poll_backoff() -> u64 {
    3
}

//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the background worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Hours between full avatar refresh sweeps.
    #[serde(default = "default_avatar_refresh_hours")]
    pub avatar_refresh_hours: u32,
    /// Delay between per-user Telegram calls during the avatar sweep,
    /// in milliseconds. Keeps the Bot API rate limiter happy.
    #[serde(default = "default_avatar_refresh_delay")]
    pub avatar_refresh_delay_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            avatar_refresh_hours: default_avatar_refresh_hours(),
            avatar_refresh_delay_ms: default_avatar_refresh_delay(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_avatar_refresh_hours() -> u32 {
    6
}

fn default_avatar_refresh_delay() -> u64 {
    100
}

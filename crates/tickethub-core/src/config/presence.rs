//! Presence and typing tracker configuration.

use serde::{Deserialize, Serialize};

/// Presence/typing tracker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Seconds after which a presence entry is excluded from "online"
    /// listings (the liveness threshold).
    #[serde(default = "default_online_timeout")]
    pub online_timeout_seconds: u64,
    /// Seconds after which a presence entry is purged from the registry
    /// entirely (the hard threshold).
    #[serde(default = "default_purge_timeout")]
    pub purge_timeout_seconds: u64,
    /// Seconds after which a typing entry is no longer reported.
    #[serde(default = "default_typing_timeout")]
    pub typing_timeout_seconds: u64,
    /// Interval of the cleanup-and-broadcast sweep, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Minutes between Telegram profile refreshes for one user.
    #[serde(default = "default_profile_cooldown")]
    pub profile_refresh_cooldown_minutes: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            online_timeout_seconds: default_online_timeout(),
            purge_timeout_seconds: default_purge_timeout(),
            typing_timeout_seconds: default_typing_timeout(),
            sweep_interval_seconds: default_sweep_interval(),
            profile_refresh_cooldown_minutes: default_profile_cooldown(),
        }
    }
}

fn default_online_timeout() -> u64 {
    60
}

fn default_purge_timeout() -> u64 {
    120
}

fn default_typing_timeout() -> u64 {
    4
}

fn default_sweep_interval() -> u64 {
    10
}

fn default_profile_cooldown() -> u64 {
    30
}

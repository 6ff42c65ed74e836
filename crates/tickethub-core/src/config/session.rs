//! Session and login-token configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Days a session stays valid after creation.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Minutes a deep-link login token stays valid.
    #[serde(default = "default_login_token_ttl")]
    pub login_token_ttl_minutes: u32,
    /// Interval between cleanup sweeps, in minutes.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            login_token_ttl_minutes: default_login_token_ttl(),
            cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

fn default_retention_days() -> u32 {
    30
}

fn default_login_token_ttl() -> u32 {
    10
}

fn default_cleanup_interval() -> u32 {
    5
}

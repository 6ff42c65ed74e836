//! HTTP server configuration.

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public site URL (used in bot links and notification buttons).
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

impl ServerConfig {
    /// Whether the public site URL is served over HTTPS.
    ///
    /// Telegram only allows WebApp buttons for HTTPS URLs; plain-URL
    /// buttons are used otherwise.
    pub fn site_is_https(&self) -> bool {
        self.site_url.starts_with("https://")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            site_url: default_site_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

//! File upload configuration.

use serde::{Deserialize, Serialize};

/// File upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory where uploaded files and avatars are stored.
    #[serde(default = "default_dir")]
    pub dir: String,
    /// Maximum size of a single uploaded file, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Maximum number of files per message.
    #[serde(default = "default_max_files")]
    pub max_files_per_message: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            max_file_size_bytes: default_max_file_size(),
            max_files_per_message: default_max_files(),
        }
    }
}

fn default_dir() -> String {
    "uploads".to_string()
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

fn default_max_files() -> usize {
    10
}

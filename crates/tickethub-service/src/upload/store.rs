//! Upload storage — random-named files under the uploads directory.

use std::path::PathBuf;

use rand::Rng;
use tracing::warn;

use tickethub_core::config::UploadsConfig;
use tickethub_core::error::AppError;
use tickethub_core::result::AppResult;

use super::validate::{extension_of, validate_and_detect};

/// A file that has been validated and written to disk.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Stored filename (random hex + original extension).
    pub filename: String,
    /// Original filename as uploaded.
    pub original_name: String,
    /// Detected MIME type.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size: i64,
}

/// Writes validated uploads into the uploads directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_size: u64,
}

impl UploadStore {
    /// Create a store over the configured uploads directory.
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            max_size: config.max_file_size_bytes,
        }
    }

    /// The directory uploads are stored in.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Validate and persist one upload.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> AppResult<StoredUpload> {
        if bytes.len() as u64 > self.max_size {
            return Err(AppError::validation("File too large"));
        }

        let mime_type = validate_and_detect(original_name, bytes)?;

        let ext = extension_of(original_name)
            .ok_or_else(|| AppError::validation("File has no extension"))?;
        let mut random = [0u8; 16];
        rand::rng().fill_bytes(&mut random);
        let filename = format!("{}.{ext}", hex::encode(random));

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&filename), bytes).await?;

        Ok(StoredUpload {
            filename,
            original_name: original_name.to_string(),
            mime_type,
            size: bytes.len() as i64,
        })
    }

    /// Remove a stored file, tolerating one that is already gone.
    /// Only bare stored names are accepted — no path separators.
    pub async fn delete(&self, filename: &str) {
        if filename.contains('/') || filename.contains('\\') {
            warn!(filename, "Refusing to delete suspicious upload path");
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.dir.join(filename)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(filename, error = %e, "Failed to delete upload");
            }
        }
    }
}

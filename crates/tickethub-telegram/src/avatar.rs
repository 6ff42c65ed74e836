//! Profile photo download.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use tickethub_core::result::AppResult;

use crate::client::TelegramClient;

/// Downloads a user's newest Telegram profile photo into the uploads
/// directory and returns its public URL path.
#[derive(Debug, Clone)]
pub struct AvatarFetcher {
    client: Arc<TelegramClient>,
    uploads_dir: PathBuf,
}

impl AvatarFetcher {
    /// Create a new avatar fetcher.
    pub fn new(client: Arc<TelegramClient>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            uploads_dir: uploads_dir.into(),
        }
    }

    /// Fetch and store the user's newest profile photo.
    ///
    /// Returns `None` when the user has no photos. The stored file is
    /// named deterministically per user, so a refresh overwrites the
    /// previous avatar.
    pub async fn fetch(&self, telegram_id: i64) -> AppResult<Option<String>> {
        let photos = self.client.get_user_profile_photos(telegram_id).await?;
        if photos.total_count == 0 {
            return Ok(None);
        }

        // The last size variant of the first photo is the largest.
        let Some(size) = photos.photos.first().and_then(|sizes| sizes.last()) else {
            return Ok(None);
        };

        let file = self.client.get_file(&size.file_id).await?;
        let Some(file_path) = file.file_path else {
            return Ok(None);
        };

        let bytes = self.client.download_file(&file_path).await?;

        let ext = Path::new(&file_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let filename = format!("avatar_{telegram_id}.{ext}");
        let dest = self.uploads_dir.join(&filename);

        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        tokio::fs::write(&dest, &bytes).await?;

        debug!(telegram_id, file = %filename, "Avatar stored");
        Ok(Some(format!("/uploads/{filename}")))
    }
}

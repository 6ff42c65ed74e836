//! Tag repository implementation.

use sqlx::SqlitePool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_entity::ticket::Tag;

/// Repository for ticket tags.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    /// Create a new tag repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tags, alphabetically.
    pub async fn list_all(&self) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tags", e))
    }

    /// Create a tag (idempotent on name) and return it.
    pub async fn create(&self, name: &str, color: &str) -> AppResult<Tag> {
        sqlx::query("INSERT OR IGNORE INTO tags (name, color) VALUES (?, ?)")
            .bind(name)
            .bind(color)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create tag", e))?;

        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load tag", e))
    }
}

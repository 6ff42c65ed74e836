//! Login-token repository implementation (deep-link auth flow).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_entity::session::LoginToken;
use tickethub_entity::user::TelegramProfile;

/// Repository for pending deep-link login tokens.
#[derive(Debug, Clone)]
pub struct LoginTokenRepository {
    pool: SqlitePool,
}

impl LoginTokenRepository {
    /// Create a new login-token repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Issue a new unconfirmed token.
    pub async fn create(&self, token: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO login_tokens (token, created_at) VALUES (?, ?)")
            .bind(token)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to create login token", e)
            })?;
        Ok(())
    }

    /// Look up a token.
    pub async fn find(&self, token: &str) -> AppResult<Option<LoginToken>> {
        sqlx::query_as::<_, LoginToken>("SELECT * FROM login_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find login token", e)
            })
    }

    /// Confirm a pending token with the Telegram profile captured by the
    /// bot. Returns false when the token does not exist or was already
    /// confirmed.
    pub async fn confirm(&self, token: &str, profile: &TelegramProfile) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE login_tokens SET confirmed = 1, telegram_id = ?, chat_id = ?, \
             username = ?, first_name = ?, last_name = ?, photo_url = ? \
             WHERE token = ? AND confirmed = 0",
        )
        .bind(profile.telegram_id)
        .bind(profile.chat_id)
        .bind(&profile.username)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.photo_url)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to confirm login token", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a token once the session has been issued.
    pub async fn delete(&self, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM login_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete login token", e)
            })?;
        Ok(())
    }

    /// Purge tokens issued before the cutoff. Returns the purge count.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM login_tokens WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge login tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}

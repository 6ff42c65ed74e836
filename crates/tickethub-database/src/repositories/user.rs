//! User repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::id::UserId;
use tickethub_entity::user::{TelegramProfile, User};

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by Telegram ID.
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE telegram_id = ?")
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by telegram id", e)
            })
    }

    /// Find a user by Telegram profile, updating their profile fields, or
    /// create them on first login.
    ///
    /// `chat_id` is only overwritten when the profile carries one — WebApp
    /// auth does not know the chat, only the bot `/start` flow does.
    /// A user whose Telegram ID matches `admin_telegram_id` is created as
    /// an administrator.
    pub async fn find_or_create(
        &self,
        profile: &TelegramProfile,
        admin_telegram_id: i64,
    ) -> AppResult<User> {
        let existing = self.find_by_telegram_id(profile.telegram_id).await?;

        if existing.is_some() {
            sqlx::query(
                "UPDATE users SET username = ?, first_name = ?, last_name = ?, \
                 photo_url = COALESCE(?, photo_url), chat_id = COALESCE(?, chat_id), \
                 last_login = ? \
                 WHERE telegram_id = ?",
            )
            .bind(&profile.username)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.photo_url)
            .bind(profile.chat_id)
            .bind(Utc::now())
            .bind(profile.telegram_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user", e))?;
        } else {
            let is_admin = profile.telegram_id == admin_telegram_id && admin_telegram_id != 0;
            let now = Utc::now();
            sqlx::query(
                "INSERT INTO users \
                 (telegram_id, chat_id, username, first_name, last_name, photo_url, is_admin, created_at, last_login) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(profile.telegram_id)
            .bind(profile.chat_id)
            .bind(&profile.username)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.photo_url)
            .bind(is_admin)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create user", e))?;
        }

        self.find_by_telegram_id(profile.telegram_id)
            .await?
            .ok_or_else(|| AppError::database("User vanished after upsert"))
    }

    /// Capture/refresh the chat ID for a user the bot just heard from.
    pub async fn update_chat_id(&self, telegram_id: i64, chat_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE users SET chat_id = ? WHERE telegram_id = ?")
            .bind(chat_id)
            .bind(telegram_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update chat id", e)
            })?;
        Ok(())
    }

    /// Write the user-editable settings block.
    ///
    /// The caller merges partial updates into the current user first; this
    /// writes all settings columns in one statement.
    pub async fn update_settings(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET privacy_hidden = ?, privacy_hide_online = ?, \
             privacy_hide_activity = ?, display_name = ?, display_avatar = ?, \
             notify_own = ?, notify_subscribed = ? \
             WHERE id = ?",
        )
        .bind(user.privacy_hidden)
        .bind(user.privacy_hide_online)
        .bind(user.privacy_hide_activity)
        .bind(&user.display_name)
        .bind(&user.display_avatar)
        .bind(user.notify_own)
        .bind(user.notify_subscribed)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update settings", e))?;
        Ok(())
    }

    /// Update the profile fields refreshed from Telegram.
    pub async fn update_profile(
        &self,
        id: UserId,
        first_name: &str,
        last_name: Option<&str>,
        username: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET first_name = ?, last_name = ?, username = ? WHERE id = ?")
            .bind(first_name)
            .bind(last_name)
            .bind(username)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update profile", e)
            })?;
        Ok(())
    }

    /// Update the locally stored avatar URL.
    pub async fn update_photo(&self, id: UserId, photo_url: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET photo_url = ? WHERE id = ?")
            .bind(photo_url)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update photo", e))?;
        Ok(())
    }

    /// List all users for the directory, most recently active first.
    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY last_login DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }
}

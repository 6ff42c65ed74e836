//! Reaction repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{MessageId, TicketId, UserId};
use tickethub_entity::message::ReactionRecord;

const SELECT_RECORD: &str = "SELECT r.message_id, r.user_id, r.emoji, \
     u.first_name, u.username, u.display_name, u.privacy_hidden \
     FROM reactions r JOIN users u ON r.user_id = u.id";

/// Repository for message reactions.
#[derive(Debug, Clone)]
pub struct ReactionRepository {
    pool: SqlitePool,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Toggle a reaction. Returns true when the reaction was added,
    /// false when it was removed.
    pub async fn toggle(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> AppResult<bool> {
        let removed = sqlx::query(
            "DELETE FROM reactions WHERE message_id = ? AND user_id = ? AND emoji = ?",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(emoji)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to toggle reaction", e))?;

        if removed.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO reactions (message_id, user_id, emoji, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(emoji)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add reaction", e))?;

        Ok(true)
    }

    /// Raw reactions of a single message, with reactor identity fields.
    pub async fn list_for_message(&self, message_id: MessageId) -> AppResult<Vec<ReactionRecord>> {
        sqlx::query_as::<_, ReactionRecord>(&format!(
            "{SELECT_RECORD} WHERE r.message_id = ? ORDER BY r.created_at ASC"
        ))
        .bind(message_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reactions", e))
    }

    /// Raw reactions of every message of a ticket, for thread assembly
    /// and live polling.
    pub async fn list_for_ticket(&self, ticket_id: TicketId) -> AppResult<Vec<ReactionRecord>> {
        sqlx::query_as::<_, ReactionRecord>(&format!(
            "{SELECT_RECORD} JOIN messages m ON r.message_id = m.id \
             WHERE m.ticket_id = ? ORDER BY r.created_at ASC"
        ))
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list ticket reactions", e)
        })
    }
}

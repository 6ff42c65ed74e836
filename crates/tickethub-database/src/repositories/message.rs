//! Message repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{MessageId, TicketId};
use tickethub_entity::message::{CreateMessage, Message, MessageRecord};

const SELECT_RECORD: &str = "SELECT m.id, m.ticket_id, m.author_id, m.content, m.is_system, m.created_at, \
     u.first_name AS author_first_name, u.username AS author_username, \
     u.photo_url AS author_photo_url, u.display_name AS author_display_name, \
     u.display_avatar AS author_display_avatar, u.privacy_hidden AS author_privacy_hidden, \
     u.privacy_hide_online AS author_privacy_hide_online, \
     u.privacy_hide_activity AS author_privacy_hide_activity, \
     u.is_admin AS author_is_admin \
     FROM messages m JOIN users u ON m.author_id = u.id";

/// Repository for ticket messages.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a message and return it joined with its author.
    pub async fn add(&self, data: &CreateMessage) -> AppResult<MessageRecord> {
        let result = sqlx::query(
            "INSERT INTO messages (ticket_id, author_id, content, is_system, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(data.ticket_id)
        .bind(data.author_id)
        .bind(&data.content)
        .bind(data.is_system)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add message", e))?;

        let id = MessageId(result.last_insert_rowid());
        self.find_record(id)
            .await?
            .ok_or_else(|| AppError::database("Message vanished after insert"))
    }

    /// Find a bare message row.
    pub async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find message", e))
    }

    /// Find a message joined with its author.
    pub async fn find_record(&self, id: MessageId) -> AppResult<Option<MessageRecord>> {
        sqlx::query_as::<_, MessageRecord>(&format!("{SELECT_RECORD} WHERE m.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find message", e))
    }

    /// All messages of a ticket, oldest first.
    pub async fn list_for_ticket(&self, ticket_id: TicketId) -> AppResult<Vec<MessageRecord>> {
        sqlx::query_as::<_, MessageRecord>(&format!(
            "{SELECT_RECORD} WHERE m.ticket_id = ? ORDER BY m.created_at ASC, m.id ASC"
        ))
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))
    }

    /// Messages of a ticket newer than the given ID (live polling).
    pub async fn list_since(
        &self,
        ticket_id: TicketId,
        after: MessageId,
    ) -> AppResult<Vec<MessageRecord>> {
        sqlx::query_as::<_, MessageRecord>(&format!(
            "{SELECT_RECORD} WHERE m.ticket_id = ? AND m.id > ? ORDER BY m.id ASC"
        ))
        .bind(ticket_id)
        .bind(after)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to poll messages", e))
    }

    /// Replace a message's content.
    pub async fn update_content(&self, id: MessageId, content: &str) -> AppResult<MessageRecord> {
        sqlx::query("UPDATE messages SET content = ? WHERE id = ?")
            .bind(content)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to edit message", e))?;

        self.find_record(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Message {id} not found")))
    }

    /// Delete a message (cascades to its attachments and reactions).
    pub async fn delete(&self, id: MessageId) -> AppResult<()> {
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete message", e)
            })?;
        Ok(())
    }
}

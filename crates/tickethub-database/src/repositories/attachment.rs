//! Attachment repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{AttachmentId, MessageId, TicketId};
use tickethub_entity::message::{Attachment, CreateAttachment};

/// Repository for attachment metadata.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: SqlitePool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an attachment and return it.
    pub async fn add(&self, data: &CreateAttachment) -> AppResult<Attachment> {
        let result = sqlx::query(
            "INSERT INTO attachments \
             (ticket_id, message_id, filename, original_name, mime_type, size, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(data.ticket_id)
        .bind(data.message_id)
        .bind(&data.filename)
        .bind(&data.original_name)
        .bind(&data.mime_type)
        .bind(data.size)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add attachment", e))?;

        let id = AttachmentId(result.last_insert_rowid());
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load attachment", e))
    }

    /// Ticket-level attachments (not linked to any message).
    pub async fn list_for_ticket(&self, ticket_id: TicketId) -> AppResult<Vec<Attachment>> {
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE ticket_id = ? AND message_id IS NULL",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list ticket attachments", e)
        })
    }

    /// Attachments of a single message.
    pub async fn list_for_message(&self, message_id: MessageId) -> AppResult<Vec<Attachment>> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE message_id = ?")
            .bind(message_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list message attachments", e)
            })
    }

    /// Attachments of all messages of a ticket, for thread assembly.
    pub async fn list_for_ticket_messages(&self, ticket_id: TicketId) -> AppResult<Vec<Attachment>> {
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE ticket_id = ? AND message_id IS NOT NULL",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list thread attachments", e)
        })
    }
}

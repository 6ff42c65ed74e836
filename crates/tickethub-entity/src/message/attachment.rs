//! Attachment entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tickethub_core::types::id::{AttachmentId, MessageId, TicketId};

/// File metadata for an upload attached to a ticket or message.
///
/// The file itself lives in the uploads directory under the random
/// `filename`; `original_name` is what the uploader called it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    /// Unique attachment identifier.
    pub id: AttachmentId,
    /// The ticket this attachment belongs to.
    pub ticket_id: TicketId,
    /// The message this attachment belongs to, if any.
    pub message_id: Option<MessageId>,
    /// Stored filename (random hex + extension).
    pub filename: String,
    /// Original filename as uploaded.
    pub original_name: String,
    /// Detected MIME type.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size: i64,
    /// When the attachment was uploaded.
    pub created_at: DateTime<Utc>,
}

/// Data required to record an attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttachment {
    pub ticket_id: TicketId,
    pub message_id: Option<MessageId>,
    pub filename: String,
    pub original_name: String,
    pub mime_type: Option<String>,
    pub size: i64,
}

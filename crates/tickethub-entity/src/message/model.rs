//! Message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tickethub_core::types::id::{MessageId, TicketId, UserId};

use crate::user::Identity;

/// A message in a ticket's thread.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// The ticket this message belongs to.
    pub ticket_id: TicketId,
    /// The authoring user.
    pub author_id: UserId,
    /// Message body.
    pub content: String,
    /// System messages record title/status changes and cannot be edited.
    pub is_system: bool,
    /// When the message was posted.
    pub created_at: DateTime<Utc>,
}

/// A message row joined with its author's identity columns.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRecord {
    pub id: MessageId,
    pub ticket_id: TicketId,
    pub author_id: UserId,
    pub content: String,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    // Author identity columns.
    pub author_first_name: String,
    pub author_username: Option<String>,
    pub author_photo_url: Option<String>,
    pub author_display_name: Option<String>,
    pub author_display_avatar: Option<String>,
    pub author_privacy_hidden: bool,
    pub author_privacy_hide_online: bool,
    pub author_privacy_hide_activity: bool,
    pub author_is_admin: bool,
}

impl MessageRecord {
    /// The author's identity slice, for masking.
    pub fn author_identity(&self) -> Identity {
        Identity {
            id: self.author_id,
            first_name: self.author_first_name.clone(),
            username: self.author_username.clone(),
            photo_url: self.author_photo_url.clone(),
            display_name: self.author_display_name.clone(),
            display_avatar: self.author_display_avatar.clone(),
            privacy_hidden: self.author_privacy_hidden,
            privacy_hide_online: self.author_privacy_hide_online,
            privacy_hide_activity: self.author_privacy_hide_activity,
        }
    }
}

/// Data required to add a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessage {
    /// Target ticket.
    pub ticket_id: TicketId,
    /// Authoring user.
    pub author_id: UserId,
    /// Message body.
    pub content: String,
    /// Whether this is a system-generated message.
    pub is_system: bool,
}

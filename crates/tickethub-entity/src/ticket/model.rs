//! Ticket entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tickethub_core::types::id::{TagId, TicketId, UserId};

use crate::user::Identity;

use super::kind::TicketKind;
use super::priority::TicketPriority;
use super::status::TicketStatus;

/// A ticket row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: TicketId,
    /// Title.
    pub title: String,
    /// Description body.
    pub description: String,
    /// Kind (bug/idea/feature/improvement).
    pub kind: TicketKind,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// Priority.
    pub priority: TicketPriority,
    /// Visible only to the author and admins.
    pub is_private: bool,
    /// The authoring user.
    pub author_id: UserId,
    /// The assigned user, if any.
    pub assigned_to: Option<UserId>,
    /// Denormalized vote counter.
    pub votes_count: i64,
    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket was last touched (new message, edit, status change).
    pub updated_at: DateTime<Utc>,
    /// Stamped when the status moves to closed/rejected.
    pub closed_at: Option<DateTime<Utc>>,
}

/// A ticket row joined with its author's identity columns, as returned by
/// listing and lookup queries.
#[derive(Debug, Clone, FromRow)]
pub struct TicketRecord {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub kind: TicketKind,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub is_private: bool,
    pub author_id: UserId,
    pub assigned_to: Option<UserId>,
    pub votes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Count of non-system messages.
    pub message_count: i64,
    // Author identity columns.
    pub author_first_name: String,
    pub author_username: Option<String>,
    pub author_photo_url: Option<String>,
    pub author_display_name: Option<String>,
    pub author_display_avatar: Option<String>,
    pub author_privacy_hidden: bool,
    pub author_privacy_hide_online: bool,
    pub author_privacy_hide_activity: bool,
}

impl TicketRecord {
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

/// Data required to create a new ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicket {
    /// Title.
    pub title: String,
    /// Description body.
    pub description: String,
    /// Kind.
    pub kind: TicketKind,
    /// Priority.
    pub priority: TicketPriority,
    /// Private flag.
    pub is_private: bool,
    /// Authoring user.
    pub author_id: UserId,
    /// Attached tag IDs.
    pub tags: Vec<TagId>,
}

/// A partial ticket update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<TicketKind>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub is_private: Option<bool>,
    pub assigned_to: Option<UserId>,
    pub tags: Option<Vec<TagId>>,
}

/// Filters for ticket listings.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub kind: Option<TicketKind>,
    pub priority: Option<TicketPriority>,
    pub author_id: Option<UserId>,
    /// Substring search on title/description.
    pub search: Option<String>,
    pub tag_id: Option<TagId>,
}

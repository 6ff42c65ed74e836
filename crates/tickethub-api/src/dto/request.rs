//! Request DTOs.

use serde::{Deserialize, Serialize};

use tickethub_core::types::id::{TagId, TicketId, UserId};
use tickethub_entity::presence::ViewKind;
use tickethub_entity::ticket::{TicketKind, TicketPriority, TicketStatus};

/// `POST /api/auth/webapp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebAppAuthRequest {
    /// Raw `initData` string from the Telegram WebApp SDK.
    #[serde(alias = "initData")]
    pub init_data: String,
}

/// `POST /api/auth/dev` — only available without a bot token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevLoginRequest {
    /// Fake Telegram user ID.
    pub id: i64,
    /// Optional username.
    pub username: Option<String>,
    /// Optional first name.
    pub first_name: Option<String>,
}

/// `POST /api/tickets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: TicketKind,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<TagId>>,
}

/// Query parameters of `GET /api/tickets`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketListParams {
    pub status: Option<TicketStatus>,
    pub kind: Option<TicketKind>,
    pub priority: Option<TicketPriority>,
    pub author_id: Option<UserId>,
    pub search: Option<String>,
    pub tag_id: Option<TagId>,
}

/// `POST /api/presence/heartbeat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    /// Current view; defaults to the list view.
    #[serde(default)]
    pub view: Option<ViewKind>,
    /// Ticket open in that view, if any.
    #[serde(default, alias = "ticketId")]
    pub ticket_id: Option<TicketId>,
    /// Title of that ticket, as shown to the client.
    #[serde(default, alias = "ticketTitle")]
    pub ticket_title: Option<String>,
}

/// `POST /api/presence/typing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingRequest {
    /// Ticket being composed in; a ping without one is a no-op.
    #[serde(default, alias = "ticketId")]
    pub ticket_id: Option<TicketId>,
}

/// `PUT /api/messages/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

/// `POST /api/messages/{id}/reactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRequest {
    pub emoji: String,
}

/// Query parameters of `GET /api/tickets/{id}/messages/poll`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollParams {
    /// Return messages with IDs greater than this.
    #[serde(default)]
    pub after: Option<i64>,
}

/// `POST /api/tags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

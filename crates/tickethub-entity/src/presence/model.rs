//! Presence wire shapes: the current view enum and the online-list entry.

use serde::{Deserialize, Serialize};

use tickethub_core::types::id::TicketId;

use crate::user::MaskedIdentity;

/// The screen a session is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    List,
    Kanban,
    Archive,
    Resource,
    Online,
    Users,
    Settings,
    Ticket,
    /// Any view this server version does not know about.
    #[serde(other)]
    Other,
}

/// One entry of the online list, masked for a specific viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineUser {
    /// Masked identity of the subject.
    #[serde(flatten)]
    pub identity: MaskedIdentity,
    /// Whether the subject is an administrator.
    pub is_admin: bool,
    /// Current view; null when the subject hides activity from the viewer.
    pub current_view: Option<ViewKind>,
    /// Ticket currently open; null when activity is hidden.
    pub current_ticket_id: Option<TicketId>,
    /// Title of the ticket currently open; null when activity is hidden.
    pub current_ticket_title: Option<String>,
    /// Last heartbeat, epoch milliseconds.
    pub last_seen: i64,
}

/// The payload pushed over the presence SSE stream.
///
/// The stream always carries the public masking (non-admin, non-self);
/// per-viewer masking happens on the GET endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUpdate {
    /// Constant `"presence"` discriminator for the frontend.
    #[serde(rename = "type")]
    pub kind: String,
    /// Online users, publicly masked.
    pub users: Vec<OnlineUser>,
    /// Count of the listed users.
    pub count: usize,
}

impl PresenceUpdate {
    /// Wrap a masked online list into the stream payload.
    pub fn new(users: Vec<OnlineUser>) -> Self {
        let count = users.len();
        Self {
            kind: "presence".to_string(),
            users,
            count,
        }
    }
}

//! Subscription entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tickethub_core::types::id::{TicketId, UserId};

/// A user's subscription to a ticket's activity.
///
/// Created automatically when a user authors or comments on a ticket;
/// deletable explicitly. Drives notification fan-out.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    /// The subscribed user.
    pub user_id: UserId,
    /// The ticket subscribed to.
    pub ticket_id: TicketId,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
}

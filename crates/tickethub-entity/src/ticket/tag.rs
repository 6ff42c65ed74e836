//! Tag entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tickethub_core::types::id::TagId;

/// A label that can be attached to tickets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    /// Unique tag identifier.
    pub id: TagId,
    /// Tag name (unique).
    pub name: String,
    /// Display color (hex).
    pub color: String,
}

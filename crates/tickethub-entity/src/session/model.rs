//! Session and login-token models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tickethub_core::types::id::UserId;

/// An authenticated browser session.
///
/// The token is an opaque random value presented as a `Bearer` header;
/// sessions are deleted at logout and purged after the retention window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Opaque session token (primary key).
    pub token: String,
    /// The authenticated user.
    pub user_id: UserId,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

/// A pending deep-link login token.
///
/// Issued by `POST /api/auth/request`; the user opens
/// `t.me/<bot>?start=<token>` and the bot confirms it, filling in the
/// captured Telegram profile. The frontend polls until `confirmed`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginToken {
    /// Opaque login token (primary key).
    pub token: String,
    /// Telegram user ID, once confirmed.
    pub telegram_id: Option<i64>,
    /// Telegram chat ID, once confirmed.
    pub chat_id: Option<i64>,
    /// Captured username.
    pub username: Option<String>,
    /// Captured first name.
    pub first_name: Option<String>,
    /// Captured last name.
    pub last_name: Option<String>,
    /// Captured (locally downloaded) avatar URL.
    pub photo_url: Option<String>,
    /// Whether the bot has confirmed this token.
    pub confirmed: bool,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

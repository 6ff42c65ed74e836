//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tickethub_core::types::id::UserId;

/// A registered user in the TicketHub system.
///
/// Users are created on first Telegram authentication; there is no local
/// password. `chat_id` is only known after the user has started a
/// conversation with the bot, and its presence is what makes the user
/// reachable for notifications.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Telegram user ID (unique).
    pub telegram_id: i64,
    /// Telegram chat ID for notifications, if the user started the bot.
    pub chat_id: Option<i64>,
    /// Telegram username (without `@`).
    pub username: Option<String>,
    /// First name as reported by Telegram.
    pub first_name: String,
    /// Last name as reported by Telegram.
    pub last_name: Option<String>,
    /// Locally stored avatar URL (`/uploads/...`).
    pub photo_url: Option<String>,
    /// Whether this user is an administrator.
    pub is_admin: bool,
    /// Notify about activity on tickets the user authored.
    pub notify_own: bool,
    /// Notify about activity on tickets the user subscribed to.
    pub notify_subscribed: bool,
    /// Fully invisible to non-admin users.
    pub privacy_hidden: bool,
    /// Invisible in the online list only.
    pub privacy_hide_online: bool,
    /// Current view/ticket context hidden from non-admin viewers.
    pub privacy_hide_activity: bool,
    /// Override for the shown name.
    pub display_name: Option<String>,
    /// Override for the shown avatar; the literal `"hidden"` suppresses it.
    pub display_avatar: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login: DateTime<Utc>,
}

impl User {
    /// Whether the user has a linked delivery channel for notifications.
    pub fn can_receive_notifications(&self) -> bool {
        self.chat_id.is_some()
    }
}

/// Telegram profile data used to find-or-create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramProfile {
    /// Telegram user ID.
    pub telegram_id: i64,
    /// Chat ID, if known (set by the bot `/start` flow, not by WebApp auth).
    pub chat_id: Option<i64>,
    /// Telegram username.
    pub username: Option<String>,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: Option<String>,
    /// Locally stored avatar URL.
    pub photo_url: Option<String>,
}

/// The user-editable settings block, as returned by `GET /api/settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    /// Fully invisible to non-admin users.
    pub privacy_hidden: bool,
    /// Invisible in the online list only.
    pub privacy_hide_online: bool,
    /// Activity context hidden from non-admin viewers.
    pub privacy_hide_activity: bool,
    /// Shown-name override (empty when unset).
    pub display_name: String,
    /// Shown-avatar override (empty when unset).
    pub display_avatar: String,
    /// Notify about activity on authored tickets.
    pub notify_own: bool,
    /// Notify about activity on subscribed tickets.
    pub notify_subscribed: bool,
    /// Real first name, for reference in the settings UI.
    pub real_first_name: String,
    /// Real username, for reference.
    pub real_username: Option<String>,
    /// Real avatar URL, for reference.
    pub real_photo_url: Option<String>,
}

/// A partial settings update; absent fields are left unchanged.
///
/// `display_name`/`display_avatar` set to an empty string clear the
/// override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub privacy_hidden: Option<bool>,
    pub privacy_hide_online: Option<bool>,
    pub privacy_hide_activity: Option<bool>,
    pub display_name: Option<String>,
    pub display_avatar: Option<String>,
    pub notify_own: Option<bool>,
    pub notify_subscribed: Option<bool>,
}

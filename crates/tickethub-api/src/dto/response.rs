//! Response DTOs.

use serde::{Deserialize, Serialize};

use tickethub_entity::presence::OnlineUser;
use tickethub_entity::user::{MaskedIdentity, User};
use tickethub_service::user::DirectoryEntry;

/// The caller's own account, as returned by auth endpoints. Unlike
/// masked identities this carries the caller's real fields plus their
/// own settings — it is never shown to anyone else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfUser {
    pub id: tickethub_core::types::id::UserId,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub photo_url: Option<String>,
    pub is_admin: bool,
    /// Whether the bot can reach this user.
    pub has_chat_id: bool,
    pub privacy_hidden: bool,
    pub privacy_hide_online: bool,
    pub privacy_hide_activity: bool,
    pub display_name: Option<String>,
    pub display_avatar: Option<String>,
    pub notify_own: bool,
    pub notify_subscribed: bool,
}

impl From<&User> for SelfUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            telegram_id: user.telegram_id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            photo_url: user.photo_url.clone(),
            is_admin: user.is_admin,
            has_chat_id: user.chat_id.is_some(),
            privacy_hidden: user.privacy_hidden,
            privacy_hide_online: user.privacy_hide_online,
            privacy_hide_activity: user.privacy_hide_activity,
            display_name: user.display_name.clone(),
            display_avatar: user.display_avatar.clone(),
            notify_own: user.notify_own,
            notify_subscribed: user.notify_subscribed,
        }
    }
}

/// Session issued after a successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SelfUser,
}

/// `POST /api/auth/request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequestResponse {
    pub token: String,
    pub bot_link: Option<String>,
}

/// `GET /api/auth/check/{token}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCheckResponse {
    pub confirmed: bool,
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SelfUser>,
}

/// Simple acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// `GET /api/presence/online`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineResponse {
    pub users: Vec<OnlineUser>,
    pub count: usize,
}

/// `GET /api/presence/typing/{ticket_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingResponse {
    pub typing: Vec<MaskedIdentity>,
}

/// `GET /api/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryResponse {
    pub users: Vec<DirectoryEntry>,
    pub total: usize,
}

/// `POST /api/tickets/{id}/vote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    pub voted: bool,
    pub votes_count: i64,
}

/// Subscribe/unsubscribe acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribedResponse {
    pub subscribed: bool,
}

/// `GET /api/config` — public bot metadata for the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub bot_username: String,
    pub has_bot_token: bool,
    pub site_url: String,
}

/// `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `POST /api/settings/avatar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarUploadResponse {
    pub url: String,
}

//! User directory listing and settings management.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tickethub_core::error::AppError;
use tickethub_core::result::AppResult;
use tickethub_core::types::id::UserId;
use tickethub_database::repositories::user::UserRepository;
use tickethub_entity::user::mask::AVATAR_HIDDEN;
use tickethub_entity::user::{
    mask_identity, Identity, MaskedIdentity, SettingsUpdate, User, UserSettings,
};

/// Longest accepted display-name override, in characters.
const MAX_DISPLAY_NAME_CHARS: usize = 40;

/// One row of the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// The user, masked for the viewer.
    #[serde(flatten)]
    pub identity: MaskedIdentity,
    /// Whether the user is an administrator.
    pub is_admin: bool,
    /// Whether the user currently appears online to the viewer.
    pub is_online: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last login time.
    pub last_login: DateTime<Utc>,
}

/// User application service.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<UserRepository>,
}

impl UserService {
    /// Create the user service.
    pub fn new(users: Arc<UserRepository>) -> Self {
        Self { users }
    }

    /// The user directory, masked for the viewer.
    ///
    /// Fully hidden users are omitted for non-admin viewers (a user with
    /// only `privacy_hide_online` stays listed — that flag hides them
    /// from the online list, not from the directory).
    pub async fn directory(
        &self,
        viewer: &User,
        online_ids: &HashSet<UserId>,
    ) -> AppResult<Vec<DirectoryEntry>> {
        let users = self.users.list_all().await?;

        Ok(users
            .iter()
            .filter_map(|user| {
                let identity = Identity::from(user);
                let is_self = user.id == viewer.id;
                if identity.hidden_from_lists(viewer.is_admin, is_self) {
                    return None;
                }
                Some(DirectoryEntry {
                    identity: mask_identity(&identity, viewer.is_admin, is_self),
                    is_admin: user.is_admin,
                    is_online: online_ids.contains(&user.id),
                    created_at: user.created_at,
                    last_login: user.last_login,
                })
            })
            .collect())
    }

    /// The viewer's own settings block.
    pub fn settings(user: &User) -> UserSettings {
        UserSettings {
            privacy_hidden: user.privacy_hidden,
            privacy_hide_online: user.privacy_hide_online,
            privacy_hide_activity: user.privacy_hide_activity,
            display_name: user.display_name.clone().unwrap_or_default(),
            display_avatar: user.display_avatar.clone().unwrap_or_default(),
            notify_own: user.notify_own,
            notify_subscribed: user.notify_subscribed,
            real_first_name: user.first_name.clone(),
            real_username: user.username.clone(),
            real_photo_url: user.photo_url.clone(),
        }
    }

    /// Apply a partial settings update for the viewer.
    pub async fn update_settings(&self, user: &User, update: SettingsUpdate) -> AppResult<()> {
        let merged = normalize_settings(user, update)?;
        self.users.update_settings(&merged).await
    }

    /// Point the viewer's display avatar at an uploaded file.
    pub async fn set_display_avatar(&self, user: &User, url: &str) -> AppResult<()> {
        let mut merged = user.clone();
        merged.display_avatar = Some(url.to_string());
        self.users.update_settings(&merged).await
    }
}

/// Merge a partial settings update into the user's current settings,
/// normalizing the display overrides.
fn normalize_settings(user: &User, update: SettingsUpdate) -> AppResult<User> {
    let mut merged = user.clone();

    if let Some(v) = update.privacy_hidden {
        merged.privacy_hidden = v;
    }
    if let Some(v) = update.privacy_hide_online {
        merged.privacy_hide_online = v;
    }
    if let Some(v) = update.privacy_hide_activity {
        merged.privacy_hide_activity = v;
    }
    if let Some(v) = update.notify_own {
        merged.notify_own = v;
    }
    if let Some(v) = update.notify_subscribed {
        merged.notify_subscribed = v;
    }

    if let Some(name) = update.display_name {
        let cleaned = name.replace(['\r', '\n', '\t'], " ").trim().to_string();
        merged.display_name = if cleaned.is_empty() {
            None
        } else {
            Some(cleaned.chars().take(MAX_DISPLAY_NAME_CHARS).collect())
        };
    }

    if let Some(avatar) = update.display_avatar {
        let value = avatar.trim();
        merged.display_avatar = if value.is_empty() {
            None
        } else if value == AVATAR_HIDDEN {
            Some(AVATAR_HIDDEN.to_string())
        } else if value.starts_with("/uploads/")
            && !value.contains(['"', '\'', '<', '>', ' ', '\t'])
        {
            Some(value.to_string())
        } else {
            return Err(AppError::validation("Invalid avatar value"));
        };
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId(1),
            telegram_id: 1001,
            chat_id: None,
            username: Some("alice".to_string()),
            first_name: "Alice".to_string(),
            last_name: None,
            photo_url: None,
            is_admin: false,
            notify_own: true,
            notify_subscribed: true,
            privacy_hidden: false,
            privacy_hide_online: false,
            privacy_hide_activity: false,
            display_name: None,
            display_avatar: None,
            created_at: Utc::now(),
            last_login: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_trimmed_and_capped() {
        let update = SettingsUpdate {
            display_name: Some(format!("  {}  ", "G".repeat(60))),
            ..Default::default()
        };
        let merged = normalize_settings(&user(), update).expect("valid");
        assert_eq!(merged.display_name.expect("set").chars().count(), 40);
    }

    #[test]
    fn test_empty_display_name_clears_override() {
        let mut current = user();
        current.display_name = Some("Ghost".to_string());
        let update = SettingsUpdate {
            display_name: Some("   ".to_string()),
            ..Default::default()
        };
        let merged = normalize_settings(&current, update).expect("valid");
        assert!(merged.display_name.is_none());
    }

    #[test]
    fn test_avatar_sentinel_and_upload_paths_accepted() {
        let update = SettingsUpdate {
            display_avatar: Some("hidden".to_string()),
            ..Default::default()
        };
        let merged = normalize_settings(&user(), update).expect("valid");
        assert_eq!(merged.display_avatar.as_deref(), Some("hidden"));

        let update = SettingsUpdate {
            display_avatar: Some("/uploads/abc.png".to_string()),
            ..Default::default()
        };
        let merged = normalize_settings(&user(), update).expect("valid");
        assert_eq!(merged.display_avatar.as_deref(), Some("/uploads/abc.png"));
    }

    #[test]
    fn test_external_avatar_url_rejected() {
        let update = SettingsUpdate {
            display_avatar: Some("https://evil.example/x.png".to_string()),
            ..Default::default()
        };
        assert!(normalize_settings(&user(), update).is_err());
    }

    #[test]
    fn test_unset_fields_left_unchanged() {
        let mut current = user();
        current.privacy_hidden = true;
        let merged =
            normalize_settings(&current, SettingsUpdate::default()).expect("valid");
        assert!(merged.privacy_hidden);
        assert!(merged.notify_own);
    }
}

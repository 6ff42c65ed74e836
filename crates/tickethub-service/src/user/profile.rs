//! Telegram profile refresh.
//!
//! Keeps stored names and avatars in sync with Telegram: a per-user
//! cooldown-gated refresh attempted on heartbeat, and a full avatar
//! sweep run by the background worker. Both are best-effort — a failed
//! Telegram call never fails the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use tickethub_core::result::AppResult;
use tickethub_core::types::id::UserId;
use tickethub_database::repositories::user::UserRepository;
use tickethub_entity::user::User;
use tickethub_telegram::avatar::AvatarFetcher;
use tickethub_telegram::TelegramClient;

/// Refreshes user profiles (name, username, avatar) from Telegram.
#[derive(Debug, Clone)]
pub struct ProfileRefresher {
    client: Arc<TelegramClient>,
    users: Arc<UserRepository>,
    avatars: AvatarFetcher,
    cooldown: chrono::Duration,
    last_refresh: Arc<DashMap<UserId, DateTime<Utc>>>,
}

impl ProfileRefresher {
    /// Create a refresher with the given per-user cooldown.
    pub fn new(
        client: Arc<TelegramClient>,
        users: Arc<UserRepository>,
        avatars: AvatarFetcher,
        cooldown_minutes: u64,
    ) -> Self {
        Self {
            client,
            users,
            avatars,
            cooldown: chrono::Duration::minutes(cooldown_minutes as i64),
            last_refresh: Arc::new(DashMap::new()),
        }
    }

    /// Refresh one user's profile unless their cooldown is still
    /// running. Returns the updated user when anything changed.
    pub async fn refresh_if_due(&self, user: &User) -> AppResult<Option<User>> {
        let now = Utc::now();
        if let Some(last) = self.last_refresh.get(&user.id) {
            if now - *last < self.cooldown {
                return Ok(None);
            }
        }
        self.last_refresh.insert(user.id, now);

        let mut changed = false;

        match self.client.get_chat(user.telegram_id).await {
            Ok(chat) => {
                let first_name = chat
                    .first_name
                    .unwrap_or_else(|| user.first_name.clone());
                if first_name != user.first_name
                    || chat.last_name != user.last_name
                    || chat.username != user.username
                {
                    self.users
                        .update_profile(
                            user.id,
                            &first_name,
                            chat.last_name.as_deref(),
                            chat.username.as_deref(),
                        )
                        .await?;
                    changed = true;
                }
            }
            Err(e) => {
                debug!(user_id = %user.id, error = %e, "Profile lookup failed");
            }
        }

        if self.refresh_avatar(user).await? {
            changed = true;
        }

        if changed {
            debug!(user_id = %user.id, "Profile refreshed from Telegram");
            return self.users.find_by_id(user.id).await;
        }
        Ok(None)
    }

    /// Refresh every known user's avatar, pausing between users to
    /// respect the Bot API rate limits.
    pub async fn refresh_all_avatars(&self, delay: Duration) -> AppResult<usize> {
        let users = self.users.list_all().await?;
        let mut refreshed = 0;

        for user in &users {
            match self.refresh_avatar(user).await {
                Ok(true) => refreshed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(user_id = %user.id, error = %e, "Avatar refresh failed");
                }
            }
            tokio::time::sleep(delay).await;
        }

        Ok(refreshed)
    }

    /// Fetch and store the user's current avatar; true when it changed.
    async fn refresh_avatar(&self, user: &User) -> AppResult<bool> {
        let fetched = match self.avatars.fetch(user.telegram_id).await {
            Ok(url) => url,
            Err(e) => {
                debug!(user_id = %user.id, error = %e, "Avatar fetch failed");
                return Ok(false);
            }
        };

        if let Some(url) = fetched {
            if user.photo_url.as_deref() != Some(url.as_str()) {
                self.users.update_photo(user.id, &url).await?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

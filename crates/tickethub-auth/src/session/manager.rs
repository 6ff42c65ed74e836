//! Session lifecycle manager — issue, validate, and revoke opaque tokens.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use tickethub_core::config::SessionConfig;
use tickethub_core::error::AppError;
use tickethub_core::result::AppResult;
use tickethub_database::repositories::session::SessionRepository;
use tickethub_database::repositories::user::UserRepository;
use tickethub_entity::session::Session;
use tickethub_entity::user::User;

use crate::token::generate_session_token;

/// Manages browser session issue and validation.
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Session persistence.
    sessions: Arc<SessionRepository>,
    /// User lookup for validation.
    users: Arc<UserRepository>,
    /// Session configuration.
    config: SessionConfig,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(
        sessions: Arc<SessionRepository>,
        users: Arc<UserRepository>,
        config: SessionConfig,
    ) -> Self {
        Self {
            sessions,
            users,
            config,
        }
    }

    /// Issue a fresh session for an authenticated user.
    pub async fn issue(&self, user: &User) -> AppResult<Session> {
        let token = generate_session_token();
        let session = self.sessions.create(&token, user.id).await?;
        info!(user_id = %user.id, "Session issued");
        Ok(session)
    }

    /// Resolve a bearer token to its user.
    ///
    /// A token past the retention window, or whose user no longer exists,
    /// is deleted and rejected.
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let session = self
            .sessions
            .find(token)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid session token"))?;

        let cutoff = Utc::now() - Duration::days(self.config.retention_days as i64);
        if session.created_at < cutoff {
            self.sessions.delete(token).await?;
            return Err(AppError::authentication("Session expired"));
        }

        match self.users.find_by_id(session.user_id).await? {
            Some(user) => Ok(user),
            None => {
                self.sessions.delete(token).await?;
                Err(AppError::authentication("Session user no longer exists"))
            }
        }
    }

    /// Revoke a session (logout).
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        self.sessions.delete(token).await
    }
}

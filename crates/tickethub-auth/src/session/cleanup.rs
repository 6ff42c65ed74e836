//! Expired session and login-token cleanup.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use tickethub_core::config::SessionConfig;
use tickethub_core::result::AppResult;
use tickethub_database::repositories::login_token::LoginTokenRepository;
use tickethub_database::repositories::session::SessionRepository;

/// Handles the periodic purge of expired sessions and stale login tokens.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    /// Session persistence.
    sessions: Arc<SessionRepository>,
    /// Login-token persistence.
    login_tokens: Arc<LoginTokenRepository>,
    /// Session configuration.
    config: SessionConfig,
}

impl SessionCleanup {
    /// Create a new cleanup handler.
    pub fn new(
        sessions: Arc<SessionRepository>,
        login_tokens: Arc<LoginTokenRepository>,
        config: SessionConfig,
    ) -> Self {
        Self {
            sessions,
            login_tokens,
            config,
        }
    }

    /// Run one cleanup cycle. Returns (sessions purged, tokens purged).
    pub async fn run_cleanup(&self) -> AppResult<(u64, u64)> {
        let session_cutoff = Utc::now() - Duration::days(self.config.retention_days as i64);
        let sessions_purged = self.sessions.purge_older_than(session_cutoff).await?;

        let token_cutoff =
            Utc::now() - Duration::minutes(self.config.login_token_ttl_minutes as i64);
        let tokens_purged = self.login_tokens.purge_older_than(token_cutoff).await?;

        if sessions_purged > 0 || tokens_purged > 0 {
            info!(
                sessions = sessions_purged,
                login_tokens = tokens_purged,
                "Session cleanup completed"
            );
        }

        Ok((sessions_purged, tokens_purged))
    }
}

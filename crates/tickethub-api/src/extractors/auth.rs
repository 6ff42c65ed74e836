//! `AuthUser` extractor — resolves the bearer session token to a user.
//!
//! Rejecting here means unauthenticated requests never reach the
//! presence/typing/service logic.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use tickethub_core::error::AppError;
use tickethub_entity::user::User;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, plus the raw session token (the presence
/// registry is keyed by it).
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The authenticated user.
    pub user: User,
    /// The opaque session token presented by the client.
    pub token: String,
}

impl std::ops::Deref for AuthUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl AuthUser {
    /// Fail unless the caller is an administrator.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.user.is_admin {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError(AppError::authentication("Missing Authorization header")))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                ApiError(AppError::authentication("Invalid Authorization header format"))
            })?
            .to_string();

        let user = state.session_manager.authenticate(&token).await?;

        Ok(AuthUser { user, token })
    }
}

//! Tag handlers.

use axum::extract::State;
use axum::Json;

use tickethub_entity::ticket::Tag;

use crate::dto::request::CreateTagRequest;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Default color for tags created without one.
const DEFAULT_TAG_COLOR: &str = "#6c757d";

/// GET /api/tags — public.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.tag_repo.list_all().await?))
}

/// POST /api/tags — admin only.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTagRequest>,
) -> Result<Json<Tag>, ApiError> {
    auth.require_admin()?;
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("Name required"));
    }
    let color = req.color.as_deref().unwrap_or(DEFAULT_TAG_COLOR);
    Ok(Json(state.tag_repo.create(req.name.trim(), color).await?))
}

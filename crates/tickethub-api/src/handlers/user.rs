//! User directory and settings handlers.

use std::collections::HashSet;

use axum::extract::{Multipart, State};
use axum::Json;

use tickethub_core::error::AppError;
use tickethub_entity::user::{SettingsUpdate, UserSettings};
use tickethub_service::upload::validate::{avatar_extension_allowed, extension_of};
use tickethub_service::user::UserService;

use crate::dto::response::{AvatarUploadResponse, DirectoryResponse, OkResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users — the directory with online flags.
pub async fn directory(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DirectoryResponse>, ApiError> {
    let online_ids: HashSet<_> = state
        .presence
        .online_user_ids(&auth.user)
        .into_iter()
        .collect();
    let users = state.user_service.directory(&auth.user, &online_ids).await?;
    let total = users.len();
    Ok(Json(DirectoryResponse { users, total }))
}

/// GET /api/settings — the caller's settings block.
pub async fn get_settings(auth: AuthUser) -> Json<UserSettings> {
    Json(UserService::settings(&auth.user))
}

/// PUT /api/settings — partial settings update.
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<OkResponse>, ApiError> {
    state.user_service.update_settings(&auth.user, update).await?;
    Ok(Json(OkResponse::ok()))
}

/// POST /api/settings/avatar — upload a custom display avatar.
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AvatarUploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(AppError::validation(format!("Upload error: {e}"))))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation("No file"))?;

        let ext = extension_of(&original_name)
            .ok_or_else(|| ApiError::validation("File has no extension"))?;
        if !avatar_extension_allowed(&ext) {
            return Err(ApiError::validation(
                "Avatar must be an image (png/jpg/gif/webp)",
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError(AppError::validation(format!("Upload error: {e}"))))?;

        let stored = state.upload_store.save(&original_name, &bytes).await?;
        let url = format!("/uploads/{}", stored.filename);
        state.user_service.set_display_avatar(&auth.user, &url).await?;
        return Ok(Json(AvatarUploadResponse { url }));
    }

    Err(ApiError::validation("No file"))
}

//! Authentication handlers: WebApp auth, the deep-link flow, dev login,
//! `me`, and logout.

use axum::extract::{Path, State};
use axum::Json;
use tracing::warn;

use tickethub_auth::token::generate_login_token;
use tickethub_auth::webapp::verify_init_data;
use tickethub_core::error::AppError;
use tickethub_entity::user::TelegramProfile;

use crate::dto::request::{DevLoginRequest, WebAppAuthRequest};
use crate::dto::response::{AuthCheckResponse, AuthRequestResponse, LoginResponse, OkResponse, SelfUser};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/webapp — instant auth; Telegram already verified the
/// user, we verify Telegram's signature.
pub async fn webapp(
    State(state): State<AppState>,
    Json(req): Json<WebAppAuthRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.init_data.is_empty() {
        return Err(ApiError::validation("Missing initData"));
    }

    let tg_user = verify_init_data(&state.config.telegram.bot_token, &req.init_data)
        .ok_or_else(|| ApiError::forbidden("Invalid WebApp data"))?;

    // Best-effort local avatar capture.
    let mut photo_url = tg_user.photo_url.clone();
    if let Some(fetcher) = &state.avatar_fetcher {
        match fetcher.fetch(tg_user.id).await {
            Ok(Some(url)) => photo_url = Some(url),
            Ok(None) => {}
            Err(e) => warn!(telegram_id = tg_user.id, error = %e, "Avatar fetch failed"),
        }
    }

    let user = state
        .user_repo
        .find_or_create(
            &TelegramProfile {
                telegram_id: tg_user.id,
                // The chat link comes from the bot /start flow, not here.
                chat_id: None,
                username: tg_user.username,
                first_name: tg_user.first_name.unwrap_or_else(|| "User".to_string()),
                last_name: tg_user.last_name,
                photo_url,
            },
            state.config.telegram.admin_telegram_id,
        )
        .await?;

    let session = state.session_manager.issue(&user).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        user: SelfUser::from(&user),
    }))
}

/// POST /api/auth/request — issue a deep-link login token.
pub async fn request_login(
    State(state): State<AppState>,
) -> Result<Json<AuthRequestResponse>, ApiError> {
    let token = generate_login_token();
    state.login_tokens.create(&token).await?;

    let bot_link = if state.config.telegram.bot_username.is_empty() {
        None
    } else {
        Some(format!(
            "https://t.me/{}?start={}",
            state.config.telegram.bot_username, token
        ))
    };

    Ok(Json(AuthRequestResponse { token, bot_link }))
}

/// GET /api/auth/check/{token} — polled by the frontend until the bot
/// confirms the login.
pub async fn check_login(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<AuthCheckResponse>, ApiError> {
    let Some(row) = state.login_tokens.find(&token).await? else {
        return Ok(Json(AuthCheckResponse {
            confirmed: false,
            expired: true,
            token: None,
            user: None,
        }));
    };

    if !row.confirmed {
        return Ok(Json(AuthCheckResponse {
            confirmed: false,
            expired: false,
            token: None,
            user: None,
        }));
    }

    let user = state
        .user_repo
        .find_or_create(
            &TelegramProfile {
                telegram_id: row
                    .telegram_id
                    .ok_or_else(|| AppError::internal("Confirmed token without telegram id"))?,
                chat_id: row.chat_id,
                username: row.username,
                first_name: row.first_name.unwrap_or_else(|| "User".to_string()),
                last_name: row.last_name,
                photo_url: row.photo_url,
            },
            state.config.telegram.admin_telegram_id,
        )
        .await?;

    let session = state.session_manager.issue(&user).await?;
    state.login_tokens.delete(&token).await?;

    Ok(Json(AuthCheckResponse {
        confirmed: true,
        expired: false,
        token: Some(session.token),
        user: Some(SelfUser::from(&user)),
    }))
}

/// POST /api/auth/dev — local development login, disabled as soon as a
/// bot token is configured.
pub async fn dev_login(
    State(state): State<AppState>,
    Json(req): Json<DevLoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if state.config.telegram.enabled() {
        return Err(ApiError::forbidden(
            "Dev login disabled when the bot is configured",
        ));
    }

    let user = state
        .user_repo
        .find_or_create(
            &TelegramProfile {
                telegram_id: req.id,
                chat_id: None,
                username: req.username,
                first_name: req.first_name.unwrap_or_else(|| "Dev User".to_string()),
                last_name: None,
                photo_url: None,
            },
            state.config.telegram.admin_telegram_id,
        )
        .await?;

    let session = state.session_manager.issue(&user).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        user: SelfUser::from(&user),
    }))
}

/// GET /api/auth/me.
pub async fn me(auth: AuthUser) -> Json<SelfUser> {
    Json(SelfUser::from(&auth.user))
}

/// POST /api/auth/logout.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<OkResponse>, ApiError> {
    state.session_manager.revoke(&auth.token).await?;
    Ok(Json(OkResponse::ok()))
}

//! Public configuration handler.

use axum::extract::State;
use axum::Json;

use crate::dto::response::ConfigResponse;
use crate::state::AppState;

/// GET /api/config — the bot metadata the frontend needs before login.
pub async fn public_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        bot_username: state.config.telegram.bot_username.clone(),
        has_bot_token: state.config.telegram.enabled(),
        site_url: state.config.server.site_url.clone(),
    })
}

//! Health check handler.

use axum::extract::State;
use axum::Json;

use crate::dto::response::HealthResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health — liveness plus a database round-trip.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    tickethub_database::connection::health_check(&state.db_pool).await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

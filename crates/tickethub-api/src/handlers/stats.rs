//! Statistics handler.

use axum::extract::State;
use axum::Json;

use tickethub_database::repositories::stats::TrackerStats;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/stats.
pub async fn tracker_stats(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<TrackerStats>, ApiError> {
    Ok(Json(state.stats_repo.tracker_stats().await?))
}

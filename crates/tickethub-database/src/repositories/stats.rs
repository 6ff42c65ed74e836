//! Tracker statistics queries.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;

/// Aggregate tracker counters shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerStats {
    /// Total tickets.
    pub total: i64,
    /// Open tickets.
    pub open: i64,
    /// Tickets in progress.
    pub in_progress: i64,
    /// Archived tickets (closed, rejected, duplicate).
    pub closed: i64,
    /// Bug tickets.
    pub bugs: i64,
    /// Idea tickets.
    pub ideas: i64,
    /// Registered users.
    pub users: i64,
}

/// Repository for aggregate statistics.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    /// Create a new stats repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Compute the dashboard counters.
    pub async fn tracker_stats(&self) -> AppResult<TrackerStats> {
        let count = |sql: &'static str| {
            let pool = self.pool.clone();
            async move {
                sqlx::query_scalar::<_, i64>(sql)
                    .fetch_one(&pool)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to compute stats", e)
                    })
            }
        };

        Ok(TrackerStats {
            total: count("SELECT COUNT(*) FROM tickets").await?,
            open: count("SELECT COUNT(*) FROM tickets WHERE status = 'open'").await?,
            in_progress: count("SELECT COUNT(*) FROM tickets WHERE status = 'in_progress'").await?,
            closed: count(
                "SELECT COUNT(*) FROM tickets WHERE status IN ('closed', 'rejected', 'duplicate')",
            )
            .await?,
            bugs: count("SELECT COUNT(*) FROM tickets WHERE kind = 'bug'").await?,
            ideas: count("SELECT COUNT(*) FROM tickets WHERE kind = 'idea'").await?,
            users: count("SELECT COUNT(*) FROM users").await?,
        })
    }
}

//! Vote repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{TicketId, UserId};

/// Repository for ticket votes. The denormalized `votes_count` on the
/// ticket row is maintained here.
#[derive(Debug, Clone)]
pub struct VoteRepository {
    pool: SqlitePool,
}

impl VoteRepository {
    /// Create a new vote repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Toggle the viewer's vote. Returns true when the vote was added,
    /// false when it was removed.
    pub async fn toggle(&self, user_id: UserId, ticket_id: TicketId) -> AppResult<bool> {
        let removed = sqlx::query("DELETE FROM votes WHERE user_id = ? AND ticket_id = ?")
            .bind(user_id)
            .bind(ticket_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to toggle vote", e))?;

        if removed.rows_affected() > 0 {
            sqlx::query("UPDATE tickets SET votes_count = votes_count - 1 WHERE id = ?")
                .bind(ticket_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to decrement votes", e)
                })?;
            return Ok(false);
        }

        sqlx::query("INSERT INTO votes (user_id, ticket_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(ticket_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add vote", e))?;

        sqlx::query("UPDATE tickets SET votes_count = votes_count + 1 WHERE id = ?")
            .bind(ticket_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to increment votes", e)
            })?;

        Ok(true)
    }

    /// All ticket IDs the user has voted for.
    pub async fn user_votes(&self, user_id: UserId) -> AppResult<Vec<TicketId>> {
        sqlx::query_scalar::<_, TicketId>("SELECT ticket_id FROM votes WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list votes", e))
    }
}

//! Subscription repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{TicketId, UserId};
use tickethub_entity::user::User;

/// Repository for ticket subscriptions.
#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    pool: SqlitePool,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Subscribe a user to a ticket (idempotent).
    pub async fn subscribe(&self, user_id: UserId, ticket_id: TicketId) -> AppResult<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO subscriptions (user_id, ticket_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(ticket_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to subscribe", e))?;
        Ok(())
    }

    /// Remove a user's subscription to a ticket.
    pub async fn unsubscribe(&self, user_id: UserId, ticket_id: TicketId) -> AppResult<()> {
        sqlx::query("DELETE FROM subscriptions WHERE user_id = ? AND ticket_id = ?")
            .bind(user_id)
            .bind(ticket_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to unsubscribe", e))?;
        Ok(())
    }

    /// Whether a user is subscribed to a ticket.
    pub async fn is_subscribed(&self, user_id: UserId, ticket_id: TicketId) -> AppResult<bool> {
        let row: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM subscriptions WHERE user_id = ? AND ticket_id = ?",
        )
        .bind(user_id)
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check subscription", e))?;
        Ok(row.is_some())
    }

    /// All subscribers of a ticket, with their full user rows so the
    /// fan-out can apply channel and preference gating.
    pub async fn subscribers_of(&self, ticket_id: TicketId) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN subscriptions s ON u.id = s.user_id \
             WHERE s.ticket_id = ?",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list subscribers", e))
    }

    /// All ticket IDs the user is subscribed to.
    pub async fn user_subscriptions(&self, user_id: UserId) -> AppResult<Vec<TicketId>> {
        sqlx::query_scalar::<_, TicketId>(
            "SELECT ticket_id FROM subscriptions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list subscriptions", e)
        })
    }
}

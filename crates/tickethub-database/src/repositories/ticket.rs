//! Ticket repository implementation.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{TagId, TicketId, UserId};
use tickethub_core::types::pagination::{PageRequest, PageResponse};
use tickethub_entity::ticket::{CreateTicket, Tag, TicketFilter, TicketRecord, UpdateTicket};

/// The viewer a listing is computed for; non-admins only see public
/// tickets and their own private ones.
#[derive(Debug, Clone, Copy)]
pub struct TicketViewer {
    /// The viewing user.
    pub user_id: UserId,
    /// Whether the viewer is an administrator.
    pub is_admin: bool,
}

const SELECT_RECORD: &str = "SELECT t.id, t.title, t.description, t.kind, t.status, t.priority, \
     t.is_private, t.author_id, t.assigned_to, t.votes_count, t.created_at, t.updated_at, t.closed_at, \
     (SELECT COUNT(*) FROM messages m WHERE m.ticket_id = t.id AND m.is_system = 0) AS message_count, \
     u.first_name AS author_first_name, u.username AS author_username, \
     u.photo_url AS author_photo_url, u.display_name AS author_display_name, \
     u.display_avatar AS author_display_avatar, u.privacy_hidden AS author_privacy_hidden, \
     u.privacy_hide_online AS author_privacy_hide_online, \
     u.privacy_hide_activity AS author_privacy_hide_activity \
     FROM tickets t JOIN users u ON t.author_id = u.id";

/// Repository for ticket CRUD and query operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a ticket by primary key, with author fields.
    pub async fn find_by_id(&self, id: TicketId) -> AppResult<Option<TicketRecord>> {
        sqlx::query_as::<_, TicketRecord>(&format!("{SELECT_RECORD} WHERE t.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ticket", e))
    }

    /// List tickets for a viewer with filters and pagination.
    ///
    /// Ordering follows the board: active statuses first, then priority
    /// (critical first), then newest.
    pub async fn list(
        &self,
        filter: &TicketFilter,
        viewer: TicketViewer,
        page: &PageRequest,
    ) -> AppResult<PageResponse<TicketRecord>> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tickets t WHERE 1=1");
        push_filters(&mut count_qb, filter, viewer);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count tickets", e))?;

        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_RECORD);
        qb.push(" WHERE 1=1");
        push_filters(&mut qb, filter, viewer);
        qb.push(
            " ORDER BY \
             CASE t.status \
               WHEN 'open' THEN 1 WHEN 'in_progress' THEN 2 WHEN 'review' THEN 3 \
               WHEN 'testing' THEN 4 WHEN 'closed' THEN 5 WHEN 'rejected' THEN 6 \
               WHEN 'duplicate' THEN 7 END, \
             CASE t.priority \
               WHEN 'critical' THEN 1 WHEN 'high' THEN 2 WHEN 'medium' THEN 3 \
               WHEN 'low' THEN 4 END, \
             t.created_at DESC",
        );
        qb.push(" LIMIT ");
        qb.push_bind(page.limit() as i64);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset() as i64);

        let tickets = qb
            .build_query_as::<TicketRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tickets", e))?;

        Ok(PageResponse::new(
            tickets,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Create a ticket and attach its tags. Returns the new ticket ID.
    pub async fn create(&self, data: &CreateTicket) -> AppResult<TicketId> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tickets \
             (title, description, kind, priority, is_private, author_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.kind)
        .bind(data.priority)
        .bind(data.is_private)
        .bind(data.author_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create ticket", e))?;

        let ticket_id = TicketId(result.last_insert_rowid());
        self.set_tags(ticket_id, &data.tags).await?;
        Ok(ticket_id)
    }

    /// Apply a partial update. Tags, when present, replace the existing
    /// set; `closed_at` is stamped when the status moves to a terminal
    /// state.
    pub async fn update(&self, id: TicketId, updates: &UpdateTicket) -> AppResult<()> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE tickets SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(title) = &updates.title {
            qb.push(", title = ");
            qb.push_bind(title);
        }
        if let Some(description) = &updates.description {
            qb.push(", description = ");
            qb.push_bind(description);
        }
        if let Some(kind) = updates.kind {
            qb.push(", kind = ");
            qb.push_bind(kind);
        }
        if let Some(status) = updates.status {
            qb.push(", status = ");
            qb.push_bind(status);
            if status.is_archived() {
                qb.push(", closed_at = ");
                qb.push_bind(Utc::now());
            }
        }
        if let Some(priority) = updates.priority {
            qb.push(", priority = ");
            qb.push_bind(priority);
        }
        if let Some(is_private) = updates.is_private {
            qb.push(", is_private = ");
            qb.push_bind(is_private);
        }
        if let Some(assigned_to) = updates.assigned_to {
            qb.push(", assigned_to = ");
            qb.push_bind(assigned_to);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);

        qb.build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update ticket", e))?;

        if let Some(tags) = &updates.tags {
            sqlx::query("DELETE FROM ticket_tags WHERE ticket_id = ?")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to clear ticket tags", e)
                })?;
            self.set_tags(id, tags).await?;
        }

        Ok(())
    }

    /// Delete a ticket (cascades to messages, attachments, subscriptions).
    pub async fn delete(&self, id: TicketId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete ticket", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Bump `updated_at` (called when a message is added).
    pub async fn touch(&self, id: TicketId) -> AppResult<()> {
        sqlx::query("UPDATE tickets SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch ticket", e))?;
        Ok(())
    }

    /// Tags attached to a ticket.
    pub async fn tags_for(&self, id: TicketId) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>(
            "SELECT tg.* FROM tags tg \
             JOIN ticket_tags tt ON tg.id = tt.tag_id \
             WHERE tt.ticket_id = ?",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load ticket tags", e))
    }

    async fn set_tags(&self, ticket_id: TicketId, tags: &[TagId]) -> AppResult<()> {
        for tag_id in tags {
            sqlx::query("INSERT OR IGNORE INTO ticket_tags (ticket_id, tag_id) VALUES (?, ?)")
                .bind(ticket_id)
                .bind(tag_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to attach tag", e)
                })?;
        }
        Ok(())
    }
}

/// Append the filter and visibility conditions shared by the count and
/// listing queries.
fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &TicketFilter, viewer: TicketViewer) {
    if !viewer.is_admin {
        qb.push(" AND (t.is_private = 0 OR t.author_id = ");
        qb.push_bind(viewer.user_id);
        qb.push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND t.status = ");
        qb.push_bind(status);
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND t.kind = ");
        qb.push_bind(kind);
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND t.priority = ");
        qb.push_bind(priority);
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND t.author_id = ");
        qb.push_bind(author_id);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (t.title LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR t.description LIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(tag_id) = filter.tag_id {
        qb.push(
            " AND EXISTS (SELECT 1 FROM ticket_tags tt \
             WHERE tt.ticket_id = t.id AND tt.tag_id = ",
        );
        qb.push_bind(tag_id);
        qb.push(")");
    }
}

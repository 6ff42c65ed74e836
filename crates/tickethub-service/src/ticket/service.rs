//! Ticket orchestration: listings, kanban, CRUD with the authorization
//! rules, votes, subscriptions, and the notification side effects.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use tickethub_core::error::AppError;
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{TicketId, UserId};
use tickethub_core::types::pagination::{PageRequest, PageResponse};
use tickethub_database::repositories::attachment::AttachmentRepository;
use tickethub_database::repositories::message::MessageRepository;
use tickethub_database::repositories::subscription::SubscriptionRepository;
use tickethub_database::repositories::ticket::{TicketRepository, TicketViewer};
use tickethub_database::repositories::vote::VoteRepository;
use tickethub_entity::message::{Attachment, CreateMessage};
use tickethub_entity::ticket::{
    CreateTicket, Tag, TicketFilter, TicketKind, TicketPriority, TicketRecord, TicketStatus,
    UpdateTicket,
};
use tickethub_entity::user::{mask_identity, MaskedIdentity, User};

use crate::notification::{render, NotificationFanout};

/// A ticket as rendered for a viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketView {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub kind: TicketKind,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub is_private: bool,
    pub author: MaskedIdentity,
    pub assigned_to: Option<UserId>,
    pub votes_count: i64,
    pub message_count: i64,
    pub tags: Vec<Tag>,
    pub user_voted: bool,
    pub user_subscribed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Ticket-level attachments; loaded for single-ticket reads only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

/// Ticket application service.
#[derive(Debug, Clone)]
pub struct TicketService {
    tickets: Arc<TicketRepository>,
    messages: Arc<MessageRepository>,
    attachments: Arc<AttachmentRepository>,
    votes: Arc<VoteRepository>,
    subscriptions: Arc<SubscriptionRepository>,
    fanout: Arc<NotificationFanout>,
}

impl TicketService {
    /// Create the ticket service.
    pub fn new(
        tickets: Arc<TicketRepository>,
        messages: Arc<MessageRepository>,
        attachments: Arc<AttachmentRepository>,
        votes: Arc<VoteRepository>,
        subscriptions: Arc<SubscriptionRepository>,
        fanout: Arc<NotificationFanout>,
    ) -> Self {
        Self {
            tickets,
            messages,
            attachments,
            votes,
            subscriptions,
            fanout,
        }
    }

    /// Whether the viewer may see this ticket at all.
    pub fn can_view(viewer: &User, record: &TicketRecord) -> bool {
        !record.is_private || viewer.is_admin || record.author_id == viewer.id
    }

    fn can_edit(viewer: &User, record: &TicketRecord) -> bool {
        viewer.is_admin || record.author_id == viewer.id
    }

    /// Load a ticket the viewer may see, or fail with not-found /
    /// forbidden.
    pub async fn load_visible(&self, viewer: &User, id: TicketId) -> AppResult<TicketRecord> {
        let record = self
            .tickets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ticket {id} not found")))?;
        if !Self::can_view(viewer, &record) {
            return Err(AppError::authorization("Access denied"));
        }
        Ok(record)
    }

    /// Paginated listing with filters.
    pub async fn list(
        &self,
        viewer: &User,
        filter: &TicketFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<TicketView>> {
        let result = self
            .tickets
            .list(filter, viewer_of(viewer), &page)
            .await?;

        let voted = self.votes.user_votes(viewer.id).await?;
        let subscribed = self.subscriptions.user_subscriptions(viewer.id).await?;

        let mut views = Vec::with_capacity(result.items.len());
        for record in &result.items {
            let tags = self.tickets.tags_for(record.id).await?;
            views.push(render_ticket(
                record,
                viewer,
                tags,
                voted.contains(&record.id),
                subscribed.contains(&record.id),
                None,
            ));
        }

        Ok(PageResponse::new(
            views,
            result.page,
            result.page_size,
            result.total,
        ))
    }

    /// The kanban board: one column per active status.
    pub async fn kanban(
        &self,
        viewer: &User,
    ) -> AppResult<HashMap<TicketStatus, Vec<TicketView>>> {
        let mut board = HashMap::new();
        for status in TicketStatus::kanban_columns() {
            let filter = TicketFilter {
                status: Some(status),
                ..Default::default()
            };
            let page = self
                .list(viewer, &filter, PageRequest::new(1, 100))
                .await?;
            board.insert(status, page.items);
        }
        Ok(board)
    }

    /// A single ticket with its tags and ticket-level attachments.
    pub async fn get(&self, viewer: &User, id: TicketId) -> AppResult<TicketView> {
        let record = self.load_visible(viewer, id).await?;
        self.render_one(viewer, &record, true).await
    }

    /// Create a ticket. The author is subscribed automatically, and the
    /// administrator is alerted about tickets created by regular users.
    pub async fn create(&self, viewer: &User, mut data: CreateTicket) -> AppResult<TicketView> {
        if data.title.trim().is_empty() {
            return Err(AppError::validation("Title is required"));
        }
        data.author_id = viewer.id;

        let ticket_id = self.tickets.create(&data).await?;
        self.subscriptions.subscribe(viewer.id, ticket_id).await?;

        if !viewer.is_admin {
            let text = render::new_ticket(
                data.kind,
                &data.title,
                &render::author_label(viewer),
                data.priority,
                data.is_private,
            );
            let fanout = Arc::clone(&self.fanout);
            tokio::spawn(async move {
                if let Err(e) = fanout.notify_admin(&text).await {
                    warn!(error = %e, "Admin alert failed");
                }
            });
        }

        let record = self
            .tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| AppError::database("Ticket vanished after create"))?;
        self.render_one(viewer, &record, false).await
    }

    /// Apply a partial update.
    ///
    /// Only the author or an admin may edit; non-admins cannot change
    /// status, assignee, or visibility. Title and status changes leave a
    /// system message in the thread and fan out to subscribers.
    pub async fn update(
        &self,
        viewer: &User,
        id: TicketId,
        mut updates: UpdateTicket,
    ) -> AppResult<TicketView> {
        let record = self.load_visible(viewer, id).await?;
        if !Self::can_edit(viewer, &record) {
            return Err(AppError::authorization("Access denied"));
        }

        if !viewer.is_admin {
            updates.status = None;
            updates.assigned_to = None;
            updates.is_private = None;
        }

        if let Some(new_title) = &updates.title {
            if !new_title.trim().is_empty() && *new_title != record.title {
                self.record_change(
                    viewer,
                    &record,
                    render::title_system_message(&record.title, new_title),
                    render::title_changed(id, &record.title, new_title),
                )
                .await?;
            }
        }

        if let Some(new_status) = updates.status {
            if new_status != record.status {
                self.record_change(
                    viewer,
                    &record,
                    render::status_system_message(record.status, new_status),
                    render::status_changed(id, &record.title, record.status, new_status),
                )
                .await?;
            }
        }

        self.tickets.update(id, &updates).await?;

        let updated = self
            .tickets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::database("Ticket vanished after update"))?;
        self.render_one(viewer, &updated, false).await
    }

    /// Delete a ticket (author or admin).
    pub async fn delete(&self, viewer: &User, id: TicketId) -> AppResult<()> {
        let record = self.load_visible(viewer, id).await?;
        if !Self::can_edit(viewer, &record) {
            return Err(AppError::authorization("Access denied"));
        }
        self.tickets.delete(id).await?;
        Ok(())
    }

    /// Toggle the viewer's vote; returns (voted, new count).
    pub async fn toggle_vote(&self, viewer: &User, id: TicketId) -> AppResult<(bool, i64)> {
        let _ = self.load_visible(viewer, id).await?;
        let voted = self.votes.toggle(viewer.id, id).await?;
        let record = self
            .tickets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::database("Ticket vanished after vote"))?;
        Ok((voted, record.votes_count))
    }

    /// Subscribe the viewer to a ticket's activity.
    pub async fn subscribe(&self, viewer: &User, id: TicketId) -> AppResult<()> {
        let _ = self.load_visible(viewer, id).await?;
        self.subscriptions.subscribe(viewer.id, id).await
    }

    /// Remove the viewer's subscription.
    pub async fn unsubscribe(&self, viewer: &User, id: TicketId) -> AppResult<()> {
        self.subscriptions.unsubscribe(viewer.id, id).await
    }

    /// Record a system message for a change and fan the event out.
    async fn record_change(
        &self,
        viewer: &User,
        record: &TicketRecord,
        system_text: String,
        notification_text: String,
    ) -> AppResult<()> {
        self.messages
            .add(&CreateMessage {
                ticket_id: record.id,
                author_id: viewer.id,
                content: system_text,
                is_system: true,
            })
            .await?;

        let fanout = Arc::clone(&self.fanout);
        let ticket_id = record.id;
        let author_id = record.author_id;
        let actor = viewer.id;
        tokio::spawn(async move {
            if let Err(e) = fanout
                .notify_subscribers(ticket_id, author_id, actor, &notification_text)
                .await
            {
                warn!(ticket_id = %ticket_id, error = %e, "Subscriber fan-out failed");
            }
        });
        Ok(())
    }

    async fn render_one(
        &self,
        viewer: &User,
        record: &TicketRecord,
        with_attachments: bool,
    ) -> AppResult<TicketView> {
        let tags = self.tickets.tags_for(record.id).await?;
        let voted = self
            .votes
            .user_votes(viewer.id)
            .await?
            .contains(&record.id);
        let subscribed = self
            .subscriptions
            .is_subscribed(viewer.id, record.id)
            .await?;
        let attachments = if with_attachments {
            Some(self.attachments.list_for_ticket(record.id).await?)
        } else {
            None
        };
        Ok(render_ticket(
            record, viewer, tags, voted, subscribed, attachments,
        ))
    }
}

fn viewer_of(user: &User) -> TicketViewer {
    TicketViewer {
        user_id: user.id,
        is_admin: user.is_admin,
    }
}

/// Assemble a view with the author masked for the viewer.
fn render_ticket(
    record: &TicketRecord,
    viewer: &User,
    tags: Vec<Tag>,
    user_voted: bool,
    user_subscribed: bool,
    attachments: Option<Vec<Attachment>>,
) -> TicketView {
    let author_identity = record.author_identity();
    let author = mask_identity(
        &author_identity,
        viewer.is_admin,
        record.author_id == viewer.id,
    );

    TicketView {
        id: record.id,
        title: record.title.clone(),
        description: record.description.clone(),
        kind: record.kind,
        status: record.status,
        priority: record.priority,
        is_private: record.is_private,
        author,
        assigned_to: record.assigned_to,
        votes_count: record.votes_count,
        message_count: record.message_count,
        tags,
        user_voted,
        user_subscribed,
        created_at: record.created_at,
        updated_at: record.updated_at,
        closed_at: record.closed_at,
        attachments,
    }
}

//! Message orchestration: the ticket thread, posting with attachments,
//! editing, reactions, and the notification side effects.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use tickethub_core::error::AppError;
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{MessageId, TicketId};
use tickethub_database::repositories::attachment::AttachmentRepository;
use tickethub_database::repositories::message::MessageRepository;
use tickethub_database::repositories::reaction::ReactionRepository;
use tickethub_database::repositories::subscription::SubscriptionRepository;
use tickethub_database::repositories::ticket::TicketRepository;
use tickethub_entity::message::{
    aggregate_reactions, Attachment, CreateAttachment, CreateMessage, MessageRecord,
    ReactionGroup,
};
use tickethub_entity::ticket::TicketRecord;
use tickethub_entity::user::{mask_identity, MaskedIdentity, User};

use crate::notification::{render, NotificationFanout};
use crate::ticket::TicketService;
use crate::upload::{StoredUpload, UploadStore};

/// Longest accepted reaction emoji, in characters.
const MAX_EMOJI_CHARS: usize = 10;

/// A message as rendered for a viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: MessageId,
    pub ticket_id: TicketId,
    pub author: MaskedIdentity,
    pub author_is_admin: bool,
    pub content: String,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
    pub reactions: Vec<ReactionGroup>,
}

/// Message application service.
#[derive(Debug, Clone)]
pub struct MessageService {
    messages: Arc<MessageRepository>,
    attachments: Arc<AttachmentRepository>,
    reactions: Arc<ReactionRepository>,
    tickets: Arc<TicketRepository>,
    subscriptions: Arc<SubscriptionRepository>,
    uploads: UploadStore,
    fanout: Arc<NotificationFanout>,
}

impl MessageService {
    /// Create the message service.
    pub fn new(
        messages: Arc<MessageRepository>,
        attachments: Arc<AttachmentRepository>,
        reactions: Arc<ReactionRepository>,
        tickets: Arc<TicketRepository>,
        subscriptions: Arc<SubscriptionRepository>,
        uploads: UploadStore,
        fanout: Arc<NotificationFanout>,
    ) -> Self {
        Self {
            messages,
            attachments,
            reactions,
            tickets,
            subscriptions,
            uploads,
            fanout,
        }
    }

    /// The full thread of a ticket, with attachments and reactions.
    pub async fn thread(&self, viewer: &User, ticket_id: TicketId) -> AppResult<Vec<MessageView>> {
        let ticket = self.visible_ticket(viewer, ticket_id).await?;

        let records = self.messages.list_for_ticket(ticket.id).await?;
        let attachments = self.attachments.list_for_ticket_messages(ticket.id).await?;
        let reactions = self.reactions.list_for_ticket(ticket.id).await?;

        Ok(records
            .iter()
            .map(|record| {
                let message_attachments = attachments
                    .iter()
                    .filter(|a| a.message_id == Some(record.id))
                    .cloned()
                    .collect();
                let raw: Vec<_> = reactions
                    .iter()
                    .filter(|r| r.message_id == record.id)
                    .cloned()
                    .collect();
                render_message(
                    record,
                    viewer,
                    message_attachments,
                    aggregate_reactions(&raw, viewer.id, viewer.is_admin),
                )
            })
            .collect())
    }

    /// Post a message, optionally with already-stored uploads.
    ///
    /// Auto-subscribes the author and fans the event out to subscribers.
    /// Non-admins cannot post on archived tickets.
    pub async fn add(
        &self,
        viewer: &User,
        ticket_id: TicketId,
        content: String,
        files: Vec<StoredUpload>,
    ) -> AppResult<MessageView> {
        let ticket = self.visible_ticket(viewer, ticket_id).await?;

        if ticket.status.is_archived() && !viewer.is_admin {
            return Err(AppError::authorization(
                "Ticket is closed — posting is disabled",
            ));
        }
        if content.trim().is_empty() && files.is_empty() {
            return Err(AppError::validation("Content or files required"));
        }

        let record = self
            .messages
            .add(&CreateMessage {
                ticket_id,
                author_id: viewer.id,
                content,
                is_system: false,
            })
            .await?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            stored.push(
                self.attachments
                    .add(&CreateAttachment {
                        ticket_id,
                        message_id: Some(record.id),
                        filename: file.filename,
                        original_name: file.original_name,
                        mime_type: file.mime_type,
                        size: file.size,
                    })
                    .await?,
            );
        }

        self.tickets.touch(ticket_id).await?;
        self.subscriptions.subscribe(viewer.id, ticket_id).await?;

        let text = render::new_message(
            ticket_id,
            &ticket.title,
            &render::author_label(viewer),
            &record.content,
        );
        let fanout = Arc::clone(&self.fanout);
        let author_id = ticket.author_id;
        let actor = viewer.id;
        tokio::spawn(async move {
            if let Err(e) = fanout
                .notify_subscribers(ticket_id, author_id, actor, &text)
                .await
            {
                warn!(ticket_id = %ticket_id, error = %e, "Subscriber fan-out failed");
            }
        });

        Ok(render_message(&record, viewer, stored, Vec::new()))
    }

    /// Messages newer than `after`, for live polling.
    pub async fn poll(
        &self,
        viewer: &User,
        ticket_id: TicketId,
        after: MessageId,
    ) -> AppResult<Vec<MessageView>> {
        let ticket = self.visible_ticket(viewer, ticket_id).await?;
        let records = self.messages.list_since(ticket.id, after).await?;

        let mut views = Vec::with_capacity(records.len());
        for record in &records {
            let attachments = self.attachments.list_for_message(record.id).await?;
            let raw = self.reactions.list_for_message(record.id).await?;
            views.push(render_message(
                record,
                viewer,
                attachments,
                aggregate_reactions(&raw, viewer.id, viewer.is_admin),
            ));
        }
        Ok(views)
    }

    /// Edit a message's content (author or admin; system messages are
    /// immutable).
    pub async fn edit(
        &self,
        viewer: &User,
        message_id: MessageId,
        content: String,
    ) -> AppResult<MessageView> {
        let message = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found"))?;

        if !viewer.is_admin && message.author_id != viewer.id {
            return Err(AppError::authorization("Access denied"));
        }
        if message.is_system {
            return Err(AppError::validation("System messages cannot be edited"));
        }
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::validation("Content required"));
        }

        let record = self.messages.update_content(message_id, &content).await?;
        let attachments = self.attachments.list_for_message(message_id).await?;
        let raw = self.reactions.list_for_message(message_id).await?;
        Ok(render_message(
            &record,
            viewer,
            attachments,
            aggregate_reactions(&raw, viewer.id, viewer.is_admin),
        ))
    }

    /// Delete a message and its attachment files (author or admin).
    pub async fn delete(&self, viewer: &User, message_id: MessageId) -> AppResult<()> {
        let message = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found"))?;

        if !viewer.is_admin && message.author_id != viewer.id {
            return Err(AppError::authorization("Access denied"));
        }

        for attachment in self.attachments.list_for_message(message_id).await? {
            self.uploads.delete(&attachment.filename).await;
        }
        self.messages.delete(message_id).await
    }

    /// Toggle the viewer's reaction on a message; returns whether it was
    /// added and the message's updated reaction groups.
    pub async fn toggle_reaction(
        &self,
        viewer: &User,
        message_id: MessageId,
        emoji: &str,
    ) -> AppResult<(bool, Vec<ReactionGroup>)> {
        if emoji.is_empty() || emoji.chars().count() > MAX_EMOJI_CHARS {
            return Err(AppError::validation("Invalid emoji"));
        }

        let message = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found"))?;
        let _ = self.visible_ticket(viewer, message.ticket_id).await?;

        let added = self.reactions.toggle(message_id, viewer.id, emoji).await?;
        let raw = self.reactions.list_for_message(message_id).await?;
        Ok((
            added,
            aggregate_reactions(&raw, viewer.id, viewer.is_admin),
        ))
    }

    /// Per-message reaction groups for a whole ticket, for live polling.
    pub async fn reactions_for_ticket(
        &self,
        viewer: &User,
        ticket_id: TicketId,
    ) -> AppResult<BTreeMap<MessageId, Vec<ReactionGroup>>> {
        let ticket = self.visible_ticket(viewer, ticket_id).await?;
        let raw = self.reactions.list_for_ticket(ticket.id).await?;

        let mut per_message: BTreeMap<MessageId, Vec<_>> = BTreeMap::new();
        for record in raw {
            per_message.entry(record.message_id).or_default().push(record);
        }

        Ok(per_message
            .into_iter()
            .map(|(id, records)| {
                (
                    id,
                    aggregate_reactions(&records, viewer.id, viewer.is_admin),
                )
            })
            .collect())
    }

    async fn visible_ticket(&self, viewer: &User, ticket_id: TicketId) -> AppResult<TicketRecord> {
        let record = self
            .tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ticket {ticket_id} not found")))?;
        if !TicketService::can_view(viewer, &record) {
            return Err(AppError::authorization("Access denied"));
        }
        Ok(record)
    }
}

/// Assemble a message view with the author masked for the viewer.
fn render_message(
    record: &MessageRecord,
    viewer: &User,
    attachments: Vec<Attachment>,
    reactions: Vec<ReactionGroup>,
) -> MessageView {
    let identity = record.author_identity();
    MessageView {
        id: record.id,
        ticket_id: record.ticket_id,
        author: mask_identity(&identity, viewer.is_admin, record.author_id == viewer.id),
        author_is_admin: record.author_is_admin,
        content: record.content.clone(),
        is_system: record.is_system,
        created_at: record.created_at,
        attachments,
        reactions,
    }
}

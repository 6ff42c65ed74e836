//! Message and reaction handlers.

use std::collections::BTreeMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use tickethub_core::error::AppError;
use tickethub_core::types::id::{MessageId, TicketId};
use tickethub_entity::message::ReactionGroup;
use tickethub_service::message::MessageView;
use tickethub_service::upload::StoredUpload;

use crate::dto::request::{EditMessageRequest, PollParams, ReactionRequest};
use crate::dto::response::OkResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/tickets/{id}/messages — the full thread.
pub async fn thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<TicketId>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    Ok(Json(
        state.message_service.thread(&auth.user, ticket_id).await?,
    ))
}

/// POST /api/tickets/{id}/messages — multipart: a `content` text field
/// plus any number of `files` fields.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<TicketId>,
    mut multipart: Multipart,
) -> Result<Json<MessageView>, ApiError> {
    let max_files = state.config.uploads.max_files_per_message;
    let mut content = String::new();
    let mut files: Vec<StoredUpload> = Vec::new();

    let stored_cleanup = |state: AppState, files: Vec<StoredUpload>| async move {
        for file in files {
            state.upload_store.delete(&file.filename).await;
        }
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                stored_cleanup(state.clone(), files).await;
                return Err(ApiError(AppError::validation(format!(
                    "Upload error: {e}"
                ))));
            }
        };

        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("content") => {
                content = field.text().await.unwrap_or_default();
            }
            Some("files") => {
                if files.len() >= max_files {
                    stored_cleanup(state.clone(), files).await;
                    return Err(ApiError::validation("Too many files"));
                }
                let original_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "file".to_string());
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        stored_cleanup(state.clone(), files).await;
                        return Err(ApiError(AppError::validation(format!(
                            "Upload error: {e}"
                        ))));
                    }
                };
                match state.upload_store.save(&original_name, &bytes).await {
                    Ok(stored) => files.push(stored),
                    Err(e) => {
                        stored_cleanup(state.clone(), files).await;
                        return Err(e.into());
                    }
                }
            }
            _ => {}
        }
    }

    match state
        .message_service
        .add(&auth.user, ticket_id, content, files.clone())
        .await
    {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            // The message was rejected; its stored files are orphans.
            stored_cleanup(state, files).await;
            Err(e.into())
        }
    }
}

/// GET /api/tickets/{id}/messages/poll?after=N
pub async fn poll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<TicketId>,
    Query(params): Query<PollParams>,
) -> Result<Json<MessagesPollResponse>, ApiError> {
    let after = MessageId(params.after.unwrap_or(0));
    let messages = state
        .message_service
        .poll(&auth.user, ticket_id, after)
        .await?;
    Ok(Json(MessagesPollResponse { messages }))
}

/// PUT /api/messages/{id}
pub async fn edit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MessageId>,
    Json(req): Json<EditMessageRequest>,
) -> Result<Json<MessageView>, ApiError> {
    Ok(Json(
        state.message_service.edit(&auth.user, id, req.content).await?,
    ))
}

/// DELETE /api/messages/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MessageId>,
) -> Result<Json<OkResponse>, ApiError> {
    state.message_service.delete(&auth.user, id).await?;
    Ok(Json(OkResponse::ok()))
}

/// POST /api/messages/{id}/reactions
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MessageId>,
    Json(req): Json<ReactionRequest>,
) -> Result<Json<ReactionToggleResponse>, ApiError> {
    let (added, reactions) = state
        .message_service
        .toggle_reaction(&auth.user, id, &req.emoji)
        .await?;
    Ok(Json(ReactionToggleResponse { added, reactions }))
}

/// GET /api/tickets/{id}/reactions/poll
pub async fn reactions_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<TicketId>,
) -> Result<Json<ReactionsPollResponse>, ApiError> {
    let reactions = state
        .message_service
        .reactions_for_ticket(&auth.user, ticket_id)
        .await?;
    Ok(Json(ReactionsPollResponse { reactions }))
}

/// Response of the message poll endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesPollResponse {
    pub messages: Vec<MessageView>,
}

/// Response of the reaction toggle endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionToggleResponse {
    pub added: bool,
    pub reactions: Vec<ReactionGroup>,
}

/// Response of the reaction poll endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionsPollResponse {
    pub reactions: BTreeMap<MessageId, Vec<ReactionGroup>>,
}

//! Ticket handlers.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;

use tickethub_core::types::id::TicketId;
use tickethub_core::types::pagination::PageResponse;
use tickethub_entity::ticket::{CreateTicket, TicketFilter, TicketPriority, TicketStatus, UpdateTicket};
use tickethub_service::ticket::TicketView;

use crate::dto::request::{CreateTicketRequest, TicketListParams};
use crate::dto::response::{OkResponse, SubscribedResponse, VoteResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/tickets
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TicketListParams>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<PageResponse<TicketView>>, ApiError> {
    let filter = TicketFilter {
        status: params.status,
        kind: params.kind,
        priority: params.priority,
        author_id: params.author_id,
        search: params.search,
        tag_id: params.tag_id,
    };
    let result = state
        .ticket_service
        .list(&auth.user, &filter, page.into_page_request())
        .await?;
    Ok(Json(result))
}

/// GET /api/tickets/kanban
pub async fn kanban(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<HashMap<TicketStatus, Vec<TicketView>>>, ApiError> {
    Ok(Json(state.ticket_service.kanban(&auth.user).await?))
}

/// GET /api/tickets/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TicketId>,
) -> Result<Json<TicketView>, ApiError> {
    Ok(Json(state.ticket_service.get(&auth.user, id).await?))
}

/// POST /api/tickets
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTicketRequest>,
) -> Result<Json<TicketView>, ApiError> {
    let data = CreateTicket {
        title: req.title,
        description: req.description.unwrap_or_default(),
        kind: req.kind,
        priority: req.priority.unwrap_or(TicketPriority::Medium),
        is_private: req.is_private.unwrap_or(false),
        author_id: auth.user.id,
        tags: req.tags.unwrap_or_default(),
    };
    Ok(Json(state.ticket_service.create(&auth.user, data).await?))
}

/// PUT /api/tickets/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TicketId>,
    Json(updates): Json<UpdateTicket>,
) -> Result<Json<TicketView>, ApiError> {
    Ok(Json(
        state.ticket_service.update(&auth.user, id, updates).await?,
    ))
}

/// DELETE /api/tickets/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TicketId>,
) -> Result<Json<OkResponse>, ApiError> {
    state.ticket_service.delete(&auth.user, id).await?;
    Ok(Json(OkResponse::ok()))
}

/// POST /api/tickets/{id}/vote
pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TicketId>,
) -> Result<Json<VoteResponse>, ApiError> {
    let (voted, votes_count) = state.ticket_service.toggle_vote(&auth.user, id).await?;
    Ok(Json(VoteResponse { voted, votes_count }))
}

/// POST /api/tickets/{id}/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TicketId>,
) -> Result<Json<SubscribedResponse>, ApiError> {
    state.ticket_service.subscribe(&auth.user, id).await?;
    Ok(Json(SubscribedResponse { subscribed: true }))
}

/// POST /api/tickets/{id}/unsubscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TicketId>,
) -> Result<Json<SubscribedResponse>, ApiError> {
    state.ticket_service.unsubscribe(&auth.user, id).await?;
    Ok(Json(SubscribedResponse { subscribed: false }))
}

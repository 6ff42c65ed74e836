//! Presence handlers: heartbeat, online list, the SSE stream, and
//! typing signals.
//!
//! Heartbeat and typing pings are best-effort signals — they always
//! acknowledge and never surface an error to the client.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast;
use tracing::debug;

use tickethub_core::types::id::TicketId;
use tickethub_entity::presence::ViewKind;

use crate::dto::request::{HeartbeatRequest, TypingRequest};
use crate::dto::response::{OkResponse, OnlineResponse, TypingResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/presence/heartbeat — the client reports its view every few
/// seconds.
pub async fn heartbeat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<HeartbeatRequest>,
) -> Json<OkResponse> {
    // Opportunistic profile refresh; cooldown-gated and spawned so the
    // heartbeat never waits on Telegram.
    if let Some(refresher) = &state.profile_refresher {
        let refresher = refresher.clone();
        let user = auth.user.clone();
        tokio::spawn(async move {
            if let Err(e) = refresher.refresh_if_due(&user).await {
                debug!(user_id = %user.id, error = %e, "Profile refresh failed");
            }
        });
    }

    state.presence.heartbeat(
        &auth.token,
        auth.user.clone(),
        req.view.unwrap_or(ViewKind::List),
        req.ticket_id,
        req.ticket_title,
    );

    Json(OkResponse::ok())
}

/// GET /api/presence/online — the masked online list for the caller.
pub async fn online(State(state): State<AppState>, auth: AuthUser) -> Json<OnlineResponse> {
    let users = state.presence.online_for_viewer(&auth.user);
    let count = users.len();
    Json(OnlineResponse { users, count })
}

/// GET /api/presence/stream — SSE stream of publicly-masked presence
/// updates. The current snapshot is sent immediately on connect.
pub async fn stream(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let initial = state.presence.current_payload();
    let rx = state.presence.subscribe();

    let first = stream::once(async move { Ok(Event::default().data(initial)) });
    let updates = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(payload) => return Some((Ok(Event::default().data(payload)), rx)),
                // A lagged receiver just waits for the next full frame.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(first.chain(updates)).keep_alive(KeepAlive::default())
}

/// POST /api/presence/typing — the caller is composing a message.
pub async fn typing_ping(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<TypingRequest>,
) -> Json<OkResponse> {
    if let Some(ticket_id) = req.ticket_id {
        state.presence.typing_ping(ticket_id, auth.user.clone());
    }
    Json(OkResponse::ok())
}

/// GET /api/presence/typing/{ticket_id} — who else is typing there.
pub async fn typing_in_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<TicketId>,
) -> Result<Json<TypingResponse>, ApiError> {
    let typing = state.presence.typing_for_viewer(ticket_id, &auth.user);
    Ok(Json(TypingResponse { typing }))
}

//! Route definitions for the TicketHub HTTP API.
//!
//! All API routes are organized by domain and mounted under `/api`;
//! uploaded files are served statically under `/uploads`.

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Room for a full multipart message: every file plus form overhead.
    let max_body = state.config.uploads.max_file_size_bytes as usize
        * state.config.uploads.max_files_per_message
        + 1024 * 1024;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(ticket_routes())
        .merge(message_routes())
        .merge(presence_routes())
        .merge(user_routes())
        .merge(misc_routes());

    let uploads = ServeDir::new(&state.config.uploads.dir);

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Auth endpoints: WebApp auth, the deep-link flow, dev login, me,
/// logout.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/webapp", post(handlers::auth::webapp))
        .route("/auth/request", post(handlers::auth::request_login))
        .route("/auth/check/{token}", get(handlers::auth::check_login))
        .route("/auth/dev", post(handlers::auth::dev_login))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/logout", post(handlers::auth::logout))
}

/// Ticket CRUD, board, votes, subscriptions.
fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(handlers::ticket::list))
        .route("/tickets", post(handlers::ticket::create))
        .route("/tickets/kanban", get(handlers::ticket::kanban))
        .route("/tickets/{id}", get(handlers::ticket::get))
        .route("/tickets/{id}", put(handlers::ticket::update))
        .route("/tickets/{id}", delete(handlers::ticket::delete))
        .route("/tickets/{id}/vote", post(handlers::ticket::vote))
        .route("/tickets/{id}/subscribe", post(handlers::ticket::subscribe))
        .route(
            "/tickets/{id}/unsubscribe",
            post(handlers::ticket::unsubscribe),
        )
}

/// Thread, message CRUD, reactions, live polling.
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets/{id}/messages", get(handlers::message::thread))
        .route("/tickets/{id}/messages", post(handlers::message::create))
        .route(
            "/tickets/{id}/messages/poll",
            get(handlers::message::poll),
        )
        .route(
            "/tickets/{id}/reactions/poll",
            get(handlers::message::reactions_poll),
        )
        .route("/messages/{id}", put(handlers::message::edit))
        .route("/messages/{id}", delete(handlers::message::delete))
        .route(
            "/messages/{id}/reactions",
            post(handlers::message::toggle_reaction),
        )
}

/// Presence endpoints: heartbeat, online list, SSE stream, typing.
fn presence_routes() -> Router<AppState> {
    Router::new()
        .route("/presence/heartbeat", post(handlers::presence::heartbeat))
        .route("/presence/online", get(handlers::presence::online))
        .route("/presence/stream", get(handlers::presence::stream))
        .route("/presence/typing", post(handlers::presence::typing_ping))
        .route(
            "/presence/typing/{ticket_id}",
            get(handlers::presence::typing_in_ticket),
        )
}

/// User directory and settings.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::user::directory))
        .route("/settings", get(handlers::user::get_settings))
        .route("/settings", put(handlers::user::update_settings))
        .route("/settings/avatar", post(handlers::user::upload_avatar))
}

/// Tags, stats, public config, health.
fn misc_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(handlers::tag::list))
        .route("/tags", post(handlers::tag::create))
        .route("/stats", get(handlers::stats::tracker_stats))
        .route("/config", get(handlers::config::public_config))
        .route("/health", get(handlers::health::health_check))
}

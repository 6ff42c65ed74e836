//! # tickethub-api
//!
//! The HTTP surface of TicketHub: an axum router over the application
//! services, bearer-token auth via the `AuthUser` extractor, the
//! presence SSE stream, and the static uploads route.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

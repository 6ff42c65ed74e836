//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::SqlitePool;

use tickethub_auth::session::SessionManager;
use tickethub_core::config::AppConfig;
use tickethub_database::repositories::login_token::LoginTokenRepository;
use tickethub_database::repositories::stats::StatsRepository;
use tickethub_database::repositories::tag::TagRepository;
use tickethub_database::repositories::user::UserRepository;
use tickethub_presence::PresenceService;
use tickethub_service::message::MessageService;
use tickethub_service::ticket::TicketService;
use tickethub_service::upload::UploadStore;
use tickethub_service::user::{ProfileRefresher, UserService};
use tickethub_telegram::avatar::AvatarFetcher;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// SQLite connection pool (health checks).
    pub db_pool: SqlitePool,

    // ── Auth ─────────────────────────────────────────────────
    /// Session lifecycle manager.
    pub session_manager: Arc<SessionManager>,
    /// Login-token repository (deep-link auth flow).
    pub login_tokens: Arc<LoginTokenRepository>,

    // ── Repositories used directly by thin handlers ──────────
    /// User repository.
    pub user_repo: Arc<UserRepository>,
    /// Tag repository.
    pub tag_repo: Arc<TagRepository>,
    /// Stats repository.
    pub stats_repo: Arc<StatsRepository>,

    // ── Services ─────────────────────────────────────────────
    /// Ticket service.
    pub ticket_service: Arc<TicketService>,
    /// Message service.
    pub message_service: Arc<MessageService>,
    /// User directory/settings service.
    pub user_service: Arc<UserService>,
    /// Live presence service.
    pub presence: Arc<PresenceService>,
    /// Upload storage.
    pub upload_store: UploadStore,

    // ── Telegram (absent in dev mode) ────────────────────────
    /// Cooldown-gated profile refresher.
    pub profile_refresher: Option<Arc<ProfileRefresher>>,
    /// Avatar downloader used during WebApp auth.
    pub avatar_fetcher: Option<AvatarFetcher>,
}

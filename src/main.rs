//! TicketHub Server — ticket tracker with Telegram auth and live presence.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{fmt, EnvFilter};

use tickethub_core::config::AppConfig;
use tickethub_core::error::AppError;
use tickethub_presence::{PresenceService, SystemClock};
use tickethub_telegram::avatar::AvatarFetcher;
use tickethub_telegram::outbound::DisabledMessenger;
use tickethub_telegram::{Messenger, TelegramClient};

#[tokio::main]
async fn main() {
    let env = std::env::var("TICKETHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TicketHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = tickethub_database::connection::create_pool(&config.database).await?;
    tickethub_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let user_repo = Arc::new(tickethub_database::repositories::user::UserRepository::new(
        db_pool.clone(),
    ));
    let session_repo = Arc::new(
        tickethub_database::repositories::session::SessionRepository::new(db_pool.clone()),
    );
    let login_token_repo = Arc::new(
        tickethub_database::repositories::login_token::LoginTokenRepository::new(db_pool.clone()),
    );
    let ticket_repo = Arc::new(
        tickethub_database::repositories::ticket::TicketRepository::new(db_pool.clone()),
    );
    let message_repo = Arc::new(
        tickethub_database::repositories::message::MessageRepository::new(db_pool.clone()),
    );
    let attachment_repo = Arc::new(
        tickethub_database::repositories::attachment::AttachmentRepository::new(db_pool.clone()),
    );
    let reaction_repo = Arc::new(
        tickethub_database::repositories::reaction::ReactionRepository::new(db_pool.clone()),
    );
    let vote_repo = Arc::new(tickethub_database::repositories::vote::VoteRepository::new(
        db_pool.clone(),
    ));
    let subscription_repo = Arc::new(
        tickethub_database::repositories::subscription::SubscriptionRepository::new(
            db_pool.clone(),
        ),
    );
    let tag_repo = Arc::new(tickethub_database::repositories::tag::TagRepository::new(
        db_pool.clone(),
    ));
    let stats_repo = Arc::new(tickethub_database::repositories::stats::StatsRepository::new(
        db_pool.clone(),
    ));

    // ── Step 3: Auth ─────────────────────────────────────────────
    let session_manager = Arc::new(tickethub_auth::session::SessionManager::new(
        Arc::clone(&session_repo),
        Arc::clone(&user_repo),
        config.session.clone(),
    ));
    let session_cleanup = Arc::new(tickethub_auth::session::SessionCleanup::new(
        Arc::clone(&session_repo),
        Arc::clone(&login_token_repo),
        config.session.clone(),
    ));

    // ── Step 4: Telegram integration ─────────────────────────────
    let telegram_enabled = config.telegram.enabled();
    let telegram_client = if telegram_enabled {
        Some(Arc::new(TelegramClient::new(config.telegram.clone())))
    } else {
        tracing::warn!("BOT_TOKEN not set — dev mode (no Telegram auth, no notifications)");
        None
    };

    let avatar_fetcher = telegram_client
        .as_ref()
        .map(|client| AvatarFetcher::new(Arc::clone(client), config.uploads.dir.clone()));

    let messenger: Arc<dyn Messenger> = match &telegram_client {
        Some(client) => Arc::clone(client) as Arc<dyn Messenger>,
        None => Arc::new(DisabledMessenger),
    };

    let profile_refresher = match (&telegram_client, &avatar_fetcher) {
        (Some(client), Some(fetcher)) => Some(Arc::new(
            tickethub_service::user::ProfileRefresher::new(
                Arc::clone(client),
                Arc::clone(&user_repo),
                fetcher.clone(),
                config.presence.profile_refresh_cooldown_minutes,
            ),
        )),
        _ => None,
    };

    // ── Step 5: Services ─────────────────────────────────────────
    let fanout = Arc::new(tickethub_service::notification::NotificationFanout::new(
        Arc::clone(&subscription_repo),
        Arc::clone(&user_repo),
        messenger,
        config.server.site_url.clone(),
        config.server.site_is_https(),
        config.telegram.admin_telegram_id,
    ));

    let upload_store = tickethub_service::upload::UploadStore::new(&config.uploads);

    let ticket_service = Arc::new(tickethub_service::ticket::TicketService::new(
        Arc::clone(&ticket_repo),
        Arc::clone(&message_repo),
        Arc::clone(&attachment_repo),
        Arc::clone(&vote_repo),
        Arc::clone(&subscription_repo),
        Arc::clone(&fanout),
    ));
    let message_service = Arc::new(tickethub_service::message::MessageService::new(
        Arc::clone(&message_repo),
        Arc::clone(&attachment_repo),
        Arc::clone(&reaction_repo),
        Arc::clone(&ticket_repo),
        Arc::clone(&subscription_repo),
        upload_store.clone(),
        Arc::clone(&fanout),
    ));
    let user_service = Arc::new(tickethub_service::user::UserService::new(Arc::clone(
        &user_repo,
    )));

    // ── Step 6: Presence service + sweep ─────────────────────────
    let presence = Arc::new(PresenceService::new(
        config.presence.clone(),
        Arc::new(SystemClock),
    ));
    presence.start();
    tracing::info!(
        "Presence service started (sweep every {}s)",
        config.presence.sweep_interval_seconds
    );

    // ── Step 7: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 8: Bot poller ───────────────────────────────────────
    let poller_handle = match &telegram_client {
        Some(client) => {
            let poller = tickethub_telegram::poller::UpdatePoller::new(
                Arc::clone(client),
                Arc::clone(&user_repo),
                Arc::clone(&login_token_repo),
                avatar_fetcher.clone().expect("fetcher exists with client"),
                config.telegram.clone(),
                config.server.clone(),
            );
            let rx = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                poller.run(rx).await;
            }))
        }
        None => None,
    };

    // ── Step 9: Background worker ────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = tickethub_worker::WorkerScheduler::new(config.worker.clone()).await?;
        scheduler
            .register_session_cleanup(
                Arc::clone(&session_cleanup),
                config.session.cleanup_interval_minutes,
            )
            .await?;
        if let Some(refresher) = &profile_refresher {
            scheduler.register_avatar_refresh(Arc::clone(refresher)).await?;
        }
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── Step 10: HTTP server ─────────────────────────────────────
    let app_state = tickethub_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        session_manager,
        login_tokens: login_token_repo,
        user_repo,
        tag_repo,
        stats_repo,
        ticket_service,
        message_service,
        user_service,
        presence: Arc::clone(&presence),
        upload_store,
        profile_refresher,
        avatar_fetcher,
    };

    let app = tickethub_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("TicketHub server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 11: Stop background tasks ───────────────────────────
    presence.stop();
    if let Some(scheduler) = scheduler.as_mut() {
        let _ = scheduler.shutdown().await;
    }
    if let Some(handle) = poller_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    tracing::info!("TicketHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

//! SQLite connection pool management.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use tickethub_core::config::DatabaseConfig;
use tickethub_core::error::{AppError, ErrorKind};

/// Create the SQLite connection pool from configuration.
///
/// Enables WAL journal mode and foreign-key enforcement, and creates the
/// database file (and its parent directory) if missing.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, AppError> {
    if let Some(parent) = Path::new(&config.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!(
        path = %config.path,
        max_connections = config.max_connections,
        "Opening SQLite database"
    );

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path))
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Invalid database path", e)
        })?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect_with(options)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to open database: {e}"),
                e,
            )
        })?;

    info!("SQLite database opened");
    Ok(pool)
}

/// Check database connectivity.
pub async fn health_check(pool: &SqlitePool) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|v| v == 1)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
}

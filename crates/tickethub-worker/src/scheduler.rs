//! Cron scheduler for periodic maintenance tasks.
//!
//! Jobs run inline in their scheduled closure — there is no job queue;
//! every task here is a small fixed-interval sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use tickethub_auth::session::SessionCleanup;
use tickethub_core::config::WorkerConfig;
use tickethub_core::error::AppError;
use tickethub_service::user::ProfileRefresher;

/// Cron-based scheduler for periodic background tasks.
pub struct WorkerScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Worker configuration.
    config: WorkerConfig,
}

impl std::fmt::Debug for WorkerScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerScheduler").finish()
    }
}

impl WorkerScheduler {
    /// Create a new scheduler.
    pub async fn new(config: WorkerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler, config })
    }

    /// Session and login-token cleanup on the configured interval.
    pub async fn register_session_cleanup(
        &self,
        cleanup: Arc<SessionCleanup>,
        interval_minutes: u32,
    ) -> Result<(), AppError> {
        let schedule = format!("0 */{} * * * *", interval_minutes.clamp(1, 59));
        let job = CronJob::new_async(schedule.as_str(), move |_uuid, _lock| {
            let cleanup = Arc::clone(&cleanup);
            Box::pin(async move {
                tracing::debug!("Running session cleanup");
                if let Err(e) = cleanup.run_cleanup().await {
                    tracing::error!("Session cleanup failed: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create session_cleanup schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add session_cleanup schedule: {}", e))
        })?;

        tracing::info!("Registered: session_cleanup (every {}min)", interval_minutes);
        Ok(())
    }

    /// Avatar refresh sweep every few hours, best-effort, rate-limited
    /// per user.
    pub async fn register_avatar_refresh(
        &self,
        refresher: Arc<ProfileRefresher>,
    ) -> Result<(), AppError> {
        let hours = self.config.avatar_refresh_hours.clamp(1, 23);
        let delay = Duration::from_millis(self.config.avatar_refresh_delay_ms);
        let schedule = format!("0 0 */{hours} * * *");

        let job = CronJob::new_async(schedule.as_str(), move |_uuid, _lock| {
            let refresher = Arc::clone(&refresher);
            Box::pin(async move {
                tracing::info!("Running avatar refresh sweep");
                match refresher.refresh_all_avatars(delay).await {
                    Ok(refreshed) => {
                        tracing::info!("Avatar refresh sweep done, {} updated", refreshed);
                    }
                    Err(e) => {
                        tracing::error!("Avatar refresh sweep failed: {}", e);
                    }
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create avatar_refresh schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add avatar_refresh schedule: {}", e))
        })?;

        tracing::info!("Registered: avatar_refresh (every {}h)", hours);
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Worker scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Worker scheduler shut down");
        Ok(())
    }
}

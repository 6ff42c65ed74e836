//! # tickethub-worker
//!
//! Cron scheduler for the periodic background jobs: session/login-token
//! cleanup and the Telegram avatar refresh sweep. The presence sweep is
//! owned by the presence service itself, not by this crate.

pub mod scheduler;

pub use scheduler::WorkerScheduler;

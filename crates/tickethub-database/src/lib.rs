//! # tickethub-database
//!
//! SQLite connection pool, migration runner, and one repository per
//! aggregate. All queries are direct SQL; errors are wrapped into the
//! unified `AppError` with context.

pub mod connection;
pub mod migration;
pub mod repositories;

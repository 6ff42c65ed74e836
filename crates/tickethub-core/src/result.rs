//! Application-wide result alias.

use crate::error::AppError;

/// Result alias used throughout TicketHub.
pub type AppResult<T> = Result<T, AppError>;

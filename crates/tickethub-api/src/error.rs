//! Maps domain `AppError` to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use tickethub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Newtype over [`AppError`] carrying the HTTP mapping.
///
/// Handlers return `Result<_, ApiError>`, and `?` on any `AppResult`
/// converts through `From<AppError>`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, code) = match err.kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ErrorKind::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
            _ => {
                tracing::error!(error = %err, "Internal server error");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorResponse {
                        error: "INTERNAL_ERROR".to_string(),
                        // Internal details stay in the logs.
                        message: "Internal server error".to_string(),
                    }),
                )
                    .into_response();
            }
        };

        let body = ApiErrorResponse {
            error: code.to_string(),
            message: err.message,
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// Shorthand for a forbidden response.
    pub fn forbidden(message: &str) -> Self {
        Self(AppError::authorization(message))
    }

    /// Shorthand for a bad-request response.
    pub fn validation(message: &str) -> Self {
        Self(AppError::validation(message))
    }
}

//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup failures
//! in the binary, and `AppError` for failures inside a single HTTP request.

use crate::config::ConfigError;
use afrilead_core::ports::PortError;
use afrilead_core::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//=========================================================================================
// Per-request Errors
//=========================================================================================

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// An error returned by a route handler, rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<PortError> for AppError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => Self::not_found(what),
            PortError::Conflict(what) => Self::conflict(what),
            PortError::Unauthorized => Self::unauthorized(),
            PortError::Unexpected(detail) => {
                error!("Store operation failed: {}", detail);
                Self::internal()
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.0)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_status_codes() {
        let cases = [
            (PortError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (PortError::Conflict("x".into()), StatusCode::CONFLICT),
            (PortError::Unauthorized, StatusCode::UNAUTHORIZED),
            (PortError::Unexpected("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (port_err, status) in cases {
            assert_eq!(AppError::from(port_err).status, status);
        }
    }

    #[test]
    fn unexpected_errors_hide_details() {
        let err = AppError::from(PortError::Unexpected("connection refused".into()));
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn startup_errors_name_their_source() {
        let err = ApiError::from(ConfigError::MissingVar("DATABASE_URL".into()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing the environment variable DATABASE_URL"
        );
        let err = ApiError::from(std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy"));
        assert!(matches!(err, ApiError::Io(_)));
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = AppError::from(ValidationError::new("Invalid role"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid role");
    }
}

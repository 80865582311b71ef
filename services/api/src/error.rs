//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its mapping
//! to structured HTTP error payloads.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;
use lingua_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The wire shape of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Stable machine-readable kind.
    pub kind: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Port(PortError::AuthenticationRequired) => {
                (StatusCode::UNAUTHORIZED, "authentication_required")
            }
            ApiError::Port(PortError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Port(PortError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            ApiError::Port(PortError::Conflict(_)) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Port(PortError::Unavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
            }
            ApiError::Port(PortError::Unexpected(_))
            | ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        // Internal failure details stay in the logs, not the payload.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {self}");
            "An internal error occurred.".to_string()
        } else {
            self.to_string_without_prefix()
        };
        let body = ErrorBody {
            error: ErrorDetail { kind, message },
        };
        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// The user-facing message, without the enum variant prefix that
    /// `Display` adds for logs.
    fn to_string_without_prefix(&self) -> String {
        match self {
            ApiError::Port(port) => port.to_string(),
            other => other.to_string(),
        }
    }
}

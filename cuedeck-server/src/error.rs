//! Error types for cuedeck-server
//!
//! Every failing endpoint answers `{"error": {"code", "message"}}`.
//! Internal failures are logged in full and reported generically.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cuedeck_common::api::ErrorResponse;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Path parameter is not a safe component or escapes the music root (400)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Destination already exists (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid session (401)
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Range header cannot be satisfied for a file of `size` bytes (416)
    #[error("Range not satisfiable (size {size})")]
    RangeNotSatisfiable { size: u64 },

    /// Method not supported on this route (405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<cuedeck_common::Error> for ApiError {
    fn from(err: cuedeck_common::Error) -> Self {
        use cuedeck_common::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::InvalidPath(msg) => ApiError::InvalidPath(msg),
            Error::Unauthenticated(msg) => ApiError::Unauthenticated(msg),
            Error::Io(e) => ApiError::Io(e),
            Error::Config(msg) | Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::InvalidPath(msg) => (StatusCode::BAD_REQUEST, "INVALID_PATH", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg)
            }
            ApiError::RangeNotSatisfiable { size } => {
                let body = Json(ErrorResponse::new(
                    "RANGE_NOT_SATISFIABLE",
                    "Requested range not satisfiable",
                ));
                return (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [
                        (header::CONTENT_RANGE, format!("bytes */{}", size)),
                        (header::ACCEPT_RANGES, "bytes".to_string()),
                    ],
                    body,
                )
                    .into_response();
            }
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                "Method not allowed".to_string(),
            ),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                internal()
            }
            ApiError::Io(err) => {
                error!("IO error: {}", err);
                internal()
            }
            ApiError::Other(err) => {
                error!("Unhandled error: {:#}", err);
                internal()
            }
        };

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error".to_string(),
    )
}

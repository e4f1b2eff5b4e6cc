//! Puzzle error types with HTTP status code mapping.
//!
//! [`PuzzleError`] is the closed set of failures the service can report.
//! Each variant maps to a specific HTTP status code and structured JSON
//! error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: image must be square (got 640x480)"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Service error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Code | Category   | HTTP Status               |
/// |------|------------|---------------------------|
/// | 1001 | Validation | 400 Bad Request           |
/// | 2001 | Not Found  | 404 Not Found             |
/// | 2002 | Conflict   | 409 Conflict              |
/// | 3001 | Storage    | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    /// Bad input: non-square or undecodable image, bad name, malformed id.
    #[error("invalid request: {0}")]
    Validation(String),

    /// No puzzle (or stored image) matches the given key.
    #[error("not found: {0}")]
    NotFound(String),

    /// A puzzle with the same unique name already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// I/O or database failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl PuzzleError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::Conflict(_) => 2002,
            Self::Storage(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for PuzzleError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("puzzle".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_string())
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

impl IntoResponse for PuzzleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

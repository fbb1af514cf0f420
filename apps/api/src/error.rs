//! # API Error Type
//!
//! Unified error type for the HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow                                           │
//! │                                                                         │
//! │  ValidationError (core) ──► 400 Bad Request                            │
//! │  DbError::NotFound ──────► 404 Not Found                               │
//! │  DbError::InsufficientStock ──► 409 Conflict (message names the        │
//! │                                 product, available and requested)      │
//! │  DbError::Duplicate ─────► 400 Bad Request                             │
//! │  anything else ──────────► 500, generic message, details logged        │
//! │                                                                         │
//! │  Body shape (matches the success envelope):                            │
//! │    { "success": false, "error": "<message>" }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Expected errors (validation, not-found, conflict) carry their message to
//! the client. Unexpected ones are logged with full context and surface as
//! a generic failure, never leaking internals.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use avemaria_core::ValidationError;
use avemaria_db::DbError;

/// API error returned from handlers.
#[derive(Debug)]
pub struct ApiError {
    /// Machine-readable category, drives the HTTP status.
    pub code: ErrorCode,

    /// Human-readable error message for display.
    pub message: String,
}

/// Error categories, mapped 1:1 to HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Resource not found (404).
    NotFound,

    /// Input validation failed (400).
    ValidationError,

    /// State conflict, e.g. insufficient stock (409).
    Conflict,

    /// Anything unexpected, including store failures (500).
    Internal,
}

impl ErrorCode {
    /// The HTTP status for this category.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.code.status(),
            Json(json!({
                "success": false,
                "error": self.message,
            })),
        )
            .into_response()
    }
}

/// Converts validation errors to 400 responses.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),

            // The conflict message is client-facing by design: it names the
            // product and both quantities so the seller can fix the cart.
            DbError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }

            DbError::Duplicate { field } => {
                ApiError::validation(format!("A record with this {} already exists", field))
            }

            DbError::ForeignKeyViolation { message } => {
                tracing::error!(message = %message, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }

            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::Internal, "Internal server error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_insufficient_stock_is_conflict_with_details() {
        let err: ApiError = DbError::InsufficientStock {
            name: "Candongas doradas".to_string(),
            reference: "CAN-001".to_string(),
            available: 3,
            requested: 5,
        }
        .into();

        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.message.contains("Candongas doradas"));
        assert!(err.message.contains("CAN-001"));
        assert!(err.message.contains("available 3"));
        assert!(err.message.contains("requested 5"));
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let err: ApiError = DbError::QueryFailed("SQLITE_BUSY: database is locked".into()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "Internal server error");
    }
}

//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::BookingError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// A settlement run is already in flight
    SettlementBusy,
    /// Domain failure from the booking/lifecycle services
    Domain(BookingError),
    /// Internal server error
    Internal(String),
}

impl AppError {
    fn domain_status(err: &BookingError) -> StatusCode {
        match err {
            // Authorization-shaped rejections
            BookingError::SessionNotOwned { .. } => StatusCode::FORBIDDEN,
            // Missing entities
            BookingError::NotFound(_)
            | BookingError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            // Persistence failures
            BookingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Everything else is a caller-correctable validation failure
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::SettlementBusy => (
                StatusCode::CONFLICT,
                ApiError::new("SETTLEMENT_BUSY", "A settlement run is already in flight"),
            ),
            AppError::Domain(err) => {
                let status = Self::domain_status(&err);
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    // Persistence detail stays in the logs
                    "Internal storage error".to_string()
                } else {
                    err.to_string()
                };
                (status, ApiError::new(err.code(), message))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Domain(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Domain(BookingError::Repository(err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionId, StudentId};

    #[test]
    fn test_session_ownership_maps_to_forbidden() {
        let err = BookingError::SessionNotOwned {
            session_id: SessionId::generate(),
        };
        assert_eq!(AppError::domain_status(&err), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        let err = BookingError::AlreadyArchived {
            student_id: StudentId(1),
        };
        assert_eq!(AppError::domain_status(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        let err = BookingError::Repository(RepositoryError::NotFound("student 9".into()));
        assert_eq!(AppError::domain_status(&err), StatusCode::NOT_FOUND);
    }
}

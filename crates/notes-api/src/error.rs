//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! This is the single place where a failure kind becomes a status code.
//! Returns JSON error bodies with an error code, a message and, for
//! validation failures, the list of rejected fields. Internal error details
//! are logged and never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notes_core::{DomainError, FieldError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// `[{field, message}]` for validation errors; absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing input (400).
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Missing, invalid or expired credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Valid identity, wrong owner (403).
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Conflict with existing state, e.g. a taken email (409).
    #[error("{0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let details = match &self {
            Self::Validation(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => Self::Validation(errors),
            DomainError::Unauthenticated(msg) => Self::Unauthorized(msg),
            DomainError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            DomainError::Forbidden(msg) => Self::Forbidden(msg),
            DomainError::NotFound(msg) => Self::NotFound(msg),
            DomainError::DuplicateEmail => Self::Conflict(err.to_string()),
            DomainError::Internal(msg) => Self::Internal(msg),
            DomainError::Store(store) => Self::Internal(store.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use notes_core::StoreError;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::invalid_field("title", "x"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err:?}");
        }
    }

    #[test]
    fn domain_errors_map_to_expected_variants() {
        assert!(matches!(
            AppError::from(DomainError::DuplicateEmail),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::InvalidCredentials),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::Forbidden("no".into())),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::NotFound("Note not found".into())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::Store(StoreError::Backend("db".into()))),
            AppError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn validation_response_lists_fields() {
        let err = AppError::Validation(vec![
            FieldError::new("title", "Title is required"),
            FieldError::new("content", "Content is required"),
        ]);
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "VALIDATION_ERROR");
        let details = body.error.details.unwrap();
        assert_eq!(details[0]["field"], "title");
        assert_eq!(details[1]["message"], "Content is required");
    }

    #[tokio::test]
    async fn not_found_carries_message_without_details() {
        let (status, body) = response_parts(AppError::NotFound("Note not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.message, "Note not found");
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("db connection failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(
            !body.error.message.contains("db connection"),
            "internal error details must not leak: {}",
            body.error.message
        );
        assert_eq!(body.error.message, "An internal error occurred");
        assert!(body.error.details.is_none());
    }

    #[test]
    fn error_body_skips_absent_details() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "TEST".to_string(),
                message: "test message".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("details"));
    }
}

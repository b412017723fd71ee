//! # Error Types
//!
//! The failure taxonomy raised by the services. The API layer is the single
//! place that maps these kinds onto HTTP status codes.

use thiserror::Error;

use crate::validation::FieldError;

/// Failure of a business operation.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed or missing input. Carries every rejected field.
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// Missing, malformed, expired or revoked session token.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// Valid identity, but the resource belongs to someone else.
    #[error("{0}")]
    Forbidden(String),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Signup with an email that is already registered.
    #[error("user already exists")]
    DuplicateEmail,

    /// Login failure. Deliberately does not say which credential was wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Failure outside the store, such as password hashing or token signing.
    #[error("internal failure: {0}")]
    Internal(String),

    /// The backing store failed.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Shorthand for a single-field validation failure.
    pub fn invalid_field(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

/// Failure reported by a store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique key (user email) is already taken.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// The backend could not complete the operation.
    #[error("backend error: {0}")]
    Backend(String),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

//! # Input Validation
//!
//! Field-level checks shared by the API layer and the services. Every check
//! reports into a [`FieldErrors`] collector so a client sees all of its
//! mistakes in one response instead of fixing them one round trip at a time.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A single rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Accumulates field errors and converts into a [`DomainError::Validation`].
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError::new(field, message));
    }

    /// Record an error unless `value` has non-whitespace content.
    pub fn require_non_empty(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}

/// Canonical form used for storing and looking up emails.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Structural email check: `local@label.label`, no whitespace, a TLD of at
/// least two characters.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.is_empty() || domain.len() > 253 {
        return false;
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    if domain.contains('@') || local.starts_with('.') || local.ends_with('.') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });
    labels_ok && labels.last().is_some_and(|tld| tld.chars().count() >= 2)
}

/// Validate a signup request. All problems are reported together.
pub fn check_registration(name: &str, email: &str, password: &str) -> Result<(), DomainError> {
    let mut errors = FieldErrors::new();
    errors.require_non_empty("name", name, "Name is required");
    if !is_valid_email(&normalize_email(email)) {
        errors.push("email", "Please enter a valid email");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", "Password must be at least 6 characters");
    }
    errors.into_result()
}

/// Validate a login request.
pub fn check_login(email: &str, password: &str) -> Result<(), DomainError> {
    let mut errors = FieldErrors::new();
    if !is_valid_email(&normalize_email(email)) {
        errors.push("email", "Please enter a valid email");
    }
    if password.is_empty() {
        errors.push("password", "Password is required");
    }
    errors.into_result()
}

/// Validate a note title/content pair.
pub fn check_note(title: &str, content: &str) -> Result<(), DomainError> {
    let mut errors = FieldErrors::new();
    errors.require_non_empty("title", title, "Title is required");
    errors.require_non_empty("content", content, "Content is required");
    errors.into_result()
}

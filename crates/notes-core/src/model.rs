//! # Records
//!
//! Users and notes as the services see them. Timestamps are UTC and truncated
//! to microseconds so a record reads back from Postgres exactly as it was
//! written.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::identity::{NoteId, UserId};
use crate::validation;

/// Current time at store precision.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A stored user, including the password hash.
///
/// Not `Serialize` on purpose: the only outward form is [`PublicUser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Normalized (trimmed, lower-cased) email.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The outward projection of this user.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The outward projection of a user: no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// The identity a verified session token resolves to.
///
/// Passed explicitly from the access middleware to handlers and services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user: PublicUser,
}

impl UserIdentity {
    pub fn new(user: PublicUser) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Set at creation, never changed.
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Case-insensitive, unanchored substring match on the title.
    ///
    /// `needle_lower` must already be lower-cased.
    pub fn title_contains(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }
}

/// Validated title/content pair, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    content: String,
}

impl NoteDraft {
    /// Fails with a validation error naming each field that is empty after
    /// trimming whitespace.
    pub fn new(title: &str, content: &str) -> Result<Self, DomainError> {
        validation::check_note(title, content)?;
        Ok(Self {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_parts(self) -> (String, String) {
        (self.title, self.content)
    }
}

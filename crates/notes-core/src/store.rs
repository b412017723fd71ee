//! # Store Contracts
//!
//! The document store is an external collaborator. These traits are the
//! whole of what the services ask of it: single-document reads and writes,
//! each atomic on its own, with no cross-document transactions.
//!
//! [`MemoryStore`] implements both traits in-process. All operations take a
//! `parking_lot::RwLock` for the duration of one call and never hold it
//! across an `.await`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::identity::{NoteId, UserId};
use crate::model::{Note, User};

/// A user record before the store assigns its identifier.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A note record before the store assigns its identifier.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
}

/// Persistence of user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Persist a new user. Fails with [`StoreError::Duplicate`] if the email
    /// is already taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
}

/// Persistence of note records.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persist a new note with `updated_at = created_at`.
    async fn create_note(&self, note: NewNote) -> Result<Note, StoreError>;

    async fn find_note(&self, id: NoteId) -> Result<Option<Note>, StoreError>;

    /// All notes of `owner`, newest first.
    async fn find_notes_by_owner(&self, owner: UserId) -> Result<Vec<Note>, StoreError>;

    /// Overwrite title, content and `updated_at`. Returns `false` if the
    /// note no longer exists.
    async fn update_note(&self, note: &Note) -> Result<bool, StoreError>;

    /// Returns `false` if the note did not exist.
    async fn delete_note(&self, id: NoteId) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    /// Kept in insertion order so equal timestamps still list newest first.
    notes: Vec<Note>,
}

/// Thread-safe, cloneable in-memory store implementing both contracts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    pub fn note_count(&self) -> usize {
        self.data.read().notes.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .data
            .read()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.data.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut guard = self.data.write();
        if guard.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }
        let record = User {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        guard.users.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn create_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let record = Note {
            id: NoteId::new(),
            title: note.title,
            content: note.content,
            owner: note.owner,
            created_at: note.created_at,
            updated_at: note.created_at,
        };
        self.data.write().notes.push(record.clone());
        Ok(record)
    }

    async fn find_note(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        Ok(self.data.read().notes.iter().find(|n| n.id == id).cloned())
    }

    async fn find_notes_by_owner(&self, owner: UserId) -> Result<Vec<Note>, StoreError> {
        let mut notes: Vec<Note> = self
            .data
            .read()
            .notes
            .iter()
            .rev()
            .filter(|n| n.owner == owner)
            .cloned()
            .collect();
        // Stable sort keeps later inserts first among equal timestamps.
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn update_note(&self, note: &Note) -> Result<bool, StoreError> {
        let mut guard = self.data.write();
        match guard.notes.iter_mut().find(|n| n.id == note.id) {
            Some(stored) => {
                stored.title = note.title.clone();
                stored.content = note.content.clone();
                stored.updated_at = note.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_note(&self, id: NoteId) -> Result<bool, StoreError> {
        let mut guard = self.data.write();
        let before = guard.notes.len();
        guard.notes.retain(|n| n.id != id);
        Ok(guard.notes.len() != before)
    }
}

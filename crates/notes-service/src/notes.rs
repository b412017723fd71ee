//! # Note Service
//!
//! Owner-scoped CRUD and title search on top of a [`NoteStore`].
//!
//! Ownership is checked here rather than folded into a store filter: update,
//! delete and get must tell "does not exist" (`NotFound`) apart from "exists
//! but is not yours" (`Forbidden`). Existence is always checked first.

use std::sync::Arc;

use notes_core::model::timestamp_now;
use notes_core::store::NewNote;
use notes_core::{DomainError, Note, NoteDraft, NoteId, NoteStore, UserId};

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl std::fmt::Debug for NoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteService").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Read,
    Update,
    Delete,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// All notes of `owner`, newest first. Empty is a valid result.
    pub async fn list_notes(&self, owner: UserId) -> Result<Vec<Note>, DomainError> {
        Ok(self.store.find_notes_by_owner(owner).await?)
    }

    /// Create a note owned by `owner`.
    pub async fn create_note(
        &self,
        owner: UserId,
        title: &str,
        content: &str,
    ) -> Result<Note, DomainError> {
        let (title, content) = NoteDraft::new(title, content)?.into_parts();
        let note = self
            .store
            .create_note(NewNote {
                title,
                content,
                owner,
                created_at: timestamp_now(),
            })
            .await?;
        tracing::info!(note_id = %note.id, owner = %owner, "note created");
        Ok(note)
    }

    /// A single note, subject to the existence-then-ownership check.
    pub async fn get_note(&self, owner: UserId, id: NoteId) -> Result<Note, DomainError> {
        self.owned_note(owner, id, Action::Read).await
    }

    /// Overwrite title and content of an owned note.
    pub async fn update_note(
        &self,
        owner: UserId,
        id: NoteId,
        title: &str,
        content: &str,
    ) -> Result<Note, DomainError> {
        let draft = NoteDraft::new(title, content)?;
        let mut note = self.owned_note(owner, id, Action::Update).await?;

        let (title, content) = draft.into_parts();
        note.title = title;
        note.content = content;
        note.updated_at = timestamp_now().max(note.created_at);

        if !self.store.update_note(&note).await? {
            // Deleted between the read and the write.
            return Err(not_found());
        }
        tracing::info!(note_id = %id, owner = %owner, "note updated");
        Ok(note)
    }

    /// Permanently remove an owned note.
    pub async fn delete_note(&self, owner: UserId, id: NoteId) -> Result<(), DomainError> {
        self.owned_note(owner, id, Action::Delete).await?;
        if !self.store.delete_note(id).await? {
            return Err(not_found());
        }
        tracing::info!(note_id = %id, owner = %owner, "note deleted");
        Ok(())
    }

    /// Notes of `owner` whose title contains `query`, ignoring case, newest
    /// first. `query` is matched literally.
    pub async fn search_notes_by_title(
        &self,
        owner: UserId,
        query: Option<&str>,
    ) -> Result<Vec<Note>, DomainError> {
        let query = match query {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return Err(DomainError::invalid_field("q", "Search query is required")),
        };
        let notes = self.store.find_notes_by_owner(owner).await?;
        Ok(notes
            .into_iter()
            .filter(|n| n.title_contains(&query))
            .collect())
    }

    async fn owned_note(
        &self,
        owner: UserId,
        id: NoteId,
        action: Action,
    ) -> Result<Note, DomainError> {
        let note = self.store.find_note(id).await?.ok_or_else(not_found)?;
        if !note.is_owned_by(owner) {
            tracing::warn!(
                note_id = %id,
                requester = %owner,
                action = action.as_str(),
                "ownership check failed"
            );
            return Err(DomainError::Forbidden(format!(
                "Not authorized to {} this note",
                action.as_str()
            )));
        }
        Ok(note)
    }
}

fn not_found() -> DomainError {
    DomainError::NotFound("Note not found".to_string())
}

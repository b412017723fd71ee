//! # Database Persistence Layer
//!
//! Postgres persistence for users and notes via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, the API
//! stores everything in PostgreSQL through [`PgStore`]. When absent, the API
//! runs on the in-memory store from `notes-core` (suitable for development
//! and testing).
//!
//! Table access lives in [`users`] and [`notes`] as free functions over
//! `&PgPool`; [`PgStore`] adapts them to the store traits.

pub mod notes;
pub mod users;

use async_trait::async_trait;
use notes_core::store::{NewNote, NewUser};
use notes_core::{CredentialStore, Note, NoteId, NoteStore, StoreError, User, UserId};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect to `url` and run the embedded migrations.
///
/// Returns `None` if no URL is configured (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = url else {
        tracing::warn!(
            "DATABASE_URL not set, running in-memory only mode. \
             Users and notes will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Postgres-backed implementation of both store traits.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "database operation failed");
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        users::get_by_email(&self.pool, email).await.map_err(backend)
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        users::get_by_id(&self.pool, id).await.map_err(backend)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let record = User {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        match users::insert(&self.pool, &record).await {
            Ok(()) => Ok(record),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(record.email))
            }
            Err(e) => Err(backend(e)),
        }
    }
}

#[async_trait]
impl NoteStore for PgStore {
    async fn create_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let record = Note {
            id: NoteId::new(),
            title: note.title,
            content: note.content,
            owner: note.owner,
            created_at: note.created_at,
            updated_at: note.created_at,
        };
        notes::insert(&self.pool, &record).await.map_err(backend)?;
        Ok(record)
    }

    async fn find_note(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        notes::get_by_id(&self.pool, id).await.map_err(backend)
    }

    async fn find_notes_by_owner(&self, owner: UserId) -> Result<Vec<Note>, StoreError> {
        notes::list_by_owner(&self.pool, owner).await.map_err(backend)
    }

    async fn update_note(&self, note: &Note) -> Result<bool, StoreError> {
        notes::update(&self.pool, note).await.map_err(backend)
    }

    async fn delete_note(&self, id: NoteId) -> Result<bool, StoreError> {
        notes::delete(&self.pool, id).await.map_err(backend)
    }
}

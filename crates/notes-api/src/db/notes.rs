//! Note persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `notes` table.
//! Ownership is enforced by the note service, not in SQL. Listing orders by
//! `created_at` then the insertion sequence, so notes created within the same
//! microsecond still come back newest first.

use chrono::{DateTime, Utc};
use notes_core::{Note, NoteId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert(pool: &PgPool, note: &Note) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notes (id, title, content, owner_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(note.id.as_uuid())
    .bind(&note.title)
    .bind(&note.content)
    .bind(note.owner.as_uuid())
    .bind(note.created_at)
    .bind(note.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_by_id(pool: &PgPool, id: NoteId) -> Result<Option<Note>, sqlx::Error> {
    let row = sqlx::query_as::<_, NoteRow>(
        "SELECT id, title, content, owner_id, created_at, updated_at
         FROM notes WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(NoteRow::into_record))
}

pub async fn list_by_owner(pool: &PgPool, owner: UserId) -> Result<Vec<Note>, sqlx::Error> {
    let rows = sqlx::query_as::<_, NoteRow>(
        "SELECT id, title, content, owner_id, created_at, updated_at
         FROM notes WHERE owner_id = $1
         ORDER BY created_at DESC, seq DESC",
    )
    .bind(owner.as_uuid())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(NoteRow::into_record).collect())
}

/// Overwrite title, content and `updated_at`. Returns `false` if no row
/// matched.
pub async fn update(pool: &PgPool, note: &Note) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE notes SET title = $1, content = $2, updated_at = $3
         WHERE id = $4",
    )
    .bind(&note.title)
    .bind(&note.content)
    .bind(note.updated_at)
    .bind(note.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: NoteId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    title: String,
    content: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NoteRow {
    fn into_record(self) -> Note {
        Note {
            id: NoteId(self.id),
            title: self.title,
            content: self.content,
            owner: UserId(self.owner_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

//! User persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `users` table. Emails
//! arrive already normalized; the unique index on `email` is what makes a
//! concurrent duplicate signup fail.

use chrono::{DateTime, Utc};
use notes_core::{User, UserId};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user.id.as_uuid())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, password_hash, created_at
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserRow::into_record))
}

pub async fn get_by_id(pool: &PgPool, id: UserId) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, password_hash, created_at
         FROM users WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserRow::into_record))
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> User {
        User {
            id: UserId(self.id),
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}

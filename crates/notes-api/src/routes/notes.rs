//! # Notes API
//!
//! Owner-scoped note CRUD and title search. The caller comes from the
//! access middleware; handlers never read a user id from the request body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use notes_core::Note;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_note_id, extract_query};
use crate::state::AppState;

// ── DTOs ────────────────────────────────────────────────────────────────────

/// Title and content for create and update. Both are required and trimmed.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct NoteRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring to look for in titles.
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id.0,
            title: note.title,
            content: note.content,
            owner_id: note.owner.0,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn to_responses(notes: Vec<Note>) -> Vec<NoteResponse> {
    notes.into_iter().map(NoteResponse::from).collect()
}

// ── Router ──────────────────────────────────────────────────────────────────

/// Build the notes router. Must be mounted behind the access middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/search", get(search_notes))
        .route(
            "/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// GET /notes: The caller's notes, newest first.
#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "Caller's notes", body = Vec<NoteResponse>),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "notes"
)]
pub async fn list_notes(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<NoteResponse>>, AppError> {
    let notes = state.notes.list_notes(caller.user_id()).await?;
    Ok(Json(to_responses(notes)))
}

/// POST /notes: Create a note owned by the caller.
#[utoipa::path(
    post,
    path = "/notes",
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Note created", body = NoteResponse),
        (status = 400, description = "Missing title or content", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "notes"
)]
pub async fn create_note(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteResponse>), AppError> {
    let req = extract_json(body)?;
    let note = state
        .notes
        .create_note(caller.user_id(), &req.title, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(note.into())))
}

/// GET /notes/search?q=: The caller's notes whose title contains `q`.
#[utoipa::path(
    get,
    path = "/notes/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching notes, newest first", body = Vec<NoteResponse>),
        (status = 400, description = "Missing query", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "notes"
)]
pub async fn search_notes(
    State(state): State<AppState>,
    caller: CallerIdentity,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<NoteResponse>>, AppError> {
    let params = extract_query(params)?;
    let notes = state
        .notes
        .search_notes_by_title(caller.user_id(), params.q.as_deref())
        .await?;
    Ok(Json(to_responses(notes)))
}

/// GET /notes/{id}: A single note owned by the caller.
#[utoipa::path(
    get,
    path = "/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 403, description = "Note belongs to another user", body = crate::error::ErrorBody),
        (status = 404, description = "Note not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "notes"
)]
pub async fn get_note(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<NoteResponse>, AppError> {
    let id = extract_note_id(id)?;
    let note = state.notes.get_note(caller.user_id(), id).await?;
    Ok(Json(note.into()))
}

/// PUT /notes/{id}: Overwrite title and content.
///
/// Body validation runs before the lookup, so an invalid body on a missing
/// note is a 400, not a 404.
#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated", body = NoteResponse),
        (status = 400, description = "Missing title or content", body = crate::error::ErrorBody),
        (status = 403, description = "Note belongs to another user", body = crate::error::ErrorBody),
        (status = 404, description = "Note not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "notes"
)]
pub async fn update_note(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<Json<NoteResponse>, AppError> {
    let req = extract_json(body)?;
    let id = extract_note_id(id)?;
    let note = state
        .notes
        .update_note(caller.user_id(), id, &req.title, &req.content)
        .await?;
    Ok(Json(note.into()))
}

/// DELETE /notes/{id}: Permanently remove a note.
#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note deleted", body = MessageResponse),
        (status = 403, description = "Note belongs to another user", body = crate::error::ErrorBody),
        (status = 404, description = "Note not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "notes"
)]
pub async fn delete_note(
    State(state): State<AppState>,
    caller: CallerIdentity,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = extract_note_id(id)?;
    state.notes.delete_note(caller.user_id(), id).await?;
    Ok(Json(MessageResponse {
        message: "Note deleted successfully".to_string(),
    }))
}

//! # Custom Extractors
//!
//! Handlers take their inputs as `Result<_, Rejection>` and pass them
//! through these helpers so malformed requests get the same error body as
//! every other failure instead of Axum's plain-text rejections.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;
use notes_core::NoteId;
use uuid::Uuid;

use crate::error::AppError;

/// Extract a JSON body, mapping deserialization errors to a 400 on `body`.
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::invalid_field("body", err.body_text()))
}

/// Extract query parameters, mapping decoding errors to a 400 on `query`.
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::invalid_field("query", err.body_text()))
}

/// Extract a note id from the path.
///
/// An id that is not a UUID cannot name any note, so it is a 404 rather
/// than a validation error.
pub fn extract_note_id(result: Result<Path<Uuid>, PathRejection>) -> Result<NoteId, AppError> {
    result
        .map(|Path(id)| NoteId(id))
        .map_err(|_| AppError::NotFound("Note not found".into()))
}

//! # OpenAPI Document Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI document
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the Bearer token security scheme referenced by protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token returned by /auth/signup or /auth/login.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notes API",
        version = "0.1.0",
        description = "Personal notes: signup, login, and owner-scoped note CRUD with title search."
    ),
    paths(
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::notes::list_notes,
        crate::routes::notes::create_note,
        crate::routes::notes::search_notes,
        crate::routes::notes::get_note,
        crate::routes::notes::update_note,
        crate::routes::notes::delete_note,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::auth::SignupRequest,
        crate::routes::auth::LoginRequest,
        crate::routes::auth::UserResponse,
        crate::routes::auth::AuthResponse,
        crate::routes::notes::NoteRequest,
        crate::routes::notes::NoteResponse,
        crate::routes::notes::MessageResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Account creation, sign-in and current user"),
        (name = "notes", description = "Owner-scoped notes and title search"),
    )
)]
pub struct ApiDoc;

/// Serves the document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

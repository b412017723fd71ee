//! # notes-api: HTTP Surface for the Notes Service
//!
//! JSON over HTTP for account signup and login, bearer-token access control,
//! and owner-scoped note CRUD with title search.
//!
//! ## API Surface
//!
//! | Route                  | Module              | Auth   |
//! |------------------------|---------------------|--------|
//! | `/auth/signup`         | [`routes::auth`]    | public |
//! | `/auth/login`          | [`routes::auth`]    | public |
//! | `/auth/me`             | [`routes::auth`]    | bearer |
//! | `/notes`, `/notes/*`   | [`routes::notes`]   | bearer |
//! | `/health/*`            | this module         | public |
//! | `/openapi.json`        | [`openapi`]         | public |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → body limit → AuthMiddleware (protected only) → Handler
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Signup, login, health probes and the OpenAPI document are mounted outside
/// the access middleware so they remain reachable without a token.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(routes::notes::router())
        .merge(routes::auth::protected_router())
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware));

    let public = Router::new()
        .merge(routes::auth::public_router())
        .merge(openapi::router())
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the router is serving.
async fn readiness() -> &'static str {
    "ready"
}

//! # Auth API
//!
//! Account creation and sign-in. Both return the public user and a fresh
//! session token. Field validation happens in the auth service so all bad
//! fields are reported together.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use notes_core::PublicUser;
use notes_service::AuthSession;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

// ── DTOs ────────────────────────────────────────────────────────────────────

/// Request to create an account. Absent fields read as empty and fail
/// validation with a field-specific message.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<PublicUser> for UserResponse {
    fn from(user: PublicUser) -> Self {
        Self {
            id: user.id.0,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.token.value,
            expires_at: session.token.expires_at,
        }
    }
}

// ── Routers ─────────────────────────────────────────────────────────────────

/// Signup and login. Mounted outside the access middleware.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

/// Routes that need a verified caller.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// POST /auth/signup: Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid fields", body = crate::error::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let req = extract_json(body)?;
    let session = state
        .auth
        .register_user(&req.name, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /auth/login: Exchange email and password for a session token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid fields", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let req = extract_json(body)?;
    let session = state.auth.authenticate(&req.email, &req.password).await?;
    Ok(Json(session.into()))
}

/// GET /auth/me: The caller's public profile.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(State(state): State<AppState>, caller: CallerIdentity) -> Json<UserResponse> {
    Json(state.auth.current_user(&caller.0).into())
}

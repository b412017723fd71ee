//! # Bearer Authentication Middleware
//!
//! Every request to a protected route must carry
//!
//! ```text
//! Authorization: Bearer <session token>
//! ```
//!
//! The middleware verifies the token through [`AuthService::verify_token`]
//! (signature, expiry, and that the account still exists), then injects a
//! [`CallerIdentity`] into the request extensions. Handlers extract it via
//! the `FromRequestParts` impl. On failure the request never reaches the
//! handler and a 401 is returned.
//!
//! [`AuthService::verify_token`]: notes_service::AuthService::verify_token

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use notes_core::{UserId, UserIdentity};

use crate::error::AppError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub UserIdentity);

impl CallerIdentity {
    pub fn user_id(&self) -> UserId {
        self.0.user_id()
    }
}

/// Extracts the identity that [`auth_middleware`] injected into extensions.
/// Returns 401 if none is present (route not behind the middleware).
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed authorization header".into()))?;

    let token = value.strip_prefix(BEARER_PREFIX).ok_or_else(|| {
        AppError::Unauthorized("authorization header must use Bearer scheme".into())
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("missing bearer token".into()));
    }
    Ok(token)
}

/// Verify the bearer token and attach the caller's identity to the request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(reason = %err, "authentication failed");
            return err.into_response();
        }
    };

    let verified = state.auth.verify_token(token).await;
    match verified {
        Ok(identity) => {
            request.extensions_mut().insert(CallerIdentity(identity));
            next.run(request).await
        }
        Err(err) => {
            let err = AppError::from(err);
            if matches!(err, AppError::Unauthorized(_)) {
                tracing::warn!(reason = %err, "authentication failed");
            }
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::Router;
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use notes_crypto::{HasherConfig, TokenCodec};
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        AppConfig {
            hasher: HasherConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ..AppConfig::default()
        }
    }

    /// Minimal router with the auth middleware in front of a handler that
    /// echoes the caller's email.
    fn test_app(state: AppState) -> Router {
        Router::new()
            .route(
                "/test",
                get(|caller: CallerIdentity| async move { caller.0.user.email }),
            )
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    fn request_with(auth: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/test");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn error_message(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        err["error"]["message"].as_str().unwrap().to_string()
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert!(bearer_token(&headers).is_err());
    }

    #[tokio::test]
    async fn valid_token_accepted() {
        let state = AppState::in_memory(test_config()).unwrap();
        let session = state
            .auth
            .register_user("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();
        let app = test_app(state);

        let header = format!("Bearer {}", session.token.value);
        let response = app.oneshot(request_with(Some(&header))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ann@x.com");
    }

    #[tokio::test]
    async fn missing_authorization_header_rejected() {
        let app = test_app(AppState::in_memory(test_config()).unwrap());
        let response = app.oneshot(request_with(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.contains("missing"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let app = test_app(AppState::in_memory(test_config()).unwrap());
        let response = app
            .oneshot(request_with(Some("Basic dXNlcjpwYXNz")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn garbage_token_rejected() {
        let app = test_app(AppState::in_memory(test_config()).unwrap());
        let response = app
            .oneshot(request_with(Some("Bearer not-a-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.contains("invalid"));
    }

    #[tokio::test]
    async fn expired_token_rejected() {
        let config = test_config();
        let codec = TokenCodec::new(&config.jwt_secret, config.token_ttl);
        let state = AppState::in_memory(config).unwrap();
        let session = state
            .auth
            .register_user("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();
        let expired = codec
            .issue_at(session.user.id, Utc::now() - Duration::days(31))
            .unwrap();

        let header = format!("Bearer {}", expired.value);
        let response = test_app(state)
            .oneshot(request_with(Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.contains("expired"));
    }

    #[tokio::test]
    async fn token_for_unknown_user_rejected() {
        let config = test_config();
        let codec = TokenCodec::new(&config.jwt_secret, config.token_ttl);
        let token = codec.issue(UserId::new()).unwrap();

        let header = format!("Bearer {}", token.value);
        let response = test_app(AppState::in_memory(config).unwrap())
            .oneshot(request_with(Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn extractor_without_middleware_is_unauthorized() {
        let app: Router = Router::new().route("/test", get(|_: CallerIdentity| async { "ok" }));
        let response = app.oneshot(request_with(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

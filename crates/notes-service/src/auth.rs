//! # Auth Service
//!
//! Signup, login and session verification.
//!
//! Token verification is split into two steps so each can be tested alone:
//!
//! 1. [`AuthService::check_token`]: signature, shape and expiry. Pure.
//! 2. [`AuthService::resolve`]: the subject must still exist in the
//!    credential store.
//!
//! [`AuthService::verify_token`] runs both on every request.
//!
//! Argon2 is CPU-bound, so hashing and verification run on the blocking pool.

use std::sync::Arc;

use notes_core::store::NewUser;
use notes_core::validation::{check_login, check_registration, normalize_email};
use notes_core::{
    CredentialStore, DomainError, PublicUser, StoreError, User, UserId, UserIdentity,
};
use notes_crypto::{Argon2Hasher, Claims, CryptoError, SessionToken, TokenCodec};

/// A user together with a freshly issued session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: PublicUser,
    pub token: SessionToken,
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    hasher: Arc<Argon2Hasher>,
    tokens: Arc<TokenCodec>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        hasher: Argon2Hasher,
        tokens: TokenCodec,
    ) -> Self {
        Self {
            credentials,
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
        }
    }

    /// Create an account and sign it in.
    ///
    /// Fails with `Validation` (all bad fields at once) or `DuplicateEmail`.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, DomainError> {
        check_registration(name, email, password)?;
        let email = normalize_email(email);

        if self.credentials.find_user_by_email(&email).await?.is_some() {
            tracing::info!("signup rejected: email already registered");
            return Err(DomainError::DuplicateEmail);
        }

        let password_hash = self.hash_password(password).await?;
        let user = self
            .credentials
            .create_user(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash,
                created_at: notes_core::model::timestamp_now(),
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent signup for the same email.
                StoreError::Duplicate(_) => DomainError::DuplicateEmail,
                other => DomainError::Store(other),
            })?;

        let token = self.issue_token(user.id)?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(AuthSession {
            user: user.public(),
            token,
        })
    }

    /// Sign in with email and password.
    ///
    /// Unknown email and wrong password both fail with `InvalidCredentials`.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, DomainError> {
        check_login(email, password)?;
        let email = normalize_email(email);

        let Some(user) = self.credentials.find_user_by_email(&email).await? else {
            // Same argon2 cost as a wrong password; the outcome is ignored.
            self.verify_password(self.hasher.dummy_hash(), password)
                .await?;
            tracing::warn!("login failed: unknown email");
            return Err(DomainError::InvalidCredentials);
        };
        if !self.verify_password(&user.password_hash, password).await? {
            tracing::warn!(user_id = %user.id, "login failed: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue_token(user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(AuthSession {
            user: user.public(),
            token,
        })
    }

    /// Signature, shape and expiry check. Does not touch the store.
    pub fn check_token(&self, token: &str) -> Result<Claims, DomainError> {
        self.tokens.verify(token).map_err(|e| match e {
            CryptoError::TokenExpired => DomainError::Unauthenticated("token expired".into()),
            _ => DomainError::Unauthenticated("invalid token".into()),
        })
    }

    /// Fetch the user a verified token names. Fails if the account is gone.
    pub async fn resolve(&self, claims: &Claims) -> Result<User, DomainError> {
        let id = claims
            .user_id()
            .map_err(|_| DomainError::Unauthenticated("invalid token".into()))?;
        self.credentials
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::Unauthenticated("user no longer exists".into()))
    }

    /// Full verification: [`check_token`](Self::check_token) then
    /// [`resolve`](Self::resolve).
    pub async fn verify_token(&self, token: &str) -> Result<UserIdentity, DomainError> {
        let claims = self.check_token(token)?;
        let user = self.resolve(&claims).await?;
        Ok(UserIdentity::new(user.public()))
    }

    /// Public projection of the resolved identity.
    pub fn current_user(&self, identity: &UserIdentity) -> PublicUser {
        identity.user.clone()
    }

    fn issue_token(&self, user: UserId) -> Result<SessionToken, DomainError> {
        self.tokens
            .issue(user)
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn verify_password(&self, stored_hash: &str, password: &str) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let stored_hash = stored_hash.to_owned();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&stored_hash, &password))
            .await
            .map_err(|e| DomainError::Internal(format!("verification task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use notes_core::MemoryStore;
    use notes_crypto::{HasherConfig, TokenSecret};

    fn secret() -> TokenSecret {
        TokenSecret::new(b"unit-test-secret-unit-test-secret".to_vec())
    }

    fn service_with(store: MemoryStore) -> AuthService {
        service_with_cost(
            store,
            HasherConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        )
    }

    fn service_with_cost(store: MemoryStore, cost: HasherConfig) -> AuthService {
        let hasher = Argon2Hasher::new(cost).unwrap();
        AuthService::new(
            Arc::new(store),
            hasher,
            TokenCodec::new(&secret(), Duration::days(30)),
        )
    }

    fn service() -> AuthService {
        service_with(MemoryStore::new())
    }

    #[tokio::test]
    async fn register_returns_public_user_and_token() {
        let auth = service();
        let session = auth
            .register_user("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.user.name, "Ann");
        assert_eq!(session.user.email, "ann@x.com");
        assert!(!session.token.value.is_empty());

        let json = serde_json::to_string(&session.user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("secret1"));
    }

    #[tokio::test]
    async fn register_normalizes_name_and_email() {
        let auth = service();
        let session = auth
            .register_user("  Ann ", " Ann@X.com ", "secret1")
            .await
            .unwrap();
        assert_eq!(session.user.name, "Ann");
        assert_eq!(session.user.email, "ann@x.com");
    }

    #[tokio::test]
    async fn register_rejects_invalid_fields_together() {
        let err = service().register_user("", "bad", "123").await.unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "password"]);
            }
            other => panic!("expected Validation, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_case_insensitive() {
        let auth = service();
        auth.register_user("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();
        let err = auth
            .register_user("Other Ann", "ANN@x.com", "secret2")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateEmail));
    }

    #[tokio::test]
    async fn login_then_verify_yields_same_user() {
        let auth = service();
        let registered = auth
            .register_user("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        let session = auth.authenticate("ANN@x.com", "secret1").await.unwrap();
        assert_eq!(session.user.id, registered.user.id);

        let identity = auth.verify_token(&session.token.value).await.unwrap();
        assert_eq!(identity.user_id(), registered.user.id);
        assert_eq!(auth.current_user(&identity), registered.user);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let auth = service();
        auth.register_user("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        let wrong_password = auth.authenticate("ann@x.com", "wrong!").await.unwrap_err();
        let unknown_email = auth.authenticate("bob@x.com", "secret1").await.unwrap_err();
        assert!(matches!(wrong_password, DomainError::InvalidCredentials));
        assert!(matches!(unknown_email, DomainError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn unknown_email_pays_the_hashing_cost() {
        let auth = service_with_cost(
            MemoryStore::new(),
            HasherConfig {
                memory_kib: 16 * 1024,
                iterations: 3,
                parallelism: 1,
            },
        );
        auth.register_user("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        let fastest = |email: &'static str| {
            let auth = auth.clone();
            async move {
                let mut best = std::time::Duration::MAX;
                for _ in 0..3 {
                    let started = std::time::Instant::now();
                    let err = auth.authenticate(email, "wrong!").await.unwrap_err();
                    assert!(matches!(err, DomainError::InvalidCredentials));
                    best = best.min(started.elapsed());
                }
                best
            }
        };
        let known = fastest("ann@x.com").await;
        let unknown = fastest("bob@x.com").await;
        assert!(
            unknown * 4 >= known,
            "unknown email took {unknown:?}, wrong password took {known:?}"
        );
    }

    #[tokio::test]
    async fn login_validates_shape() {
        let err = service().authenticate("not-an-email", "").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.len() == 2));
    }

    #[tokio::test]
    async fn check_token_is_pure() {
        let auth = service();
        let token = TokenCodec::new(&secret(), Duration::days(30))
            .issue(UserId::new())
            .unwrap();
        // Signature is fine even though the user never existed.
        let claims = auth.check_token(&token.value).unwrap();
        let err = auth.resolve(&claims).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let auth = service();
        let session = auth
            .register_user("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();
        let expired = TokenCodec::new(&secret(), Duration::days(30))
            .issue_at(session.user.id, Utc::now() - Duration::days(40))
            .unwrap();

        let err = auth.verify_token(&expired.value).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(ref m) if m.contains("expired")));
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let err = service().verify_token("garbage").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn verify_rejects_token_from_other_secret() {
        let auth = service();
        let session = auth
            .register_user("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();
        let forged = TokenCodec::new(
            &TokenSecret::new(b"attacker-secret-attacker-secret!".to_vec()),
            Duration::days(30),
        )
        .issue(session.user.id)
        .unwrap();
        assert!(auth.verify_token(&forged.value).await.is_err());
    }
}

//! # Session Tokens
//!
//! HS256 JWTs signed with a server secret.
//!
//! ```text
//! { "sub": "<user uuid>", "iat": <unix seconds>, "exp": <iat + ttl> }
//! ```
//!
//! [`TokenCodec::verify`] checks signature, algorithm, required claims and
//! expiry (zero leeway). It never touches a store; resolving the subject to a
//! live user is the auth service's job.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use notes_core::UserId;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

const GENERATED_SECRET_LEN: usize = 32;

/// Token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    /// Parse the subject into a [`UserId`].
    pub fn user_id(&self) -> Result<UserId, CryptoError> {
        self.sub
            .parse()
            .map_err(|e| CryptoError::InvalidToken(format!("subject is not a user id: {e}")))
    }
}

/// An issued token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// HMAC signing secret. `Debug` output is redacted.
#[derive(Clone)]
pub struct TokenSecret(Vec<u8>);

impl TokenSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// A random secret. Tokens signed with it do not survive a restart.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenSecret([REDACTED])")
    }
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &TokenSecret, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issue a token for `user` valid from now.
    pub fn issue(&self, user: UserId) -> Result<SessionToken, CryptoError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token for `user` as if at `issued_at`.
    pub fn issue_at(
        &self,
        user: UserId,
        issued_at: DateTime<Utc>,
    ) -> Result<SessionToken, CryptoError> {
        let iat = issued_at.timestamp();
        let exp = iat
            .checked_add(self.ttl.num_seconds())
            .ok_or_else(|| CryptoError::TokenEncoding("expiry overflows".to_string()))?;
        let claims = Claims {
            sub: user.to_string(),
            iat,
            exp,
        };
        let value = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CryptoError::TokenEncoding(e.to_string()))?;
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| CryptoError::TokenEncoding(format!("expiry {exp} out of range")))?;
        Ok(SessionToken { value, expires_at })
    }

    /// Check signature, shape and expiry. Pure: no store lookup.
    pub fn verify(&self, token: &str) -> Result<Claims, CryptoError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CryptoError::TokenExpired,
                other => CryptoError::InvalidToken(format!("{other:?}")),
            })?;
        // Reject a subject that is not a user id up front.
        data.claims.user_id()?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(
            &TokenSecret::new(b"test-secret-test-secret-test-secret".to_vec()),
            Duration::days(30),
        )
    }

    #[test]
    fn issue_then_verify_yields_same_user() {
        let codec = codec();
        let user = UserId::new();
        let token = codec.issue(user).unwrap();
        let claims = codec.verify(&token.value).unwrap();
        assert_eq!(claims.user_id().unwrap(), user);
        assert_eq!(claims.exp - claims.iat, Duration::days(30).num_seconds());
    }

    #[test]
    fn expires_at_matches_exp_claim() {
        let codec = codec();
        let token = codec.issue(UserId::new()).unwrap();
        let claims = codec.verify(&token.value).unwrap();
        assert_eq!(token.expires_at.timestamp(), claims.exp);
    }

    #[test]
    fn expired_token_rejected() {
        let codec = codec();
        let token = codec
            .issue_at(UserId::new(), Utc::now() - Duration::days(31))
            .unwrap();
        assert_eq!(codec.verify(&token.value), Err(CryptoError::TokenExpired));
    }

    #[test]
    fn token_signed_with_other_secret_rejected() {
        let other = TokenCodec::new(
            &TokenSecret::new(b"another-secret-another-secret-xx".to_vec()),
            Duration::days(30),
        );
        let token = other.issue(UserId::new()).unwrap();
        assert!(matches!(
            codec().verify(&token.value),
            Err(CryptoError::InvalidToken(_))
        ));
    }

    #[test]
    fn tampered_payload_rejected() {
        let codec = codec();
        let token = codec.issue(UserId::new()).unwrap().value;
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let forged = codec.issue(UserId::new()).unwrap().value;
        parts[1] = forged.split('.').nth(1).unwrap().to_string();
        assert!(codec.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn malformed_token_rejected() {
        for token in ["", "abc", "a.b.c", "Bearer x"] {
            assert!(
                matches!(codec().verify(token), Err(CryptoError::InvalidToken(_))),
                "accepted {token:?}"
            );
        }
    }

    #[test]
    fn non_uuid_subject_rejected() {
        let secret = TokenSecret::new(b"test-secret-test-secret-test-secret".to_vec());
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "admin".to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            codec().verify(&token),
            Err(CryptoError::InvalidToken(_))
        ));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let secret = TokenSecret::new(b"super-secret-value".to_vec());
        assert!(!format!("{secret:?}").contains("super-secret"));
        let codec = TokenCodec::new(&secret, Duration::hours(1));
        assert!(!format!("{codec:?}").contains("super-secret"));
    }

    #[test]
    fn generated_secrets_differ() {
        let a = TokenSecret::generate();
        let b = TokenSecret::generate();
        assert_eq!(a.len(), GENERATED_SECRET_LEN);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}

//! Errors raised by hashing and token operations.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CryptoError {
    /// Hashing parameters were rejected by argon2.
    #[error("invalid hasher parameters: {0}")]
    InvalidParams(String),

    /// The password could not be hashed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The token could not be signed.
    #[error("token encoding failed: {0}")]
    TokenEncoding(String),

    /// The token's `exp` is in the past.
    #[error("token expired")]
    TokenExpired,

    /// Bad signature, bad shape, or bad claims.
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

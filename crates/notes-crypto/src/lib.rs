//! # notes-crypto: Cryptographic Primitives
//!
//! - **Password hashing** with argon2id and a fresh random salt per hash,
//!   serialized as a PHC string.
//! - **Session tokens**: HS256 JWTs carrying the user id, issue time and
//!   expiry. Verification is pure: signature and expiry only, no store.
//!
//! ## Crate Policy
//!
//! - Depends only on `notes-core` internally.
//! - Secrets never appear in `Debug` output.

pub mod error;
pub mod password;
pub mod token;

pub use error::CryptoError;
pub use password::{Argon2Hasher, HasherConfig};
pub use token::{Claims, SessionToken, TokenCodec, TokenSecret};

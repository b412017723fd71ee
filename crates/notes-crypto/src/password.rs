//! # Password Hashing
//!
//! Argon2id (v0x13) with a 16-byte random salt per password. Hashes are
//! stored as PHC strings, so the parameters used at hash time travel with the
//! hash and verification keeps working after the configured cost changes.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::RngCore;

use crate::error::CryptoError;

const SALT_LEN: usize = 16;
const DUMMY_PASSWORD: &str = "notes-dummy-password";

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Salted one-way password hasher.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
    /// Hash of a fixed password under `params`, verified against when the
    /// account does not exist so both login failures cost the same.
    dummy_hash: String,
}

impl Argon2Hasher {
    pub fn new(config: HasherConfig) -> Result<Self, CryptoError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| CryptoError::InvalidParams(e.to_string()))?;
        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(hasher)
    }

    /// A valid hash at the configured cost that no user password is bound to.
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn make_salt() -> Result<SaltString, CryptoError> {
        let mut bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        SaltString::encode_b64(&bytes).map_err(|e| CryptoError::Hashing(e.to_string()))
    }

    /// Hash `password` with a fresh salt. Returns the PHC string.
    pub fn hash(&self, password: &str) -> Result<String, CryptoError> {
        let salt = Self::make_salt()?;
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CryptoError::Hashing(e.to_string()))
    }

    /// Check `password` against a stored PHC string. An unparseable hash is a
    /// mismatch, not an error.
    pub fn verify(&self, stored_hash: &str, password: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

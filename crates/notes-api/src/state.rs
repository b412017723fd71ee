//! # Application State
//!
//! Shared state handed to every handler through Axum's `State` extractor.
//! Cloning is cheap: services hold their stores and codecs behind `Arc`.

use std::sync::Arc;

use notes_core::{CredentialStore, MemoryStore, NoteStore};
use notes_crypto::{Argon2Hasher, CryptoError, TokenCodec};
use notes_service::{AuthService, NoteService};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub notes: NoteService,
}

impl AppState {
    /// Wire the services over the given stores.
    ///
    /// Fails only if the password hasher parameters are rejected.
    pub fn new(
        config: AppConfig,
        credentials: Arc<dyn CredentialStore>,
        notes: Arc<dyn NoteStore>,
    ) -> Result<Self, CryptoError> {
        let hasher = Argon2Hasher::new(config.hasher)?;
        let tokens = TokenCodec::new(&config.jwt_secret, config.token_ttl);
        Ok(Self {
            auth: AuthService::new(credentials, hasher, tokens),
            notes: NoteService::new(notes),
        })
    }

    /// State backed by a fresh [`MemoryStore`]. Data does not survive a
    /// restart.
    pub fn in_memory(config: AppConfig) -> Result<Self, CryptoError> {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }
}

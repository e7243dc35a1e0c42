use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use medialib_core::{
    FileStore, GrantAuthorizer, LocalFileStore, MediaLibrary, MemoryFileStore, UserGrant,
};

use crate::config::{ServerConfig, StorageBackend};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub media: Arc<MediaLibrary>,
    /// Revoked JWT token IDs (jti). Tokens in this map are rejected by the auth middleware.
    pub revoked_tokens: Arc<DashMap<String, Instant>>,
}

impl AppState {
    /// Wires the configured store and the folder-grant authorizer into a
    /// [`MediaLibrary`].
    ///
    /// Without configured users every caller runs as anonymous, so the
    /// authorizer falls back to a full grant.
    pub fn new(config: ServerConfig) -> Self {
        let store: Arc<dyn FileStore> = match config.storage.backend {
            StorageBackend::Local => Arc::new(LocalFileStore::new(
                config.storage.root.clone(),
                config.storage.public_url.clone(),
            )),
            StorageBackend::Memory => {
                Arc::new(MemoryFileStore::new(config.storage.public_url.clone()))
            }
        };

        let mut authorizer = GrantAuthorizer::new(config.grants());
        if !config.has_auth() {
            authorizer = authorizer.with_fallback(UserGrant::full());
        }

        Self {
            config: Arc::new(config),
            media: Arc::new(MediaLibrary::new(store, Arc::new(authorizer))),
            revoked_tokens: Arc::new(DashMap::new()),
        }
    }
}

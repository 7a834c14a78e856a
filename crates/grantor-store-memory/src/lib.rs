//! In-memory storage backend for the grantor OAuth 2.0 engine.
//!
//! Every repository is a `tokio::sync::RwLock` around a `HashMap`, which
//! gives the consume operations their exactly-one-winner guarantee for
//! free: removal happens under the write lock.
//!
//! Intended for tests, demos and single-process deployments. Nothing
//! survives a restart.

pub mod fixtures;
mod store;
mod users;

use std::sync::Arc;

use grantor_oauth2::store::ModelStore;

pub use store::{
    MemoryAccessTokenStore, MemoryAuthorizationStore, MemoryClientStore, MemoryCodeStore,
    MemoryRefreshTokenStore, MemoryScopeStore,
};
pub use users::MemoryUserDirectory;

/// Bundles one in-memory repository per entity.
///
/// The backend hands out a [`ModelStore`] over its repositories; keep the
/// backend around if seeding access to the individual stores is needed.
#[derive(Default)]
pub struct MemoryBackend {
    clients: Arc<MemoryClientStore>,
    scopes: Arc<MemoryScopeStore>,
    authorizations: Arc<MemoryAuthorizationStore>,
    codes: Arc<MemoryCodeStore>,
    access_tokens: Arc<MemoryAccessTokenStore>,
    refresh_tokens: Arc<MemoryRefreshTokenStore>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store handle over this backend's repositories.
    #[must_use]
    pub fn model_store(&self) -> ModelStore {
        ModelStore::new(
            self.clients.clone(),
            self.scopes.clone(),
            self.authorizations.clone(),
            self.codes.clone(),
            self.access_tokens.clone(),
            self.refresh_tokens.clone(),
        )
    }
}

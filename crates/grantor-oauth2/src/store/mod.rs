//! Storage traits for protocol entities.
//!
//! One repository trait per entity. Implementations live in backend crates
//! (`grantor-store-memory` ships the in-process one); handlers reach storage
//! exclusively through the [`ModelStore`] aggregate, which is the sole seam
//! between protocol logic and persistence.
//!
//! # Implementation notes
//!
//! - `create` must enforce uniqueness of the entity's opaque identifier and
//!   fail on a duplicate; the engine contains no retry logic.
//! - `consume` operations must be atomic: of two concurrent consumers of the
//!   same code or refresh token, exactly one receives the record.
//! - Never log code or token values.

pub mod authorization;
pub mod client;
pub mod code;
pub mod scope;
pub mod token;

use std::sync::Arc;

use time::OffsetDateTime;

pub use authorization::AuthorizationStore;
pub use client::ClientStore;
pub use code::CodeStore;
pub use scope::ScopeStore;
pub use token::{AccessTokenStore, RefreshTokenStore};

use crate::AuthResult;

/// Clock abstraction so expiry math is deterministic under test.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock pinned to a fixed instant. Intended for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Resource-owner credential verification.
///
/// Consumed by the password grant and by whatever front door authenticates
/// resource owners for the authorization endpoint. The engine never sees how
/// credentials are stored.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verifies a username/password pair.
    ///
    /// Returns `Ok(false)` for a wrong password or unknown user; errors are
    /// reserved for verifier-side failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the verifier itself fails.
    async fn verify(&self, username: &str, password: &str) -> AuthResult<bool>;
}

/// Aggregate of every entity repository.
///
/// Cheap to clone; each handle is shared. Handlers receive this and never a
/// concrete backend, which is what makes the storage technology swappable
/// without touching protocol code.
#[derive(Clone)]
pub struct ModelStore {
    clients: Arc<dyn ClientStore>,
    scopes: Arc<dyn ScopeStore>,
    authorizations: Arc<dyn AuthorizationStore>,
    codes: Arc<dyn CodeStore>,
    access_tokens: Arc<dyn AccessTokenStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl ModelStore {
    /// Bundles per-entity repositories into one store handle.
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientStore>,
        scopes: Arc<dyn ScopeStore>,
        authorizations: Arc<dyn AuthorizationStore>,
        codes: Arc<dyn CodeStore>,
        access_tokens: Arc<dyn AccessTokenStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            clients,
            scopes,
            authorizations,
            codes,
            access_tokens,
            refresh_tokens,
        }
    }

    /// Client repository.
    #[must_use]
    pub fn clients(&self) -> &dyn ClientStore {
        self.clients.as_ref()
    }

    /// Scope repository.
    #[must_use]
    pub fn scopes(&self) -> &dyn ScopeStore {
        self.scopes.as_ref()
    }

    /// Resource-owner approval repository.
    #[must_use]
    pub fn authorizations(&self) -> &dyn AuthorizationStore {
        self.authorizations.as_ref()
    }

    /// Authorization code repository.
    #[must_use]
    pub fn codes(&self) -> &dyn CodeStore {
        self.codes.as_ref()
    }

    /// Access token repository.
    #[must_use]
    pub fn access_tokens(&self) -> &dyn AccessTokenStore {
        self.access_tokens.as_ref()
    }

    /// Refresh token repository.
    #[must_use]
    pub fn refresh_tokens(&self) -> &dyn RefreshTokenStore {
        self.refresh_tokens.as_ref()
    }
}

//! Scope repository trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Scope;

/// Storage operations for the scope universe.
#[async_trait]
pub trait ScopeStore: Send + Sync {
    /// Finds a scope by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<Scope>>;

    /// Creates a new scope.
    ///
    /// # Errors
    ///
    /// Returns an error if a scope with the same name already exists or the
    /// storage operation fails.
    async fn create(&self, scope: &Scope) -> AuthResult<()>;

    /// Lists every known scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self) -> AuthResult<Vec<Scope>>;
}

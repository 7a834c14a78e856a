//! Resource-owner approval repository trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Authorization;

/// Storage operations for resource-owner approvals.
#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    /// Finds the approval a resource owner granted to a client, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_and_username(
        &self,
        client_id: &str,
        username: &str,
    ) -> AuthResult<Option<Authorization>>;

    /// Records an approval, replacing any previous one for the same
    /// `(client_id, username)` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn upsert(&self, authorization: &Authorization) -> AuthResult<()>;

    /// Lists every stored approval.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self) -> AuthResult<Vec<Authorization>>;
}

//! Client repository trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage operations for registered OAuth 2.0 clients.
///
/// Registration itself happens outside the engine; protocol handlers only
/// read, but `create`/`update`/`delete` exist so backends can be seeded and
/// administered through the same interface.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Finds a client by its `client_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if a client with the same `client_id` already exists
    /// or the storage operation fails.
    async fn create(&self, client: &Client) -> AuthResult<()>;

    /// Replaces an existing client record.
    ///
    /// # Errors
    ///
    /// Returns an error if the client does not exist or the storage
    /// operation fails.
    async fn update(&self, client: &Client) -> AuthResult<()>;

    /// Deletes a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, client_id: &str) -> AuthResult<()>;

    /// Lists all registered clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self) -> AuthResult<Vec<Client>>;
}

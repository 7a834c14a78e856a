//! Authorization code repository trait.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Storage operations for authorization codes.
///
/// The consume operation carries the single-use guarantee: it must remove
/// the record atomically so that of two concurrent redemption attempts for
/// the same code, exactly one receives it and the other sees `None`.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Finds a code by value, regardless of expiry. Callers check expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Persists a freshly minted code.
    ///
    /// # Errors
    ///
    /// Returns an error if a code with the same value already exists or the
    /// storage operation fails.
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()>;

    /// Atomically removes and returns a code.
    ///
    /// Returns `None` if the code does not exist or was already consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Removes codes whose expiry is at or before `now`. Returns the number
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_expired(&self, now: OffsetDateTime) -> AuthResult<usize>;
}

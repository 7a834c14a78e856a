//! Access and refresh token repository traits.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::types::{AccessToken, RefreshToken};

/// Storage operations for access tokens.
#[async_trait]
pub trait AccessTokenStore: Send + Sync {
    /// Finds a token by value, regardless of expiry. Callers check expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_token(&self, access_token: &str) -> AuthResult<Option<AccessToken>>;

    /// Persists a freshly minted token.
    ///
    /// # Errors
    ///
    /// Returns an error if a token with the same value already exists or the
    /// storage operation fails.
    async fn create(&self, token: &AccessToken) -> AuthResult<()>;

    /// Removes tokens whose expiry is at or before `now`. Returns the number
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_expired(&self, now: OffsetDateTime) -> AuthResult<usize>;
}

/// Storage operations for refresh tokens.
///
/// `consume` backs refresh-token rotation and must provide the same
/// exactly-one-winner guarantee as code consumption.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Finds a token by value, regardless of expiry. Callers check expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_token(&self, refresh_token: &str) -> AuthResult<Option<RefreshToken>>;

    /// Persists a freshly minted token.
    ///
    /// # Errors
    ///
    /// Returns an error if a token with the same value already exists or the
    /// storage operation fails.
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Atomically removes and returns a token.
    ///
    /// Returns `None` if the token does not exist or was already consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn consume(&self, refresh_token: &str) -> AuthResult<Option<RefreshToken>>;

    /// Removes tokens whose expiry is at or before `now`. Returns the number
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_expired(&self, now: OffsetDateTime) -> AuthResult<usize>;
}

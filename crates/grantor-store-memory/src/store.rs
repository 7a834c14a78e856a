//! `HashMap`-backed repository implementations.
//!
//! All maps are keyed by the entity's unique identifier. `create` rejects
//! duplicates, and the consume operations remove under the write lock, so
//! concurrent redemption of the same code or refresh token has exactly one
//! winner. Error messages never include code or token values.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use grantor_oauth2::AuthResult;
use grantor_oauth2::error::OAuth2Error;
use grantor_oauth2::store::{
    AccessTokenStore, AuthorizationStore, ClientStore, CodeStore, RefreshTokenStore, ScopeStore,
};
use grantor_oauth2::types::{AccessToken, Authorization, AuthorizationCode, Client, RefreshToken, Scope};

/// In-memory client repository.
#[derive(Default)]
pub struct MemoryClientStore {
    clients: RwLock<HashMap<String, Client>>,
}

impl MemoryClientStore {
    /// Creates a repository pre-populated with the given clients.
    #[must_use]
    pub fn with_entries(clients: impl IntoIterator<Item = Client>) -> Self {
        Self {
            clients: RwLock::new(
                clients
                    .into_iter()
                    .map(|client| (client.client_id.clone(), client))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn create(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.client_id) {
            return Err(OAuth2Error::storage(format!(
                "client already exists: {}",
                client.client_id
            )));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn update(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.write().await;
        if !clients.contains_key(&client.client_id) {
            return Err(OAuth2Error::storage(format!(
                "no such client: {}",
                client.client_id
            )));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn delete(&self, client_id: &str) -> AuthResult<()> {
        self.clients.write().await.remove(client_id);
        Ok(())
    }

    async fn list(&self) -> AuthResult<Vec<Client>> {
        Ok(self.clients.read().await.values().cloned().collect())
    }
}

/// In-memory scope repository.
#[derive(Default)]
pub struct MemoryScopeStore {
    scopes: RwLock<HashMap<String, Scope>>,
}

impl MemoryScopeStore {
    /// Creates a repository pre-populated with the given scopes.
    #[must_use]
    pub fn with_entries(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self {
            scopes: RwLock::new(
                scopes
                    .into_iter()
                    .map(|scope| (scope.name.clone(), scope))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl ScopeStore for MemoryScopeStore {
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<Scope>> {
        Ok(self.scopes.read().await.get(name).cloned())
    }

    async fn create(&self, scope: &Scope) -> AuthResult<()> {
        let mut scopes = self.scopes.write().await;
        if scopes.contains_key(&scope.name) {
            return Err(OAuth2Error::storage(format!(
                "scope already exists: {}",
                scope.name
            )));
        }
        scopes.insert(scope.name.clone(), scope.clone());
        Ok(())
    }

    async fn list(&self) -> AuthResult<Vec<Scope>> {
        Ok(self.scopes.read().await.values().cloned().collect())
    }
}

/// In-memory approval repository, keyed by `(client_id, username)`.
#[derive(Default)]
pub struct MemoryAuthorizationStore {
    authorizations: RwLock<HashMap<(String, String), Authorization>>,
}

impl MemoryAuthorizationStore {
    /// Creates a repository pre-populated with the given approvals.
    #[must_use]
    pub fn with_entries(authorizations: impl IntoIterator<Item = Authorization>) -> Self {
        Self {
            authorizations: RwLock::new(
                authorizations
                    .into_iter()
                    .map(|authorization| {
                        (
                            (
                                authorization.client_id.clone(),
                                authorization.username.clone(),
                            ),
                            authorization,
                        )
                    })
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl AuthorizationStore for MemoryAuthorizationStore {
    async fn find_by_client_and_username(
        &self,
        client_id: &str,
        username: &str,
    ) -> AuthResult<Option<Authorization>> {
        Ok(self
            .authorizations
            .read()
            .await
            .get(&(client_id.to_string(), username.to_string()))
            .cloned())
    }

    async fn upsert(&self, authorization: &Authorization) -> AuthResult<()> {
        self.authorizations.write().await.insert(
            (
                authorization.client_id.clone(),
                authorization.username.clone(),
            ),
            authorization.clone(),
        );
        Ok(())
    }

    async fn list(&self) -> AuthResult<Vec<Authorization>> {
        Ok(self
            .authorizations
            .read()
            .await
            .values()
            .cloned()
            .collect())
    }
}

/// In-memory authorization code repository.
#[derive(Default)]
pub struct MemoryCodeStore {
    codes: RwLock<HashMap<String, AuthorizationCode>>,
}

impl MemoryCodeStore {
    /// Creates a repository pre-populated with the given codes.
    #[must_use]
    pub fn with_entries(codes: impl IntoIterator<Item = AuthorizationCode>) -> Self {
        Self {
            codes: RwLock::new(
                codes
                    .into_iter()
                    .map(|code| (code.code.clone(), code))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl CodeStore for MemoryCodeStore {
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.read().await.get(code).cloned())
    }

    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
        let mut codes = self.codes.write().await;
        if codes.contains_key(&code.code) {
            return Err(OAuth2Error::storage("authorization code collision"));
        }
        codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.write().await.remove(code))
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> AuthResult<usize> {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, code| !code.is_expired(now));
        Ok(before - codes.len())
    }
}

/// In-memory access token repository.
#[derive(Default)]
pub struct MemoryAccessTokenStore {
    tokens: RwLock<HashMap<String, AccessToken>>,
}

impl MemoryAccessTokenStore {
    /// Creates a repository pre-populated with the given tokens.
    #[must_use]
    pub fn with_entries(tokens: impl IntoIterator<Item = AccessToken>) -> Self {
        Self {
            tokens: RwLock::new(
                tokens
                    .into_iter()
                    .map(|token| (token.access_token.clone(), token))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl AccessTokenStore for MemoryAccessTokenStore {
    async fn find_by_token(&self, access_token: &str) -> AuthResult<Option<AccessToken>> {
        Ok(self.tokens.read().await.get(access_token).cloned())
    }

    async fn create(&self, token: &AccessToken) -> AuthResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.access_token) {
            return Err(OAuth2Error::storage("access token collision"));
        }
        tokens.insert(token.access_token.clone(), token.clone());
        Ok(())
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> AuthResult<usize> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired(now));
        Ok(before - tokens.len())
    }
}

/// In-memory refresh token repository.
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl MemoryRefreshTokenStore {
    /// Creates a repository pre-populated with the given tokens.
    #[must_use]
    pub fn with_entries(tokens: impl IntoIterator<Item = RefreshToken>) -> Self {
        Self {
            tokens: RwLock::new(
                tokens
                    .into_iter()
                    .map(|token| (token.refresh_token.clone(), token))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn find_by_token(&self, refresh_token: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(refresh_token).cloned())
    }

    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.refresh_token) {
            return Err(OAuth2Error::storage("refresh token collision"));
        }
        tokens.insert(token.refresh_token.clone(), token.clone());
        Ok(())
    }

    async fn consume(&self, refresh_token: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tokens.write().await.remove(refresh_token))
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> AuthResult<usize> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired(now));
        Ok(before - tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use super::*;

    fn code(value: &str, expires: OffsetDateTime) -> AuthorizationCode {
        AuthorizationCode {
            code: value.to_string(),
            client_id: "http://democlient1.com/".to_string(),
            redirect_uri: Some("http://democlient1.com/redirect_uri".to_string()),
            state: None,
            username: "demousername1".to_string(),
            scope: vec!["demoscope1".to_string()],
            expires,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let store = MemoryCodeStore::default();
        let record = code("abc", datetime!(2016-01-01 12:10:00 UTC));

        store.create(&record).await.unwrap();
        let err = store.create(&record).await.unwrap_err();
        assert_eq!(err.error_code(), "server_error");
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let store = MemoryCodeStore::default();
        store
            .create(&code("abc", datetime!(2016-01-01 12:10:00 UTC)))
            .await
            .unwrap();

        assert!(store.consume("abc").await.unwrap().is_some());
        assert!(store.consume("abc").await.unwrap().is_none());
        assert!(store.find_by_code("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_consume_has_one_winner() {
        let store = Arc::new(MemoryCodeStore::default());
        store
            .create(&code("abc", datetime!(2016-01-01 12:10:00 UTC)))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.consume("abc").await.unwrap().is_some()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let now = datetime!(2016-01-01 12:00:00 UTC);
        let store = MemoryCodeStore::with_entries([
            code("live", now + time::Duration::minutes(10)),
            code("dead", now - time::Duration::minutes(10)),
            code("edge", now),
        ]);

        // Expiry exactly at `now` counts as expired.
        assert_eq!(store.delete_expired(now).await.unwrap(), 2);
        assert!(store.find_by_code("live").await.unwrap().is_some());
        assert!(store.find_by_code("dead").await.unwrap().is_none());
        assert!(store.find_by_code("edge").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authorization_upsert_replaces() {
        let store = MemoryAuthorizationStore::default();
        let first = Authorization::new(
            "demousername1",
            "http://democlient1.com/",
            vec!["demoscope1".to_string()],
        );
        store.upsert(&first).await.unwrap();

        let widened = Authorization::new(
            "demousername1",
            "http://democlient1.com/",
            vec!["demoscope1".to_string(), "demoscope2".to_string()],
        );
        store.upsert(&widened).await.unwrap();

        let stored = store
            .find_by_client_and_username("http://democlient1.com/", "demousername1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.scope.len(), 2);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}

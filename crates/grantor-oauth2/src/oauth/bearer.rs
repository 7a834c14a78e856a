//! Bearer token type handler.
//!
//! Mints opaque bearer tokens, persists them, and shapes the token-endpoint
//! payload. `expires_in` is always computed against the clock at shaping
//! time; the absolute expiry instant is what gets stored.

use std::sync::Arc;

use serde::Serialize;

use crate::AuthResult;
use crate::config::OAuthConfig;
use crate::error::OAuth2Error;
use crate::store::{Clock, ModelStore};
use crate::types::{AccessToken, RefreshToken, generate_token_value, join_scope};

/// Token endpoint response body (RFC 6749 section 5.1).
#[derive(Debug, Clone, Serialize)]
pub struct TokenPayload {
    /// The opaque access token value.
    pub access_token: String,

    /// Always `"bearer"`.
    pub token_type: String,

    /// Seconds until the access token expires, relative to issuance.
    pub expires_in: i64,

    /// Refresh token, when the grant issues one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Granted scope, space-joined. Omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Issues bearer tokens and shapes token responses.
pub struct BearerTokenIssuer {
    store: ModelStore,
    clock: Arc<dyn Clock>,
    config: OAuthConfig,
}

impl BearerTokenIssuer {
    /// Creates a new issuer.
    #[must_use]
    pub fn new(store: ModelStore, clock: Arc<dyn Clock>, config: OAuthConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Mints and persists an access token for a validated grant outcome.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn mint_access_token(
        &self,
        client_id: &str,
        username: Option<&str>,
        scope: &[String],
    ) -> AuthResult<AccessToken> {
        let token = AccessToken {
            access_token: generate_token_value(),
            token_type: "bearer".to_string(),
            client_id: client_id.to_string(),
            username: username.map(str::to_string),
            scope: scope.to_vec(),
            expires: self.clock.now() + self.config.access_lifetime(),
        };
        self.store.access_tokens().create(&token).await?;
        Ok(token)
    }

    /// Mints and persists a refresh token for a validated grant outcome.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn mint_refresh_token(
        &self,
        client_id: &str,
        username: Option<&str>,
        scope: &[String],
    ) -> AuthResult<RefreshToken> {
        let token = RefreshToken {
            refresh_token: generate_token_value(),
            client_id: client_id.to_string(),
            username: username.map(str::to_string),
            scope: scope.to_vec(),
            expires: self.clock.now() + self.config.refresh_lifetime(),
        };
        self.store.refresh_tokens().create(&token).await?;
        Ok(token)
    }

    /// Mints an access token (and optionally a refresh token) and shapes the
    /// final token-endpoint payload.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn issue(
        &self,
        client_id: &str,
        username: Option<&str>,
        scope: &[String],
        with_refresh_token: bool,
    ) -> AuthResult<TokenPayload> {
        let access = self.mint_access_token(client_id, username, scope).await?;
        let refresh = if with_refresh_token {
            Some(self.mint_refresh_token(client_id, username, scope).await?)
        } else {
            None
        };
        Ok(self.shape(&access, refresh.as_ref()))
    }

    /// Shapes a token payload from persisted records, computing `expires_in`
    /// against the clock now.
    #[must_use]
    pub fn shape(&self, access: &AccessToken, refresh: Option<&RefreshToken>) -> TokenPayload {
        TokenPayload {
            access_token: access.access_token.clone(),
            token_type: access.token_type.clone(),
            expires_in: access.expires_in(self.clock.now()),
            refresh_token: refresh.map(|token| token.refresh_token.clone()),
            scope: if access.scope.is_empty() {
                None
            } else {
                Some(join_scope(&access.scope))
            },
        }
    }

    /// Looks up a presented bearer token and enforces expiry.
    ///
    /// The protected-resource side of the handler: the same lookup-and-check
    /// pattern as code and refresh token redemption.
    ///
    /// # Errors
    ///
    /// Fails with `invalid_grant` for an unknown or expired token.
    pub async fn authenticate(&self, access_token: &str) -> AuthResult<AccessToken> {
        let token = self
            .store
            .access_tokens()
            .find_by_token(access_token)
            .await?
            .ok_or_else(|| OAuth2Error::invalid_grant("Unknown access token"))?;

        if token.is_expired(self.clock.now()) {
            return Err(OAuth2Error::invalid_grant("Access token has expired"));
        }

        Ok(token)
    }
}

//! Token endpoint handlers.
//!
//! Dispatch on `grant_type` selects a handler; every handler authenticates
//! the client first, then validates its own parameters in order and stops
//! at the first failure. Nothing is persisted until the whole chain has
//! passed, and redemption of single-use artifacts (codes, rotated refresh
//! tokens) goes through the store's atomic `consume` so a replay race has
//! exactly one winner.
//!
//! Token endpoint failures are always direct JSON responses; the redirect
//! delivery rules of the authorization endpoint do not apply here.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::AuthResult;
use crate::config::OAuthConfig;
use crate::error::OAuth2Error;
use crate::oauth::bearer::{BearerTokenIssuer, TokenPayload};
use crate::store::{Clock, CredentialVerifier, ModelStore};
use crate::types::{RefreshToken, parse_scope, scope_is_subset};
use crate::validate;

/// Token endpoint request parameters.
///
/// The union of every grant type's parameters; each handler picks out what
/// it needs and rejects what is missing with the precise protocol error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// Requested grant type.
    pub grant_type: Option<String>,

    /// Authorization code (authorization_code grant).
    pub code: Option<String>,

    /// Redirect URI to recheck against the one bound into the code.
    pub redirect_uri: Option<String>,

    /// Client identifier, when sent as a body parameter.
    pub client_id: Option<String>,

    /// Client secret, when sent as a body parameter.
    pub client_secret: Option<String>,

    /// Refresh token (refresh_token grant).
    pub refresh_token: Option<String>,

    /// Requested scope, space-delimited.
    pub scope: Option<String>,

    /// Resource owner username (password grant).
    pub username: Option<String>,

    /// Resource owner password (password grant).
    pub password: Option<String>,
}

impl TokenRequest {
    /// Client credentials carried in the request body.
    ///
    /// The HTTP layer prefers an Authorization header when one is present
    /// and falls back to these.
    #[must_use]
    pub fn body_credentials(&self) -> ClientCredentials {
        ClientCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

/// Client credentials presented to the token endpoint, already merged from
/// whichever transport carried them (HTTP Basic or body parameters).
#[derive(Debug, Clone, Default)]
pub struct ClientCredentials {
    /// Client identifier.
    pub client_id: Option<String>,

    /// Client secret. Absent for public clients.
    pub client_secret: Option<String>,
}

impl ClientCredentials {
    /// Credentials for a confidential client.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
        }
    }

    /// Credentials for a public client (identifier only).
    #[must_use]
    pub fn public(client_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: None,
        }
    }
}

/// The closed set of token endpoint handlers.
///
/// Registered by string identifier; unknown identifiers are rejected at
/// dispatch with `unsupported_grant_type`. Adding a grant type means adding
/// a variant here, not touching the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantTypeHandler {
    /// Authorization code redemption (RFC 6749 section 4.1.3).
    AuthorizationCode,
    /// Resource owner password credentials (RFC 6749 section 4.3).
    Password,
    /// Client credentials (RFC 6749 section 4.4).
    ClientCredentials,
    /// Refresh token redemption (RFC 6749 section 6).
    RefreshToken,
}

impl GrantTypeHandler {
    /// Selects the handler for a `grant_type` parameter.
    ///
    /// # Errors
    ///
    /// Fails with `invalid_request` when the parameter is missing and
    /// `unsupported_grant_type` when it names no registered handler.
    pub fn from_param(value: Option<&str>) -> AuthResult<Self> {
        match value.filter(|v| !v.is_empty()) {
            None => Err(OAuth2Error::invalid_request(
                "Missing required parameter: grant_type",
            )),
            Some("authorization_code") => Ok(Self::AuthorizationCode),
            Some("password") => Ok(Self::Password),
            Some("client_credentials") => Ok(Self::ClientCredentials),
            Some("refresh_token") => Ok(Self::RefreshToken),
            Some(other) => Err(OAuth2Error::unsupported_grant_type(other)),
        }
    }

    /// Returns the wire identifier of this handler.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Whether this grant issues a refresh token alongside the access token.
    ///
    /// Client credentials never gets one: the client can always re-request.
    #[must_use]
    pub fn issues_refresh_token(&self) -> bool {
        !matches!(self, Self::ClientCredentials)
    }
}

/// Token endpoint service.
///
/// Authenticates the client once, dispatches on `grant_type`, and returns
/// the shaped token payload. One instance serves all requests.
pub struct TokenService {
    store: ModelStore,
    clock: Arc<dyn Clock>,
    verifier: Arc<dyn CredentialVerifier>,
    config: OAuthConfig,
    issuer: BearerTokenIssuer,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        store: ModelStore,
        clock: Arc<dyn Clock>,
        verifier: Arc<dyn CredentialVerifier>,
        config: OAuthConfig,
    ) -> Self {
        let issuer = BearerTokenIssuer::new(store.clone(), clock.clone(), config.clone());
        Self {
            store,
            clock,
            verifier,
            config,
            issuer,
        }
    }

    /// The issuer backing this service, for protected-resource checks.
    #[must_use]
    pub fn issuer(&self) -> &BearerTokenIssuer {
        &self.issuer
    }

    /// Processes a token request end to end.
    ///
    /// # Errors
    ///
    /// Returns the protocol error for the first failed validation step.
    pub async fn token(
        &self,
        request: &TokenRequest,
        credentials: &ClientCredentials,
    ) -> AuthResult<TokenPayload> {
        let handler = GrantTypeHandler::from_param(request.grant_type.as_deref())?;

        let client = validate::check_client_credentials(credentials, &self.store).await?;

        debug!(
            grant_type = handler.as_str(),
            client_id = %client.client_id,
            "processing token request"
        );

        let payload = match handler {
            GrantTypeHandler::AuthorizationCode => {
                self.grant_authorization_code(request, &client.client_id).await
            }
            GrantTypeHandler::Password => self.grant_password(request, &client.client_id).await,
            GrantTypeHandler::ClientCredentials => {
                self.grant_client_credentials(request, &client.client_id).await
            }
            GrantTypeHandler::RefreshToken => {
                self.grant_refresh_token(request, &client.client_id).await
            }
        }?;

        info!(
            grant_type = handler.as_str(),
            client_id = %client.client_id,
            "token issued"
        );

        Ok(payload)
    }

    /// Redeems a single-use authorization code for tokens.
    async fn grant_authorization_code(
        &self,
        request: &TokenRequest,
        client_id: &str,
    ) -> AuthResult<TokenPayload> {
        let code_value = request
            .code
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| OAuth2Error::invalid_request("Missing required parameter: code"))?;

        let code = self
            .store
            .codes()
            .find_by_code(code_value)
            .await?
            .ok_or_else(|| OAuth2Error::invalid_grant("Unknown authorization code"))?;

        if code.client_id != client_id {
            warn!(client_id, "authorization code presented by wrong client");
            return Err(OAuth2Error::invalid_grant(
                "Authorization code was issued to another client",
            ));
        }

        if code.is_expired(self.clock.now()) {
            return Err(OAuth2Error::invalid_grant("Authorization code has expired"));
        }

        // The redirect URI bound at issuance must be repeated exactly.
        if let Some(bound) = code.redirect_uri.as_deref() {
            match request.redirect_uri.as_deref().filter(|v| !v.is_empty()) {
                None => {
                    return Err(OAuth2Error::invalid_request(
                        "Missing required parameter: redirect_uri",
                    ));
                }
                Some(supplied) if supplied != bound => {
                    return Err(OAuth2Error::invalid_grant(
                        "redirect_uri does not match the authorization request",
                    ));
                }
                Some(_) => {}
            }
        }

        // Consume last: a failed validation must not destroy the code, and
        // concurrent redemption has exactly one winner here.
        let code = self
            .store
            .codes()
            .consume(code_value)
            .await?
            .ok_or_else(|| OAuth2Error::invalid_grant("Unknown authorization code"))?;

        self.issuer
            .issue(client_id, Some(&code.username), &code.scope, true)
            .await
    }

    /// Exchanges resource owner credentials for tokens.
    async fn grant_password(
        &self,
        request: &TokenRequest,
        client_id: &str,
    ) -> AuthResult<TokenPayload> {
        let username = request
            .username
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| OAuth2Error::invalid_request("Missing required parameter: username"))?;
        let password = request
            .password
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| OAuth2Error::invalid_request("Missing required parameter: password"))?;

        if !self.verifier.verify(username, password).await? {
            warn!(client_id, "resource owner credential verification failed");
            return Err(OAuth2Error::invalid_grant(
                "Invalid resource owner credentials",
            ));
        }

        let scope = validate::check_scope_approved(
            request.scope.as_deref(),
            &self.store,
            client_id,
            username,
        )
        .await?;

        self.issuer
            .issue(client_id, Some(username), &scope, true)
            .await
    }

    /// Issues tokens against the client's own authorization. No resource
    /// owner is involved and no refresh token is issued.
    async fn grant_client_credentials(
        &self,
        request: &TokenRequest,
        client_id: &str,
    ) -> AuthResult<TokenPayload> {
        let scope = validate::check_scope_exists(request.scope.as_deref(), &self.store).await?;

        self.issuer.issue(client_id, None, &scope, false).await
    }

    /// Redeems a refresh token for a fresh access token, optionally
    /// narrowing scope and rotating the refresh token.
    async fn grant_refresh_token(
        &self,
        request: &TokenRequest,
        client_id: &str,
    ) -> AuthResult<TokenPayload> {
        let token_value = request
            .refresh_token
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                OAuth2Error::invalid_request("Missing required parameter: refresh_token")
            })?;

        let presented = self
            .store
            .refresh_tokens()
            .find_by_token(token_value)
            .await?
            .ok_or_else(|| OAuth2Error::invalid_grant("Unknown refresh token"))?;

        if presented.client_id != client_id {
            warn!(client_id, "refresh token presented by wrong client");
            return Err(OAuth2Error::invalid_grant(
                "Refresh token was issued to another client",
            ));
        }

        if presented.is_expired(self.clock.now()) {
            return Err(OAuth2Error::invalid_grant("Refresh token has expired"));
        }

        // Scope may be narrowed on refresh, never widened.
        let scope = match request.scope.as_deref().filter(|v| !v.is_empty()) {
            None => presented.scope.clone(),
            Some(requested) => {
                let requested = parse_scope(requested);
                if !scope_is_subset(&requested, &presented.scope) {
                    return Err(OAuth2Error::invalid_scope(
                        "Requested scope exceeds the scope of the refresh token",
                    ));
                }
                requested
            }
        };

        let username = presented.username.as_deref();

        if self.config.refresh_token_rotation {
            self.rotate_refresh_token(&presented, username, &scope).await
        } else {
            let access = self
                .issuer
                .mint_access_token(client_id, username, &scope)
                .await?;
            Ok(self.issuer.shape(&access, Some(&presented)))
        }
    }

    /// Consumes the presented refresh token and issues a replacement.
    ///
    /// The consume is atomic; of two concurrent redemptions of the same
    /// token exactly one rotates it, the other sees `invalid_grant`.
    async fn rotate_refresh_token(
        &self,
        presented: &RefreshToken,
        username: Option<&str>,
        scope: &[String],
    ) -> AuthResult<TokenPayload> {
        self.store
            .refresh_tokens()
            .consume(&presented.refresh_token)
            .await?
            .ok_or_else(|| OAuth2Error::invalid_grant("Unknown refresh token"))?;

        self.issuer
            .issue(&presented.client_id, username, scope, true)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_type_dispatch() {
        assert_eq!(
            GrantTypeHandler::from_param(Some("authorization_code")).unwrap(),
            GrantTypeHandler::AuthorizationCode
        );
        assert_eq!(
            GrantTypeHandler::from_param(Some("refresh_token")).unwrap(),
            GrantTypeHandler::RefreshToken
        );

        let err = GrantTypeHandler::from_param(None).unwrap_err();
        assert_eq!(err.error_code(), "invalid_request");

        let err = GrantTypeHandler::from_param(Some("urn:ietf:params:oauth:grant-type:jwt-bearer"))
            .unwrap_err();
        assert_eq!(err.error_code(), "unsupported_grant_type");
    }

    #[test]
    fn test_body_credentials() {
        let request = TokenRequest {
            client_id: Some("http://democlient1.com/".to_string()),
            client_secret: Some("demosecret1".to_string()),
            ..TokenRequest::default()
        };
        let credentials = request.body_credentials();
        assert_eq!(credentials.client_id.as_deref(), Some("http://democlient1.com/"));
        assert_eq!(credentials.client_secret.as_deref(), Some("demosecret1"));
    }
}

//! Axum handlers for the OAuth 2.0 endpoints.
//!
//! - [`authorize`] - `GET /oauth2/authorize`
//! - [`token`] - `POST /oauth2/token`
//! - [`resource`] - `GET /oauth2/resource/username`, a demo protected resource
//!
//! The handlers are thin: they parse transport-level concerns (query and
//! form bodies, HTTP Basic credentials, bearer tokens) and hand everything
//! to the protocol services. All policy lives below this layer.

pub mod authorize;
pub mod resource;
pub mod token;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use base64::Engine;
use serde_json::json;

use crate::config::OAuthConfig;
use crate::error::OAuth2Error;
use crate::oauth::{AuthorizationService, TokenService};
use crate::store::{Clock, CredentialVerifier, ModelStore};

pub use authorize::authorize_handler;
pub use resource::resource_handler;
pub use token::token_handler;

/// Shared state for all OAuth endpoints.
#[derive(Clone)]
pub struct OAuthState {
    authorization: Arc<AuthorizationService>,
    tokens: Arc<TokenService>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl OAuthState {
    /// Wires the protocol services over a store, clock and verifier.
    #[must_use]
    pub fn new(
        store: ModelStore,
        clock: Arc<dyn Clock>,
        verifier: Arc<dyn CredentialVerifier>,
        config: OAuthConfig,
    ) -> Self {
        let authorization = Arc::new(AuthorizationService::new(
            store.clone(),
            clock.clone(),
            config.clone(),
        ));
        let tokens = Arc::new(TokenService::new(store, clock, verifier.clone(), config));
        Self {
            authorization,
            tokens,
            verifier,
        }
    }

    /// The authorization endpoint service.
    #[must_use]
    pub fn authorization(&self) -> &AuthorizationService {
        &self.authorization
    }

    /// The token endpoint service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// The resource-owner credential verifier.
    #[must_use]
    pub fn verifier(&self) -> &dyn CredentialVerifier {
        self.verifier.as_ref()
    }
}

/// The OAuth endpoint routes. Nest or merge this into an application router.
pub fn routes() -> Router<OAuthState> {
    Router::new()
        .route("/oauth2/authorize", get(authorize_handler))
        .route("/oauth2/token", post(token_handler))
        .route("/oauth2/resource/username", get(resource_handler))
}

/// Shapes a protocol error as the RFC 6749 section 5.2 JSON body.
///
/// `invalid_client` gets a `WWW-Authenticate` challenge so Basic-auth
/// clients know to retry with credentials.
pub(crate) fn error_response(error: &OAuth2Error) -> Response {
    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::Json(json!({
        "error": error.error_code(),
        "error_description": error.error_description(),
    }));

    if status == StatusCode::UNAUTHORIZED {
        (
            status,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"oauth2\"")],
            body,
        )
            .into_response()
    } else {
        (status, body).into_response()
    }
}

/// Parses HTTP Basic credentials from the Authorization header.
///
/// Both halves are form-urlencoded inside the Basic value (RFC 6749
/// section 2.3.1); client identifiers here are URIs, so the colon in
/// `http://` must arrive as `%3A`.
pub(crate) fn parse_basic_auth(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (username, password) = credentials.split_once(':')?;
    Some((decode_credential(username)?, decode_credential(password)?))
}

/// Decodes one form-urlencoded credential component. A bare `=` or `&`
/// means the component was not encoded; such values are rejected.
fn decode_credential(value: &str) -> Option<String> {
    let mut parsed = url::form_urlencoded::parse(value.as_bytes());
    match parsed.next() {
        None => Some(String::new()),
        Some((decoded, tail)) if tail.is_empty() && parsed.next().is_none() => {
            Some(decoded.into_owned())
        }
        _ => None,
    }
}

//! Authorization endpoint handlers.
//!
//! Dispatch on `response_type` selects a handler; the handler runs the
//! validation chain in its required order (resource owner, client, redirect
//! URI, state, scope), then either mints an authorization code (`code`) or
//! an access token delivered in the URI fragment (`token`, the implicit
//! flow).
//!
//! Error delivery follows RFC 6749 section 4.1.2.1: once the redirect
//! target has been validated, failures travel back to the client as
//! redirect parameters; before that point (unauthenticated owner, unknown
//! client, unusable redirect URI, unknown response type) redirecting would
//! mean sending an error to an unvalidated URI, so those are direct
//! responses.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::AuthResult;
use crate::config::OAuthConfig;
use crate::error::{OAuth2Error, RedirectableError};
use crate::oauth::AuthContext;
use crate::oauth::bearer::BearerTokenIssuer;
use crate::store::{Clock, ModelStore};
use crate::types::AuthorizationCode;
use crate::validate;

/// Authorization endpoint request parameters.
///
/// All fields are optional at the parsing layer; the validation chain
/// produces the precise protocol error for anything missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeRequest {
    /// Requested response type (`code` or `token`).
    pub response_type: Option<String>,

    /// Client identifier.
    pub client_id: Option<String>,

    /// Redirect target. Required when the client has none registered.
    pub redirect_uri: Option<String>,

    /// Requested scope, space-delimited.
    pub scope: Option<String>,

    /// Opaque anti-CSRF value, echoed back verbatim.
    pub state: Option<String>,
}

/// Successful authorization outcome: the redirect the user agent is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeSuccess {
    /// Full redirect URL carrying the code (query) or token (fragment).
    pub location: String,
}

/// Failed authorization outcome.
#[derive(Debug)]
pub enum AuthorizeRejection {
    /// No trusted redirect target exists; respond directly.
    Direct(OAuth2Error),

    /// The redirect target was validated before the failure; deliver the
    /// error as redirect parameters.
    Redirect {
        /// The validated redirect target.
        target: String,
        /// The failure being reported.
        error: OAuth2Error,
        /// State to echo, when the request carried one.
        state: Option<String>,
        /// Deliver in the URI fragment (implicit flow) instead of the query.
        fragment: bool,
    },
}

impl AuthorizeRejection {
    /// Builds the error-redirect URL, when one applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored redirect target fails to parse, which
    /// would indicate a corrupted client registration.
    pub fn location(&self) -> AuthResult<Option<String>> {
        let Self::Redirect {
            target,
            error,
            state,
            fragment,
        } = self
        else {
            return Ok(None);
        };

        let code = RedirectableError::from_error(error);
        let mut pairs: Vec<(&str, String)> = vec![
            ("error", code.as_str().to_string()),
            ("error_description", error.error_description()),
        ];
        if let Some(state) = state {
            pairs.push(("state", state.clone()));
        }

        Ok(Some(append_params(target, &pairs, *fragment)?))
    }
}

/// The closed set of authorization endpoint handlers.
///
/// Registered by string identifier; unknown identifiers are rejected at
/// dispatch with `unsupported_response_type`, which is the extension seam:
/// adding a response type means adding a variant here, not touching the
/// dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTypeHandler {
    /// Authorization code issuance (RFC 6749 section 4.1).
    Code,
    /// Implicit access token issuance (RFC 6749 section 4.2).
    Token,
}

impl ResponseTypeHandler {
    /// Selects the handler for a `response_type` parameter.
    ///
    /// # Errors
    ///
    /// Fails with `invalid_request` when the parameter is missing and
    /// `unsupported_response_type` when it names no registered handler.
    pub fn from_param(value: Option<&str>) -> AuthResult<Self> {
        match value.filter(|v| !v.is_empty()) {
            None => Err(OAuth2Error::invalid_request(
                "Missing required parameter: response_type",
            )),
            Some("code") => Ok(Self::Code),
            Some("token") => Ok(Self::Token),
            Some(other) => Err(OAuth2Error::unsupported_response_type(other)),
        }
    }

    /// Returns the wire identifier of this handler.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
        }
    }
}

/// Authorization endpoint service.
///
/// Owns the dispatch from `response_type` to handler and the shared
/// validation chain. One instance serves all requests; it holds no
/// per-request state.
pub struct AuthorizationService {
    store: ModelStore,
    clock: Arc<dyn Clock>,
    config: OAuthConfig,
    issuer: BearerTokenIssuer,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(store: ModelStore, clock: Arc<dyn Clock>, config: OAuthConfig) -> Self {
        let issuer = BearerTokenIssuer::new(store.clone(), clock.clone(), config.clone());
        Self {
            store,
            clock,
            config,
            issuer,
        }
    }

    /// Processes an authorization request end to end.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthorizeRejection`] carrying either a direct protocol
    /// error or a pre-validated error-redirect.
    pub async fn authorize(
        &self,
        request: &AuthorizeRequest,
        auth: &AuthContext,
    ) -> Result<AuthorizeSuccess, AuthorizeRejection> {
        let handler = ResponseTypeHandler::from_param(request.response_type.as_deref())
            .map_err(AuthorizeRejection::Direct)?;

        debug!(
            response_type = handler.as_str(),
            client_id = ?request.client_id,
            "processing authorization request"
        );

        handler.handle(self, request, auth).await
    }

    /// Runs the shared validation chain in its required order and returns
    /// the validated values: username, client, redirect target, state and
    /// granted scope.
    async fn validate_chain(
        &self,
        request: &AuthorizeRequest,
        auth: &AuthContext,
        fragment: bool,
    ) -> Result<ValidatedAuthorize, AuthorizeRejection> {
        // Owner, client and redirect URI fail direct: no trusted target yet.
        let username = validate::check_username(auth).map_err(AuthorizeRejection::Direct)?;

        let client = validate::check_client_id(request.client_id.as_deref(), &self.store)
            .await
            .map_err(AuthorizeRejection::Direct)?;

        let redirect = validate::check_redirect_uri(&client, request.redirect_uri.as_deref())
            .map_err(AuthorizeRejection::Direct)?;

        // From here on the target is trusted; failures redirect.
        let state = validate::check_state(request.state.as_deref());

        let scope = validate::check_scope_approved(
            request.scope.as_deref(),
            &self.store,
            &client.client_id,
            &username,
        )
        .await
        .map_err(|error| AuthorizeRejection::Redirect {
            target: redirect.target.clone(),
            error,
            state: state.clone(),
            fragment,
        })?;

        Ok(ValidatedAuthorize {
            username,
            client_id: client.client_id,
            redirect,
            state,
            scope,
        })
    }
}

struct ValidatedAuthorize {
    username: String,
    client_id: String,
    redirect: validate::ResolvedRedirect,
    state: Option<String>,
    scope: Vec<String>,
}

impl ResponseTypeHandler {
    /// Handles a dispatched authorization request.
    async fn handle(
        self,
        service: &AuthorizationService,
        request: &AuthorizeRequest,
        auth: &AuthContext,
    ) -> Result<AuthorizeSuccess, AuthorizeRejection> {
        match self {
            Self::Code => handle_code(service, request, auth).await,
            Self::Token => handle_token(service, request, auth).await,
        }
    }
}

/// Code response type: mint a single-use authorization code and redirect
/// with `code` (and `state`) as query parameters.
async fn handle_code(
    service: &AuthorizationService,
    request: &AuthorizeRequest,
    auth: &AuthContext,
) -> Result<AuthorizeSuccess, AuthorizeRejection> {
    let validated = service.validate_chain(request, auth, false).await?;

    let code = AuthorizationCode {
        code: AuthorizationCode::generate(),
        client_id: validated.client_id.clone(),
        redirect_uri: validated.redirect.supplied.clone(),
        state: validated.state.clone(),
        username: validated.username.clone(),
        scope: validated.scope.clone(),
        expires: service.clock.now() + service.config.code_lifetime(),
    };

    service
        .store
        .codes()
        .create(&code)
        .await
        .map_err(|error| redirect_rejection(&validated, error, false))?;

    info!(
        client_id = %validated.client_id,
        username = %validated.username,
        "authorization code issued"
    );

    let mut pairs: Vec<(&str, String)> = vec![("code", code.code)];
    if let Some(ref state) = validated.state {
        pairs.push(("state", state.clone()));
    }

    let location = append_params(&validated.redirect.target, &pairs, false)
        .map_err(|error| redirect_rejection(&validated, error, false))?;

    Ok(AuthorizeSuccess { location })
}

/// Token response type (implicit): mint an access token and deliver it in
/// the URI fragment. No refresh token is issued on this path.
async fn handle_token(
    service: &AuthorizationService,
    request: &AuthorizeRequest,
    auth: &AuthContext,
) -> Result<AuthorizeSuccess, AuthorizeRejection> {
    let validated = service.validate_chain(request, auth, true).await?;

    let payload = service
        .issuer
        .issue(
            &validated.client_id,
            Some(&validated.username),
            &validated.scope,
            false,
        )
        .await
        .map_err(|error| redirect_rejection(&validated, error, true))?;

    info!(
        client_id = %validated.client_id,
        username = %validated.username,
        "implicit access token issued"
    );

    let mut pairs: Vec<(&str, String)> = vec![
        ("access_token", payload.access_token),
        ("token_type", payload.token_type),
        ("expires_in", payload.expires_in.to_string()),
    ];
    if let Some(scope) = payload.scope {
        pairs.push(("scope", scope));
    }
    if let Some(ref state) = validated.state {
        pairs.push(("state", state.clone()));
    }

    let location = append_params(&validated.redirect.target, &pairs, true)
        .map_err(|error| redirect_rejection(&validated, error, true))?;

    Ok(AuthorizeSuccess { location })
}

fn redirect_rejection(
    validated: &ValidatedAuthorize,
    error: OAuth2Error,
    fragment: bool,
) -> AuthorizeRejection {
    AuthorizeRejection::Redirect {
        target: validated.redirect.target.clone(),
        error,
        state: validated.state.clone(),
        fragment,
    }
}

/// Appends encoded parameters to a redirect target, either as query
/// parameters or as the URI fragment.
fn append_params(
    target: &str,
    pairs: &[(&str, String)],
    fragment: bool,
) -> AuthResult<String> {
    let mut url = url::Url::parse(target)
        .map_err(|_| OAuth2Error::internal("Registered redirect URI is not a valid URL"))?;

    if fragment {
        let mut encoded = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            encoded.append_pair(key, value);
        }
        url.set_fragment(Some(&encoded.finish()));
    } else {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
        drop(query);
    }

    Ok(url.to_string())
}

//! Parameter validation.
//!
//! Stateless check functions shared by the response type and grant type
//! handlers. Each takes request-derived values plus a store handle and
//! returns the validated value or a specific protocol error; callers run
//! them strictly in the documented order and stop at the first failure, so
//! no writes ever precede a passing validation chain.

use crate::AuthResult;
use crate::error::OAuth2Error;
use crate::oauth::AuthContext;
use crate::oauth::grant::ClientCredentials;
use crate::store::ModelStore;
use crate::types::{Client, parse_scope};

/// The redirect target a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRedirect {
    /// URI the response will be delivered to.
    pub target: String,

    /// The URI the request supplied explicitly, if any. Bound into the
    /// authorization code so the token exchange can require it again.
    pub supplied: Option<String>,
}

/// Checks that a resource owner is authenticated.
///
/// # Errors
///
/// Fails with `access_denied` for an anonymous context.
pub fn check_username(auth: &AuthContext) -> AuthResult<String> {
    auth.username
        .clone()
        .ok_or_else(|| OAuth2Error::access_denied("Resource owner is not authenticated"))
}

/// Checks that `client_id` is present and resolves to a registered client.
///
/// # Errors
///
/// Fails with `invalid_request` when missing and `invalid_client` when
/// unknown.
pub async fn check_client_id(
    client_id: Option<&str>,
    store: &ModelStore,
) -> AuthResult<Client> {
    let client_id = client_id
        .filter(|value| !value.is_empty())
        .ok_or_else(|| OAuth2Error::invalid_request("Missing required parameter: client_id"))?;

    store
        .clients()
        .find_by_client_id(client_id)
        .await?
        .ok_or_else(|| OAuth2Error::invalid_client("Unknown client"))
}

/// Resolves the redirect target for an authorization request.
///
/// A client with no registered redirect URI must be given one in the
/// request; a client with one registered accepts either no explicit URI or
/// an exact match.
///
/// # Errors
///
/// Fails with `invalid_request` when no target can be resolved or the
/// supplied URI does not exactly match the registered one.
pub fn check_redirect_uri(
    client: &Client,
    supplied: Option<&str>,
) -> AuthResult<ResolvedRedirect> {
    let supplied = supplied.filter(|value| !value.is_empty());

    match (client.redirect_uri.as_deref(), supplied) {
        (None, None) => Err(OAuth2Error::invalid_request(
            "Missing required parameter: redirect_uri",
        )),
        (None, Some(uri)) => Ok(ResolvedRedirect {
            target: uri.to_string(),
            supplied: Some(uri.to_string()),
        }),
        (Some(registered), None) => Ok(ResolvedRedirect {
            target: registered.to_string(),
            supplied: None,
        }),
        // Exact string match only; no prefix or normalization games.
        (Some(registered), Some(uri)) if registered == uri => Ok(ResolvedRedirect {
            target: uri.to_string(),
            supplied: Some(uri.to_string()),
        }),
        (Some(_), Some(_)) => Err(OAuth2Error::invalid_request(
            "redirect_uri does not match the registered value",
        )),
    }
}

/// Passes the opaque `state` value through. Absent state is legal.
#[must_use]
pub fn check_state(state: Option<&str>) -> Option<String> {
    state
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Validates a requested scope string against the scope universe.
///
/// Every space-delimited name must exist as a stored `Scope`. An absent or
/// empty parameter yields the empty scope set.
///
/// # Errors
///
/// Fails with `invalid_scope` naming the first unknown scope.
pub async fn check_scope_exists(
    requested: Option<&str>,
    store: &ModelStore,
) -> AuthResult<Vec<String>> {
    let names = parse_scope(requested.unwrap_or_default());

    for name in &names {
        if store.scopes().find_by_name(name).await?.is_none() {
            return Err(OAuth2Error::invalid_scope(format!(
                "Unknown scope: {name}"
            )));
        }
    }

    Ok(names)
}

/// Validates a requested scope string against the universe and against the
/// resource owner's prior approval for this client.
///
/// # Errors
///
/// Fails with `invalid_scope` for unknown names and `access_denied` when
/// the owner has not approved the requested set for this client.
pub async fn check_scope_approved(
    requested: Option<&str>,
    store: &ModelStore,
    client_id: &str,
    username: &str,
) -> AuthResult<Vec<String>> {
    let names = check_scope_exists(requested, store).await?;

    if names.is_empty() {
        return Ok(names);
    }

    let approved = store
        .authorizations()
        .find_by_client_and_username(client_id, username)
        .await?;

    match approved {
        Some(authorization) if authorization.covers(&names) => Ok(names),
        _ => Err(OAuth2Error::access_denied(
            "Requested scope has not been approved by the resource owner",
        )),
    }
}

/// Authenticates a client at the token endpoint.
///
/// Confidential clients must present their secret (HTTP Basic or body
/// parameters, already merged by the HTTP layer); public clients present
/// `client_id` alone.
///
/// # Errors
///
/// Fails with `invalid_request` when `client_id` is missing and
/// `invalid_client` for an unknown client or a wrong/missing secret.
pub async fn check_client_credentials(
    credentials: &ClientCredentials,
    store: &ModelStore,
) -> AuthResult<Client> {
    let client = check_client_id(credentials.client_id.as_deref(), store).await?;

    if !client.verify_secret(credentials.client_secret.as_deref()) {
        return Err(OAuth2Error::invalid_client("Client authentication failed"));
    }

    Ok(client)
}

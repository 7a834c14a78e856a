//! Authorization endpoint handler.
//!
//! `GET /oauth2/authorize`. The resource owner authenticates with HTTP
//! Basic credentials (this stands in for whatever session layer a real
//! deployment fronts the endpoint with); the request parameters arrive in
//! the query string.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::OAuth2Error;
use crate::http::{OAuthState, error_response, parse_basic_auth};
use crate::oauth::{AuthContext, AuthorizeRejection, AuthorizeRequest};

/// OAuth 2.0 authorization endpoint handler.
///
/// Success and post-validation failures are `302` redirects back to the
/// client; failures before a redirect target is trusted are direct JSON
/// responses, with `401` plus a Basic challenge for an unauthenticated
/// resource owner.
pub async fn authorize_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Query(request): Query<AuthorizeRequest>,
) -> Response {
    let auth = match owner_context(&state, &headers).await {
        Ok(auth) => auth,
        Err(error) => return error_response(&error),
    };

    if auth.username.is_none() {
        // No credentials at all: challenge rather than reject.
        return (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"oauth2\"")],
        )
            .into_response();
    }

    match state.authorization().authorize(&request, &auth).await {
        Ok(success) => found(&success.location),
        Err(rejection) => rejection_response(&rejection),
    }
}

/// A `302 Found` redirect, as RFC 6749 section 4.1.2 illustrates.
fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => error_response(&OAuth2Error::internal("Redirect target is not a valid header value")),
    }
}

/// Resolves the resource-owner context from HTTP Basic credentials.
///
/// Missing credentials yield an anonymous context; wrong credentials are a
/// direct `access_denied`.
async fn owner_context(
    state: &OAuthState,
    headers: &HeaderMap,
) -> Result<AuthContext, OAuth2Error> {
    let Some((username, password)) = parse_basic_auth(headers) else {
        return Ok(AuthContext::anonymous());
    };

    if state.verifier().verify(&username, &password).await? {
        Ok(AuthContext::authenticated(username))
    } else {
        warn!("resource owner authentication failed at authorization endpoint");
        Err(OAuth2Error::access_denied(
            "Resource owner authentication failed",
        ))
    }
}

fn rejection_response(rejection: &AuthorizeRejection) -> Response {
    match rejection {
        AuthorizeRejection::Direct(error) => error_response(error),
        AuthorizeRejection::Redirect { .. } => match rejection.location() {
            Ok(Some(location)) => found(&location),
            Ok(None) | Err(_) => {
                error_response(&OAuth2Error::internal("Failed to build error redirect"))
            }
        },
    }
}

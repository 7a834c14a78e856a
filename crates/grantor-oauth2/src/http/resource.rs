//! Demo protected resource.
//!
//! `GET /oauth2/resource/username` authenticates a bearer token and echoes
//! the identity bound to it. It exists to exercise the protected-resource
//! side of the bearer handler end to end.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::error::OAuth2Error;
use crate::http::OAuthState;
use crate::types::join_scope;

/// Bearer token passed as a query parameter (RFC 6750 section 2.3).
#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    /// The access token, when not sent in the Authorization header.
    pub access_token: Option<String>,
}

/// Protected resource handler.
///
/// Accepts the token from the `Authorization: Bearer` header or the
/// `access_token` query parameter; the header wins. Failures are `401`
/// with a Bearer challenge, per RFC 6750.
pub async fn resource_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Query(query): Query<ResourceQuery>,
) -> Response {
    let Some(token_value) = bearer_token(&headers, &query) else {
        return challenge(None);
    };

    match state.tokens().issuer().authenticate(&token_value).await {
        Ok(token) => axum::Json(json!({
            "username": token.username,
            "client_id": token.client_id,
            "scope": join_scope(&token.scope),
        }))
        .into_response(),
        Err(error) if error.is_server_error() => crate::http::error_response(&error),
        Err(error) => challenge(Some(bearer_error_code(&error))),
    }
}

/// RFC 6750 section 3.1 names unknown or expired tokens `invalid_token`;
/// the engine reports them as `invalid_grant` internally.
fn bearer_error_code(error: &OAuth2Error) -> &'static str {
    match error.error_code() {
        "invalid_grant" => "invalid_token",
        other => other,
    }
}

fn bearer_token(headers: &HeaderMap, query: &ResourceQuery) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = value.to_str().ok()?.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
        return None;
    }
    query.access_token.clone().filter(|v| !v.is_empty())
}

fn challenge(error_code: Option<&str>) -> Response {
    let value = match error_code {
        Some(code) => format!("Bearer realm=\"oauth2\", error=\"{code}\""),
        None => "Bearer realm=\"oauth2\"".to_string(),
    };
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, value)],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_sources() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer eeb5aa92bbb4b56373b9e0d00bc02d93"),
        );
        assert_eq!(
            bearer_token(&headers, &ResourceQuery::default()).as_deref(),
            Some("eeb5aa92bbb4b56373b9e0d00bc02d93")
        );

        let query = ResourceQuery {
            access_token: Some("fromquery".to_string()),
        };
        assert_eq!(
            bearer_token(&HeaderMap::new(), &query).as_deref(),
            Some("fromquery")
        );

        // A non-Bearer header blocks the query fallback.
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers, &query).is_none());
    }

    #[test]
    fn test_bearer_error_code_mapping() {
        assert_eq!(
            bearer_error_code(&OAuth2Error::invalid_grant("Unknown access token")),
            "invalid_token"
        );
        assert_eq!(
            bearer_error_code(&OAuth2Error::invalid_request("x")),
            "invalid_request"
        );
    }
}

//! Token endpoint handler.
//!
//! `POST /oauth2/token` with an `application/x-www-form-urlencoded` body.
//! Client credentials arrive either as an HTTP Basic Authorization header
//! or as `client_id`/`client_secret` body parameters; the header wins when
//! both are present.

use axum::Form;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::http::{OAuthState, error_response, parse_basic_auth};
use crate::oauth::{ClientCredentials, TokenRequest};

/// OAuth 2.0 token endpoint handler.
///
/// Token responses carry `Cache-Control: no-store` and `Pragma: no-cache`
/// per RFC 6749 section 5.1.
pub async fn token_handler(
    State(state): State<OAuthState>,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Response {
    let credentials = extract_client_credentials(&headers, &request);

    match state.tokens().token(&request, &credentials).await {
        Ok(payload) => (
            [
                (header::CACHE_CONTROL, "no-store"),
                (header::PRAGMA, "no-cache"),
            ],
            axum::Json(payload),
        )
            .into_response(),
        Err(error) => {
            warn!(
                error = error.error_code(),
                grant_type = ?request.grant_type,
                "token request failed"
            );
            error_response(&error)
        }
    }
}

/// Merges client credentials from the Authorization header and the body.
fn extract_client_credentials(headers: &HeaderMap, request: &TokenRequest) -> ClientCredentials {
    if let Some((client_id, client_secret)) = parse_basic_auth(headers) {
        return ClientCredentials {
            client_id: Some(client_id),
            client_secret: Some(client_secret),
        };
    }
    request.body_credentials()
}

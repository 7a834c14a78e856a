//! Demo dataset.
//!
//! A small, fully deterministic world of clients, users, scopes, approvals
//! and pre-issued artifacts, seeded relative to a caller-supplied instant
//! so expiry edge cases are reproducible. Used by the engine's own tests
//! and by the demo server.
//!
//! The dataset:
//!
//! - `democlient1`..`democlient3`: confidential clients with registered
//!   redirect URIs; `democlient4` has no registered redirect URI.
//! - `demousername1`..`demousername3` with passwords `demopassword1`..`3`.
//! - Scopes `demoscope1`..`demoscope3`.
//! - Approvals: user N approved client N for scopes 1..=N.
//! - A live and an expired authorization code, a live and an expired
//!   refresh token, and one live access token.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use grantor_oauth2::store::ModelStore;
use grantor_oauth2::types::{
    AccessToken, Authorization, AuthorizationCode, Client, RefreshToken, Scope,
};

use crate::users::MemoryUserDirectory;
use crate::{
    MemoryAccessTokenStore, MemoryAuthorizationStore, MemoryClientStore, MemoryCodeStore,
    MemoryRefreshTokenStore, MemoryScopeStore,
};

/// Live authorization code, issued to `democlient2` for `demousername2`.
pub const CODE_LIVE: &str = "f0c68d250bcc729eb780a235371a9a55";

/// Expired authorization code, issued to `democlient1`.
pub const CODE_EXPIRED: &str = "1e5aa97ddaf4b0228dfb4223010d4417";

/// Live authorization code issued to `democlient4`, the client without a
/// registered redirect URI.
pub const CODE_UNREGISTERED_REDIRECT: &str = "08fb55e26c84f8cb060b7803bc177af8";

/// Live refresh token, issued to `democlient3` for `demousername3`.
pub const REFRESH_TOKEN_LIVE: &str = "288b5ea8e75d2b24368a79ed5ed9593b";

/// Expired refresh token, issued to `democlient1`.
pub const REFRESH_TOKEN_EXPIRED: &str = "5ff43cbc27b54202c6fd8bb9c2a308ce";

/// Live access token, issued to `democlient1` for `demousername1`.
pub const ACCESS_TOKEN_LIVE: &str = "eeb5aa92bbb4b56373b9e0d00bc02d93";

fn scopes(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

/// Builds a store and user directory seeded with the demo dataset.
///
/// Lifetimes are relative to `now`: live codes expire 10 minutes later,
/// the live refresh token 1 day later, the live access token 1 hour later,
/// and the expired artifacts lie the same intervals in the past.
#[must_use]
pub fn demo(now: OffsetDateTime) -> (ModelStore, Arc<MemoryUserDirectory>) {
    let clients = MemoryClientStore::with_entries([
        Client::new(
            "http://democlient1.com/",
            Some("demosecret1".to_string()),
            Some("http://democlient1.com/redirect_uri".to_string()),
        ),
        Client::new(
            "http://democlient2.com/",
            Some("demosecret2".to_string()),
            Some("http://democlient2.com/redirect_uri".to_string()),
        ),
        Client::new(
            "http://democlient3.com/",
            Some("demosecret3".to_string()),
            Some("http://democlient3.com/redirect_uri".to_string()),
        ),
        Client::new(
            "http://democlient4.com/",
            Some("demosecret4".to_string()),
            None,
        ),
    ]);

    let scope_store = MemoryScopeStore::with_entries([
        Scope::new("demoscope1"),
        Scope::new("demoscope2"),
        Scope::new("demoscope3"),
    ]);

    let authorizations = MemoryAuthorizationStore::with_entries([
        Authorization::new(
            "demousername1",
            "http://democlient1.com/",
            scopes(&["demoscope1"]),
        ),
        Authorization::new(
            "demousername2",
            "http://democlient2.com/",
            scopes(&["demoscope1", "demoscope2"]),
        ),
        Authorization::new(
            "demousername3",
            "http://democlient3.com/",
            scopes(&["demoscope1", "demoscope2", "demoscope3"]),
        ),
    ]);

    let codes = MemoryCodeStore::with_entries([
        AuthorizationCode {
            code: CODE_LIVE.to_string(),
            client_id: "http://democlient2.com/".to_string(),
            redirect_uri: Some("http://democlient2.com/redirect_uri".to_string()),
            state: None,
            username: "demousername2".to_string(),
            scope: scopes(&["demoscope1", "demoscope2"]),
            expires: now + Duration::minutes(10),
        },
        AuthorizationCode {
            code: CODE_EXPIRED.to_string(),
            client_id: "http://democlient1.com/".to_string(),
            redirect_uri: Some("http://democlient1.com/redirect_uri".to_string()),
            state: None,
            username: "demousername1".to_string(),
            scope: scopes(&["demoscope1"]),
            expires: now - Duration::minutes(10),
        },
        AuthorizationCode {
            code: CODE_UNREGISTERED_REDIRECT.to_string(),
            client_id: "http://democlient4.com/".to_string(),
            redirect_uri: Some("http://democlient4.com/redirect_uri".to_string()),
            state: None,
            username: "demousername1".to_string(),
            scope: scopes(&["demoscope1"]),
            expires: now + Duration::minutes(10),
        },
    ]);

    let access_tokens = MemoryAccessTokenStore::with_entries([AccessToken {
        access_token: ACCESS_TOKEN_LIVE.to_string(),
        token_type: "bearer".to_string(),
        client_id: "http://democlient1.com/".to_string(),
        username: Some("demousername1".to_string()),
        scope: scopes(&["demoscope1"]),
        expires: now + Duration::hours(1),
    }]);

    let refresh_tokens = MemoryRefreshTokenStore::with_entries([
        RefreshToken {
            refresh_token: REFRESH_TOKEN_LIVE.to_string(),
            client_id: "http://democlient3.com/".to_string(),
            username: Some("demousername3".to_string()),
            scope: scopes(&["demoscope1", "demoscope2", "demoscope3"]),
            expires: now + Duration::days(1),
        },
        RefreshToken {
            refresh_token: REFRESH_TOKEN_EXPIRED.to_string(),
            client_id: "http://democlient1.com/".to_string(),
            username: Some("demousername1".to_string()),
            scope: scopes(&["demoscope1"]),
            expires: now - Duration::days(1),
        },
    ]);

    let store = ModelStore::new(
        Arc::new(clients),
        Arc::new(scope_store),
        Arc::new(authorizations),
        Arc::new(codes),
        Arc::new(access_tokens),
        Arc::new(refresh_tokens),
    );

    let users = Arc::new(MemoryUserDirectory::with_users([
        ("demousername1", "demopassword1"),
        ("demousername2", "demopassword2"),
        ("demousername3", "demopassword3"),
    ]));

    (store, users)
}

//! Standalone OAuth 2.0 authorization server.
//!
//! Thin glue over the `grantor-oauth2` engine: configuration loading, an
//! in-memory storage backend (optionally seeded with the demo dataset) and
//! an axum application with request tracing.

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use time::OffsetDateTime;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use grantor_oauth2::http::{OAuthState, routes};
use grantor_oauth2::store::{Clock, ModelStore, SystemClock};
use grantor_store_memory::{MemoryBackend, MemoryUserDirectory, fixtures};

pub use config::ServerConfig;

/// Builds the OAuth application state from configuration.
///
/// With `seed_demo_data` the store starts out holding the demo clients,
/// users, scopes and pre-issued artifacts; otherwise it starts empty. The
/// store handle is returned alongside the state for maintenance tasks.
#[must_use]
pub fn build_state(config: &ServerConfig) -> (OAuthState, ModelStore) {
    let (store, users) = if config.seed_demo_data {
        fixtures::demo(OffsetDateTime::now_utc())
    } else {
        (
            MemoryBackend::new().model_store(),
            Arc::new(MemoryUserDirectory::new()),
        )
    };

    let state = OAuthState::new(
        store.clone(),
        Arc::new(SystemClock),
        users,
        config.oauth.clone(),
    );
    (state, store)
}

/// Builds the axum application over prepared state.
#[must_use]
pub fn build_app(state: OAuthState) -> Router {
    routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Spawns the periodic sweep that removes expired codes and tokens.
pub fn spawn_expiry_sweeper(
    store: ModelStore,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let now = SystemClock.now();

            let mut removed = 0usize;
            let sweeps = [
                ("codes", store.codes().delete_expired(now).await),
                ("access tokens", store.access_tokens().delete_expired(now).await),
                ("refresh tokens", store.refresh_tokens().delete_expired(now).await),
            ];
            for (kind, result) in sweeps {
                match result {
                    Ok(count) => removed += count,
                    Err(error) => warn!(kind, %error, "expiry sweep failed"),
                }
            }
            if removed > 0 {
                debug!(removed, "expired artifacts purged");
            }
        }
    })
}

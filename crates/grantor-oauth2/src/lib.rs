//! OAuth 2.0 authorization server protocol engine (RFC 6749).
//!
//! The engine issues and redeems the protocol artifacts - authorization
//! codes, access tokens, refresh tokens - over a pluggable storage
//! abstraction. It covers both standard endpoints:
//!
//! - **Authorization endpoint**: `code` and `token` (implicit) response
//!   types, with the RFC's redirect-based error delivery.
//! - **Token endpoint**: `authorization_code`, `password`,
//!   `client_credentials` and `refresh_token` grants.
//!
//! # Architecture
//!
//! ```text
//! http/        axum handlers (transport only)
//!   |
//! oauth/       response type + grant type handlers, bearer issuance
//!   |
//! validate     ordered parameter validation chain
//!   |
//! store/       repository traits behind ModelStore
//! ```
//!
//! Storage backends live in separate crates; `grantor-store-memory` ships
//! an in-process one with the demo fixture set. The engine never sees a
//! concrete backend, only [`store::ModelStore`].
//!
//! # Example
//!
//! ```ignore
//! use grantor_oauth2::http::{OAuthState, routes};
//! use grantor_oauth2::store::SystemClock;
//!
//! let state = OAuthState::new(store, Arc::new(SystemClock), verifier, config);
//! let app = routes().with_state(state);
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod store;
pub mod types;
pub mod validate;

pub use config::OAuthConfig;
pub use error::OAuth2Error;

/// Result alias used throughout the engine.
pub type AuthResult<T> = Result<T, OAuth2Error>;

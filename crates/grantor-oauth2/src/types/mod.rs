//! Entity model.
//!
//! Plain data records owned by the model store. The engine never mutates an
//! entity in place; it constructs a new value and hands it to the store.

pub mod authorization;
pub mod client;
pub mod code;
pub mod scope;
pub mod token;

pub use authorization::Authorization;
pub use client::Client;
pub use code::AuthorizationCode;
pub use scope::{Scope, join_scope, parse_scope, scope_is_subset};
pub use token::{AccessToken, RefreshToken, generate_token_value};

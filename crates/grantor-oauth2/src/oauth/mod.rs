//! OAuth 2.0 protocol handlers.
//!
//! - [`authorize`] - authorization endpoint: response type handlers
//! - [`grant`] - token endpoint: grant type handlers
//! - [`bearer`] - bearer token issuance and response shaping

pub mod authorize;
pub mod bearer;
pub mod grant;

pub use authorize::{
    AuthorizationService, AuthorizeRejection, AuthorizeRequest, AuthorizeSuccess,
    ResponseTypeHandler,
};
pub use bearer::{BearerTokenIssuer, TokenPayload};
pub use grant::{ClientCredentials, GrantTypeHandler, TokenRequest, TokenService};

/// Resource-owner authentication context.
///
/// Filled in by the surrounding application (session layer, HTTP auth,
/// whatever the deployment uses) and passed explicitly into every handler.
/// The engine never consults ambient state to learn who is logged in.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    /// Authenticated username, or `None` for an anonymous request.
    pub username: Option<String>,
}

impl AuthContext {
    /// Context for an authenticated resource owner.
    #[must_use]
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    /// Context for an anonymous request.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { username: None }
    }
}

//! Authorization code record.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single-use authorization code.
///
/// Minted by the code response type handler, bound to the client, resource
/// owner, scope and redirect target at issuance, and exchanged exactly once
/// at the token endpoint. Once exchanged the record is invalidated; a replay
/// fails with `invalid_grant`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// Unique opaque code value (32 hex characters, 128 bits of entropy).
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Redirect target bound at issuance. `None` when the registered
    /// redirect URI was used and none was supplied explicitly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Anti-CSRF state supplied by the client, echoed in the redirect and
    /// kept with the code for audit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Resource owner who approved the request.
    pub username: String,

    /// Granted scope names.
    pub scope: Vec<String>,

    /// Absolute expiry instant.
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

impl AuthorizationCode {
    /// Generates a fresh code value: 128 bits of uniform randomness encoded
    /// as 32 lowercase hex characters.
    #[must_use]
    pub fn generate() -> String {
        super::token::generate_token_value()
    }

    /// Returns `true` if the code has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires <= now
    }
}

//! OAuth 2.0 client registration record.

use serde::{Deserialize, Serialize};

/// A registered OAuth 2.0 client.
///
/// Clients are created by an external registration process and are read-only
/// to the engine. The `client_id` is an opaque unique string, in practice
/// often the client's base URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier.
    pub client_id: String,

    /// Client secret. Absent for public clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Registered redirect URI. When absent, authorization requests must
    /// supply one explicitly and no exact-match check is possible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

impl Client {
    /// Creates a new client record.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri,
        }
    }

    /// Returns `true` if this client holds a secret.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        self.client_secret.is_some()
    }

    /// Verifies a presented client secret against the registered one.
    ///
    /// A public client (no registered secret) accepts only an absent secret.
    #[must_use]
    pub fn verify_secret(&self, presented: Option<&str>) -> bool {
        match (self.client_secret.as_deref(), presented) {
            (Some(registered), Some(presented)) => constant_time_eq(registered, presented),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Byte-wise comparison that does not short-circuit on the first mismatch.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

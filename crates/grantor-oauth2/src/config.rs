//! Engine configuration.
//!
//! Token and code lifetimes are deliberately short by default and match the
//! values recommended by RFC 6749: authorization codes live 10 minutes,
//! access tokens 1 hour, refresh tokens 1 day.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OAuth 2.0 engine configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [oauth]
/// authorization_code_lifetime = "10m"
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "1d"
/// refresh_token_rotation = true
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime. Codes are single-use and short-lived.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Rotate refresh tokens on use.
    ///
    /// When enabled, redeeming a refresh token invalidates it and a new one
    /// is issued in the token response, bounding the replay window. When
    /// disabled, the presented refresh token stays valid until it expires.
    pub refresh_token_rotation: bool,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600),
            access_token_lifetime: Duration::from_secs(3600),
            refresh_token_lifetime: Duration::from_secs(24 * 3600),
            refresh_token_rotation: true,
        }
    }
}

impl OAuthConfig {
    /// Sets the authorization code lifetime.
    #[must_use]
    pub fn with_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.authorization_code_lifetime = lifetime;
        self
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Disables refresh token rotation.
    #[must_use]
    pub fn without_refresh_token_rotation(mut self) -> Self {
        self.refresh_token_rotation = false;
        self
    }

    /// Authorization code lifetime as a `time::Duration`.
    #[must_use]
    pub fn code_lifetime(&self) -> time::Duration {
        to_time_duration(self.authorization_code_lifetime)
    }

    /// Access token lifetime as a `time::Duration`.
    #[must_use]
    pub fn access_lifetime(&self) -> time::Duration {
        to_time_duration(self.access_token_lifetime)
    }

    /// Refresh token lifetime as a `time::Duration`.
    #[must_use]
    pub fn refresh_lifetime(&self) -> time::Duration {
        to_time_duration(self.refresh_token_lifetime)
    }
}

fn to_time_duration(duration: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
}

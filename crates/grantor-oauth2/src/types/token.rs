//! Access and refresh token records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Generates an opaque token value: 128 bits of uniform randomness encoded
/// as 32 lowercase hex characters.
///
/// Used for authorization codes, access tokens and refresh tokens alike.
/// Collision resistance is probabilistic here; the store additionally
/// enforces uniqueness on insert.
#[must_use]
pub fn generate_token_value() -> String {
    let mut bytes = [0u8; 16];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    hex::encode(bytes)
}

/// A bearer access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Unique opaque token value.
    pub access_token: String,

    /// Token type, always `"bearer"`.
    pub token_type: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Resource owner, absent for the client credentials grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Granted scope names.
    pub scope: Vec<String>,

    /// Absolute expiry instant.
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

impl AccessToken {
    /// Returns `true` if the token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires <= now
    }

    /// Seconds remaining until expiry, clamped at zero.
    ///
    /// Computed against the supplied instant at response-serialization time,
    /// never stored.
    #[must_use]
    pub fn expires_in(&self, now: OffsetDateTime) -> i64 {
        (self.expires - now).whole_seconds().max(0)
    }
}

/// A long-lived refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique opaque token value.
    pub refresh_token: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Resource owner, absent for the client credentials grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Granted scope names. Tokens minted from this refresh token must carry
    /// a subset of this set.
    pub scope: Vec<String>,

    /// Absolute expiry instant.
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

impl RefreshToken {
    /// Returns `true` if the token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_generate_token_value_shape() {
        let value = generate_token_value();
        assert_eq!(value.len(), 32);
        assert!(value.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_token_value_uniqueness() {
        let values: Vec<String> = (0..100).map(|_| generate_token_value()).collect();
        let mut unique = values.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(values.len(), unique.len());
    }

    #[test]
    fn test_access_token_expiry_math() {
        let now = OffsetDateTime::now_utc();
        let token = AccessToken {
            access_token: generate_token_value(),
            token_type: "bearer".to_string(),
            client_id: "http://democlient1.com/".to_string(),
            username: Some("demousername1".to_string()),
            scope: vec!["demoscope1".to_string()],
            expires: now + Duration::hours(1),
        };

        assert!(!token.is_expired(now));
        assert_eq!(token.expires_in(now), 3600);
        assert_eq!(token.expires_in(now + Duration::minutes(30)), 1800);

        // Past expiry clamps to zero rather than going negative.
        assert_eq!(token.expires_in(now + Duration::hours(2)), 0);
        assert!(token.is_expired(now + Duration::hours(2)));
    }

    #[test]
    fn test_refresh_token_expiry() {
        let now = OffsetDateTime::now_utc();
        let token = RefreshToken {
            refresh_token: generate_token_value(),
            client_id: "http://democlient3.com/".to_string(),
            username: Some("demousername3".to_string()),
            scope: vec!["demoscope1".to_string()],
            expires: now + Duration::days(1),
        };

        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::days(2)));
    }

    #[test]
    fn test_username_omitted_for_client_credentials() {
        let token = AccessToken {
            access_token: generate_token_value(),
            token_type: "bearer".to_string(),
            client_id: "machine".to_string(),
            username: None,
            scope: vec![],
            expires: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&token).unwrap();
        assert!(!json.contains("username"));
    }
}

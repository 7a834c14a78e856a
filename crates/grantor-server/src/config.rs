//! Server configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use grantor_oauth2::OAuthConfig;

/// Top-level server configuration.
///
/// # Example (TOML)
///
/// ```toml
/// listen = "127.0.0.1:8000"
/// seed_demo_data = true
///
/// [oauth]
/// access_token_lifetime = "1h"
/// refresh_token_rotation = true
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub listen: String,

    /// Seed the in-memory store with the demo dataset at startup.
    pub seed_demo_data: bool,

    /// How often expired codes and tokens are purged from the store.
    #[serde(with = "humantime_serde")]
    pub expiry_sweep_interval: Duration,

    /// Protocol engine settings.
    pub oauth: OAuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8000".to_string(),
            seed_demo_data: true,
            expiry_sweep_interval: Duration::from_secs(600),
            oauth: OAuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file, or defaults when no path is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

//! Client configuration.
//!
//! Defaults point at the production gateway; every field can be overridden
//! through `VELD_`-prefixed environment variables (`VELD_GATEWAY_URL`,
//! `VELD_API_URL`, `VELD_BOT`).

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading failed.
#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(String);

/// Connection settings for one client instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket endpoint of the gateway.
    pub gateway_url: String,
    /// Base URL of the REST surface.
    pub api_url: String,
    /// Whether this session identifies as a bot account.
    pub bot: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: "wss://chat-gateway.veld.dev".to_string(),
            api_url: "https://chat-gateway.veld.dev/api/v1".to_string(),
            bot: true,
        }
    }
}

impl ClientConfig {
    /// Loads the configuration: coded defaults layered under `VELD_*`
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Env::prefixed("VELD_"))
            .extract()
            .map_err(|e| ConfigError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_production() {
        let config = ClientConfig::default();
        assert_eq!(config.gateway_url, "wss://chat-gateway.veld.dev");
        assert_eq!(config.api_url, "https://chat-gateway.veld.dev/api/v1");
        assert!(config.bot);
    }

    #[test]
    fn env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("VELD_GATEWAY_URL", "ws://localhost:9000");
            jail.set_env("VELD_BOT", "false");

            let config = ClientConfig::from_env().expect("config should load");
            assert_eq!(config.gateway_url, "ws://localhost:9000");
            assert_eq!(config.api_url, ClientConfig::default().api_url);
            assert!(!config.bot);
            Ok(())
        });
    }
}

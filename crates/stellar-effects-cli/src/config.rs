//! Configuration loading for the stellar-effects binary.
//!
//! Values come from an optional TOML file, then `STELLAR_EFFECTS_*`
//! environment variables, then command line flags.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stellar_effects_common::{resolve_passphrase, NetworkId};

/// Binary configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network used when a request does not name one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// `public`, `testnet`, `futurenet` or a literal passphrase.
    #[serde(default = "default_network")]
    pub name: String,

    /// Attach the asset contract map to derived operations.
    #[serde(default)]
    pub map_sac: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network(),
            map_sac: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text or json).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to use ANSI colors.
    #[serde(default = "default_true")]
    pub colors: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            colors: true,
        }
    }
}

fn default_network() -> String {
    "testnet".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Recognized variables:
    /// - STELLAR_EFFECTS_NETWORK
    /// - STELLAR_EFFECTS_MAP_SAC
    /// - STELLAR_EFFECTS_LOG_LEVEL
    /// - STELLAR_EFFECTS_LOG_FORMAT
    pub fn from_file_with_env(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STELLAR_EFFECTS_NETWORK") {
            self.network.name = val;
        }
        if let Ok(val) = std::env::var("STELLAR_EFFECTS_MAP_SAC") {
            self.network.map_sac = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("STELLAR_EFFECTS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("STELLAR_EFFECTS_LOG_FORMAT") {
            self.logging.format = val;
        }
    }

    /// Reject an unknown network name.
    pub fn validate(&self) -> anyhow::Result<()> {
        resolve_passphrase(Some(self.network.name.as_str()))?;
        Ok(())
    }

    /// Generate a sample configuration file.
    pub fn sample_config() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Network id of a network name or passphrase.
pub fn network_id(network: &str) -> anyhow::Result<NetworkId> {
    let passphrase = resolve_passphrase(Some(network))?;
    Ok(NetworkId::from_passphrase(&passphrase))
}

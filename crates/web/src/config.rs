//! Web interface configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Web interface configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Configuration store settings
    pub store: StoreConfig,

    /// Remote operation settings
    pub remote: RemoteConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub listen: String,

    /// Language passed to remote lookups
    pub lang: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// Configuration store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON snapshot backing the in-memory store
    pub snapshot_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("/var/lib/foris/config.json"),
        }
    }
}

/// Remote operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Shell command triggering the updater
    pub updater_command: String,

    /// Shell command restarting the device
    pub reboot_command: String,

    /// Registration lookup endpoint
    pub registration_url: String,

    /// Timeout for registration lookups
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            updater_command: "updater.sh".to_string(),
            reboot_command: "reboot".to_string(),
            registration_url: "https://api.turris.cz/registration/lookup.json".to_string(),
            timeout_secs: 10,
        }
    }
}

impl WebConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

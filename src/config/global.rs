//! Global configuration for spicetify's upgrade routine.
//!
//! # Configuration File Location
//!
//! - **Unix/macOS**: `~/.spicetify/upgrade.toml`
//! - **Windows**: `%LOCALAPPDATA%\spicetify\upgrade.toml`
//!
//! The location can be overridden with the global `--config` flag. A missing
//! file is not an error; defaults are used instead.
//!
//! # File Format
//!
//! ```toml
//! [upgrade]
//! repository = "khanhas/spicetify-cli"
//! api_base = "https://api.github.com"
//! download_base = "https://github.com"
//! artifact_name = "spicetify"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::upgrade::config::UpgradeConfig;

/// User-wide settings read from `upgrade.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Release locations used by `spicetify upgrade`.
    #[serde(default)]
    pub upgrade: UpgradeConfig,
}

impl GlobalConfig {
    /// Load from the default platform-specific location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined, or the
    /// file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, otherwise from [`default_path`](Self::default_path).
    ///
    /// A file that does not exist yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file path.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Platform-appropriate path of `upgrade.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("spicetify")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".spicetify")
        };

        Ok(config_dir.join("upgrade.toml"))
    }
}

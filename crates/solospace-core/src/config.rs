//! Configuration
//!
//! The two settings the placement engine reads, in TOML. Owned by whatever
//! settings store the backend has; the core only ever reads a copy.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Placement behaviour
    pub placement: PlacementConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Give maximized windows their own workspace, not just fullscreen ones.
    pub move_window_when_maximized: bool,

    /// Only the primary monitor has workspaces; the others are static.
    pub workspaces_only_on_primary: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            move_window_when_maximized: true,
            workspaces_only_on_primary: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(Self::find_config_file);

        match config_path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {:?}", path);
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {path:?}"))?;

                let config: Self = toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {path:?}"))?;

                Ok(config)
            },
            Some(path) => {
                warn!("Config file not found at {:?}, using defaults", path);
                Ok(Self::default())
            },
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            },
        }
    }

    /// Find the configuration file
    fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            dirs::config_dir().map(|p| p.join("solospace/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/solospace/config.toml")),
            Some(PathBuf::from("/etc/solospace/config.toml")),
        ];

        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Generate default configuration as a string
    pub fn default_config_string() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

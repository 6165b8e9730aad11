//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the pump-config.toml
//! file: which elevation service to query, how long to wait for it, and what to
//! do when a lookup fails.

use crate::elevation::FallbackPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "pump-config.toml";

/// Application configuration loaded from pump-config.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Elevation service configuration
    pub elevation: ElevationConfig,
}

/// Elevation lookup configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ElevationConfig {
    /// Open-Elevation compatible lookup endpoint
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Behavior when a lookup fails (fallback elevation or drop the point)
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

impl ElevationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            elevation: ElevationConfig {
                endpoint: "https://api.open-elevation.com/api/v1/lookup".to_string(),
                timeout_secs: 10,
                fallback: FallbackPolicy::default(),
            },
        }
    }
}

impl Config {
    /// Load configuration from pump-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), endpoint = %config.elevation.endpoint, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file format, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// Save current configuration to pump-config.toml
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to_path(CONFIG_FILE)
    }
}

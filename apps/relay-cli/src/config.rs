//! Relay CLI configuration.
//!
//! A single YAML file describes the virtual devices to register and the
//! entertainment system built on top of them. Environment variables override
//! selected fields after loading.

use std::path::Path;

use anyhow::{Context, Result};
use entertainment_core::{MediaFeatures, SystemConfig};
use serde::Deserialize;

/// How a virtual media device implements its commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerMode {
    #[default]
    Async,
    Blocking,
    /// Advertises features but implements nothing.
    #[serde(rename = "none")]
    Unimplemented,
}

/// A media device registered in the in-memory registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VirtualDeviceConfig {
    pub entity_id: String,
    /// Feature names (`play`, `volume_set`, ...) or the raw bit value.
    #[serde(default)]
    pub features: MediaFeatures,
    #[serde(default)]
    pub mode: HandlerMode,
}

/// Relay CLI configuration loaded from YAML with environment overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// The entertainment system and its media sources.
    pub system: SystemConfig,

    /// Virtual media devices.
    pub devices: Vec<VirtualDeviceConfig>,

    /// Entity ids of virtual lights.
    pub lights: Vec<String>,

    /// Media source selected before running a command.
    /// Override: `RELAY_SOURCE`
    pub default_source: Option<String>,
}

impl RelayConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_yaml_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parses YAML text and validates the system section.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config
            .system
            .validate()
            .context("Invalid media source configuration")?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RELAY_SYSTEM_NAME") {
            if !val.is_empty() {
                self.system.name = val;
            }
        }

        if let Ok(val) = std::env::var("RELAY_SOURCE") {
            if !val.is_empty() {
                self.default_source = Some(val);
            }
        }
    }
}

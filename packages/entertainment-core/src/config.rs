//! Media source configuration.
//!
//! A media source is configured either as a bare `media_player.*` entity id or
//! as an object naming the player and its optional remote, speaker and
//! ambiance lights. [`SystemConfig::load`] reads a YAML file and runs the
//! schema checks; everything downstream trusts validated configuration.

use std::fmt;
use std::path::Path;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ambiance::BrightnessScale;
use crate::error::{ConfigError, ConfigResult};

pub const MEDIA_PLAYER_DOMAIN: &str = "media_player";
pub const REMOTE_DOMAIN: &str = "remote";
pub const LIGHT_DOMAIN: &str = "light";

pub const DEFAULT_SORT_ORDER: u32 = 1;
pub const DEFAULT_SYSTEM_NAME: &str = "Entertainment System";

fn default_sort_order() -> u32 {
    DEFAULT_SORT_ORDER
}

/// Ambiance lights for a media source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmbianceConfig {
    /// Light whose brightness follows the source.
    pub brightness: String,
    /// Brightness range of that light, `[min, max]`.
    #[serde(default)]
    pub brightness_scale: BrightnessScale,
    /// Optional second light for intensity.
    #[serde(default)]
    pub intensity: Option<String>,
}

/// Full form of a media source entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaSourceDetails {
    pub media_player: String,
    #[serde(default)]
    pub remote: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default = "default_sort_order")]
    pub sort_order: u32,
    /// Selected when the system starts.
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub ambiance: Option<AmbianceConfig>,
}

/// One configured media source.
///
/// Deserializes from a string (bare entity id) or a mapping (details). The
/// variant is picked by shape, so errors inside the mapping are reported as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MediaSourceConfig {
    /// Just the media player; no remote, speaker or ambiance.
    EntityId(String),
    Detailed(MediaSourceDetails),
}

impl<'de> Deserialize<'de> for MediaSourceConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SourceVisitor;

        impl<'de> Visitor<'de> for SourceVisitor {
            type Value = MediaSourceConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a media_player entity id or a media source mapping")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(MediaSourceConfig::EntityId(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(MediaSourceConfig::EntityId(value))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                MediaSourceDetails::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(MediaSourceConfig::Detailed)
            }
        }

        deserializer.deserialize_any(SourceVisitor)
    }
}

impl MediaSourceConfig {
    pub fn media_player(&self) -> &str {
        match self {
            Self::EntityId(id) => id,
            Self::Detailed(details) => &details.media_player,
        }
    }

    pub fn remote(&self) -> Option<&str> {
        match self {
            Self::EntityId(_) => None,
            Self::Detailed(details) => details.remote.as_deref(),
        }
    }

    pub fn speaker(&self) -> Option<&str> {
        match self {
            Self::EntityId(_) => None,
            Self::Detailed(details) => details.speaker.as_deref(),
        }
    }

    pub fn sort_order(&self) -> u32 {
        match self {
            Self::EntityId(_) => DEFAULT_SORT_ORDER,
            Self::Detailed(details) => details.sort_order,
        }
    }

    /// Whether this source is selected when the system starts.
    pub fn is_default(&self) -> bool {
        match self {
            Self::EntityId(_) => false,
            Self::Detailed(details) => details.default,
        }
    }

    pub fn ambiance(&self) -> Option<&AmbianceConfig> {
        match self {
            Self::EntityId(_) => None,
            Self::Detailed(details) => details.ambiance.as_ref(),
        }
    }

    /// Checks entity domains and `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> ConfigResult<()> {
        entity_id_with_domain(self.media_player(), MEDIA_PLAYER_DOMAIN)?;
        if let Some(remote) = self.remote() {
            entity_id_with_domain(remote, REMOTE_DOMAIN)?;
        }
        if let Some(speaker) = self.speaker() {
            entity_id_with_domain(speaker, MEDIA_PLAYER_DOMAIN)?;
        }
        if self.sort_order() < 1 {
            return Err(ConfigError::InvalidSortOrder(self.sort_order()));
        }
        if let Some(ambiance) = self.ambiance() {
            entity_id_with_domain(&ambiance.brightness, LIGHT_DOMAIN)?;
            if let Some(intensity) = &ambiance.intensity {
                entity_id_with_domain(intensity, LIGHT_DOMAIN)?;
            }
        }
        Ok(())
    }
}

/// Top-level configuration: a named system of media sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemConfig {
    #[serde(default = "default_system_name")]
    pub name: String,
    #[serde(default)]
    pub media_sources: Vec<MediaSourceConfig>,
}

fn default_system_name() -> String {
    DEFAULT_SYSTEM_NAME.to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: default_system_name(),
            media_sources: Vec::new(),
        }
    }
}

impl SystemConfig {
    /// Parses and validates YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Validates every media source.
    pub fn validate(&self) -> ConfigResult<()> {
        self.media_sources
            .iter()
            .try_for_each(MediaSourceConfig::validate)
    }
}

/// Returns whether `value` looks like `domain.object_id`.
///
/// Both parts use lowercase ASCII letters, digits and underscores, must not
/// start or end with an underscore, and the domain must not contain `__`.
pub fn is_valid_entity_id(value: &str) -> bool {
    let Some((domain, object_id)) = value.split_once('.') else {
        return false;
    };
    let valid_part = |part: &str| {
        !part.is_empty()
            && !part.starts_with('_')
            && !part.ends_with('_')
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    };
    valid_part(domain) && valid_part(object_id) && !domain.contains("__")
}

/// Validates that `value` is an entity id in `domain`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEntityId`] otherwise.
pub fn entity_id_with_domain(value: &str, domain: &'static str) -> ConfigResult<()> {
    let in_domain = value
        .split_once('.')
        .is_some_and(|(prefix, _)| prefix == domain);
    if is_valid_entity_id(value) && in_domain {
        Ok(())
    } else {
        Err(ConfigError::InvalidEntityId {
            value: value.to_string(),
            domain,
        })
    }
}

//! Lighting coordination attached to a media source.
//!
//! An ambiance binds a brightness light and, optionally, an intensity light.
//! Both are resolved during the media source's attach phase. Nothing drives
//! them yet; the resolved handles are exposed for ambiance commands to use.

use serde::{Deserialize, Serialize};

use crate::binding::LightBinding;
use crate::config::AmbianceConfig;
use crate::error::ConfigError;
use crate::registry::EntityRegistry;
use crate::utils::map_value_to_range;

/// Brightness range of a light, `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct BrightnessScale {
    min: f64,
    max: f64,
}

impl BrightnessScale {
    /// Creates a scale.
    ///
    /// # Errors
    ///
    /// Returns an error unless `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        if min < max {
            Ok(Self { min, max })
        } else {
            Err(ConfigError::InvalidBrightnessScale { min, max })
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Maps a level in `0.0..=1.0` onto this scale. Out-of-range levels are clamped.
    pub fn to_device(&self, level: f64) -> f64 {
        map_value_to_range(level.clamp(0.0, 1.0), (0.0, 1.0), (self.min, self.max))
    }
}

impl Default for BrightnessScale {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 255.0,
        }
    }
}

impl TryFrom<(f64, f64)> for BrightnessScale {
    type Error = ConfigError;

    fn try_from((min, max): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

impl From<BrightnessScale> for (f64, f64) {
    fn from(scale: BrightnessScale) -> Self {
        (scale.min, scale.max)
    }
}

/// Lights bound to a media source.
#[derive(Debug)]
pub struct Ambiance {
    brightness: LightBinding,
    brightness_scale: BrightnessScale,
    intensity: Option<LightBinding>,
}

impl Ambiance {
    pub fn new(config: &AmbianceConfig) -> Self {
        Self {
            brightness: LightBinding::new(config.brightness.clone()),
            brightness_scale: config.brightness_scale,
            intensity: config.intensity.clone().map(LightBinding::new),
        }
    }

    /// Resolves the brightness light and, if configured, the intensity light.
    pub async fn resolve(&self, registry: &dyn EntityRegistry) {
        self.brightness.resolve(registry).await;
        if let Some(intensity) = &self.intensity {
            intensity.resolve(registry).await;
        }
    }

    pub fn brightness(&self) -> &LightBinding {
        &self.brightness
    }

    pub fn brightness_scale(&self) -> BrightnessScale {
        self.brightness_scale
    }

    pub fn intensity(&self) -> Option<&LightBinding> {
        self.intensity.as_ref()
    }
}

//! Centralized error types for the entertainment core library.
//!
//! Relay outcomes where no device could perform a command are not errors; they
//! surface as diagnostics plus an empty result. The types here cover the cases
//! that do propagate: a device reporting failure, a worker-pool job that could
//! not complete, and configuration that fails schema checks.

use serde::Serialize;
use thiserror::Error;

/// Trait for error types that provide machine-readable error codes.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

/// Failure reported by (or on behalf of) an external device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device accepted the command but failed to carry it out.
    #[error("{entity_id} failed to {command}: {message}")]
    Failed {
        entity_id: String,
        command: &'static str,
        message: String,
    },

    /// The device was asked for a form of a command it does not provide.
    #[error("{entity_id} does not implement '{command}'")]
    NotImplemented {
        entity_id: String,
        command: &'static str,
    },

    /// The blocking worker running a synchronous device method did not finish.
    #[error("worker pool job for '{command}' did not complete: {message}")]
    WorkerPool {
        command: &'static str,
        message: String,
    },
}

impl ErrorCode for DeviceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Failed { .. } => "device_failed",
            Self::NotImplemented { .. } => "device_not_implemented",
            Self::WorkerPool { .. } => "worker_pool_failed",
        }
    }
}

/// Error returned by a relayed command.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The selected device returned an error.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A command was relayed before the media source was attached.
    #[error("media source '{0}' has not been attached")]
    NotAttached(String),
}

impl ErrorCode for RelayError {
    fn code(&self) -> &'static str {
        match self {
            Self::Device(err) => err.code(),
            Self::NotAttached(_) => "not_attached",
        }
    }
}

/// Configuration failed to load or did not satisfy the schema.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An entity id is malformed or belongs to the wrong domain.
    #[error("{value} is not a valid entity id in the '{domain}' domain")]
    InvalidEntityId { value: String, domain: &'static str },

    /// `sort_order` must be at least 1.
    #[error("sort_order must be >= 1 (got {0})")]
    InvalidSortOrder(u32),

    /// `brightness_scale` must be strictly increasing.
    #[error("brightness_scale minimum {min} must be below maximum {max}")]
    InvalidBrightnessScale { min: f64, max: f64 },

    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidEntityId { .. } => "invalid_entity_id",
            Self::InvalidSortOrder(_) => "invalid_sort_order",
            Self::InvalidBrightnessScale { .. } => "invalid_brightness_scale",
            Self::Io { .. } => "config_io",
            Self::Parse(_) => "config_parse",
        }
    }
}

/// Application-wide error type for the entertainment system.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum EntertainmentError {
    /// A device rejected or failed a command.
    #[error("Device error: {0}")]
    Device(String),

    /// Configuration could not be loaded or validated.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A requested media source does not exist.
    #[error("Media source not found: {0}")]
    SourceNotFound(String),

    /// A media source was used before being attached.
    #[error("Not attached: {0}")]
    NotAttached(String),
}

impl EntertainmentError {
    /// Returns a machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Device(_) => "device_error",
            Self::Configuration(_) => "configuration_error",
            Self::SourceNotFound(_) => "source_not_found",
            Self::NotAttached(_) => "not_attached",
        }
    }
}

impl From<DeviceError> for EntertainmentError {
    fn from(err: DeviceError) -> Self {
        Self::Device(err.to_string())
    }
}

impl From<RelayError> for EntertainmentError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Device(err) => err.into(),
            RelayError::NotAttached(name) => Self::NotAttached(name),
        }
    }
}

impl From<ConfigError> for EntertainmentError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a single device call.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Result of a relayed command.
pub type RelayResult<T> = Result<T, RelayError>;

/// Result of configuration loading and validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenient Result alias for application-wide operations.
pub type EntertainmentResult<T> = Result<T, EntertainmentError>;

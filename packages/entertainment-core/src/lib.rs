//! Entertainment Core - media command relay for multi-device entertainment systems.
//!
//! A media source is the user-facing playback entity. It is backed by a media
//! player and optionally a remote, a dedicated speaker and ambiance lights.
//! This crate binds those devices at startup and relays each playback command
//! to the first device able to perform it.
//!
//! # Architecture
//!
//! - [`features`]: Capability flags advertised by devices
//! - [`command`]: Command vocabulary and per-command routing
//! - [`device`]: Traits external device integrations implement
//! - [`binding`]: Resolve-once links from configuration to live devices
//! - [`media_source`]: The command relay
//! - [`ambiance`]: Lights bound to a media source
//! - [`system`]: Ordered media sources with one selected source
//! - [`config`]: YAML configuration and schema validation
//! - [`utils`]: State comparison helpers and [`StateTracker`](utils::StateTracker)
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! The relay never reaches for globals; its collaborators are injected through
//! [`RelayContext`]:
//!
//! - [`EntityRegistry`](registry::EntityRegistry): Looks up devices by entity id
//! - [`Scheduler`](runtime::Scheduler): Runs synchronous device methods off the event loop
//! - [`DiagnosticSink`](diagnostics::DiagnosticSink): Receives relay diagnostics
//!
//! Each trait has a default implementation: [`InMemoryRegistry`],
//! [`TokioScheduler`] and [`LoggingDiagnostics`].

#![warn(clippy::all)]

pub mod ambiance;
pub mod binding;
pub mod command;
pub mod config;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod media_source;
pub mod registry;
pub mod runtime;
pub mod system;
pub mod utils;

#[cfg(test)]
mod test_fixtures;

// Re-export commonly used types at the crate root
pub use ambiance::{Ambiance, BrightnessScale};
pub use binding::{DeviceBinding, DeviceRole, LightBinding, MediaBinding};
pub use command::{
    BrowseMedia, BrowseRequest, CommandKind, CommandOutput, MediaCommand, PlayMediaRequest,
    RepeatMode, Routing,
};
pub use config::{AmbianceConfig, MediaSourceConfig, MediaSourceDetails, SystemConfig};
pub use device::{LightDevice, MediaDevice};
pub use diagnostics::{DiagnosticSink, LoggingDiagnostics, NoopDiagnostics, RelayDiagnostic};
pub use error::{
    ConfigError, ConfigResult, DeviceError, DeviceResult, EntertainmentError,
    EntertainmentResult, ErrorCode, RelayError, RelayResult,
};
pub use features::MediaFeatures;
pub use media_source::{MediaSource, RelayContext, RelayOutcome};
pub use registry::{EntityRegistry, InMemoryRegistry};
pub use runtime::{BlockingJob, Scheduler, TokioScheduler};
pub use system::EntertainmentSystem;
pub use utils::{are_different, are_divergent, map_value_to_range, StateTracker};

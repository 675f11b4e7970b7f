//! Trait abstractions for the devices behind a media source.
//!
//! External integrations implement these traits; the relay depends only on
//! them and never on a concrete device type.

use async_trait::async_trait;

use crate::command::{CommandKind, CommandOutput, MediaCommand};
use crate::error::{DeviceError, DeviceResult};
use crate::features::MediaFeatures;

/// A playback, remote or speaker device that can receive media commands.
///
/// A device declares per command whether it offers an asynchronous handler,
/// a synchronous (blocking) handler, both, or neither. The relay prefers the
/// asynchronous form and only runs the blocking form on the scheduler's worker
/// pool.
#[async_trait]
pub trait MediaDevice: Send + Sync {
    /// Entity id of the device (`media_player.living_room_tv`).
    fn entity_id(&self) -> &str;

    /// Capabilities currently advertised by the device.
    fn supported_features(&self) -> MediaFeatures;

    /// Whether [`handle_async`](Self::handle_async) implements `kind`.
    fn provides_async(&self, _kind: CommandKind) -> bool {
        false
    }

    /// Whether [`handle_blocking`](Self::handle_blocking) implements `kind`.
    fn provides_blocking(&self, _kind: CommandKind) -> bool {
        false
    }

    /// Carries out a command without blocking the calling task.
    async fn handle_async(&self, command: &MediaCommand) -> DeviceResult<CommandOutput> {
        Err(DeviceError::NotImplemented {
            entity_id: self.entity_id().to_string(),
            command: command.name(),
        })
    }

    /// Carries out a command synchronously. Never called on the event loop.
    fn handle_blocking(&self, command: &MediaCommand) -> DeviceResult<CommandOutput> {
        Err(DeviceError::NotImplemented {
            entity_id: self.entity_id().to_string(),
            command: command.name(),
        })
    }
}

/// A dimmable light used for ambiance.
#[async_trait]
pub trait LightDevice: Send + Sync {
    /// Entity id of the light (`light.living_room_lamp`).
    fn entity_id(&self) -> &str;

    /// Sets the brightness on the light's own scale.
    async fn set_brightness(&self, brightness: f64) -> DeviceResult<()>;
}

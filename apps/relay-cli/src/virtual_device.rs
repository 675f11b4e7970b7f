//! Virtual devices backing the CLI's in-memory registry.
//!
//! They accept every command they advertise, log it and remember which
//! commands reached them so the CLI can report the handling device.

use std::sync::Arc;

use async_trait::async_trait;
use entertainment_core::{
    BrowseMedia, CommandKind, CommandOutput, DeviceResult, InMemoryRegistry, LightDevice,
    MediaCommand, MediaDevice, MediaFeatures,
};
use parking_lot::Mutex;

use crate::config::{HandlerMode, RelayConfig, VirtualDeviceConfig};

pub struct VirtualMediaDevice {
    entity_id: String,
    features: MediaFeatures,
    mode: HandlerMode,
    handled: Mutex<Vec<MediaCommand>>,
}

impl VirtualMediaDevice {
    pub fn new(config: &VirtualDeviceConfig) -> Self {
        Self {
            entity_id: config.entity_id.clone(),
            features: config.features,
            mode: config.mode,
            handled: Mutex::new(Vec::new()),
        }
    }

    /// Commands this device has carried out, oldest first.
    pub fn handled(&self) -> Vec<MediaCommand> {
        self.handled.lock().clone()
    }

    fn perform(&self, command: &MediaCommand, path: &str) -> DeviceResult<CommandOutput> {
        log::info!("[VirtualDevice] {} handled {} ({})", self.entity_id, command.name(), path);
        self.handled.lock().push(command.clone());

        Ok(match command {
            MediaCommand::BrowseMedia(request) => CommandOutput::Browse(BrowseMedia {
                title: self.entity_id.clone(),
                media_class: "directory".into(),
                media_content_id: request.media_content_id.clone().unwrap_or_default(),
                media_content_type: request
                    .media_content_type
                    .clone()
                    .unwrap_or_else(|| "library".into()),
                can_play: false,
                can_expand: true,
                children: Vec::new(),
            }),
            _ => CommandOutput::Done,
        })
    }
}

#[async_trait]
impl MediaDevice for VirtualMediaDevice {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn supported_features(&self) -> MediaFeatures {
        self.features
    }

    fn provides_async(&self, kind: CommandKind) -> bool {
        self.mode == HandlerMode::Async && self.features.supports(kind.required_feature())
    }

    fn provides_blocking(&self, kind: CommandKind) -> bool {
        self.mode == HandlerMode::Blocking && self.features.supports(kind.required_feature())
    }

    async fn handle_async(&self, command: &MediaCommand) -> DeviceResult<CommandOutput> {
        self.perform(command, "async")
    }

    fn handle_blocking(&self, command: &MediaCommand) -> DeviceResult<CommandOutput> {
        self.perform(command, "blocking")
    }
}

pub struct VirtualLight {
    entity_id: String,
    brightness: Mutex<Option<f64>>,
}

impl VirtualLight {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            brightness: Mutex::new(None),
        }
    }

    /// Last brightness written to the light.
    #[cfg(test)]
    pub fn brightness(&self) -> Option<f64> {
        *self.brightness.lock()
    }
}

#[async_trait]
impl LightDevice for VirtualLight {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    async fn set_brightness(&self, brightness: f64) -> DeviceResult<()> {
        log::info!("[VirtualLight] {} brightness -> {:.1}", self.entity_id, brightness);
        *self.brightness.lock() = Some(brightness);
        Ok(())
    }
}

/// Devices registered from a [`RelayConfig`].
pub struct VirtualDevices {
    pub media: Vec<Arc<VirtualMediaDevice>>,
}

impl VirtualDevices {
    /// Creates every configured device and inserts it into `registry`.
    pub fn register(config: &RelayConfig, registry: &InMemoryRegistry) -> Self {
        let media: Vec<_> = config
            .devices
            .iter()
            .map(|device| Arc::new(VirtualMediaDevice::new(device)))
            .collect();

        for device in &media {
            if registry.insert_media(device.clone()).is_some() {
                log::warn!("Duplicate device {}, keeping the last", device.entity_id());
            }
        }
        for entity_id in &config.lights {
            if registry.insert_light(Arc::new(VirtualLight::new(entity_id.clone()))).is_some() {
                log::warn!("Duplicate light {}, keeping the last", entity_id);
            }
        }

        log::info!(
            "Registered {} media device(s) and {} light(s)",
            media.len(),
            config.lights.len()
        );
        Self { media }
    }

    /// Entity id of the first device that handled a command of `kind`.
    pub fn handled_by(&self, kind: CommandKind) -> Option<&str> {
        self.media
            .iter()
            .find(|device| device.handled().iter().any(|c| c.kind() == kind))
            .map(|device| device.entity_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entertainment_core::EntityRegistry;

    fn device(entity_id: &str, features: MediaFeatures, mode: HandlerMode) -> VirtualDeviceConfig {
        VirtualDeviceConfig {
            entity_id: entity_id.into(),
            features,
            mode,
        }
    }

    #[test]
    fn handler_forms_follow_mode_and_features() {
        let tv = VirtualMediaDevice::new(&device(
            "media_player.tv",
            MediaFeatures::PLAY,
            HandlerMode::Blocking,
        ));
        assert!(tv.provides_blocking(CommandKind::MediaPlay));
        assert!(!tv.provides_async(CommandKind::MediaPlay));
        assert!(!tv.provides_blocking(CommandKind::MediaPause));

        let mute = VirtualMediaDevice::new(&device(
            "media_player.receiver",
            MediaFeatures::VOLUME_MUTE,
            HandlerMode::Unimplemented,
        ));
        assert!(!mute.provides_async(CommandKind::MuteVolume));
        assert!(!mute.provides_blocking(CommandKind::MuteVolume));
    }

    #[tokio::test]
    async fn register_populates_registry() {
        let config = RelayConfig {
            devices: vec![device("media_player.tv", MediaFeatures::PLAY, HandlerMode::Async)],
            lights: vec!["light.lamp".into()],
            ..Default::default()
        };
        let registry = InMemoryRegistry::new();

        let devices = VirtualDevices::register(&config, &registry);

        assert_eq!(registry.len(), 2);
        assert!(registry.media_device("media_player.tv").await.is_some());
        assert!(registry.light("light.lamp").await.is_some());
        assert!(devices.handled_by(CommandKind::MediaPlay).is_none());

        devices.media[0]
            .handle_async(&MediaCommand::MediaPlay)
            .await
            .unwrap();
        assert_eq!(devices.handled_by(CommandKind::MediaPlay), Some("media_player.tv"));
    }

    #[tokio::test]
    async fn light_remembers_brightness() {
        let light = VirtualLight::new("light.lamp");
        assert_eq!(light.brightness(), None);

        light.set_brightness(127.5).await.unwrap();
        assert_eq!(light.brightness(), Some(127.5));
    }
}

//! Entity registry lookups.
//!
//! The registry owns every device; media sources only borrow handles to them.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::device::{LightDevice, MediaDevice};

/// Resolves configured entity ids into live device handles.
///
/// A missing entity is reported as `None`, never as an error.
#[async_trait]
pub trait EntityRegistry: Send + Sync {
    /// Looks up a media player, remote or speaker.
    async fn media_device(&self, entity_id: &str) -> Option<Arc<dyn MediaDevice>>;

    /// Looks up a light.
    async fn light(&self, entity_id: &str) -> Option<Arc<dyn LightDevice>>;
}

/// Registry backed by in-process maps.
///
/// Suitable for embedding and for tests. Entries can be added or replaced at
/// any time; media sources see the handle that was present when they attached.
#[derive(Default)]
pub struct InMemoryRegistry {
    media: DashMap<String, Arc<dyn MediaDevice>>,
    lights: DashMap<String, Arc<dyn LightDevice>>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a media device under its own entity id.
    ///
    /// Returns the previously registered device with the same id, if any.
    pub fn insert_media(&self, device: Arc<dyn MediaDevice>) -> Option<Arc<dyn MediaDevice>> {
        self.media.insert(device.entity_id().to_string(), device)
    }

    /// Registers a light under its own entity id.
    pub fn insert_light(&self, light: Arc<dyn LightDevice>) -> Option<Arc<dyn LightDevice>> {
        self.lights.insert(light.entity_id().to_string(), light)
    }

    /// Removes an entity of either kind. Returns `true` if anything was removed.
    pub fn remove(&self, entity_id: &str) -> bool {
        let media = self.media.remove(entity_id).is_some();
        let light = self.lights.remove(entity_id).is_some();
        media || light
    }

    /// Total number of registered entities.
    pub fn len(&self) -> usize {
        self.media.len() + self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EntityRegistry for InMemoryRegistry {
    async fn media_device(&self, entity_id: &str) -> Option<Arc<dyn MediaDevice>> {
        self.media.get(entity_id).map(|entry| Arc::clone(entry.value()))
    }

    async fn light(&self, entity_id: &str) -> Option<Arc<dyn LightDevice>> {
        self.lights
            .get(entity_id)
            .map(|entry| Arc::clone(entry.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeviceResult;
    use crate::features::MediaFeatures;

    struct Tv;

    impl MediaDevice for Tv {
        fn entity_id(&self) -> &str {
            "media_player.tv"
        }
        fn supported_features(&self) -> MediaFeatures {
            MediaFeatures::TURN_ON
        }
    }

    struct Lamp;

    #[async_trait]
    impl LightDevice for Lamp {
        fn entity_id(&self) -> &str {
            "light.lamp"
        }
        async fn set_brightness(&self, _: f64) -> DeviceResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn lookups_are_separated_by_kind() {
        let registry = InMemoryRegistry::new();
        registry.insert_media(Arc::new(Tv));
        registry.insert_light(Arc::new(Lamp));

        assert!(registry.media_device("media_player.tv").await.is_some());
        assert!(registry.light("media_player.tv").await.is_none());
        assert!(registry.light("light.lamp").await.is_some());
        assert!(registry.media_device("media_player.missing").await.is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_reports_whether_entity_existed() {
        let registry = InMemoryRegistry::new();
        registry.insert_media(Arc::new(Tv));

        assert!(registry.remove("media_player.tv"));
        assert!(!registry.remove("media_player.tv"));
        assert!(registry.is_empty());
    }
}

//! Lazily-resolved device bindings.
//!
//! A binding pairs a configured entity id with the live handle the registry
//! returns for it. Bindings are resolved once, during attach, and are
//! read-only afterwards.

use std::fmt;
use std::sync::{Arc, OnceLock};

use futures::future::BoxFuture;

use crate::device::{LightDevice, MediaDevice};
use crate::registry::EntityRegistry;

/// Logical role of a device within a media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    /// The media player the source is built around.
    Primary,
    /// A remote used to drive the player (not used for routing).
    Remote,
    /// A dedicated speaker or receiver that owns volume.
    Speaker,
}

impl DeviceRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "media_player",
            Self::Remote => "remote",
            Self::Speaker => "speaker",
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device kinds that can be looked up in an [`EntityRegistry`].
pub trait RegistryLookup: Send + Sync + 'static {
    fn lookup<'a>(
        registry: &'a dyn EntityRegistry,
        entity_id: &'a str,
    ) -> BoxFuture<'a, Option<Arc<Self>>>;
}

impl RegistryLookup for dyn MediaDevice {
    fn lookup<'a>(
        registry: &'a dyn EntityRegistry,
        entity_id: &'a str,
    ) -> BoxFuture<'a, Option<Arc<Self>>> {
        registry.media_device(entity_id)
    }
}

impl RegistryLookup for dyn LightDevice {
    fn lookup<'a>(
        registry: &'a dyn EntityRegistry,
        entity_id: &'a str,
    ) -> BoxFuture<'a, Option<Arc<Self>>> {
        registry.light(entity_id)
    }
}

/// Association between a configured entity id and its resolved handle.
///
/// An unresolved binding, or one whose entity was not found, simply has no
/// device; callers treat that as the capability being absent.
pub struct DeviceBinding<D: ?Sized> {
    entity_id: String,
    // Outer `None`: not resolved yet. Inner `None`: registry had no entry.
    resolved: OnceLock<Option<Arc<D>>>,
}

/// Binding to a media player, remote or speaker.
pub type MediaBinding = DeviceBinding<dyn MediaDevice>;

/// Binding to a light.
pub type LightBinding = DeviceBinding<dyn LightDevice>;

impl<D: ?Sized + RegistryLookup> DeviceBinding<D> {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            resolved: OnceLock::new(),
        }
    }

    /// Configured entity id.
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Queries the registry for this binding's entity.
    ///
    /// Must be called once before the binding is used. Later calls keep the
    /// first resolution.
    pub async fn resolve(&self, registry: &dyn EntityRegistry) {
        if self.is_resolved() {
            log::debug!("[Binding] {} already resolved, ignoring", self.entity_id);
            return;
        }

        let device = D::lookup(registry, &self.entity_id).await;
        if device.is_none() {
            log::debug!("[Binding] {} not found in registry", self.entity_id);
        }

        if self.resolved.set(device).is_err() {
            log::debug!("[Binding] {} resolved concurrently, keeping first", self.entity_id);
        }
    }

    /// Whether [`resolve`](Self::resolve) has completed, whatever its outcome.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// The live handle, if resolution found one.
    pub fn device(&self) -> Option<&Arc<D>> {
        self.resolved.get().and_then(Option::as_ref)
    }
}

impl<D: ?Sized> fmt::Debug for DeviceBinding<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.resolved.get() {
            None => "unresolved",
            Some(None) => "missing",
            Some(Some(_)) => "resolved",
        };
        f.debug_struct("DeviceBinding")
            .field("entity_id", &self.entity_id)
            .field("state", &state)
            .finish()
    }
}

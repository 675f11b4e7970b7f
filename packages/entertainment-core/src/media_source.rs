//! Media sources and command relaying.
//!
//! A [`MediaSource`] is the user-facing playback entity. It may be a single
//! media player or a player combined with a remote, a dedicated speaker and
//! ambiance lights. Each command is relayed to the first candidate device that
//! advertises the required feature and implements the command:
//!
//! - Volume and mute: the speaker if bound, then the media player
//! - Everything else: the media player only
//!
//! Commands that no device can perform are reported to the diagnostics sink
//! and return `Ok(None)`.

use std::sync::{Arc, OnceLock};

use futures::join;

use crate::ambiance::Ambiance;
use crate::binding::{DeviceRole, MediaBinding};
use crate::command::{
    BrowseMedia, BrowseRequest, CommandOutput, MediaCommand, PlayMediaRequest, RepeatMode, Routing,
};
use crate::config::MediaSourceConfig;
use crate::device::MediaDevice;
use crate::diagnostics::{DiagnosticSink, LoggingDiagnostics, RelayDiagnostic};
use crate::error::{RelayError, RelayResult};
use crate::features::MediaFeatures;
use crate::registry::EntityRegistry;
use crate::runtime::{blocking_call, Scheduler};

/// Result of a relayed command: `Ok(None)` when no device performed it.
pub type RelayOutcome = RelayResult<Option<CommandOutput>>;

/// Collaborators injected into every media source.
#[derive(Clone)]
pub struct RelayContext {
    pub registry: Arc<dyn EntityRegistry>,
    pub scheduler: Arc<dyn Scheduler>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

impl RelayContext {
    /// Creates a context that logs diagnostics through `tracing`.
    pub fn new(registry: Arc<dyn EntityRegistry>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            registry,
            scheduler,
            diagnostics: Arc::new(LoggingDiagnostics),
        }
    }

    /// Replaces the diagnostics sink.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// Candidate devices per [`Routing`], in the order they are tried.
type CandidateLists = [Vec<Arc<dyn MediaDevice>>; 2];

/// A logical media source backed by one or more devices.
pub struct MediaSource {
    primary: MediaBinding,
    remote: Option<MediaBinding>,
    speaker: Option<MediaBinding>,
    ambiance: Option<Ambiance>,
    sort_order: u32,
    context: RelayContext,
    candidates: OnceLock<CandidateLists>,
}

impl MediaSource {
    /// Builds an unattached media source from validated configuration.
    pub fn new(config: &MediaSourceConfig, context: RelayContext) -> Self {
        Self {
            primary: MediaBinding::new(config.media_player()),
            remote: config.remote().map(MediaBinding::new),
            speaker: config.speaker().map(MediaBinding::new),
            ambiance: config.ambiance().map(Ambiance::new),
            sort_order: config.sort_order(),
            context,
            candidates: OnceLock::new(),
        }
    }

    /// Identifier of the source: its media player's entity id.
    pub fn name(&self) -> &str {
        self.primary.entity_id()
    }

    pub fn sort_order(&self) -> u32 {
        self.sort_order
    }

    pub fn ambiance(&self) -> Option<&Ambiance> {
        self.ambiance.as_ref()
    }

    /// The binding for `role`, if that role is configured.
    pub fn binding(&self, role: DeviceRole) -> Option<&MediaBinding> {
        match role {
            DeviceRole::Primary => Some(&self.primary),
            DeviceRole::Remote => self.remote.as_ref(),
            DeviceRole::Speaker => self.speaker.as_ref(),
        }
    }

    fn device(&self, role: DeviceRole) -> Option<&Arc<dyn MediaDevice>> {
        self.binding(role).and_then(MediaBinding::device)
    }

    /// Resolves every binding against the registry and fixes the candidate lists.
    ///
    /// Missing entities leave their role empty; attach never fails. Call once
    /// before relaying commands.
    pub async fn attach(&self) {
        let registry = self.context.registry.as_ref();
        let ambiance = async {
            if let Some(ambiance) = &self.ambiance {
                ambiance.resolve(registry).await;
            }
        };

        join!(
            self.primary.resolve(registry),
            resolve_optional(self.remote.as_ref(), registry),
            resolve_optional(self.speaker.as_ref(), registry),
            ambiance,
        );

        let lists = Routing::ALL.map(|routing| {
            routing
                .roles()
                .iter()
                .filter_map(|role| self.device(*role).cloned())
                .collect::<Vec<_>>()
        });

        if self.candidates.set(lists).is_err() {
            log::debug!("[MediaSource] {} attached more than once", self.name());
            return;
        }

        log::info!(
            "[MediaSource] {} attached (speaker: {}, remote: {}, ambiance: {})",
            self.name(),
            self.device(DeviceRole::Speaker).is_some(),
            self.device(DeviceRole::Remote).is_some(),
            self.ambiance.is_some(),
        );
    }

    pub fn is_attached(&self) -> bool {
        self.candidates.get().is_some()
    }

    /// Union of the media player's and the speaker's features.
    ///
    /// The remote is not included. Unresolved roles contribute nothing.
    pub fn supported_features(&self) -> MediaFeatures {
        [DeviceRole::Primary, DeviceRole::Speaker]
            .into_iter()
            .filter_map(|role| self.device(role))
            .fold(MediaFeatures::empty(), |acc, device| {
                acc | device.supported_features()
            })
    }

    /// Relays `command` to the first capable candidate device.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not attached, or if the chosen device
    /// fails. Other candidates are not tried after a device failure.
    pub async fn relay(&self, command: MediaCommand) -> RelayOutcome {
        let Some(candidates) = self.candidates.get() else {
            return Err(RelayError::NotAttached(self.name().to_string()));
        };

        let kind = command.kind();
        let required = kind.required_feature();

        for device in &candidates[kind.routing().index()] {
            if !device.supported_features().supports(required) {
                self.context.diagnostics.emit(RelayDiagnostic::CapabilityMismatch {
                    entity_id: device.entity_id().to_string(),
                    command: kind.name(),
                });
                continue;
            }

            if device.provides_async(kind) {
                log::debug!("[MediaSource] {} -> {} (async)", kind, device.entity_id());
                let output = device.handle_async(&command).await?;
                return Ok(Some(output));
            }

            if device.provides_blocking(kind) {
                log::debug!("[MediaSource] {} -> {} (blocking)", kind, device.entity_id());
                let job = blocking_call(Arc::clone(device), command);
                let output = self.context.scheduler.run_blocking(kind.name(), job).await?;
                return Ok(Some(output));
            }

            self.context
                .diagnostics
                .emit(RelayDiagnostic::MissingImplementation {
                    entity_id: device.entity_id().to_string(),
                    command: kind.name(),
                });
        }

        self.context.diagnostics.emit(RelayDiagnostic::Unperformable {
            source: self.name().to_string(),
            command: kind.name(),
        });
        Ok(None)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Command surface
    // ─────────────────────────────────────────────────────────────────────

    pub async fn turn_on(&self) -> RelayOutcome {
        self.relay(MediaCommand::TurnOn).await
    }

    pub async fn turn_off(&self) -> RelayOutcome {
        self.relay(MediaCommand::TurnOff).await
    }

    pub async fn mute_volume(&self, mute: bool) -> RelayOutcome {
        self.relay(MediaCommand::MuteVolume { mute }).await
    }

    /// Sets the volume, 0.0..=1.0.
    pub async fn set_volume_level(&self, volume: f64) -> RelayOutcome {
        self.relay(MediaCommand::SetVolumeLevel { volume }).await
    }

    pub async fn media_play(&self) -> RelayOutcome {
        self.relay(MediaCommand::MediaPlay).await
    }

    pub async fn media_pause(&self) -> RelayOutcome {
        self.relay(MediaCommand::MediaPause).await
    }

    pub async fn media_stop(&self) -> RelayOutcome {
        self.relay(MediaCommand::MediaStop).await
    }

    pub async fn media_previous_track(&self) -> RelayOutcome {
        self.relay(MediaCommand::MediaPreviousTrack).await
    }

    pub async fn media_next_track(&self) -> RelayOutcome {
        self.relay(MediaCommand::MediaNextTrack).await
    }

    /// Seeks to `position` seconds.
    pub async fn media_seek(&self, position: f64) -> RelayOutcome {
        self.relay(MediaCommand::MediaSeek { position }).await
    }

    pub async fn play_media(&self, request: PlayMediaRequest) -> RelayOutcome {
        self.relay(MediaCommand::PlayMedia(request)).await
    }

    pub async fn select_source(&self, source: impl Into<String>) -> RelayOutcome {
        self.relay(MediaCommand::SelectSource {
            source: source.into(),
        })
        .await
    }

    pub async fn select_sound_mode(&self, sound_mode: impl Into<String>) -> RelayOutcome {
        self.relay(MediaCommand::SelectSoundMode {
            sound_mode: sound_mode.into(),
        })
        .await
    }

    pub async fn clear_playlist(&self) -> RelayOutcome {
        self.relay(MediaCommand::ClearPlaylist).await
    }

    pub async fn set_shuffle(&self, shuffle: bool) -> RelayOutcome {
        self.relay(MediaCommand::SetShuffle { shuffle }).await
    }

    pub async fn set_repeat(&self, repeat: RepeatMode) -> RelayOutcome {
        self.relay(MediaCommand::SetRepeat { repeat }).await
    }

    /// Browses the media library. `Ok(None)` if no device can browse.
    pub async fn browse_media(&self, request: BrowseRequest) -> RelayResult<Option<BrowseMedia>> {
        let output = self.relay(MediaCommand::BrowseMedia(request)).await?;
        Ok(match output {
            Some(CommandOutput::Browse(tree)) => Some(tree),
            _ => None,
        })
    }
}

async fn resolve_optional(binding: Option<&MediaBinding>, registry: &dyn EntityRegistry) {
    if let Some(binding) = binding {
        binding.resolve(registry).await;
    }
}

impl std::fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSource")
            .field("primary", &self.primary)
            .field("remote", &self.remote)
            .field("speaker", &self.speaker)
            .field("ambiance", &self.ambiance)
            .field("sort_order", &self.sort_order)
            .field("attached", &self.is_attached())
            .finish()
    }
}

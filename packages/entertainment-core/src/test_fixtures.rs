//! Shared fakes for relay tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::command::{BrowseMedia, CommandKind, CommandOutput, MediaCommand};
use crate::device::MediaDevice;
use crate::diagnostics::{DiagnosticSink, RelayDiagnostic};
use crate::error::{DeviceError, DeviceResult};
use crate::features::MediaFeatures;
use crate::media_source::RelayContext;
use crate::registry::InMemoryRegistry;
use crate::runtime::TokioScheduler;

/// Mock device that records which handler form ran and with what command.
pub(crate) struct MockDevice {
    entity_id: String,
    features: MediaFeatures,
    async_kinds: HashSet<CommandKind>,
    blocking_kinds: HashSet<CommandKind>,
    fail: bool,
    pub async_calls: AtomicUsize,
    pub blocking_calls: AtomicUsize,
    pub received: Mutex<Vec<MediaCommand>>,
    pub blocking_thread: Mutex<Option<ThreadId>>,
}

impl MockDevice {
    pub fn new(entity_id: &str, features: MediaFeatures) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            features,
            async_kinds: HashSet::new(),
            blocking_kinds: HashSet::new(),
            fail: false,
            async_calls: AtomicUsize::new(0),
            blocking_calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            blocking_thread: Mutex::new(None),
        }
    }

    /// Implements every command asynchronously.
    pub fn with_all_async(mut self) -> Self {
        self.async_kinds.extend(CommandKind::ALL);
        self
    }

    /// Implements every command synchronously.
    pub fn with_all_blocking(mut self) -> Self {
        self.blocking_kinds.extend(CommandKind::ALL);
        self
    }

    /// Fails every command it handles.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn total_calls(&self) -> usize {
        self.async_calls.load(Ordering::SeqCst) + self.blocking_calls.load(Ordering::SeqCst)
    }

    pub fn last_command(&self) -> Option<MediaCommand> {
        self.received.lock().last().cloned()
    }

    fn respond(&self, command: &MediaCommand) -> DeviceResult<CommandOutput> {
        self.received.lock().push(command.clone());
        if self.fail {
            return Err(DeviceError::Failed {
                entity_id: self.entity_id.clone(),
                command: command.name(),
                message: "device offline".into(),
            });
        }
        Ok(match command {
            MediaCommand::BrowseMedia(_) => CommandOutput::Browse(sample_library()),
            _ => CommandOutput::Done,
        })
    }
}

#[async_trait]
impl MediaDevice for MockDevice {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn supported_features(&self) -> MediaFeatures {
        self.features
    }

    fn provides_async(&self, kind: CommandKind) -> bool {
        self.async_kinds.contains(&kind)
    }

    fn provides_blocking(&self, kind: CommandKind) -> bool {
        self.blocking_kinds.contains(&kind)
    }

    async fn handle_async(&self, command: &MediaCommand) -> DeviceResult<CommandOutput> {
        self.async_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(command)
    }

    fn handle_blocking(&self, command: &MediaCommand) -> DeviceResult<CommandOutput> {
        self.blocking_calls.fetch_add(1, Ordering::SeqCst);
        *self.blocking_thread.lock() = Some(thread::current().id());
        self.respond(command)
    }
}

pub(crate) fn sample_library() -> BrowseMedia {
    BrowseMedia {
        title: "Library".into(),
        media_class: "directory".into(),
        media_content_id: "root".into(),
        media_content_type: "library".into(),
        can_play: false,
        can_expand: true,
        children: vec![BrowseMedia {
            title: "Jazz".into(),
            media_class: "playlist".into(),
            media_content_id: "playlist:jazz".into(),
            media_content_type: "playlist".into(),
            can_play: true,
            can_expand: false,
            children: Vec::new(),
        }],
    }
}

/// Sink that records every diagnostic for assertions.
#[derive(Default)]
pub(crate) struct RecordingDiagnostics {
    pub events: Mutex<Vec<RelayDiagnostic>>,
}

impl RecordingDiagnostics {
    pub fn unperformable_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|d| matches!(d, RelayDiagnostic::Unperformable { .. }))
            .count()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn emit(&self, diagnostic: RelayDiagnostic) {
        self.events.lock().push(diagnostic);
    }
}

/// Registry, context and diagnostics wired for a test.
pub(crate) struct Harness {
    pub registry: Arc<InMemoryRegistry>,
    pub diagnostics: Arc<RecordingDiagnostics>,
    pub context: RelayContext,
}

impl Harness {
    /// Must be called inside a Tokio runtime.
    pub fn new(devices: &[Arc<MockDevice>]) -> Self {
        let registry = Arc::new(InMemoryRegistry::new());
        for device in devices {
            registry.insert_media(device.clone());
        }
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let context = RelayContext::new(registry.clone(), TokioScheduler::current().arc())
            .with_diagnostics(diagnostics.clone());
        Self {
            registry,
            diagnostics,
            context,
        }
    }
}

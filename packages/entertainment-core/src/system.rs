//! Entertainment system: the ordered set of media sources and the selection.

use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;

use crate::command::{CommandOutput, MediaCommand};
use crate::config::SystemConfig;
use crate::error::{EntertainmentError, EntertainmentResult};
use crate::media_source::{MediaSource, RelayContext};

/// A named group of media sources with one selected source.
///
/// Sources are kept in ascending `sort_order`; ties keep configuration order.
/// The first source flagged `default` is selected initially, otherwise the
/// first source in that order.
pub struct EntertainmentSystem {
    name: String,
    sources: Vec<Arc<MediaSource>>,
    selected: RwLock<usize>,
}

impl EntertainmentSystem {
    /// Builds the system from validated configuration. Sources are not attached.
    pub fn new(config: &SystemConfig, context: RelayContext) -> Self {
        let mut entries: Vec<_> = config
            .media_sources
            .iter()
            .map(|source| {
                let media_source = Arc::new(MediaSource::new(source, context.clone()));
                (source.is_default(), media_source)
            })
            .collect();
        entries.sort_by_key(|(_, source)| source.sort_order());

        let selected = entries
            .iter()
            .position(|(is_default, _)| *is_default)
            .unwrap_or(0);
        let sources = entries.into_iter().map(|(_, source)| source).collect();

        Self {
            name: config.name.clone(),
            sources,
            selected: RwLock::new(selected),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches every source concurrently.
    pub async fn attach_all(&self) {
        join_all(self.sources.iter().map(|source| source.attach())).await;
        log::info!(
            "[EntertainmentSystem] {} attached {} media source(s)",
            self.name,
            self.sources.len()
        );
    }

    /// Sources in display order.
    pub fn sources(&self) -> &[Arc<MediaSource>] {
        &self.sources
    }

    /// Looks up a source by its media player entity id.
    pub fn source(&self, name: &str) -> Option<&Arc<MediaSource>> {
        self.sources.iter().find(|source| source.name() == name)
    }

    /// The currently selected source, if the system has any.
    pub fn selected(&self) -> Option<Arc<MediaSource>> {
        self.sources.get(*self.selected.read()).cloned()
    }

    /// Selects the source named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EntertainmentError::SourceNotFound`] if no source has that name.
    pub fn select(&self, name: &str) -> EntertainmentResult<Arc<MediaSource>> {
        let index = self
            .sources
            .iter()
            .position(|source| source.name() == name)
            .ok_or_else(|| EntertainmentError::SourceNotFound(name.to_string()))?;

        *self.selected.write() = index;
        log::info!("[EntertainmentSystem] {} selected {}", self.name, name);
        Ok(Arc::clone(&self.sources[index]))
    }

    /// Relays `command` to the selected source.
    ///
    /// # Errors
    ///
    /// Returns an error if the system has no sources or the relay fails.
    pub async fn relay(&self, command: MediaCommand) -> EntertainmentResult<Option<CommandOutput>> {
        let source = self
            .selected()
            .ok_or_else(|| EntertainmentError::SourceNotFound(self.name.clone()))?;
        Ok(source.relay(command).await?)
    }
}

impl std::fmt::Debug for EntertainmentSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntertainmentSystem")
            .field("name", &self.name)
            .field("sources", &self.sources)
            .field("selected", &*self.selected.read())
            .finish()
    }
}

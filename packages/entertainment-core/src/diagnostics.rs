//! Relay diagnostics.
//!
//! The relay reports every skipped candidate and every command that no device
//! could perform through a [`DiagnosticSink`]. These reports are the only
//! externally visible trace of a command that had no effect.

use serde::Serialize;

/// Something the relay could not do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelayDiagnostic {
    /// A candidate device does not advertise the required feature.
    CapabilityMismatch {
        entity_id: String,
        command: &'static str,
    },
    /// A candidate advertises the feature but implements neither handler form.
    MissingImplementation {
        entity_id: String,
        command: &'static str,
    },
    /// No candidate could perform the command.
    Unperformable {
        source: String,
        command: &'static str,
    },
}

/// Receives relay diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: RelayDiagnostic);
}

/// Writes diagnostics as structured warnings.
pub struct LoggingDiagnostics;

impl DiagnosticSink for LoggingDiagnostics {
    fn emit(&self, diagnostic: RelayDiagnostic) {
        match diagnostic {
            RelayDiagnostic::CapabilityMismatch { entity_id, command } => {
                tracing::warn!(%entity_id, command, "{entity_id} does not support '{command}'");
            }
            RelayDiagnostic::MissingImplementation { entity_id, command } => {
                tracing::warn!(
                    %entity_id,
                    command,
                    "{entity_id} does not have an implementation for '{command}'"
                );
            }
            RelayDiagnostic::Unperformable { source, command } => {
                tracing::warn!(%source, command, "Unable to perform {command}");
            }
        }
    }
}

/// Discards diagnostics.
pub struct NoopDiagnostics;

impl DiagnosticSink for NoopDiagnostics {
    fn emit(&self, _diagnostic: RelayDiagnostic) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::RecordingDiagnostics;

    #[test]
    fn recording_sink_counts_unperformable() {
        let sink = RecordingDiagnostics::default();
        sink.emit(RelayDiagnostic::CapabilityMismatch {
            entity_id: "media_player.tv".into(),
            command: "media_seek",
        });
        sink.emit(RelayDiagnostic::Unperformable {
            source: "media_player.tv".into(),
            command: "media_seek",
        });

        assert_eq!(sink.events.lock().len(), 2);
        assert_eq!(sink.unperformable_count(), 1);
    }

    #[test]
    fn diagnostics_serialize_with_kind_tag() {
        let json = serde_json::to_value(RelayDiagnostic::MissingImplementation {
            entity_id: "remote.tv".into(),
            command: "turn_on",
        })
        .unwrap();
        assert_eq!(json["kind"], "missing_implementation");
        assert_eq!(json["command"], "turn_on");
    }
}

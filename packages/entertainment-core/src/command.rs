//! Relayable media commands.
//!
//! Every command a media source can relay is enumerated here together with the
//! capability it requires and the device roles that may service it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::binding::DeviceRole;
use crate::features::MediaFeatures;

/// Discriminant of a [`MediaCommand`], used for capability lookups and for
/// devices declaring which commands they implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    TurnOn,
    TurnOff,
    MuteVolume,
    SetVolumeLevel,
    MediaPlay,
    MediaPause,
    MediaStop,
    MediaPreviousTrack,
    MediaNextTrack,
    MediaSeek,
    PlayMedia,
    SelectSource,
    SelectSoundMode,
    ClearPlaylist,
    SetShuffle,
    SetRepeat,
    BrowseMedia,
}

impl CommandKind {
    pub const ALL: [CommandKind; 17] = [
        Self::TurnOn,
        Self::TurnOff,
        Self::MuteVolume,
        Self::SetVolumeLevel,
        Self::MediaPlay,
        Self::MediaPause,
        Self::MediaStop,
        Self::MediaPreviousTrack,
        Self::MediaNextTrack,
        Self::MediaSeek,
        Self::PlayMedia,
        Self::SelectSource,
        Self::SelectSoundMode,
        Self::ClearPlaylist,
        Self::SetShuffle,
        Self::SetRepeat,
        Self::BrowseMedia,
    ];

    /// Command name as used in service calls and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::MuteVolume => "mute_volume",
            Self::SetVolumeLevel => "set_volume_level",
            Self::MediaPlay => "media_play",
            Self::MediaPause => "media_pause",
            Self::MediaStop => "media_stop",
            Self::MediaPreviousTrack => "media_previous_track",
            Self::MediaNextTrack => "media_next_track",
            Self::MediaSeek => "media_seek",
            Self::PlayMedia => "play_media",
            Self::SelectSource => "select_source",
            Self::SelectSoundMode => "select_sound_mode",
            Self::ClearPlaylist => "clear_playlist",
            Self::SetShuffle => "set_shuffle",
            Self::SetRepeat => "set_repeat",
            Self::BrowseMedia => "browse_media",
        }
    }

    /// Looks up a command by its service name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Capability a device must advertise to receive this command.
    pub fn required_feature(self) -> MediaFeatures {
        match self {
            Self::TurnOn => MediaFeatures::TURN_ON,
            Self::TurnOff => MediaFeatures::TURN_OFF,
            Self::MuteVolume => MediaFeatures::VOLUME_MUTE,
            Self::SetVolumeLevel => MediaFeatures::VOLUME_SET,
            Self::MediaPlay => MediaFeatures::PLAY,
            Self::MediaPause => MediaFeatures::PAUSE,
            Self::MediaStop => MediaFeatures::STOP,
            Self::MediaPreviousTrack => MediaFeatures::PREVIOUS_TRACK,
            Self::MediaNextTrack => MediaFeatures::NEXT_TRACK,
            Self::MediaSeek => MediaFeatures::SEEK,
            Self::PlayMedia => MediaFeatures::PLAY_MEDIA,
            Self::SelectSource => MediaFeatures::SELECT_SOURCE,
            Self::SelectSoundMode => MediaFeatures::SELECT_SOUND_MODE,
            Self::ClearPlaylist => MediaFeatures::CLEAR_PLAYLIST,
            Self::SetShuffle => MediaFeatures::SHUFFLE_SET,
            Self::SetRepeat => MediaFeatures::REPEAT_SET,
            Self::BrowseMedia => MediaFeatures::BROWSE_MEDIA,
        }
    }

    /// Which candidate list the relay walks for this command.
    pub fn routing(self) -> Routing {
        match self {
            Self::MuteVolume | Self::SetVolumeLevel => Routing::SpeakerFirst,
            _ => Routing::Primary,
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered candidate roles for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routing {
    /// Only the primary media player.
    Primary,
    /// The dedicated speaker when present, then the primary media player.
    SpeakerFirst,
}

impl Routing {
    pub const ALL: [Routing; 2] = [Self::Primary, Self::SpeakerFirst];

    /// Roles in the order they are tried.
    pub fn roles(self) -> &'static [DeviceRole] {
        match self {
            Self::Primary => &[DeviceRole::Primary],
            Self::SpeakerFirst => &[DeviceRole::Speaker, DeviceRole::Primary],
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::SpeakerFirst => 1,
        }
    }
}

/// Repeat mode for [`MediaCommand::SetRepeat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    Off,
    All,
    One,
}

/// Arguments for [`MediaCommand::PlayMedia`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayMediaRequest {
    pub media_type: String,
    pub media_id: String,
    /// Integration-specific extras (`enqueue`, `announce`, ...), passed through untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Arguments for [`MediaCommand::BrowseMedia`]. Both fields absent means the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseRequest {
    #[serde(default)]
    pub media_content_type: Option<String>,
    #[serde(default)]
    pub media_content_id: Option<String>,
}

/// A media command together with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MediaCommand {
    TurnOn,
    TurnOff,
    MuteVolume { mute: bool },
    /// Volume level in the range 0.0..=1.0.
    SetVolumeLevel { volume: f64 },
    MediaPlay,
    MediaPause,
    MediaStop,
    MediaPreviousTrack,
    MediaNextTrack,
    /// Position in seconds.
    MediaSeek { position: f64 },
    PlayMedia(PlayMediaRequest),
    SelectSource { source: String },
    SelectSoundMode { sound_mode: String },
    ClearPlaylist,
    SetShuffle { shuffle: bool },
    SetRepeat { repeat: RepeatMode },
    BrowseMedia(BrowseRequest),
}

impl MediaCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::TurnOn => CommandKind::TurnOn,
            Self::TurnOff => CommandKind::TurnOff,
            Self::MuteVolume { .. } => CommandKind::MuteVolume,
            Self::SetVolumeLevel { .. } => CommandKind::SetVolumeLevel,
            Self::MediaPlay => CommandKind::MediaPlay,
            Self::MediaPause => CommandKind::MediaPause,
            Self::MediaStop => CommandKind::MediaStop,
            Self::MediaPreviousTrack => CommandKind::MediaPreviousTrack,
            Self::MediaNextTrack => CommandKind::MediaNextTrack,
            Self::MediaSeek { .. } => CommandKind::MediaSeek,
            Self::PlayMedia(_) => CommandKind::PlayMedia,
            Self::SelectSource { .. } => CommandKind::SelectSource,
            Self::SelectSoundMode { .. } => CommandKind::SelectSoundMode,
            Self::ClearPlaylist => CommandKind::ClearPlaylist,
            Self::SetShuffle { .. } => CommandKind::SetShuffle,
            Self::SetRepeat { .. } => CommandKind::SetRepeat,
            Self::BrowseMedia(_) => CommandKind::BrowseMedia,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// One node of a media library browse tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseMedia {
    pub title: String,
    pub media_class: String,
    pub media_content_id: String,
    pub media_content_type: String,
    pub can_play: bool,
    pub can_expand: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BrowseMedia>,
}

/// Value returned by a device after carrying out a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CommandOutput {
    /// The command completed with nothing to report.
    Done,
    /// Result of a browse request.
    Browse(BrowseMedia),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_lookup() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(CommandKind::from_name("launch_rocket"), None);
    }

    #[test]
    fn only_volume_commands_prefer_speaker() {
        for kind in CommandKind::ALL {
            let expected = matches!(kind, CommandKind::MuteVolume | CommandKind::SetVolumeLevel);
            assert_eq!(kind.routing() == Routing::SpeakerFirst, expected, "{kind}");
        }
        assert_eq!(
            Routing::SpeakerFirst.roles(),
            &[DeviceRole::Speaker, DeviceRole::Primary]
        );
    }

    #[test]
    fn each_command_requires_a_single_distinct_flag() {
        let mut seen = MediaFeatures::empty();
        for kind in CommandKind::ALL {
            let flag = kind.required_feature();
            assert_eq!(flag.bits().count_ones(), 1, "{kind}");
            assert!(!seen.intersects(flag), "{kind} shares a flag");
            seen |= flag;
        }
    }

    #[test]
    fn commands_parse_from_tagged_json() {
        let seek: MediaCommand =
            serde_json::from_str(r#"{"command": "media_seek", "position": 30}"#).unwrap();
        assert_eq!(seek, MediaCommand::MediaSeek { position: 30.0 });

        let play: MediaCommand = serde_json::from_str(
            r#"{"command": "play_media", "media_type": "music", "media_id": "spotify:track:1", "extra": {"enqueue": "add"}}"#,
        )
        .unwrap();
        assert_eq!(play.kind(), CommandKind::PlayMedia);

        let browse: MediaCommand = serde_json::from_str(r#"{"command": "browse_media"}"#).unwrap();
        assert_eq!(browse, MediaCommand::BrowseMedia(BrowseRequest::default()));

        let repeat: MediaCommand =
            serde_json::from_str(r#"{"command": "set_repeat", "repeat": "one"}"#).unwrap();
        assert_eq!(
            repeat,
            MediaCommand::SetRepeat {
                repeat: RepeatMode::One
            }
        );
    }
}

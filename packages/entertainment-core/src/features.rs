//! Media player capability flags.
//!
//! Bit values match the Home Assistant `media_player` support constants so that
//! flags reported by existing integrations can be used unchanged.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Capabilities advertised by a media device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MediaFeatures: u32 {
        const PAUSE = 1;
        const SEEK = 1 << 1;
        const VOLUME_SET = 1 << 2;
        const VOLUME_MUTE = 1 << 3;
        const PREVIOUS_TRACK = 1 << 4;
        const NEXT_TRACK = 1 << 5;
        const TURN_ON = 1 << 7;
        const TURN_OFF = 1 << 8;
        const PLAY_MEDIA = 1 << 9;
        const VOLUME_STEP = 1 << 10;
        const SELECT_SOURCE = 1 << 11;
        const STOP = 1 << 12;
        const CLEAR_PLAYLIST = 1 << 13;
        const PLAY = 1 << 14;
        const SHUFFLE_SET = 1 << 15;
        const SELECT_SOUND_MODE = 1 << 16;
        const BROWSE_MEDIA = 1 << 17;
        const REPEAT_SET = 1 << 18;
    }
}

impl MediaFeatures {
    /// Parses a single flag name as written in configuration (`"volume_set"`).
    ///
    /// Matching ignores case and surrounding whitespace. Returns `None` for
    /// unknown names.
    pub fn from_config_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        if upper.contains('|') {
            return None;
        }
        bitflags::parser::from_str::<Self>(&upper)
            .ok()
            .filter(|flags| !flags.is_empty())
    }

    /// Returns `true` if every bit of `required` is advertised.
    #[inline]
    pub fn supports(self, required: MediaFeatures) -> bool {
        self.contains(required)
    }
}

impl From<u32> for MediaFeatures {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl Serialize for MediaFeatures {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

/// Accepts either the raw integer bits or a list of flag names.
impl<'de> Deserialize<'de> for MediaFeatures {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bits(u32),
            Names(Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bits(bits) => Ok(Self::from_bits_retain(bits)),
            Repr::Names(names) => names.iter().try_fold(Self::empty(), |acc, name| {
                Self::from_config_name(name)
                    .map(|flag| acc | flag)
                    .ok_or_else(|| serde::de::Error::custom(format!("unknown feature '{name}'")))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_match_media_player_constants() {
        assert_eq!(MediaFeatures::TURN_ON.bits(), 128);
        assert_eq!(MediaFeatures::SELECT_SOURCE.bits(), 2048);
        assert_eq!(MediaFeatures::BROWSE_MEDIA.bits(), 131_072);
        assert_eq!(MediaFeatures::REPEAT_SET.bits(), 262_144);
    }

    #[test]
    fn config_names_ignore_case() {
        assert_eq!(
            MediaFeatures::from_config_name("volume_set"),
            Some(MediaFeatures::VOLUME_SET)
        );
        assert_eq!(
            MediaFeatures::from_config_name(" Seek "),
            Some(MediaFeatures::SEEK)
        );
        assert_eq!(MediaFeatures::from_config_name("teleport"), None);
        assert_eq!(MediaFeatures::from_config_name(""), None);
        assert_eq!(MediaFeatures::from_config_name("play | pause"), None);
    }

    #[test]
    fn generated_name_lookup_stays_exact() {
        assert_eq!(MediaFeatures::from_name("PLAY"), Some(MediaFeatures::PLAY));
        assert_eq!(MediaFeatures::from_name("play"), None);
    }

    #[test]
    fn deserializes_names_and_bits() {
        let named: MediaFeatures = serde_json::from_str(r#"["turn_on", "volume_set"]"#).unwrap();
        assert_eq!(named, MediaFeatures::TURN_ON | MediaFeatures::VOLUME_SET);

        let bits: MediaFeatures = serde_json::from_str("132").unwrap();
        assert_eq!(bits, MediaFeatures::TURN_ON | MediaFeatures::VOLUME_SET);

        assert!(serde_json::from_str::<MediaFeatures>(r#"["bogus"]"#).is_err());
    }

    #[test]
    fn supports_requires_all_bits() {
        let flags = MediaFeatures::PLAY | MediaFeatures::PAUSE;
        assert!(flags.supports(MediaFeatures::PLAY));
        assert!(!flags.supports(MediaFeatures::PLAY | MediaFeatures::STOP));
    }
}

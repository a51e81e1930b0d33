//! Track types and the relay order.

use serde::{Deserialize, Serialize};

/// A track type; the declaration order is the relay order.
///
/// Slot `i` of a session always carries `TrackType::for_slot(i)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Drum,
    Bass,
    Synth,
    Vocal,
}

/// The relay order.
pub const RELAY_ORDER: [TrackType; 4] = [
    TrackType::Drum,
    TrackType::Bass,
    TrackType::Synth,
    TrackType::Vocal,
];

impl TrackType {
    /// Returns all track types in relay order.
    pub fn all() -> &'static [TrackType] {
        &RELAY_ORDER
    }

    /// Track type of a slot position, cycling through the relay order.
    pub fn for_slot(index: usize) -> TrackType {
        RELAY_ORDER[index % RELAY_ORDER.len()]
    }

    /// Key used for this track type in the wire format.
    pub fn wire_key(&self) -> &'static str {
        match self {
            TrackType::Drum => "drum",
            TrackType::Bass => "bass",
            TrackType::Synth => "synth",
            TrackType::Vocal => "vocal",
        }
    }

    /// Looks up a track type by wire key; unknown keys yield `None`.
    pub fn from_wire_key(key: &str) -> Option<TrackType> {
        RELAY_ORDER.iter().copied().find(|t| t.wire_key() == key)
    }
}

impl std::fmt::Display for TrackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_key())
    }
}

impl std::str::FromStr for TrackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackType::from_wire_key(s).ok_or_else(|| format!("unknown track type: {}", s))
    }
}

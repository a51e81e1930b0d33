//! Instrument identity carried by every note.
//!
//! Instruments are resolved once, when a note is authored or decoded, into a
//! closed [`Timbre`] variant. The string id of a timbre is what travels on the
//! wire; ids that name no known timbre are preserved verbatim as
//! [`Instrument::Custom`] so that decoding never loses information.

use serde::{Deserialize, Serialize};

/// Oscillator waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Percussion voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumKind {
    Kick,
    Snare,
    HiHat,
    Clap,
    Tom,
    Crash,
}

/// Vocal voicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voicing {
    Ah,
    Ooh,
    Choir,
}

/// Synthesis category handed to the sound-producing capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timbre {
    Oscillator(Waveform),
    Drum(DrumKind),
    Vocal(Voicing),
}

const TIMBRE_IDS: [(&str, Timbre); 13] = [
    ("sine", Timbre::Oscillator(Waveform::Sine)),
    ("square", Timbre::Oscillator(Waveform::Square)),
    ("sawtooth", Timbre::Oscillator(Waveform::Sawtooth)),
    ("triangle", Timbre::Oscillator(Waveform::Triangle)),
    ("kick", Timbre::Drum(DrumKind::Kick)),
    ("snare", Timbre::Drum(DrumKind::Snare)),
    ("hihat", Timbre::Drum(DrumKind::HiHat)),
    ("clap", Timbre::Drum(DrumKind::Clap)),
    ("tom", Timbre::Drum(DrumKind::Tom)),
    ("crash", Timbre::Drum(DrumKind::Crash)),
    ("ah", Timbre::Vocal(Voicing::Ah)),
    ("ooh", Timbre::Vocal(Voicing::Ooh)),
    ("choir", Timbre::Vocal(Voicing::Choir)),
];

impl Timbre {
    /// Canonical wire id of this timbre.
    pub fn id(&self) -> &'static str {
        TIMBRE_IDS
            .iter()
            .find(|(_, t)| t == self)
            .map(|(id, _)| *id)
            .unwrap_or("sine")
    }

    /// Resolves a wire id to a timbre.
    pub fn from_id(id: &str) -> Option<Timbre> {
        TIMBRE_IDS
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, t)| *t)
    }

    /// All known timbres.
    pub fn all() -> impl Iterator<Item = Timbre> {
        TIMBRE_IDS.iter().map(|(_, t)| *t)
    }
}

impl Default for Timbre {
    fn default() -> Self {
        Timbre::Oscillator(Waveform::Sine)
    }
}

impl std::fmt::Display for Timbre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl TryFrom<String> for Timbre {
    type Error = String;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Timbre::from_id(&id).ok_or_else(|| format!("unknown timbre: {}", id))
    }
}

impl From<Timbre> for String {
    fn from(timbre: Timbre) -> Self {
        timbre.id().to_string()
    }
}

/// The instrument of a note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Instrument {
    /// A timbre resolved at authoring time.
    Known(Timbre),
    /// An id with no matching timbre, kept verbatim.
    Custom(String),
}

impl Instrument {
    /// Resolves a wire id.
    pub fn from_id(id: &str) -> Self {
        match Timbre::from_id(id) {
            Some(timbre) => Instrument::Known(timbre),
            None => Instrument::Custom(id.to_string()),
        }
    }

    /// The id written to the wire.
    pub fn id(&self) -> &str {
        match self {
            Instrument::Known(timbre) => timbre.id(),
            Instrument::Custom(id) => id,
        }
    }

    /// The resolved timbre, if any.
    pub fn timbre(&self) -> Option<Timbre> {
        match self {
            Instrument::Known(timbre) => Some(*timbre),
            Instrument::Custom(_) => None,
        }
    }
}

impl From<Timbre> for Instrument {
    fn from(timbre: Timbre) -> Self {
        Instrument::Known(timbre)
    }
}

impl From<String> for Instrument {
    fn from(id: String) -> Self {
        Instrument::from_id(&id)
    }
}

impl From<&str> for Instrument {
    fn from(id: &str) -> Self {
        Instrument::from_id(id)
    }
}

impl From<Instrument> for String {
    fn from(instrument: Instrument) -> Self {
        match instrument {
            Instrument::Known(timbre) => timbre.id().to_string(),
            Instrument::Custom(id) => id,
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

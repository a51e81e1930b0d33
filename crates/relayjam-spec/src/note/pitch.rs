//! Pitch classes and the pitch-class/octave <-> MIDI mapping.

use serde::{Deserialize, Serialize};

use super::constants::{MIDI_MAX, SEMITONE_MAP};

/// The twelve semitone names, spelled with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "B")]
    B,
}

impl PitchClass {
    /// All pitch classes in semitone order.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitone offset above C (0..=11).
    pub fn semitone_index(&self) -> u8 {
        *self as u8
    }

    /// Pitch class for a semitone offset; wraps modulo 12.
    pub fn from_semitone_index(index: u8) -> Self {
        Self::ALL[(index % 12) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a pitch class and octave to a MIDI pitch number.
///
/// `pitch = 12 * (octave + 1) + semitone_index`. Returns `None` when the
/// result falls outside 0..=127.
///
/// # Examples
/// ```
/// use relayjam_spec::note::{pitch_to_midi, PitchClass};
///
/// assert_eq!(pitch_to_midi(PitchClass::C, 4), Some(60));
/// assert_eq!(pitch_to_midi(PitchClass::C, 1), Some(24));
/// assert_eq!(pitch_to_midi(PitchClass::GSharp, 9), None);
/// ```
pub fn pitch_to_midi(pitch_class: PitchClass, octave: i8) -> Option<u8> {
    let pitch = midi_number(pitch_class, octave);
    if (0..=MIDI_MAX as i32).contains(&pitch) {
        Some(pitch as u8)
    } else {
        None
    }
}

/// Unchecked MIDI number for a pitch class and octave; may lie outside 0..=127.
pub(crate) fn midi_number(pitch_class: PitchClass, octave: i8) -> i32 {
    12 * (octave as i32 + 1) + pitch_class.semitone_index() as i32
}

/// Convert a MIDI pitch number back to its pitch class and octave.
///
/// `octave = floor(pitch / 12) - 1`, `semitone = pitch mod 12`.
pub fn midi_to_pitch(pitch: u8) -> (PitchClass, i8) {
    let octave = (pitch / 12) as i8 - 1;
    (PitchClass::from_semitone_index(pitch % 12), octave)
}

/// Parse a note name in scientific notation (e.g. "C4", "F#2", "Bb3", "C-1")
/// into a MIDI pitch number.
///
/// Returns `None` for unparseable names or pitches outside 0..=127.
///
/// # Examples
/// ```
/// use relayjam_spec::note::note_name_to_midi;
///
/// assert_eq!(note_name_to_midi("A4"), Some(69));
/// assert_eq!(note_name_to_midi("Bb3"), Some(58));
/// assert_eq!(note_name_to_midi("C-1"), Some(0));
/// assert_eq!(note_name_to_midi("H2"), None);
/// ```
pub fn note_name_to_midi(name: &str) -> Option<u8> {
    let name = name.trim();
    let mut chars = name.chars();

    let letter = chars.next()?.to_ascii_uppercase();
    let mut semitone = SEMITONE_MAP
        .iter()
        .find(|(c, _)| *c == letter)
        .map(|(_, s)| *s)?;

    let rest = chars.as_str();
    let rest = if let Some(stripped) = rest.strip_prefix('#') {
        semitone += 1;
        stripped
    } else if let Some(stripped) = rest.strip_prefix('b') {
        semitone -= 1;
        stripped
    } else {
        rest
    };

    let octave: i32 = rest.parse().ok()?;
    let pitch = octave
        .checked_add(1)?
        .checked_mul(12)?
        .checked_add(semitone)?;
    if (0..=MIDI_MAX as i32).contains(&pitch) {
        Some(pitch as u8)
    } else {
        None
    }
}

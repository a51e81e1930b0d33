//! Pitch-class and MIDI pitch conversion utilities.
//!
//! The wire form carries a single MIDI pitch number per note; authoring code
//! works with a pitch class and an octave. This module converts between the
//! two and parses note names such as `"C#4"` or `"Bb3"`.

mod constants;
mod frequency;
mod pitch;


pub use constants::{A4_FREQ, A4_MIDI, MAX_OCTAVE, MIDI_MAX, MIN_OCTAVE};
pub use frequency::{freq_to_midi, midi_to_freq};
pub use pitch::{midi_to_pitch, note_name_to_midi, pitch_to_midi, PitchClass};
pub(crate) use pitch::midi_number;

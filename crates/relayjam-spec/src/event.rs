//! Structured note events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::instrument::Instrument;
use crate::note::{midi_to_pitch, PitchClass};
use crate::track::TrackType;

/// Fixed composition horizon, in sixteenth notes (four bars of 4/4).
pub const TOTAL_SIXTEENTH_NOTES: u32 = 64;

/// Sixteenth notes per quarter-note beat.
pub const SIXTEENTHS_PER_BEAT: u32 = 4;

/// Notes grouped by track type, iterated in relay order.
pub type TracksByType = BTreeMap<TrackType, Vec<NoteEvent>>;

/// A single note as authored by a contributor.
///
/// Times are in sixteenth-note ticks from the start of the composition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch_class: PitchClass,
    pub octave: i8,
    pub start_time: u32,
    pub duration: u32,
    pub velocity: u8,
    pub instrument: Instrument,
}

impl NoteEvent {
    pub fn new(
        pitch_class: PitchClass,
        octave: i8,
        start_time: u32,
        duration: u32,
        velocity: u8,
        instrument: impl Into<Instrument>,
    ) -> Self {
        Self {
            pitch_class,
            octave,
            start_time,
            duration,
            velocity,
            instrument: instrument.into(),
        }
    }

    /// Builds a note from a MIDI pitch number.
    pub fn from_midi(
        pitch: u8,
        start_time: u32,
        duration: u32,
        velocity: u8,
        instrument: impl Into<Instrument>,
    ) -> Self {
        let (pitch_class, octave) = midi_to_pitch(pitch);
        Self::new(pitch_class, octave, start_time, duration, velocity, instrument)
    }

    /// MIDI pitch number; may be outside 0..=127 for an unchecked note.
    pub fn midi_pitch(&self) -> i32 {
        crate::note::midi_number(self.pitch_class, self.octave)
    }

    /// Tick at which the note stops sounding.
    pub fn end_time(&self) -> u64 {
        self.start_time as u64 + self.duration as u64
    }
}

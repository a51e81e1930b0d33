//! Playback scores: decoded notes flattened into one sorted timeline.

use std::collections::HashSet;

use relayjam_relay::CompositionMusicData;
use relayjam_spec::note::pitch_to_midi;
use relayjam_spec::{midi_to_freq, Instrument, NoteEvent, Timbre, TrackType, TracksByType};

use crate::error::PlaybackError;

/// A note ready for scheduling.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNote {
    /// Position in the score; identifies the note to the scheduler.
    pub id: usize,
    pub track_type: TrackType,
    pub start_tick: u32,
    pub duration_ticks: u32,
    pub frequency_hz: f64,
    pub velocity: u8,
    pub timbre: Timbre,
}

/// All notes of a piece, sorted by start tick, plus the loop horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackScore {
    notes: Vec<ScheduledNote>,
    horizon: u32,
}

impl PlaybackScore {
    /// Builds a score from labelled note lists.
    ///
    /// Notes with the same start tick keep their input order. Instruments
    /// with no known timbre are resolved to `fallback` here, once, so the
    /// scheduler never has to. Notes whose pitch lies outside the MIDI range
    /// are dropped with a warning.
    pub fn from_tracks<'a, I>(tracks: I, horizon: u32, fallback: Timbre) -> Self
    where
        I: IntoIterator<Item = (TrackType, &'a [NoteEvent])>,
    {
        let mut unknown: HashSet<&str> = HashSet::new();
        let mut notes: Vec<ScheduledNote> = Vec::new();

        for (track_type, events) in tracks {
            for event in events {
                let Some(pitch) = pitch_to_midi(event.pitch_class, event.octave) else {
                    tracing::warn!(
                        pitch = event.midi_pitch(),
                        start_tick = event.start_time,
                        track_type = %track_type,
                        "pitch outside the MIDI range, note skipped"
                    );
                    continue;
                };
                let timbre = match &event.instrument {
                    Instrument::Known(timbre) => *timbre,
                    Instrument::Custom(id) => {
                        if unknown.insert(id.as_str()) {
                            tracing::warn!(
                                instrument = %id,
                                fallback = %fallback,
                                "unknown instrument, using fallback timbre"
                            );
                        }
                        fallback
                    }
                };
                notes.push(ScheduledNote {
                    id: 0,
                    track_type,
                    start_tick: event.start_time,
                    duration_ticks: event.duration,
                    frequency_hz: midi_to_freq(pitch),
                    velocity: event.velocity,
                    timbre,
                });
            }
        }

        notes.sort_by_key(|n| n.start_tick);
        for (id, note) in notes.iter_mut().enumerate() {
            note.id = id;
        }

        Self { notes, horizon }
    }

    /// Builds a score from a decoded single-contributor track map.
    pub fn from_tracks_by_type(tracks: &TracksByType, horizon: u32, fallback: Timbre) -> Self {
        Self::from_tracks(
            tracks.iter().map(|(t, notes)| (*t, notes.as_slice())),
            horizon,
            fallback,
        )
    }

    /// Decodes a composition and builds its score.
    ///
    /// Each track is labelled with its slot's track type. The horizon is the
    /// composition's `total_sixteenth_notes`.
    pub fn from_composition(
        data: &CompositionMusicData,
        fallback: Timbre,
    ) -> Result<Self, PlaybackError> {
        let slots = data.decode_tracks()?;
        Ok(Self::from_tracks(
            slots.iter().map(|s| (s.track_type, s.notes.as_slice())),
            data.total_sixteenth_notes,
            fallback,
        ))
    }

    pub fn notes(&self) -> &[ScheduledNote] {
        &self.notes
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

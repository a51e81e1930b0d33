//! The sound-producing capability the scheduler drives.

use relayjam_spec::Timbre;
use serde::Serialize;

/// A request to start sounding one note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteActivation {
    pub frequency_hz: f64,
    pub duration_seconds: f64,
    /// MIDI velocity, 0..=127.
    pub velocity: u8,
    pub timbre: Timbre,
    /// Seconds from now at which the note should start; 0 without lookahead.
    pub delay_seconds: f64,
}

/// Receives note activations. Synthesis happens behind this trait.
pub trait SoundSink {
    fn activate_note(&mut self, activation: &NoteActivation);

    /// Silences everything that is sounding or queued.
    fn stop_all(&mut self);
}

/// Sink that records what it is asked to play.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub activations: Vec<NoteActivation>,
    pub stop_all_calls: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frequencies of every activation, in order.
    pub fn frequencies(&self) -> Vec<f64> {
        self.activations.iter().map(|a| a.frequency_hz).collect()
    }

    pub fn clear(&mut self) {
        self.activations.clear();
    }
}

impl SoundSink for RecordingSink {
    fn activate_note(&mut self, activation: &NoteActivation) {
        self.activations.push(activation.clone());
    }

    fn stop_all(&mut self) {
        self.stop_all_calls += 1;
    }
}

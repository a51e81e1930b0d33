//! Note and configuration fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use relayjam_spec::{NoteEvent, Timbre, Voicing, Waveform};
use tempfile::TempDir;

/// The single kick used throughout the end-to-end tests.
pub fn kick() -> NoteEvent {
    NoteEvent::from_midi(36, 0, 4, 100, "kick")
}

/// Four-on-the-floor with a snare backbeat over one bar.
pub fn drum_beat() -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    for beat in 0..4u32 {
        notes.push(NoteEvent::from_midi(36, beat * 4, 1, 110, "kick"));
        if beat % 2 == 1 {
            notes.push(NoteEvent::from_midi(38, beat * 4, 1, 96, "snare"));
        }
        notes.push(NoteEvent::from_midi(42, beat * 4 + 2, 1, 70, "hihat"));
    }
    notes
}

/// Root-fifth bass line, eighth notes.
pub fn bass_line() -> Vec<NoteEvent> {
    [40u8, 47, 40, 47, 45, 52, 43, 50]
        .iter()
        .enumerate()
        .map(|(i, pitch)| {
            NoteEvent::from_midi(
                *pitch,
                i as u32 * 2,
                2,
                90,
                Timbre::Oscillator(Waveform::Sawtooth),
            )
        })
        .collect()
}

/// Short square-wave lead in the second bar.
pub fn synth_lead() -> Vec<NoteEvent> {
    vec![
        NoteEvent::from_midi(76, 16, 4, 80, Timbre::Oscillator(Waveform::Square)),
        NoteEvent::from_midi(79, 20, 4, 80, Timbre::Oscillator(Waveform::Square)),
        NoteEvent::from_midi(81, 24, 8, 84, Timbre::Oscillator(Waveform::Square)),
    ]
}

/// Vocal hook that ends exactly on the horizon.
pub fn vocal_hook() -> Vec<NoteEvent> {
    vec![
        NoteEvent::from_midi(64, 48, 8, 75, Timbre::Vocal(Voicing::Ooh)),
        NoteEvent::from_midi(67, 56, 8, 75, Timbre::Vocal(Voicing::Ah)),
    ]
}

/// A config file in a temporary directory.
pub struct ConfigFixture {
    pub root: TempDir,
    pub path: PathBuf,
}

impl ConfigFixture {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes `json` to `relayjam.json` in a fresh temporary directory.
pub fn config_file(json: &serde_json::Value) -> ConfigFixture {
    let root = TempDir::new().expect("Failed to create temp dir");
    let path = root.path().join("relayjam.json");
    let contents = serde_json::to_string_pretty(json).expect("Failed to serialize config");
    fs::write(&path, contents).expect("Failed to write config file");
    ConfigFixture { root, path }
}

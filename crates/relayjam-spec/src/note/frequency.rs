//! MIDI pitch and frequency conversion.

use super::constants::{A4_FREQ, A4_MIDI, MIDI_MAX};

/// Convert a MIDI pitch number to frequency in Hz.
///
/// Uses `f = 440 * 2^((n - 69) / 12)`.
///
/// # Examples
/// ```
/// use relayjam_spec::note::midi_to_freq;
///
/// assert!((midi_to_freq(69) - 440.0).abs() < 0.001);
/// assert!((midi_to_freq(60) - 261.626).abs() < 0.01);
/// ```
pub fn midi_to_freq(midi_pitch: u8) -> f64 {
    A4_FREQ * 2.0_f64.powf((midi_pitch as f64 - A4_MIDI as f64) / 12.0)
}

/// Convert a frequency in Hz to the nearest MIDI pitch number (clamped to 0..=127).
pub fn freq_to_midi(freq: f64) -> u8 {
    let pitch = A4_MIDI as f64 + 12.0 * (freq / A4_FREQ).log2();
    pitch.round().clamp(0.0, MIDI_MAX as f64) as u8
}

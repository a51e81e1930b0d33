//! Constants for pitch conversion.

/// Highest valid MIDI pitch number.
pub const MIDI_MAX: u8 = 127;

/// Octave of MIDI pitch 0 (C-1).
pub const MIN_OCTAVE: i8 = -1;

/// Octave of MIDI pitch 127 (G9).
pub const MAX_OCTAVE: i8 = 9;

/// MIDI pitch of the A440 reference.
pub const A4_MIDI: u8 = 69;

/// Reference frequency of A4 in Hz.
pub const A4_FREQ: f64 = 440.0;

/// Semitone offsets for natural note letters (C=0, D=2, E=4, F=5, G=7, A=9, B=11).
pub(super) const SEMITONE_MAP: [(char, i32); 7] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

//! RelayJam Core Types and Note Codec
//!
//! This crate provides the note model, the compact wire codec, validation,
//! content hashing and configuration shared by every RelayJam crate.
//!
//! A RelayJam composition is written by several contributors in relay order
//! (drum, bass, synth, vocal). Each contribution is a set of notes encoded
//! into a small JSON wire payload that is stored on the ledger verbatim.
//!
//! # Example
//!
//! ```
//! use relayjam_spec::{decode, encode, NoteEvent, PitchClass, TrackType, TracksByType};
//!
//! let mut tracks = TracksByType::new();
//! tracks.insert(TrackType::Drum, vec![NoteEvent::from_midi(36, 0, 4, 100, "kick")]);
//!
//! let wire = encode(&tracks).unwrap();
//! assert_eq!(wire, r#"{"drum":[[36,0,4,100,"kick"]]}"#);
//!
//! let decoded = decode(&wire).unwrap();
//! let kick = &decoded[&TrackType::Drum][0];
//! assert_eq!((kick.pitch_class, kick.octave), (PitchClass::C, 2));
//! ```
//!
//! # Modules
//!
//! - [`codec`]: Wire encoding, decoding and validation
//! - [`config`]: Runtime configuration
//! - [`error`]: Validation codes and shared error traits
//! - [`event`]: Note events and composition constants
//! - [`hash`]: Canonical hashing and identifier derivation
//! - [`ids`]: Identifier newtypes
//! - [`instrument`]: Instrument ids and timbres
//! - [`note`]: Pitch names, MIDI numbers and frequencies
//! - [`track`]: Track types and the relay order

pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod hash;
pub mod ids;
pub mod instrument;
pub mod note;
pub mod track;

// Re-export commonly used types at the crate root
pub use codec::{
    check_horizon, decode, encode, validate, validate_detailed, CodecError, DecodedMusic,
    EncodedTrack, MusicData, NoteField,
};
pub use config::{LedgerConfig, PlaybackConfig, RelayConfig, RelayJamConfig};
pub use error::{CoreError, ErrorCode, SpecError, ValidationError, ValidationResult};
pub use event::{NoteEvent, TracksByType, SIXTEENTHS_PER_BEAT, TOTAL_SIXTEENTH_NOTES};
pub use hash::wire_content_hash;
pub use ids::{CompositionId, ContributorId, SessionId, TrackId};
pub use instrument::{DrumKind, Instrument, Timbre, Voicing, Waveform};
pub use note::{midi_to_freq, note_name_to_midi, PitchClass};
pub use track::{TrackType, RELAY_ORDER};

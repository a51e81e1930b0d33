//! Note codec: lossless conversion between structured notes and the compact
//! wire form stored on the ledger.
//!
//! # Wire format
//!
//! A JSON object mapping a track-type key (`"drum"`, `"bass"`, `"synth"`,
//! `"vocal"`) to an array of five-element note tuples:
//!
//! ```text
//! {"drum":[[36,0,4,100,"kick"],[38,4,4,90,"snare"]]}
//!          pitch start dur vel instrument
//! ```
//!
//! Track types with no notes are omitted, absent keys mean an empty track, and
//! unknown keys are ignored on decode so that newer writers stay readable.
//! Tempo and horizon are *not* part of the wire; they travel next to it in a
//! [`MusicData`] envelope.

mod decode;
mod encode;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CoreError, ErrorCode, SpecError, ValidationError, ValidationResult};
use crate::event::TracksByType;

pub use decode::{decode, validate, validate_detailed};
pub use encode::{check_horizon, encode};

/// A field of a wire note tuple, in tuple order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Pitch,
    StartTime,
    Duration,
    Velocity,
    Instrument,
}

impl NoteField {
    /// Position of the field inside a note tuple.
    pub fn position(&self) -> usize {
        *self as usize
    }

    /// Inclusive bounds for the integer fields.
    pub(crate) fn bounds(&self) -> (i64, i64) {
        match self {
            NoteField::Pitch | NoteField::Velocity => (0, 127),
            NoteField::StartTime => (0, u32::MAX as i64),
            NoteField::Duration => (1, u32::MAX as i64),
            NoteField::Instrument => (0, 0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteField::Pitch => "pitch",
            NoteField::StartTime => "start_time",
            NoteField::Duration => "duration",
            NoteField::Velocity => "velocity",
            NoteField::Instrument => "instrument",
        }
    }
}

impl std::fmt::Display for NoteField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while encoding, decoding or range-checking notes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed wire payload at {path}: {reason}")]
    MalformedWire { path: String, reason: String },

    #[error("wire payload holds no track data (expected an array under drum, bass, synth or vocal)")]
    NoTrackData,

    #[error("{field} out of range at {path}: {reason}")]
    FieldOutOfRange {
        path: String,
        field: NoteField,
        reason: String,
    },

    #[error("note at {path} ends at tick {end}, past the horizon of {horizon}")]
    BeyondHorizon { path: String, end: u64, horizon: u32 },
}

impl CodecError {
    /// Validation code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CodecError::MalformedWire { .. } => ErrorCode::MalformedWire,
            CodecError::NoTrackData => ErrorCode::NoTrackData,
            CodecError::FieldOutOfRange { .. } => ErrorCode::FieldOutOfRange,
            CodecError::BeyondHorizon { .. } => ErrorCode::BeyondHorizon,
        }
    }

    /// Path of the offending element, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            CodecError::MalformedWire { path, .. }
            | CodecError::FieldOutOfRange { path, .. }
            | CodecError::BeyondHorizon { path, .. } => Some(path),
            CodecError::NoTrackData => None,
        }
    }

    /// Converts to a validation error for a [`ValidationResult`].
    pub fn to_validation_error(&self) -> ValidationError {
        let message = match self {
            CodecError::MalformedWire { reason, .. } => reason.clone(),
            CodecError::FieldOutOfRange { field, reason, .. } => format!("{} {}", field, reason),
            other => other.to_string(),
        };
        match self.path() {
            Some(path) => ValidationError::with_path(self.error_code(), message, path),
            None => ValidationError::new(self.error_code(), message),
        }
    }
}

impl CoreError for CodecError {
    fn code(&self) -> &'static str {
        match self {
            CodecError::MalformedWire { .. } => "CODEC_001",
            CodecError::NoTrackData => "CODEC_002",
            CodecError::FieldOutOfRange { .. } => "CODEC_003",
            CodecError::BeyondHorizon { .. } => "CODEC_004",
        }
    }

    fn category(&self) -> &'static str {
        "codec"
    }
}

pub(crate) fn collect_validation(errors: &[CodecError]) -> ValidationResult {
    let mut result = ValidationResult::success();
    for error in errors {
        result.add_error(error.to_validation_error());
    }
    result
}

/// A wire-encoded track, as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedTrack(String);

impl EncodedTrack {
    /// Encodes notes into a new wire track.
    pub fn encode(tracks: &TracksByType) -> Result<Self, CodecError> {
        encode(tracks).map(EncodedTrack)
    }

    /// Wraps a wire string as received from the ledger, without checking it.
    pub fn from_wire(wire: impl Into<String>) -> Self {
        EncodedTrack(wire.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn decode(&self) -> Result<TracksByType, CodecError> {
        decode(&self.0)
    }

    pub fn validate(&self) -> bool {
        validate(&self.0)
    }

    /// BLAKE3 digest of the canonicalized wire.
    pub fn content_hash(&self) -> Result<String, SpecError> {
        crate::hash::wire_content_hash(&self.0)
    }
}

impl std::fmt::Display for EncodedTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An encoded track together with the tempo and horizon the wire omits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicData {
    pub bpm: u16,
    pub total_sixteenth_notes: u32,
    pub encoded: EncodedTrack,
}

/// Decoded notes with their tempo and horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMusic {
    pub tracks: TracksByType,
    pub bpm: u16,
    pub total_sixteenth_notes: u32,
}

impl MusicData {
    pub fn new(bpm: u16, total_sixteenth_notes: u32, encoded: EncodedTrack) -> Self {
        Self {
            bpm,
            total_sixteenth_notes,
            encoded,
        }
    }

    /// Decodes the wire and re-attaches the envelope fields.
    pub fn decode(&self) -> Result<DecodedMusic, CodecError> {
        Ok(DecodedMusic {
            tracks: self.encoded.decode()?,
            bpm: self.bpm,
            total_sixteenth_notes: self.total_sixteenth_notes,
        })
    }
}

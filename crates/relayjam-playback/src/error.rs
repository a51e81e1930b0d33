//! Error types for playback.

use relayjam_relay::AggregateError;
use relayjam_spec::CoreError;
use thiserror::Error;

/// Errors raised while building a score or a scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// Tempo must be positive.
    #[error("invalid tempo: {bpm} bpm")]
    InvalidTempo {
        /// The rejected tempo.
        bpm: u16,
    },

    /// A playback setting is unusable.
    #[error("invalid playback setting '{field}': {reason}")]
    InvalidConfig {
        /// Offending setting.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A seek target that is not a finite tick.
    #[error("invalid playback position: {tick}")]
    InvalidPosition {
        /// The rejected tick.
        tick: f64,
    },

    /// A composition track failed to decode.
    #[error(transparent)]
    Score(#[from] AggregateError),
}

impl CoreError for PlaybackError {
    fn code(&self) -> &'static str {
        match self {
            PlaybackError::InvalidTempo { .. } => "PLAYBACK_001",
            PlaybackError::InvalidConfig { .. } => "PLAYBACK_002",
            PlaybackError::Score(_) => "PLAYBACK_003",
            PlaybackError::InvalidPosition { .. } => "PLAYBACK_004",
        }
    }

    fn category(&self) -> &'static str {
        "playback"
    }
}

//! Error types for the relay, aggregation and ledger layers.

use relayjam_spec::{CodecError, CoreError, SessionId, TrackType};
use thiserror::Error;

/// Result type for relay state machine operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Protocol errors raised by a relay session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The session has no open slot left.
    #[error("session {session} is finalized")]
    SessionFinalized {
        /// The finalized session.
        session: SessionId,
    },

    /// The declared track type is not the type of the current slot.
    #[error("slot {slot} expects a {expected} track, got {declared}")]
    TrackTypeMismatch {
        /// Index of the current slot.
        slot: usize,
        /// Track type the slot carries.
        expected: TrackType,
        /// Track type the caller declared.
        declared: TrackType,
    },

    /// The target slot is already filled.
    #[error("slot {slot} is already filled")]
    SlotOccupied {
        /// Index of the occupied slot.
        slot: usize,
    },

    /// The caller's view of the current slot is out of date.
    #[error("stale slot: caller expected slot {expected}, session is at slot {actual}")]
    StaleSlot {
        /// Slot index the caller assumed.
        expected: usize,
        /// Actual current slot index.
        actual: usize,
    },

    /// Session creation parameters are out of bounds.
    #[error("invalid session parameter '{field}': {reason}")]
    InvalidSessionParams {
        /// Offending parameter.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl RelayError {
    /// Creates an invalid session parameter error.
    pub fn invalid_param(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSessionParams {
            field,
            reason: reason.into(),
        }
    }
}

impl CoreError for RelayError {
    fn code(&self) -> &'static str {
        match self {
            RelayError::SessionFinalized { .. } => "RELAY_001",
            RelayError::TrackTypeMismatch { .. } => "RELAY_002",
            RelayError::SlotOccupied { .. } => "RELAY_003",
            RelayError::StaleSlot { .. } => "RELAY_004",
            RelayError::InvalidSessionParams { .. } => "RELAY_005",
        }
    }

    fn category(&self) -> &'static str {
        "relay"
    }
}

/// Errors raised while building a composition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    /// The session still has open slots.
    #[error("session {session} is not finalized")]
    NotFinalized {
        /// The open session.
        session: SessionId,
    },

    /// A composition was already built for the session.
    #[error("session {session} was already aggregated")]
    AlreadyAggregated {
        /// The aggregated session.
        session: SessionId,
    },

    /// The track stored in a slot does not decode.
    #[error("track in slot {slot} is malformed: {source}")]
    MalformedTrack {
        /// Slot index of the bad track.
        slot: usize,
        /// Underlying codec failure.
        #[source]
        source: CodecError,
    },
}

impl CoreError for AggregateError {
    fn code(&self) -> &'static str {
        match self {
            AggregateError::NotFinalized { .. } => "AGGREGATE_001",
            AggregateError::AlreadyAggregated { .. } => "AGGREGATE_002",
            AggregateError::MalformedTrack { .. } => "AGGREGATE_003",
        }
    }

    fn category(&self) -> &'static str {
        "aggregate"
    }
}

/// Errors surfaced at the ledger boundary.
///
/// Protocol errors raised by the ledger-resident state machine are carried
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The call did not complete within the configured timeout.
    #[error("ledger call '{operation}' timed out after {after_ms} ms")]
    Timeout {
        /// Ledger operation name.
        operation: &'static str,
        /// Timeout that elapsed.
        after_ms: u64,
    },

    /// The ledger refused the transaction.
    #[error("ledger rejected the transaction: {reason}")]
    Rejected {
        /// Reason reported by the ledger.
        reason: String,
    },

    /// The requested record does not exist.
    #[error("{what} not found on the ledger")]
    NotFound {
        /// Description of the missing record.
        what: String,
    },

    /// Relay protocol error.
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Aggregation error.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl LedgerError {
    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates a rejection error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

impl CoreError for LedgerError {
    fn code(&self) -> &'static str {
        match self {
            LedgerError::Timeout { .. } => "LEDGER_001",
            LedgerError::Rejected { .. } => "LEDGER_002",
            LedgerError::NotFound { .. } => "LEDGER_003",
            LedgerError::Relay(inner) => inner.code(),
            LedgerError::Aggregate(inner) => inner.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            LedgerError::Relay(inner) => inner.category(),
            LedgerError::Aggregate(inner) => inner.category(),
            _ => "ledger",
        }
    }
}

/// Errors raised by the contributor-side client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The notes could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A ledger call failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The session cannot take a contribution.
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl CoreError for ClientError {
    fn code(&self) -> &'static str {
        match self {
            ClientError::Codec(inner) => inner.code(),
            ClientError::Ledger(inner) => inner.code(),
            ClientError::Relay(inner) => inner.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            ClientError::Codec(inner) => inner.category(),
            ClientError::Ledger(inner) => inner.category(),
            ClientError::Relay(inner) => inner.category(),
        }
    }
}

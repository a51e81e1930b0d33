//! The ledger boundary.
//!
//! The ledger hosts sessions, minted tracks and compositions. This crate only
//! talks to it through [`Ledger`]; [`crate::MemoryLedger`] is an in-process
//! implementation used for tests and offline sessions.
//!
//! Errors are passed to the caller unmodified. Nothing here retries.

use chrono::{DateTime, Utc};
use relayjam_spec::{CompositionId, ContributorId, MusicData, SessionId, TrackId, TrackType};
use serde::{Deserialize, Serialize};

use crate::aggregate::CompositionMusicData;
use crate::error::LedgerError;
use crate::session::{SessionParams, SessionSnapshot};

/// Result type for ledger calls.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Receipt of a successful `join_and_commit` transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub session_id: SessionId,
    pub slot_index: usize,
    pub track_type: TrackType,
    /// True if this commit filled the last slot.
    pub finalized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Operations the ledger program exposes.
pub trait Ledger {
    /// Creates a session and returns its id.
    fn create_session(&mut self, params: SessionParams) -> LedgerResult<SessionId>;

    /// Commits a previously minted track to the session's current slot.
    fn join_and_commit(
        &mut self,
        caller: &ContributorId,
        session: SessionId,
        track: &TrackId,
        declared: TrackType,
    ) -> LedgerResult<TxReceipt>;

    /// Reads the current state of a session.
    fn get_session_info(&self, session: SessionId) -> LedgerResult<SessionSnapshot>;

    /// Mints a track of `track_type` owned by `owner`.
    ///
    /// The track can only be committed to a slot of the same type.
    fn mint_track(
        &mut self,
        owner: &ContributorId,
        track_type: TrackType,
        music: MusicData,
    ) -> LedgerResult<TrackId>;

    /// Reads the music data of a minted track.
    fn get_track_music_data(&self, track: &TrackId) -> LedgerResult<MusicData>;

    /// Aggregates a finalized session and mints its composition.
    fn mint_composition(&mut self, session: SessionId) -> LedgerResult<CompositionId>;

    /// Reads the music data of a minted composition.
    fn get_composition_music_data(
        &self,
        composition: &CompositionId,
    ) -> LedgerResult<CompositionMusicData>;
}

//! Relay sessions: fixed-order track slots filled one commit at a time.
//!
//! A session is created with `max_tracks` slots whose track types follow the
//! relay order cyclically (drum, bass, synth, vocal, drum, ...). Each commit
//! fills the current slot and advances the cursor; the commit that fills the
//! last slot finalizes the session.
//!
//! ```text
//! Open(0) --commit--> Open(1) --commit--> ... --commit--> Finalized
//! ```
//!
//! Every check runs before any field is touched, so a failed commit leaves
//! the session exactly as it was.


use chrono::{DateTime, Utc};
use relayjam_spec::config::RelayConfig;
use relayjam_spec::{ContributorId, EncodedTrack, SessionId, TrackId, TrackType};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};

/// Parameters supplied when a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    pub bpm: u16,
    pub max_tracks: usize,
}

impl SessionParams {
    /// Creates parameters with an empty description and genre.
    pub fn new(name: impl Into<String>, bpm: u16, max_tracks: usize) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            genre: String::new(),
            bpm,
            max_tracks,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the genre.
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    fn check(&self, config: &RelayConfig) -> RelayResult<()> {
        if self.max_tracks == 0 {
            return Err(RelayError::invalid_param("max_tracks", "must be at least 1"));
        }
        if self.max_tracks > config.max_tracks_limit {
            return Err(RelayError::invalid_param(
                "max_tracks",
                format!(
                    "must be at most {}, got {}",
                    config.max_tracks_limit, self.max_tracks
                ),
            ));
        }
        if !(config.min_bpm..=config.max_bpm).contains(&self.bpm) {
            return Err(RelayError::invalid_param(
                "bpm",
                format!(
                    "must be in {}..={}, got {}",
                    config.min_bpm, config.max_bpm, self.bpm
                ),
            ));
        }
        Ok(())
    }
}

/// Handle to a minted track as stored in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub track_id: TrackId,
    pub encoded: EncodedTrack,
}

impl TrackRef {
    pub fn new(track_id: TrackId, encoded: EncodedTrack) -> Self {
        Self { track_id, encoded }
    }
}

/// One position in the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub track_type: TrackType,
    pub filled_by: Option<ContributorId>,
    pub track_ref: Option<TrackRef>,
}

impl Slot {
    fn empty(track_type: TrackType) -> Self {
        Self {
            track_type,
            filled_by: None,
            track_ref: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.filled_by.is_some()
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RelayState {
    /// Waiting for a commit to the given slot.
    Open { next_slot: usize },
    /// All slots filled. Terminal.
    Finalized,
}

/// Emitted by the commit that fills the last slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationEvent {
    pub session_id: SessionId,
    pub completed_at: DateTime<Utc>,
    pub contributors: Vec<ContributorId>,
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Slot that was filled.
    pub slot_index: usize,
    /// Track type of the filled slot.
    pub track_type: TrackType,
    /// Present only when this commit finalized the session.
    pub finalized: Option<FinalizationEvent>,
}

/// A relay session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    name: String,
    description: String,
    genre: String,
    bpm: u16,
    horizon: u32,
    slots: Vec<Slot>,
    current_slot_index: usize,
    is_finalized: bool,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    contributors: Vec<ContributorId>,
}

impl Session {
    /// Creates a session with `params.max_tracks` empty slots.
    ///
    /// # Arguments
    /// * `id` - Ledger-assigned session id
    /// * `params` - Name, tempo and slot count
    /// * `config` - Relay limits and the composition horizon
    /// * `created_at` - Creation timestamp
    ///
    /// # Returns
    /// * The open session, or `InvalidSessionParams` naming the bad field
    pub fn create(
        id: SessionId,
        params: SessionParams,
        config: &RelayConfig,
        created_at: DateTime<Utc>,
    ) -> RelayResult<Self> {
        params.check(config)?;

        let slots = (0..params.max_tracks)
            .map(|i| Slot::empty(TrackType::for_slot(i)))
            .collect();

        tracing::debug!(
            session = %id,
            max_tracks = params.max_tracks,
            bpm = params.bpm,
            "session created"
        );

        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            genre: params.genre,
            bpm: params.bpm,
            horizon: config.horizon,
            slots,
            current_slot_index: 0,
            is_finalized: false,
            created_at,
            completed_at: None,
            contributors: Vec::new(),
        })
    }

    /// Track type of the slot awaiting a commit.
    pub fn current_slot_type(&self) -> RelayResult<TrackType> {
        if self.is_finalized {
            return Err(RelayError::SessionFinalized { session: self.id });
        }
        Ok(TrackType::for_slot(self.current_slot_index))
    }

    /// Fills the current slot with `track_ref`.
    ///
    /// Fails with `SessionFinalized`, `TrackTypeMismatch` or `SlotOccupied`
    /// without touching the session. The commit that fills the last slot
    /// sets `completed_at = now` and returns a [`FinalizationEvent`].
    pub fn join_and_commit(
        &mut self,
        contributor: ContributorId,
        track_ref: TrackRef,
        declared: TrackType,
        now: DateTime<Utc>,
    ) -> RelayResult<CommitOutcome> {
        let slot_index = self.current_slot_index;
        let slot = match self.slots.get(slot_index) {
            Some(slot) if !self.is_finalized => slot,
            _ => return Err(RelayError::SessionFinalized { session: self.id }),
        };
        if declared != slot.track_type {
            return Err(RelayError::TrackTypeMismatch {
                slot: slot_index,
                expected: slot.track_type,
                declared,
            });
        }
        // Unreachable while slots only fill through this method.
        if slot.is_filled() {
            return Err(RelayError::SlotOccupied { slot: slot_index });
        }

        let slot = &mut self.slots[slot_index];
        slot.filled_by = Some(contributor.clone());
        slot.track_ref = Some(track_ref);
        self.contributors.push(contributor);
        self.current_slot_index += 1;

        tracing::debug!(
            session = %self.id,
            slot = slot_index,
            track_type = %declared,
            "track committed"
        );

        let finalized = if self.current_slot_index == self.slots.len() {
            self.is_finalized = true;
            self.completed_at = Some(now);
            tracing::info!(
                session = %self.id,
                contributors = self.contributors.len(),
                "session finalized"
            );
            Some(FinalizationEvent {
                session_id: self.id,
                completed_at: now,
                contributors: self.contributors.clone(),
            })
        } else {
            None
        };

        Ok(CommitOutcome {
            slot_index,
            track_type: declared,
            finalized,
        })
    }

    /// Like [`Session::join_and_commit`], but first checks that the caller
    /// saw the session at `expected_slot`.
    pub fn join_and_commit_at(
        &mut self,
        expected_slot: usize,
        contributor: ContributorId,
        track_ref: TrackRef,
        declared: TrackType,
        now: DateTime<Utc>,
    ) -> RelayResult<CommitOutcome> {
        if self.is_finalized {
            return Err(RelayError::SessionFinalized { session: self.id });
        }
        if expected_slot != self.current_slot_index {
            return Err(RelayError::StaleSlot {
                expected: expected_slot,
                actual: self.current_slot_index,
            });
        }
        self.join_and_commit(contributor, track_ref, declared, now)
    }

    pub fn state(&self) -> RelayState {
        if self.is_finalized {
            RelayState::Finalized
        } else {
            RelayState::Open {
                next_slot: self.current_slot_index,
            }
        }
    }

    /// Serializable view of the session.
    pub fn info(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            genre: self.genre.clone(),
            bpm: self.bpm,
            max_tracks: self.slots.len(),
            horizon: self.horizon,
            state: self.state(),
            current_slot_index: self.current_slot_index,
            current_slot_type: self.current_slot_type().ok(),
            is_finalized: self.is_finalized,
            created_at: self.created_at,
            completed_at: self.completed_at,
            contributors: self.contributors.clone(),
            slots: self.slots.clone(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn max_tracks(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn current_slot_index(&self) -> usize {
        self.current_slot_index
    }

    pub fn is_finalized(&self) -> bool {
        self.is_finalized
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Contributors in commit order; one entry per filled slot.
    pub fn contributors(&self) -> &[ContributorId] {
        &self.contributors
    }
}

/// Point-in-time copy of a session, as returned by `get_session_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub name: String,
    pub description: String,
    pub genre: String,
    pub bpm: u16,
    pub max_tracks: usize,
    pub horizon: u32,
    pub state: RelayState,
    pub current_slot_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_slot_type: Option<TrackType>,
    pub is_finalized: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub contributors: Vec<ContributorId>,
    pub slots: Vec<Slot>,
}

impl SessionSnapshot {
    /// Serializes the snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

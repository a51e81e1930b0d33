//! Composition aggregation: one immutable record per finalized session.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use relayjam_spec::{CodecError, ContributorId, EncodedTrack, NoteEvent, SessionId, TrackType};
use serde::{Deserialize, Serialize};

use crate::error::AggregateError;
use crate::session::{Session, TrackRef};

/// Builds compositions and remembers which sessions already have one.
#[derive(Debug, Default)]
pub struct Aggregator {
    aggregated: HashSet<SessionId>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the composition of a finalized session.
    ///
    /// The session is only recorded as aggregated when this succeeds, so a
    /// failed attempt can be retried.
    ///
    /// # Arguments
    /// * `session` - A finalized session
    /// * `minted_at` - Timestamp stored on the composition
    ///
    /// # Returns
    /// * The composition, or `NotFinalized`, `AlreadyAggregated` or
    ///   `MalformedTrack` naming the bad slot
    pub fn aggregate(
        &mut self,
        session: &Session,
        minted_at: DateTime<Utc>,
    ) -> Result<Composition, AggregateError> {
        let session_id = session.id();
        if !session.is_finalized() {
            return Err(AggregateError::NotFinalized {
                session: session_id,
            });
        }
        if self.aggregated.contains(&session_id) {
            return Err(AggregateError::AlreadyAggregated {
                session: session_id,
            });
        }

        let track_refs: Vec<TrackRef> = session
            .slots()
            .iter()
            .filter_map(|slot| slot.track_ref.clone())
            .collect();

        let mut last_end = 0u64;
        for (slot, track_ref) in track_refs.iter().enumerate() {
            last_end = last_end.max(track_end(slot, &track_ref.encoded)?);
        }
        let total_sixteenth_notes = last_end.min(session.horizon() as u64) as u32;

        self.aggregated.insert(session_id);
        tracing::info!(
            session = %session_id,
            tracks = track_refs.len(),
            total_sixteenth_notes,
            "composition aggregated"
        );

        Ok(Composition {
            session_id,
            contributors: session.contributors().to_vec(),
            track_refs,
            bpm: session.bpm(),
            total_sixteenth_notes,
            minted_at,
        })
    }

    /// Returns true if a composition was built for `session`.
    pub fn is_aggregated(&self, session: SessionId) -> bool {
        self.aggregated.contains(&session)
    }
}

/// Latest note end in a track; tracks without track data end at 0.
fn track_end(slot: usize, encoded: &EncodedTrack) -> Result<u64, AggregateError> {
    match encoded.decode() {
        Ok(tracks) => Ok(tracks
            .values()
            .flatten()
            .map(NoteEvent::end_time)
            .max()
            .unwrap_or(0)),
        Err(CodecError::NoTrackData) => {
            tracing::debug!(slot, "slot holds no track data");
            Ok(0)
        }
        Err(source) => Err(AggregateError::MalformedTrack { slot, source }),
    }
}

/// The finished composition. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    session_id: SessionId,
    contributors: Vec<ContributorId>,
    track_refs: Vec<TrackRef>,
    bpm: u16,
    total_sixteenth_notes: u32,
    minted_at: DateTime<Utc>,
}

impl Composition {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Contributors in slot order.
    pub fn contributors(&self) -> &[ContributorId] {
        &self.contributors
    }

    /// Track references in slot order.
    pub fn track_refs(&self) -> &[TrackRef] {
        &self.track_refs
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    pub fn total_sixteenth_notes(&self) -> u32 {
        self.total_sixteenth_notes
    }

    pub fn minted_at(&self) -> DateTime<Utc> {
        self.minted_at
    }

    /// Playback data, with `encoded_tracks` aligned to `track_refs`.
    pub fn music_data(&self) -> CompositionMusicData {
        CompositionMusicData {
            bpm: self.bpm,
            total_sixteenth_notes: self.total_sixteenth_notes,
            encoded_tracks: self
                .track_refs
                .iter()
                .map(|r| r.encoded.clone())
                .collect(),
        }
    }

    /// Decodes every track and labels it with its slot's track type.
    pub fn decode_tracks(&self) -> Result<Vec<DecodedSlot>, AggregateError> {
        self.music_data().decode_tracks()
    }
}

/// Tempo, length and wire tracks of a composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionMusicData {
    pub bpm: u16,
    pub total_sixteenth_notes: u32,
    pub encoded_tracks: Vec<EncodedTrack>,
}

/// Notes of one slot, labelled with the slot's track type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSlot {
    pub slot: usize,
    pub track_type: TrackType,
    pub notes: Vec<NoteEvent>,
}

impl CompositionMusicData {
    /// Decodes each track in slot order.
    ///
    /// Tracks without track data yield an empty slot; any other codec
    /// failure is reported with its slot index.
    pub fn decode_tracks(&self) -> Result<Vec<DecodedSlot>, AggregateError> {
        self.encoded_tracks
            .iter()
            .enumerate()
            .map(|(slot, encoded)| {
                let notes = match encoded.decode() {
                    Ok(tracks) => tracks.into_values().flatten().collect(),
                    Err(CodecError::NoTrackData) => Vec::new(),
                    Err(source) => return Err(AggregateError::MalformedTrack { slot, source }),
                };
                Ok(DecodedSlot {
                    slot,
                    track_type: TrackType::for_slot(slot),
                    notes,
                })
            })
            .collect()
    }
}

//! In-process ledger holding sessions, tracks and compositions in memory.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use relayjam_spec::config::{LedgerConfig, RelayConfig, RelayJamConfig};
use relayjam_spec::hash::{derive_composition_id, derive_track_id};
use relayjam_spec::{CompositionId, ContributorId, MusicData, SessionId, TrackId, TrackType};

use crate::aggregate::{Aggregator, Composition, CompositionMusicData};
use crate::error::LedgerError;
use crate::ledger::{Ledger, LedgerResult, TxReceipt};
use crate::session::{Session, SessionParams, SessionSnapshot, TrackRef};

#[derive(Debug, Clone)]
struct MintedTrack {
    owner: ContributorId,
    track_type: TrackType,
    music: MusicData,
    committed_to: Option<SessionId>,
}

/// Reference ledger that runs the relay state machine and the aggregator
/// in-process.
///
/// Track ids are derived from a mint counter and the wire, composition ids
/// from the session and its track ids. A simulated call latency can be set
/// to exercise timeout handling: any call whose latency exceeds
/// `call_timeout_ms` fails with [`LedgerError::Timeout`] and has no effect.
#[derive(Debug)]
pub struct MemoryLedger {
    relay: RelayConfig,
    ledger: LedgerConfig,
    sessions: BTreeMap<SessionId, Session>,
    tracks: HashMap<TrackId, MintedTrack>,
    compositions: HashMap<CompositionId, Composition>,
    aggregator: Aggregator,
    next_session: u64,
    track_sequence: u64,
    latency_ms: u64,
    fixed_time: Option<DateTime<Utc>>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new(&RelayJamConfig::default())
    }
}

impl MemoryLedger {
    pub fn new(config: &RelayJamConfig) -> Self {
        Self {
            relay: config.relay.clone(),
            ledger: config.ledger.clone(),
            sessions: BTreeMap::new(),
            tracks: HashMap::new(),
            compositions: HashMap::new(),
            aggregator: Aggregator::new(),
            next_session: 1,
            track_sequence: 0,
            latency_ms: 0,
            fixed_time: None,
        }
    }

    /// Stamps every transaction with `time` instead of the wall clock.
    pub fn with_fixed_time(mut self, time: DateTime<Utc>) -> Self {
        self.fixed_time = Some(time);
        self
    }

    /// Sets the simulated latency of every subsequent call.
    pub fn set_latency_ms(&mut self, latency_ms: u64) {
        self.latency_ms = latency_ms;
    }

    /// The session with the given id, if it exists.
    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// The composition with the given id, if it was minted.
    pub fn composition(&self, id: &CompositionId) -> Option<&Composition> {
        self.compositions.get(id)
    }

    /// Number of tracks minted so far.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_time.unwrap_or_else(Utc::now)
    }

    fn call(&self, operation: &'static str) -> LedgerResult<()> {
        let timeout = self.ledger.call_timeout_ms;
        if self.latency_ms > timeout {
            tracing::warn!(operation, timeout_ms = timeout, "ledger call timed out");
            return Err(LedgerError::Timeout {
                operation,
                after_ms: timeout,
            });
        }
        Ok(())
    }

    fn session_mut(&mut self, id: SessionId) -> LedgerResult<&mut Session> {
        self.sessions
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found(id.to_string()))
    }
}

impl Ledger for MemoryLedger {
    fn create_session(&mut self, params: SessionParams) -> LedgerResult<SessionId> {
        self.call("create_session")?;
        let id = SessionId(self.next_session);
        let session = Session::create(id, params, &self.relay, self.now())?;
        self.sessions.insert(id, session);
        self.next_session += 1;
        Ok(id)
    }

    fn join_and_commit(
        &mut self,
        caller: &ContributorId,
        session: SessionId,
        track: &TrackId,
        declared: TrackType,
    ) -> LedgerResult<TxReceipt> {
        self.call("join_and_commit")?;
        let now = self.now();

        let minted = self
            .tracks
            .get(track)
            .ok_or_else(|| LedgerError::not_found(track.to_string()))?;
        if &minted.owner != caller {
            return Err(LedgerError::rejected(format!(
                "{} is not owned by {}",
                track, caller
            )));
        }
        if let Some(other) = minted.committed_to {
            return Err(LedgerError::rejected(format!(
                "{} is already committed to {}",
                track, other
            )));
        }
        if minted.track_type != declared {
            return Err(LedgerError::rejected(format!(
                "{} was minted as a {} track, not {}",
                track, minted.track_type, declared
            )));
        }
        let track_ref = TrackRef::new(track.clone(), minted.music.encoded.clone());

        let outcome =
            self.session_mut(session)?
                .join_and_commit(caller.clone(), track_ref, declared, now)?;

        if let Some(minted) = self.tracks.get_mut(track) {
            minted.committed_to = Some(session);
        }

        Ok(TxReceipt {
            session_id: session,
            slot_index: outcome.slot_index,
            track_type: outcome.track_type,
            finalized: outcome.finalized.is_some(),
            completed_at: outcome.finalized.map(|event| event.completed_at),
        })
    }

    fn get_session_info(&self, session: SessionId) -> LedgerResult<SessionSnapshot> {
        self.call("get_session_info")?;
        self.sessions
            .get(&session)
            .map(Session::info)
            .ok_or_else(|| LedgerError::not_found(session.to_string()))
    }

    fn mint_track(
        &mut self,
        owner: &ContributorId,
        track_type: TrackType,
        music: MusicData,
    ) -> LedgerResult<TrackId> {
        self.call("mint_track")?;
        // Malformed wires are left to the aggregator, which reports the slot.
        if let Ok(tracks) = music.encoded.decode() {
            if let Some(other) = tracks.keys().find(|t| **t != track_type) {
                return Err(LedgerError::rejected(format!(
                    "a {} track cannot carry {} notes",
                    track_type, other
                )));
            }
        }
        self.track_sequence += 1;
        let id = derive_track_id(self.track_sequence, music.encoded.as_str());
        tracing::info!(track = %id, owner = %owner, "track minted");
        self.tracks.insert(
            id.clone(),
            MintedTrack {
                owner: owner.clone(),
                track_type,
                music,
                committed_to: None,
            },
        );
        Ok(id)
    }

    fn get_track_music_data(&self, track: &TrackId) -> LedgerResult<MusicData> {
        self.call("get_track_music_data")?;
        self.tracks
            .get(track)
            .map(|minted| minted.music.clone())
            .ok_or_else(|| LedgerError::not_found(track.to_string()))
    }

    fn mint_composition(&mut self, session: SessionId) -> LedgerResult<CompositionId> {
        self.call("mint_composition")?;
        let now = self.now();
        let session = self
            .sessions
            .get(&session)
            .ok_or_else(|| LedgerError::not_found(session.to_string()))?;

        let composition = self.aggregator.aggregate(session, now)?;
        let track_ids: Vec<TrackId> = composition
            .track_refs()
            .iter()
            .map(|r| r.track_id.clone())
            .collect();
        let id = derive_composition_id(composition.session_id(), &track_ids);

        tracing::info!(composition = %id, session = %composition.session_id(), "composition minted");
        self.compositions.insert(id.clone(), composition);
        Ok(id)
    }

    fn get_composition_music_data(
        &self,
        composition: &CompositionId,
    ) -> LedgerResult<CompositionMusicData> {
        self.call("get_composition_music_data")?;
        self.compositions
            .get(composition)
            .map(Composition::music_data)
            .ok_or_else(|| LedgerError::not_found(composition.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AggregateError, RelayError};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use relayjam_spec::EncodedTrack;

    fn ledger() -> MemoryLedger {
        MemoryLedger::default().with_fixed_time(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    fn music(wire: &str) -> MusicData {
        MusicData::new(120, 64, EncodedTrack::from_wire(wire))
    }

    fn alice() -> ContributorId {
        ContributorId::new("alice")
    }

    #[test]
    fn test_session_ids_are_sequential() {
        let mut ledger = ledger();
        let a = ledger.create_session(SessionParams::new("a", 120, 4)).unwrap();
        let b = ledger.create_session(SessionParams::new("b", 120, 4)).unwrap();
        assert_eq!((a, b), (SessionId(1), SessionId(2)));
    }

    #[test]
    fn test_invalid_session_params_propagate() {
        let mut ledger = ledger();
        let err = ledger
            .create_session(SessionParams::new("slow", 10, 4))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Relay(RelayError::InvalidSessionParams { field: "bpm", .. })
        ));
    }

    #[test]
    fn test_mint_and_read_track() {
        let mut ledger = ledger();
        let data = music(r#"{"drum":[[36,0,4,100,"kick"]]}"#);
        let id = ledger.mint_track(&alice(), TrackType::Drum, data.clone()).unwrap();
        assert_eq!(ledger.get_track_music_data(&id).unwrap(), data);

        let again = ledger.mint_track(&alice(), TrackType::Drum, data).unwrap();
        assert_ne!(id, again);
        assert_eq!(ledger.track_count(), 2);
    }

    #[test]
    fn test_commit_requires_owned_uncommitted_track() {
        let mut ledger = ledger();
        let session = ledger.create_session(SessionParams::new("s", 120, 4)).unwrap();
        let track = ledger
            .mint_track(&alice(), TrackType::Drum, music(r#"{"drum":[[36,0,4,100,"kick"]]}"#))
            .unwrap();

        let err = ledger
            .join_and_commit(&ContributorId::new("mallory"), session, &track, TrackType::Drum)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected { .. }));

        let receipt = ledger
            .join_and_commit(&alice(), session, &track, TrackType::Drum)
            .unwrap();
        assert_eq!(receipt.slot_index, 0);
        assert!(!receipt.finalized);

        let err = ledger
            .join_and_commit(&alice(), session, &track, TrackType::Bass)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected { .. }));
    }

    #[test]
    fn test_commit_requires_minted_track_type() {
        let mut ledger = ledger();
        let session = ledger.create_session(SessionParams::new("s", 120, 4)).unwrap();
        let vocal = ledger
            .mint_track(&alice(), TrackType::Vocal, music(r#"{"vocal":[[60,0,4,100,"ooh"]]}"#))
            .unwrap();

        let err = ledger
            .join_and_commit(&alice(), session, &vocal, TrackType::Drum)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected { .. }));

        let info = ledger.get_session_info(session).unwrap();
        assert_eq!(info.current_slot_index, 0);
        assert!(info.slots[0].track_ref.is_none());
    }

    #[test]
    fn test_mint_rejects_wire_of_another_type() {
        let mut ledger = ledger();
        let err = ledger
            .mint_track(&alice(), TrackType::Drum, music(r#"{"vocal":[[60,0,4,100,"ooh"]]}"#))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected { .. }));
        assert_eq!(ledger.track_count(), 0);

        // Empty payloads carry no notes of any type.
        ledger
            .mint_track(&alice(), TrackType::Bass, music(r#"{"bass":[]}"#))
            .unwrap();
        assert_eq!(ledger.track_count(), 1);
    }

    #[test]
    fn test_unknown_records_are_not_found() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.get_session_info(SessionId(42)),
            Err(LedgerError::NotFound { .. })
        ));
        assert!(matches!(
            ledger.get_track_music_data(&TrackId("track-x".to_string())),
            Err(LedgerError::NotFound { .. })
        ));
        assert!(matches!(
            ledger.mint_composition(SessionId(42)),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_full_session_mints_composition_once() {
        let mut ledger = ledger();
        let session = ledger.create_session(SessionParams::new("s", 100, 2)).unwrap();
        let wires = [
            r#"{"drum":[[36,0,4,100,"kick"]]}"#,
            r#"{"bass":[[40,4,8,90,"sine"]]}"#,
        ];
        let mut last = None;
        for (i, wire) in wires.iter().enumerate() {
            let track = ledger.mint_track(&alice(), TrackType::for_slot(i), music(wire)).unwrap();
            last = Some(
                ledger
                    .join_and_commit(&alice(), session, &track, TrackType::for_slot(i))
                    .unwrap(),
            );
        }
        let receipt = last.unwrap();
        assert!(receipt.finalized);
        assert!(receipt.completed_at.is_some());

        let composition = ledger.mint_composition(session).unwrap();
        let data = ledger.get_composition_music_data(&composition).unwrap();
        assert_eq!(data.bpm, 100);
        assert_eq!(data.total_sixteenth_notes, 12);
        assert_eq!(data.encoded_tracks.len(), 2);

        assert_eq!(
            ledger.mint_composition(session),
            Err(LedgerError::Aggregate(AggregateError::AlreadyAggregated {
                session
            }))
        );
    }

    #[test]
    fn test_latency_beyond_timeout_fails_without_effect() {
        let mut config = RelayJamConfig::default();
        config.ledger.call_timeout_ms = 100;
        let mut ledger = MemoryLedger::new(&config);

        ledger.set_latency_ms(250);
        assert_eq!(
            ledger.create_session(SessionParams::new("s", 120, 4)),
            Err(LedgerError::Timeout {
                operation: "create_session",
                after_ms: 100,
            })
        );
        assert!(ledger.session(SessionId(1)).is_none());

        ledger.set_latency_ms(50);
        assert_eq!(
            ledger.create_session(SessionParams::new("s", 120, 4)),
            Ok(SessionId(1))
        );
    }
}

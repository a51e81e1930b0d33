//! Contributor-side orchestration of a relay turn.
//!
//! ```text
//! notes -> check_horizon -> encode -> mint_track -> join_and_commit
//!                                                      |
//!                                      finalized? -> mint_composition
//! ```

use relayjam_spec::{
    check_horizon, CompositionId, ContributorId, EncodedTrack, MusicData, NoteEvent, SessionId,
    TrackId, TrackType, TracksByType,
};

use crate::aggregate::CompositionMusicData;
use crate::error::{ClientError, RelayError};
use crate::ledger::Ledger;
use crate::session::{SessionParams, SessionSnapshot};

/// What a successful contribution produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub session_id: SessionId,
    pub track_id: TrackId,
    pub slot_index: usize,
    /// Set when this contribution finalized the session.
    pub composition: Option<CompositionId>,
}

/// Acts on the ledger on behalf of one contributor.
#[derive(Debug)]
pub struct RelayClient<L> {
    ledger: L,
    contributor: ContributorId,
}

impl<L: Ledger> RelayClient<L> {
    pub fn new(ledger: L, contributor: ContributorId) -> Self {
        Self {
            ledger,
            contributor,
        }
    }

    pub fn contributor(&self) -> &ContributorId {
        &self.contributor
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }

    /// Acts as a different contributor from now on.
    pub fn switch_contributor(&mut self, contributor: ContributorId) {
        self.contributor = contributor;
    }

    pub fn create_session(&mut self, params: SessionParams) -> Result<SessionId, ClientError> {
        Ok(self.ledger.create_session(params)?)
    }

    pub fn session_info(&self, session: SessionId) -> Result<SessionSnapshot, ClientError> {
        Ok(self.ledger.get_session_info(session)?)
    }

    /// Contributes `notes` as the `declared` track of `session`.
    ///
    /// Everything that can be checked locally (open session, slot type,
    /// horizon, encodability) is checked before anything is minted. If the
    /// commit finalizes the session, the composition is minted as well.
    pub fn contribute(
        &mut self,
        session: SessionId,
        declared: TrackType,
        notes: Vec<NoteEvent>,
    ) -> Result<Contribution, ClientError> {
        let info = self.ledger.get_session_info(session)?;
        let expected = info
            .current_slot_type
            .ok_or(RelayError::SessionFinalized { session })?;
        if expected != declared {
            return Err(RelayError::TrackTypeMismatch {
                slot: info.current_slot_index,
                expected,
                declared,
            }
            .into());
        }

        let mut tracks = TracksByType::new();
        tracks.insert(declared, notes);
        check_horizon(&tracks, info.horizon)?;
        let encoded = EncodedTrack::encode(&tracks)?;

        let music = MusicData::new(info.bpm, info.horizon, encoded);
        let track_id = self.ledger.mint_track(&self.contributor, declared, music)?;
        let receipt = self
            .ledger
            .join_and_commit(&self.contributor, session, &track_id, declared)?;

        tracing::debug!(
            session = %session,
            slot = receipt.slot_index,
            contributor = %self.contributor,
            "contribution committed"
        );

        let composition = if receipt.finalized {
            Some(self.ledger.mint_composition(session)?)
        } else {
            None
        };

        Ok(Contribution {
            session_id: session,
            track_id,
            slot_index: receipt.slot_index,
            composition,
        })
    }

    pub fn composition_music_data(
        &self,
        composition: &CompositionId,
    ) -> Result<CompositionMusicData, ClientError> {
        Ok(self.ledger.get_composition_music_data(composition)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::memory_ledger::MemoryLedger;
    use pretty_assertions::assert_eq;
    use relayjam_spec::CodecError;

    fn client() -> RelayClient<MemoryLedger> {
        RelayClient::new(MemoryLedger::default(), ContributorId::new("alice"))
    }

    fn note(pitch: u8, start: u32, duration: u32) -> NoteEvent {
        NoteEvent::from_midi(pitch, start, duration, 100, "sine")
    }

    #[test]
    fn test_contribute_commits_and_finalizes() {
        let mut client = client();
        let session = client
            .create_session(SessionParams::new("duo", 120, 2))
            .unwrap();

        let first = client
            .contribute(session, TrackType::Drum, vec![note(36, 0, 4)])
            .unwrap();
        assert_eq!(first.slot_index, 0);
        assert_eq!(first.composition, None);

        client.switch_contributor(ContributorId::new("bob"));
        let second = client
            .contribute(session, TrackType::Bass, vec![note(40, 4, 4)])
            .unwrap();
        let composition = second.composition.expect("last slot mints the composition");

        let data = client.composition_music_data(&composition).unwrap();
        assert_eq!(data.total_sixteenth_notes, 8);
        assert_eq!(
            client
                .ledger()
                .composition(&composition)
                .unwrap()
                .contributors(),
            &[ContributorId::new("alice"), ContributorId::new("bob")]
        );
    }

    #[test]
    fn test_wrong_type_mints_nothing() {
        let mut client = client();
        let session = client
            .create_session(SessionParams::new("s", 120, 4))
            .unwrap();
        let err = client
            .contribute(session, TrackType::Synth, vec![note(60, 0, 4)])
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Relay(RelayError::TrackTypeMismatch {
                slot: 0,
                expected: TrackType::Drum,
                declared: TrackType::Synth,
            })
        );
        assert_eq!(client.ledger().track_count(), 0);
    }

    #[test]
    fn test_notes_past_horizon_are_rejected_locally() {
        let mut client = client();
        let session = client
            .create_session(SessionParams::new("s", 120, 4))
            .unwrap();
        let err = client
            .contribute(session, TrackType::Drum, vec![note(36, 62, 4)])
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Codec(CodecError::BeyondHorizon { end: 66, .. })
        ));
        assert_eq!(client.ledger().track_count(), 0);
    }

    #[test]
    fn test_finalized_session_refuses_contributions() {
        let mut client = client();
        let session = client
            .create_session(SessionParams::new("solo", 120, 1))
            .unwrap();
        client
            .contribute(session, TrackType::Drum, vec![note(36, 0, 4)])
            .unwrap();
        assert_eq!(
            client.contribute(session, TrackType::Bass, vec![note(40, 0, 4)]),
            Err(ClientError::Relay(RelayError::SessionFinalized { session }))
        );
    }

    #[test]
    fn test_ledger_errors_propagate() {
        let mut config = relayjam_spec::RelayJamConfig::default();
        config.ledger.call_timeout_ms = 10;
        let mut client = RelayClient::new(MemoryLedger::new(&config), ContributorId::new("a"));
        client.ledger_mut().set_latency_ms(20);
        assert!(matches!(
            client.create_session(SessionParams::new("s", 120, 4)),
            Err(ClientError::Ledger(LedgerError::Timeout { .. }))
        ));
    }
}

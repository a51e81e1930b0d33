//! Local record storage and a read-through cache over any [`Ledger`].
//!
//! Only minted records are cached: a minted track's music data and a minted
//! composition's music data never change once written. Session info is
//! always read from the ledger. Ledger errors are returned as-is and never
//! answered from the cache.

use std::collections::HashMap;

use relayjam_spec::{CompositionId, ContributorId, MusicData, SessionId, TrackId, TrackType};

use crate::aggregate::CompositionMusicData;
use crate::ledger::{Ledger, LedgerResult, TxReceipt};
use crate::session::{SessionParams, SessionSnapshot};

/// Key of a cached record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Track(TrackId),
    Composition(CompositionId),
}

/// A cached ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Track(MusicData),
    Composition(CompositionMusicData),
}

/// Key-value storage for immutable ledger records.
pub trait RecordRepository {
    fn put(&mut self, key: RecordKey, record: Record);

    fn get(&self, key: &RecordKey) -> Option<Record>;
}

/// In-memory [`RecordRepository`].
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: HashMap<RecordKey, Record>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordRepository for MemoryRepository {
    fn put(&mut self, key: RecordKey, record: Record) {
        self.records.insert(key, record);
    }

    fn get(&self, key: &RecordKey) -> Option<Record> {
        self.records.get(key).cloned()
    }
}

/// A [`Ledger`] that answers minted-record reads from a repository first.
#[derive(Debug)]
pub struct CachedLedger<L, R> {
    inner: L,
    repository: R,
}

impl<L: Ledger, R: RecordRepository> CachedLedger<L, R> {
    pub fn new(inner: L, repository: R) -> Self {
        Self { inner, repository }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut L {
        &mut self.inner
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_parts(self) -> (L, R) {
        (self.inner, self.repository)
    }

    /// Reads a track, filling the cache on a miss.
    pub fn track_music_data(&mut self, track: &TrackId) -> LedgerResult<MusicData> {
        let key = RecordKey::Track(track.clone());
        if let Some(Record::Track(music)) = self.repository.get(&key) {
            tracing::debug!(track = %track, "track cache hit");
            return Ok(music);
        }
        let music = self.inner.get_track_music_data(track)?;
        self.repository.put(key, Record::Track(music.clone()));
        Ok(music)
    }

    /// Reads a composition, filling the cache on a miss.
    pub fn composition_music_data(
        &mut self,
        composition: &CompositionId,
    ) -> LedgerResult<CompositionMusicData> {
        let key = RecordKey::Composition(composition.clone());
        if let Some(Record::Composition(data)) = self.repository.get(&key) {
            tracing::debug!(composition = %composition, "composition cache hit");
            return Ok(data);
        }
        let data = self.inner.get_composition_music_data(composition)?;
        self.repository.put(key, Record::Composition(data.clone()));
        Ok(data)
    }
}

impl<L: Ledger, R: RecordRepository> Ledger for CachedLedger<L, R> {
    fn create_session(&mut self, params: SessionParams) -> LedgerResult<SessionId> {
        self.inner.create_session(params)
    }

    fn join_and_commit(
        &mut self,
        caller: &ContributorId,
        session: SessionId,
        track: &TrackId,
        declared: TrackType,
    ) -> LedgerResult<TxReceipt> {
        self.inner.join_and_commit(caller, session, track, declared)
    }

    fn get_session_info(&self, session: SessionId) -> LedgerResult<SessionSnapshot> {
        self.inner.get_session_info(session)
    }

    /// Minting also seeds the cache.
    fn mint_track(
        &mut self,
        owner: &ContributorId,
        track_type: TrackType,
        music: MusicData,
    ) -> LedgerResult<TrackId> {
        let id = self.inner.mint_track(owner, track_type, music.clone())?;
        self.repository
            .put(RecordKey::Track(id.clone()), Record::Track(music));
        Ok(id)
    }

    fn get_track_music_data(&self, track: &TrackId) -> LedgerResult<MusicData> {
        match self.repository.get(&RecordKey::Track(track.clone())) {
            Some(Record::Track(music)) => Ok(music),
            _ => self.inner.get_track_music_data(track),
        }
    }

    fn mint_composition(&mut self, session: SessionId) -> LedgerResult<CompositionId> {
        self.inner.mint_composition(session)
    }

    fn get_composition_music_data(
        &self,
        composition: &CompositionId,
    ) -> LedgerResult<CompositionMusicData> {
        match self
            .repository
            .get(&RecordKey::Composition(composition.clone()))
        {
            Some(Record::Composition(data)) => Ok(data),
            _ => self.inner.get_composition_music_data(composition),
        }
    }
}

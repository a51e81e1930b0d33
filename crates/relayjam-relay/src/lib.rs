//! RelayJam Relay - Ordered multi-contributor sessions and compositions
//!
//! This crate implements the relay protocol: a session has a fixed number of
//! slots whose track types follow the relay order, each contributor commits
//! one encoded track to the next open slot, and the commit that fills the
//! last slot finalizes the session. A finalized session is aggregated into a
//! single immutable [`Composition`].
//!
//! # Example
//!
//! ```
//! use relayjam_relay::{Ledger, MemoryLedger, RelayClient, SessionParams};
//! use relayjam_spec::{ContributorId, NoteEvent, TrackType};
//!
//! let mut client = RelayClient::new(MemoryLedger::default(), ContributorId::new("alice"));
//! let session = client.create_session(SessionParams::new("demo", 120, 1)).unwrap();
//!
//! let kick = NoteEvent::from_midi(36, 0, 4, 100, "kick");
//! let contribution = client.contribute(session, TrackType::Drum, vec![kick]).unwrap();
//!
//! let composition = contribution.composition.unwrap();
//! let data = client.ledger().get_composition_music_data(&composition).unwrap();
//! assert_eq!(data.total_sixteenth_notes, 4);
//! ```
//!
//! # Module Structure
//!
//! - [`session`]: The relay state machine
//! - [`aggregate`]: Composition building
//! - [`ledger`]: The ledger boundary trait
//! - [`memory_ledger`]: In-process ledger
//! - [`repository`]: Record repository and read-through cache
//! - [`client`]: Contributor-side orchestration
//! - [`error`]: Error types

pub mod aggregate;
pub mod client;
pub mod error;
pub mod ledger;
pub mod memory_ledger;
pub mod repository;
pub mod session;

pub use aggregate::{Aggregator, Composition, CompositionMusicData, DecodedSlot};
pub use client::{Contribution, RelayClient};
pub use error::{AggregateError, ClientError, LedgerError, RelayError, RelayResult};
pub use ledger::{Ledger, LedgerResult, TxReceipt};
pub use memory_ledger::MemoryLedger;
pub use repository::{CachedLedger, MemoryRepository, Record, RecordKey, RecordRepository};
pub use session::{
    CommitOutcome, FinalizationEvent, RelayState, Session, SessionParams, SessionSnapshot, Slot,
    TrackRef,
};

//! Shared setup for the end-to-end tests.

use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use relayjam_relay::{Contribution, Ledger, MemoryLedger, RelayClient, SessionParams};
use relayjam_spec::config::RelayJamConfig;
use relayjam_spec::{CompositionId, ContributorId, NoteEvent, SessionId, TrackType};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
///
/// Filtering follows `RUST_LOG`; nothing is printed by default.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Fixed timestamp for ledger transactions.
pub fn test_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// Outcome of a full relay run.
pub struct RelayRun {
    pub client: RelayClient<MemoryLedger>,
    pub session: SessionId,
    pub contributions: Vec<Contribution>,
}

impl RelayRun {
    /// Composition minted by the last contribution.
    pub fn composition(&self) -> Option<&CompositionId> {
        self.contributions.last()?.composition.as_ref()
    }
}

/// Runs one relay: each entry of `parts` is committed by its own
/// contributor, in order, as the track type of its slot.
pub fn run_relay(config: &RelayJamConfig, bpm: u16, parts: Vec<Vec<NoteEvent>>) -> RelayRun {
    init_tracing();
    let ledger = MemoryLedger::new(config).with_fixed_time(test_time());
    let mut client = RelayClient::new(ledger, ContributorId::new("contributor-0"));
    let session = client
        .create_session(SessionParams::new("e2e", bpm, parts.len()).genre("test"))
        .expect("Failed to create session");

    let mut contributions = Vec::new();
    for (i, notes) in parts.into_iter().enumerate() {
        client.switch_contributor(ContributorId::new(format!("contributor-{}", i)));
        let declared = TrackType::for_slot(i);
        let contribution = client
            .contribute(session, declared, notes)
            .unwrap_or_else(|e| panic!("contribution {} failed: {}", i, e));
        contributions.push(contribution);
    }

    assert!(client.ledger().get_session_info(session).is_ok());
    RelayRun {
        client,
        session,
        contributions,
    }
}

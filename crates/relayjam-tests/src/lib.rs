//! RelayJam End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the flows that cross crate
//! boundaries:
//!
//! - Relay: notes -> encoded tracks -> session commits -> composition
//! - Codec: property-based round-trip and range rejection
//! - Playback: composition -> score -> timed activations
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p relayjam-tests
//!
//! # With scheduler and ledger logs
//! RUST_LOG=debug cargo test -p relayjam-tests -- --nocapture
//! ```

pub mod fixtures;
pub mod harness;

// Re-export commonly used items
pub use fixtures::{bass_line, config_file, drum_beat, kick, synth_lead, vocal_hook, ConfigFixture};
pub use harness::{init_tracing, run_relay, test_time, RelayRun};

//! Runtime configuration for the relay, playback and ledger layers.
//!
//! Every section is `serde(default)`, so a config file only needs to name
//! the values it overrides:
//!
//! ```
//! use relayjam_spec::config::RelayJamConfig;
//!
//! let config = RelayJamConfig::from_json(r#"{"playback":{"lookahead_ticks":2}}"#).unwrap();
//! assert_eq!(config.playback.lookahead_ticks, 2);
//! assert_eq!(config.relay.horizon, 64);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::event::{SIXTEENTHS_PER_BEAT, TOTAL_SIXTEENTH_NOTES};
use crate::instrument::Timbre;

/// Relay session limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Composition horizon in sixteenth notes.
    pub horizon: u32,
    /// Largest `max_tracks` a session may be created with.
    pub max_tracks_limit: usize,
    /// Lowest accepted session tempo.
    pub min_bpm: u16,
    /// Highest accepted session tempo.
    pub max_bpm: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            horizon: TOTAL_SIXTEENTH_NOTES,
            max_tracks_limit: Self::DEFAULT_MAX_TRACKS_LIMIT,
            min_bpm: Self::DEFAULT_MIN_BPM,
            max_bpm: Self::DEFAULT_MAX_BPM,
        }
    }
}

impl RelayConfig {
    pub const DEFAULT_MAX_TRACKS_LIMIT: usize = 16;
    pub const DEFAULT_MIN_BPM: u16 = 30;
    pub const DEFAULT_MAX_BPM: u16 = 300;
}

/// Playback scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Scheduler ticks per beat. Note times are sixteenths, so this must
    /// stay at [`SIXTEENTHS_PER_BEAT`].
    pub ticks_per_beat: u32,
    /// Interval between polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// How far past the current tick notes are dispatched early.
    pub lookahead_ticks: u32,
    /// Timbre used for instrument ids the playback layer does not know.
    pub fallback_timbre: Timbre,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            ticks_per_beat: SIXTEENTHS_PER_BEAT,
            poll_interval_ms: Self::DEFAULT_POLL_INTERVAL_MS,
            lookahead_ticks: 0,
            fallback_timbre: Timbre::default(),
        }
    }
}

impl PlaybackConfig {
    /// Roughly one frame at 60 Hz.
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;
}

/// Ledger client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Upper bound for a single ledger call.
    pub call_timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: Self::DEFAULT_CALL_TIMEOUT_MS,
        }
    }
}

impl LedgerConfig {
    pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayJamConfig {
    pub relay: RelayConfig,
    pub playback: PlaybackConfig,
    pub ledger: LedgerConfig,
}

impl RelayJamConfig {
    /// Parses and validates a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        let config: RelayJamConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the config to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), SpecError> {
        let relay = &self.relay;
        if relay.horizon == 0 {
            return Err(invalid("relay.horizon", "must be positive"));
        }
        if relay.max_tracks_limit == 0 {
            return Err(invalid("relay.max_tracks_limit", "must be positive"));
        }
        if relay.min_bpm == 0 {
            return Err(invalid("relay.min_bpm", "must be positive"));
        }
        if relay.min_bpm > relay.max_bpm {
            return Err(invalid(
                "relay.min_bpm",
                format!(
                    "{} is greater than relay.max_bpm ({})",
                    relay.min_bpm, relay.max_bpm
                ),
            ));
        }
        if self.playback.ticks_per_beat != SIXTEENTHS_PER_BEAT {
            return Err(invalid(
                "playback.ticks_per_beat",
                format!(
                    "must be {} (one tick per sixteenth note), got {}",
                    SIXTEENTHS_PER_BEAT, self.playback.ticks_per_beat
                ),
            ));
        }
        if self.playback.poll_interval_ms == 0 {
            return Err(invalid("playback.poll_interval_ms", "must be positive"));
        }
        if self.ledger.call_timeout_ms == 0 {
            return Err(invalid("ledger.call_timeout_ms", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SpecError {
    SpecError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::{DrumKind, Waveform};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RelayJamConfig::default();
        assert_eq!(config.relay.horizon, 64);
        assert_eq!(config.relay.min_bpm, 30);
        assert_eq!(config.relay.max_bpm, 300);
        assert_eq!(config.playback.ticks_per_beat, 4);
        assert_eq!(config.playback.lookahead_ticks, 0);
        assert_eq!(
            config.playback.fallback_timbre,
            Timbre::Oscillator(Waveform::Sine)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RelayJamConfig::from_json(
            r#"{"relay":{"max_bpm":180},"playback":{"fallback_timbre":"kick"}}"#,
        )
        .unwrap();
        assert_eq!(config.relay.max_bpm, 180);
        assert_eq!(config.relay.min_bpm, 30);
        assert_eq!(config.playback.fallback_timbre, Timbre::Drum(DrumKind::Kick));
        assert_eq!(config.ledger, LedgerConfig::default());
    }

    #[test]
    fn test_unknown_fallback_timbre_rejected() {
        let err = RelayJamConfig::from_json(r#"{"playback":{"fallback_timbre":"kazoo"}}"#)
            .unwrap_err();
        assert!(matches!(err, SpecError::JsonParse(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RelayJamConfig::default();
        config.relay.min_bpm = 200;
        config.relay.max_bpm = 100;
        match config.validate() {
            Err(SpecError::InvalidConfig { field, .. }) => assert_eq!(field, "relay.min_bpm"),
            other => panic!("unexpected result: {:?}", other),
        }

        for json in [
            r#"{"playback":{"ticks_per_beat":0}}"#,
            r#"{"playback":{"ticks_per_beat":8}}"#,
        ] {
            match RelayJamConfig::from_json(json).unwrap_err() {
                SpecError::InvalidConfig { field, .. } => {
                    assert_eq!(field, "playback.ticks_per_beat")
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ledger":{{"call_timeout_ms":500}}}}"#).unwrap();

        let config = RelayJamConfig::from_file(file.path()).unwrap();
        assert_eq!(config.ledger.call_timeout_ms, 500);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RelayJamConfig::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SpecError::Io(_)));
    }

    #[test]
    fn test_pretty_json_roundtrip() {
        let mut config = RelayJamConfig::default();
        config.playback.lookahead_ticks = 3;
        let json = config.to_json_pretty().unwrap();
        assert_eq!(RelayJamConfig::from_json(&json).unwrap(), config);
    }
}

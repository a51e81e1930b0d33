//! Transport state owned by one scheduler.

use std::collections::HashSet;

use serde::Serialize;

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Token identifying one scheduled poll. Polls carrying a cancelled token
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollHandle(u64);

/// Position, play state and bookkeeping for a single playback.
#[derive(Debug, Default)]
pub struct Transport {
    /// Position in ticks; fractional between ticks.
    pub(crate) position_ticks: f64,
    pub(crate) state: PlaybackState,
    /// Tick at which playback wraps up.
    pub(crate) loop_horizon: u32,
    /// Lower bound of the next activation window.
    pub(crate) last_checked: f64,
    /// Ids of notes already activated.
    pub(crate) played: HashSet<usize>,
    pending: HashSet<PollHandle>,
    next_handle: u64,
}

impl Transport {
    pub fn new(loop_horizon: u32) -> Self {
        Self {
            loop_horizon,
            ..Self::default()
        }
    }

    pub fn position_ticks(&self) -> f64 {
        self.position_ticks
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn loop_horizon(&self) -> u32 {
        self.loop_horizon
    }

    /// Number of live poll handles.
    pub fn pending_polls(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn issue_handle(&mut self) -> PollHandle {
        self.next_handle += 1;
        let handle = PollHandle(self.next_handle);
        self.pending.insert(handle);
        handle
    }

    pub(crate) fn is_live(&self, handle: PollHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// The live handle, if any.
    pub(crate) fn live_handle(&self) -> Option<PollHandle> {
        self.pending.iter().next().copied()
    }

    pub(crate) fn cancel_polls(&mut self) {
        self.pending.clear();
    }

    /// Back to tick 0, stopped, nothing played, no live polls.
    pub(crate) fn reset(&mut self) {
        self.cancel_polls();
        self.played.clear();
        self.position_ticks = 0.0;
        self.last_checked = 0.0;
        self.state = PlaybackState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique_and_cancellable() {
        let mut transport = Transport::new(64);
        let a = transport.issue_handle();
        transport.cancel_polls();
        let b = transport.issue_handle();
        assert_ne!(a, b);
        assert!(!transport.is_live(a));
        assert!(transport.is_live(b));
        assert_eq!(transport.pending_polls(), 1);
    }

    #[test]
    fn test_reset() {
        let mut transport = Transport::new(64);
        transport.issue_handle();
        transport.position_ticks = 12.5;
        transport.last_checked = 12.0;
        transport.played.insert(3);
        transport.state = PlaybackState::Paused;

        transport.reset();
        assert_eq!(transport.position_ticks(), 0.0);
        assert_eq!(transport.state(), PlaybackState::Stopped);
        assert!(transport.played.is_empty());
        assert_eq!(transport.pending_polls(), 0);
        assert_eq!(transport.loop_horizon(), 64);
    }
}

//! Cooperative playback scheduler.
//!
//! The host calls [`Scheduler::poll`] every `poll_interval` with the handle
//! returned by [`Scheduler::play`]. Each poll derives the current tick from
//! the clock and activates every note whose start falls in the window
//! scanned since the previous poll:
//!
//! ```text
//! last_checked <= start_tick < current_tick + lookahead_ticks
//! ```
//!
//! A note is activated at most once per pass; the played set is only cleared
//! by stop, completion or a backward seek past the note.

use std::time::Duration;

use relayjam_spec::config::PlaybackConfig;
use relayjam_spec::SIXTEENTHS_PER_BEAT;

use crate::clock::Clock;
use crate::error::PlaybackError;
use crate::score::PlaybackScore;
use crate::sink::{NoteActivation, SoundSink};
use crate::transport::{PlaybackState, PollHandle, Transport};

/// What a poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The handle was cancelled or the transport is not playing.
    Ignored,
    /// Playback continues; `fired` notes were activated.
    Continue { fired: usize },
    /// The horizon was reached; the transport is back at tick 0, stopped.
    Completed { fired: usize },
}

/// Turns a [`PlaybackScore`] into timed activations on a [`SoundSink`].
#[derive(Debug)]
pub struct Scheduler<C> {
    score: PlaybackScore,
    bpm: u16,
    config: PlaybackConfig,
    clock: C,
    transport: Transport,
    /// Clock time and tick at which playback was last (re)anchored.
    reference: (Duration, f64),
}

impl<C: Clock> Scheduler<C> {
    /// Creates a stopped scheduler at tick 0.
    pub fn new(
        score: PlaybackScore,
        bpm: u16,
        config: PlaybackConfig,
        clock: C,
    ) -> Result<Self, PlaybackError> {
        if bpm == 0 {
            return Err(PlaybackError::InvalidTempo { bpm });
        }
        if config.ticks_per_beat != SIXTEENTHS_PER_BEAT {
            return Err(PlaybackError::InvalidConfig {
                field: "ticks_per_beat",
                reason: format!(
                    "must be {} (one tick per sixteenth note), got {}",
                    SIXTEENTHS_PER_BEAT, config.ticks_per_beat
                ),
            });
        }
        let transport = Transport::new(score.horizon());
        Ok(Self {
            score,
            bpm,
            config,
            clock,
            transport,
            reference: (Duration::ZERO, 0.0),
        })
    }

    /// Seconds per tick: `(60 / bpm) / ticks_per_beat`.
    pub fn tick_duration(&self) -> f64 {
        60.0 / self.bpm as f64 / self.config.ticks_per_beat as f64
    }

    /// How often the host should poll.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    pub fn score(&self) -> &PlaybackScore {
        &self.score
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn state(&self) -> PlaybackState {
        self.transport.state()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Current position in ticks, following the clock while playing.
    pub fn position(&self) -> f64 {
        if self.transport.is_playing() {
            self.current_tick()
        } else {
            self.transport.position_ticks
        }
    }

    /// Stops, rewinds to tick 0 and starts playing.
    pub fn start(&mut self, sink: &mut dyn SoundSink) -> PollHandle {
        self.stop(sink);
        self.play()
    }

    /// Starts or resumes playback from the current position.
    ///
    /// Notes starting before the current position are not played. Returns
    /// the handle to pass to [`Scheduler::poll`]; if already playing, the
    /// live handle is returned unchanged.
    pub fn play(&mut self) -> PollHandle {
        if self.transport.is_playing() {
            if let Some(handle) = self.transport.live_handle() {
                return handle;
            }
        }
        let position = self.transport.position_ticks;
        self.reference = (self.clock.now(), position);
        self.transport.last_checked = position;
        self.transport.state = PlaybackState::Playing;
        tracing::debug!(position, bpm = self.bpm, "playback started");
        self.transport.issue_handle()
    }

    /// Freezes the position and cancels the pending poll.
    pub fn pause(&mut self) {
        if !self.transport.is_playing() {
            return;
        }
        self.transport.position_ticks = self.current_tick();
        self.transport.state = PlaybackState::Paused;
        self.transport.cancel_polls();
        tracing::debug!(position = self.transport.position_ticks, "playback paused");
    }

    /// Cancels every poll, forgets played notes, rewinds to tick 0 and
    /// silences the sink. Safe in any state.
    pub fn stop(&mut self, sink: &mut dyn SoundSink) {
        self.transport.reset();
        sink.stop_all();
        tracing::debug!("playback stopped");
    }

    /// Moves to `tick` without changing play or pause.
    ///
    /// Notes at or after `tick` become playable again; notes between the old
    /// and new position are skipped on a forward seek. Ticks past either end
    /// are clamped; NaN and infinities are rejected and leave the transport
    /// untouched.
    pub fn seek(&mut self, tick: f64) -> Result<(), PlaybackError> {
        if !tick.is_finite() {
            return Err(PlaybackError::InvalidPosition { tick });
        }
        let tick = tick.clamp(0.0, self.transport.loop_horizon as f64);
        let notes = self.score.notes();
        self.transport
            .played
            .retain(|id| (notes[*id].start_tick as f64) < tick);
        self.transport.position_ticks = tick;
        self.transport.last_checked = tick;
        if self.transport.is_playing() {
            self.reference = (self.clock.now(), tick);
        }
        tracing::debug!(tick, "seek");
        Ok(())
    }

    /// Activates every note that became due since the last poll.
    pub fn poll(&mut self, handle: PollHandle, sink: &mut dyn SoundSink) -> PollOutcome {
        if !self.transport.is_playing() || !self.transport.is_live(handle) {
            return PollOutcome::Ignored;
        }

        let horizon = self.transport.loop_horizon as f64;
        let current = self.current_tick();
        let completed = current >= horizon;
        let window_end = if completed {
            horizon
        } else {
            (current + self.config.lookahead_ticks as f64).min(horizon)
        };

        let fired = self.activate_window(current, window_end, sink);

        if completed {
            tracing::debug!(fired, "playback reached the horizon");
            self.transport.reset();
            return PollOutcome::Completed { fired };
        }

        self.transport.position_ticks = current;
        self.transport.last_checked = current;
        PollOutcome::Continue { fired }
    }

    fn activate_window(&mut self, current: f64, window_end: f64, sink: &mut dyn SoundSink) -> usize {
        let tick_duration = self.tick_duration();
        let from = self.transport.last_checked;
        let mut fired = 0;

        for note in self.score.notes() {
            let start = note.start_tick as f64;
            if start < from {
                continue;
            }
            if start >= window_end {
                break;
            }
            if !self.transport.played.insert(note.id) {
                continue;
            }
            let activation = NoteActivation {
                frequency_hz: note.frequency_hz,
                duration_seconds: note.duration_ticks as f64 * tick_duration,
                velocity: note.velocity,
                timbre: note.timbre,
                delay_seconds: ((start - current) * tick_duration).max(0.0),
            };
            tracing::debug!(
                note = note.id,
                start_tick = note.start_tick,
                track_type = %note.track_type,
                "note activated"
            );
            sink.activate_note(&activation);
            fired += 1;
        }
        fired
    }

    fn current_tick(&self) -> f64 {
        let (anchor_time, anchor_tick) = self.reference;
        let elapsed = self.clock.now().saturating_sub(anchor_time).as_secs_f64();
        anchor_tick + elapsed / self.tick_duration()
    }
}

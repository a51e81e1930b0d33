//! RelayJam Playback - Timed note activations from compositions
//!
//! This crate turns decoded notes into precisely timed activations for an
//! external sound capability. It never synthesizes audio itself: a
//! [`SoundSink`] receives one [`NoteActivation`] per note.
//!
//! Scheduling is single-threaded and cooperative. The host drives a
//! [`Scheduler`] by polling it at a fixed interval; time comes from an
//! injected [`Clock`], so tests run on a [`ManualClock`].
//!
//! # Example
//!
//! ```
//! use relayjam_playback::{ManualClock, PlaybackScore, RecordingSink, Scheduler};
//! use relayjam_spec::config::PlaybackConfig;
//! use relayjam_spec::{NoteEvent, Timbre, TrackType};
//!
//! let kick = [NoteEvent::from_midi(36, 0, 4, 100, "kick")];
//! let score = PlaybackScore::from_tracks([(TrackType::Drum, &kick[..])], 64, Timbre::default());
//!
//! let mut scheduler = Scheduler::new(score, 120, PlaybackConfig::default(), ManualClock::new()).unwrap();
//! let mut sink = RecordingSink::new();
//! let handle = scheduler.play();
//!
//! scheduler.clock().advance_secs(0.05);
//! scheduler.poll(handle, &mut sink);
//! assert_eq!(sink.activations.len(), 1);
//! ```

pub mod clock;
pub mod error;
pub mod scheduler;
pub mod score;
pub mod sink;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::PlaybackError;
pub use scheduler::{PollOutcome, Scheduler};
pub use score::{PlaybackScore, ScheduledNote};
pub use sink::{NoteActivation, RecordingSink, SoundSink};
pub use transport::{PlaybackState, PollHandle, Transport};

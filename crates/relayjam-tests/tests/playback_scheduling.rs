//! Playback of relayed compositions.
//!
//! Builds compositions through the relay, turns them into scores and drives
//! the scheduler with a manual clock, checking what reaches the sink and
//! when.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p relayjam-tests --test playback_scheduling
//! ```

use pretty_assertions::assert_eq;
use serde_json::json;

use relayjam_playback::{
    ManualClock, PlaybackScore, PlaybackState, PollOutcome, RecordingSink, Scheduler,
};
use relayjam_relay::CompositionMusicData;
use relayjam_spec::config::RelayJamConfig;
use relayjam_spec::{midi_to_freq, NoteEvent, Timbre, Waveform};
use relayjam_tests::{config_file, run_relay};

const TICK: f64 = 0.125;

fn relayed(config: &RelayJamConfig, parts: Vec<Vec<NoteEvent>>) -> CompositionMusicData {
    let run = run_relay(config, 120, parts);
    let composition = run.composition().expect("relay should mint a composition");
    run.client.composition_music_data(composition).unwrap()
}

/// Kick at 0 and 8, bass and lead both at 4.
fn four_note_composition(config: &RelayJamConfig) -> CompositionMusicData {
    relayed(
        config,
        vec![
            vec![
                NoteEvent::from_midi(36, 0, 4, 100, "kick"),
                NoteEvent::from_midi(38, 8, 4, 100, "snare"),
            ],
            vec![NoteEvent::from_midi(40, 4, 4, 90, "sawtooth")],
            vec![NoteEvent::from_midi(72, 4, 4, 80, "square")],
        ],
    )
}

fn scheduler(
    data: &CompositionMusicData,
    config: &RelayJamConfig,
) -> Scheduler<ManualClock> {
    let score = PlaybackScore::from_composition(data, config.playback.fallback_timbre).unwrap();
    Scheduler::new(score, data.bpm, config.playback.clone(), ManualClock::new()).unwrap()
}

#[test]
fn composition_plays_in_start_order_then_completes() {
    let config = RelayJamConfig::default();
    let data = four_note_composition(&config);
    assert_eq!(data.total_sixteenth_notes, 12);

    let mut scheduler = scheduler(&data, &config);
    let mut sink = RecordingSink::new();
    let handle = scheduler.play();

    let starts: Vec<u32> = scheduler.score().notes().iter().map(|n| n.start_tick).collect();
    assert_eq!(starts, vec![0, 4, 4, 8]);

    scheduler.clock().advance_secs(0.01);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Continue { fired: 1 });

    scheduler.clock().advance_secs(4.0 * TICK);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Continue { fired: 2 });

    scheduler.clock().advance_secs(4.0 * TICK);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Continue { fired: 1 });

    assert_eq!(
        sink.frequencies(),
        vec![midi_to_freq(36), midi_to_freq(40), midi_to_freq(72), midi_to_freq(38)]
    );
    assert!(sink
        .activations
        .iter()
        .all(|a| (a.duration_seconds - 4.0 * TICK).abs() < 1e-9));

    scheduler.clock().advance_secs(4.0 * TICK);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Completed { fired: 0 });
    assert_eq!(scheduler.state(), PlaybackState::Stopped);
    assert_eq!(scheduler.position(), 0.0);

    // The completed pass left no live poll behind.
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Ignored);
}

#[test]
fn long_gap_between_polls_fires_every_note_once() {
    let config = RelayJamConfig::default();
    let data = four_note_composition(&config);
    let mut scheduler = scheduler(&data, &config);
    let mut sink = RecordingSink::new();
    let handle = scheduler.play();

    scheduler.clock().advance_secs(9.0 * TICK);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Continue { fired: 4 });
    scheduler.clock().advance_secs(0.5 * TICK);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Continue { fired: 0 });
    assert_eq!(sink.activations.len(), 4);
}

#[test]
fn pause_resume_and_stop() {
    let config = RelayJamConfig::default();
    let data = four_note_composition(&config);
    let mut scheduler = scheduler(&data, &config);
    let mut sink = RecordingSink::new();

    let first = scheduler.play();
    scheduler.clock().advance_secs(2.0 * TICK);
    scheduler.poll(first, &mut sink);
    scheduler.pause();
    assert_eq!(scheduler.state(), PlaybackState::Paused);
    assert_eq!(scheduler.poll(first, &mut sink), PollOutcome::Ignored);

    // Time spent paused does not move the position.
    scheduler.clock().advance_secs(10.0);
    assert!((scheduler.position() - 2.0).abs() < 1e-9);

    let resumed = scheduler.play();
    assert_ne!(first, resumed);
    scheduler.clock().advance_secs(2.5 * TICK);
    assert_eq!(scheduler.poll(resumed, &mut sink), PollOutcome::Continue { fired: 2 });

    scheduler.stop(&mut sink);
    assert_eq!(sink.stop_all_calls, 1);
    assert_eq!(scheduler.state(), PlaybackState::Stopped);
    assert_eq!(scheduler.poll(resumed, &mut sink), PollOutcome::Ignored);
}

#[test]
fn configured_fallback_timbre_replaces_unknown_instruments() {
    let fixture = config_file(&json!({
        "playback": { "fallback_timbre": "triangle" }
    }));
    let config = RelayJamConfig::from_file(fixture.path()).unwrap();
    let data = relayed(
        &config,
        vec![vec![
            NoteEvent::from_midi(36, 0, 2, 100, "kick"),
            NoteEvent::from_midi(60, 0, 2, 100, "theremin"),
        ]],
    );

    // The unknown id survives the ledger round trip untouched.
    assert!(data.encoded_tracks[0].as_str().contains("\"theremin\""));

    let mut scheduler = scheduler(&data, &config);
    let mut sink = RecordingSink::new();
    let handle = scheduler.play();
    scheduler.clock().advance_secs(0.01);
    scheduler.poll(handle, &mut sink);

    let timbres: Vec<Timbre> = sink.activations.iter().map(|a| a.timbre).collect();
    assert_eq!(
        timbres,
        vec![
            Timbre::from_id("kick").unwrap(),
            Timbre::Oscillator(Waveform::Triangle),
        ]
    );
}

#[test]
fn configured_lookahead_schedules_notes_ahead_with_delay() {
    let fixture = config_file(&json!({
        "playback": { "lookahead_ticks": 2 }
    }));
    let config = RelayJamConfig::from_file(fixture.path()).unwrap();
    let data = four_note_composition(&config);
    let mut scheduler = scheduler(&data, &config);
    let mut sink = RecordingSink::new();
    let handle = scheduler.play();

    scheduler.clock().advance_secs(2.5 * TICK);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Continue { fired: 3 });
    let delay = sink.activations[1].delay_seconds;
    assert!((delay - 1.5 * TICK).abs() < 1e-9);

    // Already scheduled notes are not activated again.
    scheduler.clock().advance_secs(TICK);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Continue { fired: 0 });
}

#[test]
fn seek_backward_replays_from_new_position() {
    let config = RelayJamConfig::default();
    let data = four_note_composition(&config);
    let mut scheduler = scheduler(&data, &config);
    let mut sink = RecordingSink::new();
    let handle = scheduler.play();

    scheduler.clock().advance_secs(6.0 * TICK);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Continue { fired: 3 });

    scheduler.seek(4.0).unwrap();
    scheduler.clock().advance_secs(0.5 * TICK);
    assert_eq!(scheduler.poll(handle, &mut sink), PollOutcome::Continue { fired: 2 });
    assert_eq!(sink.activations.len(), 5);
}

//! Codec tests.

use pretty_assertions::assert_eq;

use super::*;
use crate::event::NoteEvent;
use crate::instrument::{Instrument, Timbre, Voicing, Waveform};
use crate::note::PitchClass;
use crate::track::TrackType;

fn kick() -> NoteEvent {
    NoteEvent::from_midi(36, 0, 4, 100, "kick")
}

fn sample_tracks() -> TracksByType {
    let mut tracks = TracksByType::new();
    tracks.insert(
        TrackType::Drum,
        vec![kick(), NoteEvent::from_midi(38, 4, 4, 90, "snare")],
    );
    tracks.insert(
        TrackType::Synth,
        vec![NoteEvent::new(
            PitchClass::FSharp,
            4,
            8,
            8,
            64,
            Timbre::Oscillator(Waveform::Sawtooth),
        )],
    );
    tracks
}

#[test]
fn test_encode_kick() {
    let mut tracks = TracksByType::new();
    tracks.insert(TrackType::Drum, vec![kick()]);
    assert_eq!(encode(&tracks).unwrap(), r#"{"drum":[[36,0,4,100,"kick"]]}"#);
}

#[test]
fn test_encode_omits_empty_tracks() {
    let mut tracks = sample_tracks();
    tracks.insert(TrackType::Bass, Vec::new());
    tracks.insert(TrackType::Vocal, Vec::new());

    let wire = encode(&tracks).unwrap();
    assert!(!wire.contains("bass"));
    assert!(!wire.contains("vocal"));
    assert!(wire.contains("\"drum\""));
    assert!(wire.contains("\"synth\""));
}

#[test]
fn test_roundtrip() {
    let tracks = sample_tracks();
    let wire = encode(&tracks).unwrap();
    assert_eq!(decode(&wire).unwrap(), tracks);
}

#[test]
fn test_roundtrip_keeps_custom_instrument() {
    let mut tracks = TracksByType::new();
    tracks.insert(
        TrackType::Vocal,
        vec![
            NoteEvent::from_midi(64, 0, 2, 80, "theremin"),
            NoteEvent::from_midi(67, 2, 2, 80, Timbre::Vocal(Voicing::Ah)),
        ],
    );
    let decoded = decode(&encode(&tracks).unwrap()).unwrap();
    assert_eq!(
        decoded[&TrackType::Vocal][0].instrument,
        Instrument::Custom("theremin".to_string())
    );
    assert_eq!(decoded, tracks);
}

#[test]
fn test_pitch_name_equivalence() {
    // C2 and MIDI 36 are the same note.
    let wire = r#"{"drum":[[36,0,4,100,"kick"]]}"#;
    let decoded = decode(wire).unwrap();
    let note = &decoded[&TrackType::Drum][0];
    assert_eq!(note.pitch_class, PitchClass::C);
    assert_eq!(note.octave, 2);
}

#[test]
fn test_encode_rejects_out_of_range_pitch() {
    let mut tracks = TracksByType::new();
    tracks.insert(
        TrackType::Bass,
        vec![kick(), NoteEvent::new(PitchClass::A, 9, 0, 1, 10, "sine")],
    );
    let err = encode(&tracks).unwrap_err();
    assert_eq!(
        err,
        CodecError::FieldOutOfRange {
            path: "bass[1]".to_string(),
            field: NoteField::Pitch,
            reason: "must be in 0..=127, got 129".to_string(),
        }
    );
}

#[test]
fn test_encode_rejects_zero_duration_and_loud_velocity() {
    let mut tracks = TracksByType::new();
    tracks.insert(TrackType::Drum, vec![NoteEvent::from_midi(36, 0, 0, 100, "kick")]);
    assert!(matches!(
        encode(&tracks),
        Err(CodecError::FieldOutOfRange {
            field: NoteField::Duration,
            ..
        })
    ));

    tracks.insert(TrackType::Drum, vec![NoteEvent::from_midi(36, 0, 1, 128, "kick")]);
    assert!(matches!(
        encode(&tracks),
        Err(CodecError::FieldOutOfRange {
            field: NoteField::Velocity,
            ..
        })
    ));
}

#[test]
fn test_decode_ignores_unknown_keys() {
    let wire = r#"{"guitar":[[1,2,3]],"drum":[[36,0,4,100,"kick"]],"version":2}"#;
    let decoded = decode(wire).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[&TrackType::Drum], vec![kick()]);
    assert!(validate(wire));
}

#[test]
fn test_decode_malformed_payloads() {
    let cases = vec![
        ("not json", "$"),
        ("[1,2,3]", "$"),
        ("42", "$"),
        (r#"{"drum":{"0":[36,0,4,100,"kick"]}}"#, "drum"),
        (r#"{"drum":[36]}"#, "drum[0]"),
        (r#"{"drum":[[36,0,4,100]]}"#, "drum[0]"),
        (r#"{"drum":[[36,0,4,100,"kick",1]]}"#, "drum[0]"),
        (r#"{"drum":[[36.5,0,4,100,"kick"]]}"#, "drum[0][0]"),
        (r#"{"drum":[["36",0,4,100,"kick"]]}"#, "drum[0][0]"),
        (r#"{"drum":[[36,0,4,100,7]]}"#, "drum[0][4]"),
    ];

    for (wire, path) in cases {
        match decode(wire) {
            Err(CodecError::MalformedWire { path: got, .. }) => {
                assert_eq!(got, path, "wrong path for {}", wire)
            }
            other => panic!("expected MalformedWire for {}, got {:?}", wire, other),
        }
        assert!(!validate(wire), "expected invalid: {}", wire);
    }
}

#[test]
fn test_decode_no_track_data() {
    for wire in ["{}", r#"{"guitar":[[36,0,4,100,"kick"]]}"#] {
        assert_eq!(decode(wire), Err(CodecError::NoTrackData));
        assert!(!validate(wire));
    }
}

#[test]
fn test_decode_empty_recognized_array() {
    let decoded = decode(r#"{"bass":[]}"#).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_range_rejection() {
    let cases = vec![
        (r#"{"drum":[[128,0,4,100,"kick"]]}"#, NoteField::Pitch),
        (r#"{"drum":[[-1,0,4,100,"kick"]]}"#, NoteField::Pitch),
        (r#"{"drum":[[36,-1,4,100,"kick"]]}"#, NoteField::StartTime),
        (r#"{"drum":[[36,0,0,100,"kick"]]}"#, NoteField::Duration),
        (r#"{"drum":[[36,0,-4,100,"kick"]]}"#, NoteField::Duration),
        (r#"{"drum":[[36,0,4,128,"kick"]]}"#, NoteField::Velocity),
        (r#"{"drum":[[36,0,4,-1,"kick"]]}"#, NoteField::Velocity),
        (
            r#"{"drum":[[36,18446744073709551615,4,100,"kick"]]}"#,
            NoteField::StartTime,
        ),
    ];

    for (wire, expected_field) in cases {
        assert!(!validate(wire), "expected invalid: {}", wire);
        match decode(wire) {
            Err(CodecError::FieldOutOfRange { field, path, .. }) => {
                assert_eq!(field, expected_field, "wrong field for {}", wire);
                assert_eq!(path, format!("drum[0][{}]", expected_field.position()));
            }
            other => panic!("expected FieldOutOfRange for {}, got {:?}", wire, other),
        }
    }
}

#[test]
fn test_validate_detailed_reports_every_failure() {
    let wire = r#"{"drum":[[200,0,4,100,"kick"],[36,0,4,100,"kick"]],"bass":[[40,0,0,300,"sine"]]}"#;
    let result = validate_detailed(wire);
    assert!(!result.is_ok());

    let paths: Vec<_> = result
        .errors
        .iter()
        .map(|e| e.path.clone().unwrap_or_default())
        .collect();
    assert_eq!(paths, vec!["drum[0][0]", "bass[0][2]", "bass[0][3]"]);
    assert!(result
        .errors
        .iter()
        .all(|e| e.code == crate::error::ErrorCode::FieldOutOfRange));
    assert!(result.errors[0].message.starts_with("pitch must be in 0..=127"));
}

#[test]
fn test_check_horizon() {
    let mut tracks = TracksByType::new();
    tracks.insert(
        TrackType::Bass,
        vec![
            NoteEvent::from_midi(40, 0, 16, 90, "sine"),
            NoteEvent::from_midi(40, 60, 8, 90, "sine"),
        ],
    );
    assert!(check_horizon(&tracks, 68).is_ok());
    assert_eq!(
        check_horizon(&tracks, 64),
        Err(CodecError::BeyondHorizon {
            path: "bass[1]".to_string(),
            end: 68,
            horizon: 64,
        })
    );
}

#[test]
fn test_music_data_envelope() {
    let encoded = EncodedTrack::encode(&sample_tracks()).unwrap();
    let data = MusicData::new(120, 64, encoded);
    let decoded = data.decode().unwrap();
    assert_eq!(decoded.bpm, 120);
    assert_eq!(decoded.total_sixteenth_notes, 64);
    assert_eq!(decoded.tracks, sample_tracks());
}

#[test]
fn test_content_hash_ignores_whitespace() {
    let compact = EncodedTrack::from_wire(r#"{"drum":[[36,0,4,100,"kick"]]}"#);
    let spaced = EncodedTrack::from_wire("{ \"drum\" : [ [36, 0, 4, 100, \"kick\"] ] }");
    let hash = compact.content_hash().unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(hash, spaced.content_hash().unwrap());
}

#[test]
fn test_codec_error_codes() {
    assert_eq!(CodecError::NoTrackData.code(), "CODEC_002");
    assert_eq!(CodecError::NoTrackData.category(), "codec");
    let err = CodecError::MalformedWire {
        path: "vocal[2]".to_string(),
        reason: "expected 5 fields, found 3".to_string(),
    };
    let validation = err.to_validation_error();
    assert_eq!(validation.path.as_deref(), Some("vocal[2]"));
    assert_eq!(validation.message, "expected 5 fields, found 3");
}

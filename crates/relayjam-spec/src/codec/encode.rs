//! Notes -> wire.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{CodecError, NoteField};
use crate::event::{NoteEvent, TracksByType};

/// One note tuple as it appears on the wire.
#[derive(Serialize)]
struct WireNote<'a>(u8, u32, u32, u8, &'a str);

/// Encodes notes grouped by track type into the wire form.
///
/// Track types without notes are omitted. Every note is range-checked; the
/// first failure is reported with its path (e.g. `bass[3]`).
///
/// # Example
/// ```
/// use relayjam_spec::codec::encode;
/// use relayjam_spec::{NoteEvent, TrackType, TracksByType};
///
/// let mut tracks = TracksByType::new();
/// tracks.insert(TrackType::Drum, vec![NoteEvent::from_midi(36, 0, 4, 100, "kick")]);
/// tracks.insert(TrackType::Bass, vec![]);
///
/// let wire = encode(&tracks).unwrap();
/// assert_eq!(wire, r#"{"drum":[[36,0,4,100,"kick"]]}"#);
/// ```
pub fn encode(tracks: &TracksByType) -> Result<String, CodecError> {
    let mut wire: BTreeMap<&'static str, Vec<WireNote<'_>>> = BTreeMap::new();

    for (track_type, notes) in tracks {
        if notes.is_empty() {
            continue;
        }
        let key = track_type.wire_key();
        let mut encoded = Vec::with_capacity(notes.len());
        for (index, note) in notes.iter().enumerate() {
            encoded.push(wire_note(note, &format!("{}[{}]", key, index))?);
        }
        wire.insert(key, encoded);
    }

    serde_json::to_string(&wire).map_err(|e| CodecError::MalformedWire {
        path: "$".to_string(),
        reason: format!("serialization failed: {}", e),
    })
}

fn wire_note<'a>(note: &'a NoteEvent, path: &str) -> Result<WireNote<'a>, CodecError> {
    let pitch = note.midi_pitch();
    let out_of_range = |field: NoteField, value: i64| {
        let (min, max) = field.bounds();
        CodecError::FieldOutOfRange {
            path: path.to_string(),
            field,
            reason: format!("must be in {}..={}, got {}", min, max, value),
        }
    };

    if !(0..=127).contains(&pitch) {
        return Err(out_of_range(NoteField::Pitch, pitch as i64));
    }
    if note.duration == 0 {
        return Err(out_of_range(NoteField::Duration, 0));
    }
    if note.velocity > 127 {
        return Err(out_of_range(NoteField::Velocity, note.velocity as i64));
    }

    Ok(WireNote(
        pitch as u8,
        note.start_time,
        note.duration,
        note.velocity,
        note.instrument.id(),
    ))
}

/// Checks that every note ends at or before `horizon`.
pub fn check_horizon(tracks: &TracksByType, horizon: u32) -> Result<(), CodecError> {
    for (track_type, notes) in tracks {
        for (index, note) in notes.iter().enumerate() {
            let end = note.end_time();
            if end > horizon as u64 {
                return Err(CodecError::BeyondHorizon {
                    path: format!("{}[{}]", track_type.wire_key(), index),
                    end,
                    horizon,
                });
            }
        }
    }
    Ok(())
}

//! Wire -> notes, with structural and range validation.

use serde_json::Value;

use super::{collect_validation, CodecError, NoteField};
use crate::error::ValidationResult;
use crate::event::{NoteEvent, TracksByType};
use crate::track::TrackType;

/// Decodes a wire payload into notes grouped by track type.
///
/// Fails with [`CodecError::MalformedWire`] if the payload is not a JSON
/// object or a recognized entry is badly shaped, [`CodecError::NoTrackData`]
/// if no recognized track-type key holds an array, and
/// [`CodecError::FieldOutOfRange`] for range failures. Never returns partial
/// data. Recognized keys holding an empty array decode to no entry.
pub fn decode(wire: &str) -> Result<TracksByType, CodecError> {
    let (tracks, mut errors) = scan(wire);
    if errors.is_empty() {
        Ok(tracks)
    } else {
        Err(errors.swap_remove(0))
    }
}

/// Returns true if `wire` would decode successfully.
pub fn validate(wire: &str) -> bool {
    scan(wire).1.is_empty()
}

/// Validates `wire` and reports every failure with its code and path.
pub fn validate_detailed(wire: &str) -> ValidationResult {
    collect_validation(&scan(wire).1)
}

/// Walks the payload once, collecting decoded notes and every error found.
fn scan(wire: &str) -> (TracksByType, Vec<CodecError>) {
    let mut tracks = TracksByType::new();
    let mut errors = Vec::new();

    let value: Value = match serde_json::from_str(wire) {
        Ok(value) => value,
        Err(e) => {
            errors.push(malformed("$", format!("not valid JSON: {}", e)));
            return (tracks, errors);
        }
    };
    let Some(object) = value.as_object() else {
        errors.push(malformed(
            "$",
            "expected an object mapping track types to note arrays",
        ));
        return (tracks, errors);
    };

    let mut saw_track_data = false;
    for track_type in TrackType::all() {
        let key = track_type.wire_key();
        let Some(entry) = object.get(key) else {
            continue;
        };
        let Some(items) = entry.as_array() else {
            errors.push(malformed(key, "expected an array of note tuples"));
            continue;
        };
        saw_track_data = true;

        let mut notes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if let Some(note) = scan_tuple(&format!("{}[{}]", key, index), item, &mut errors) {
                notes.push(note);
            }
        }
        if !notes.is_empty() {
            tracks.insert(*track_type, notes);
        }
    }

    if !saw_track_data && errors.is_empty() {
        errors.push(CodecError::NoTrackData);
    }
    if !errors.is_empty() {
        tracks.clear();
    }
    (tracks, errors)
}

fn scan_tuple(path: &str, item: &Value, errors: &mut Vec<CodecError>) -> Option<NoteEvent> {
    let Some(fields) = item.as_array() else {
        errors.push(malformed(path, "expected a 5-element note tuple"));
        return None;
    };
    if fields.len() != 5 {
        errors.push(malformed(
            path,
            format!("expected 5 fields, found {}", fields.len()),
        ));
        return None;
    }

    let pitch = int_field(path, NoteField::Pitch, &fields[0], errors);
    let start = int_field(path, NoteField::StartTime, &fields[1], errors);
    let duration = int_field(path, NoteField::Duration, &fields[2], errors);
    let velocity = int_field(path, NoteField::Velocity, &fields[3], errors);
    let instrument = match fields[4].as_str() {
        Some(id) => Some(id),
        None => {
            errors.push(malformed(
                &field_path(path, NoteField::Instrument),
                "instrument id must be a string",
            ));
            None
        }
    };

    Some(NoteEvent::from_midi(
        pitch? as u8,
        start? as u32,
        duration? as u32,
        velocity? as u8,
        instrument?,
    ))
}

fn int_field(
    path: &str,
    field: NoteField,
    value: &Value,
    errors: &mut Vec<CodecError>,
) -> Option<i64> {
    let path = field_path(path, field);
    let (min, max) = field.bounds();

    let number = match value.as_i64() {
        Some(n) => n,
        None => {
            if let Some(big) = value.as_u64() {
                errors.push(CodecError::FieldOutOfRange {
                    path,
                    field,
                    reason: format!("must be in {}..={}, got {}", min, max, big),
                });
            } else {
                errors.push(malformed(&path, format!("{} must be an integer", field)));
            }
            return None;
        }
    };

    if number < min || number > max {
        errors.push(CodecError::FieldOutOfRange {
            path,
            field,
            reason: format!("must be in {}..={}, got {}", min, max, number),
        });
        return None;
    }
    Some(number)
}

fn field_path(path: &str, field: NoteField) -> String {
    format!("{}[{}]", path, field.position())
}

fn malformed(path: &str, reason: impl Into<String>) -> CodecError {
    CodecError::MalformedWire {
        path: path.to_string(),
        reason: reason.into(),
    }
}

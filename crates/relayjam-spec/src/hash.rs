//! Content hashing and identifier derivation.
//!
//! Wire payloads are hashed over a canonical form so that two payloads that
//! differ only in whitespace or key order share a digest:
//!
//! ```text
//! content_hash = hex(BLAKE3(canonical_json(wire)))
//! ```
//!
//! Canonical form: object keys sorted by code point, no insignificant
//! whitespace, integers printed without exponent or fraction.

use serde_json::Value;

use crate::error::SpecError;
use crate::ids::{CompositionId, SessionId, TrackId};

/// Length of the hex digest embedded in derived identifiers.
const ID_DIGEST_LEN: usize = 16;

/// Renders a JSON value in canonical form.
pub fn canonicalize_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// BLAKE3 digest of a JSON value's canonical form, as 64 lowercase hex chars.
pub fn canonical_value_hash(value: &Value) -> String {
    blake3::hash(canonicalize_json(value).as_bytes())
        .to_hex()
        .to_string()
}

/// Hashes a wire payload over its canonical form.
///
/// Only requires the payload to be valid JSON; structural validity is the
/// codec's concern.
///
/// # Example
/// ```
/// use relayjam_spec::hash::wire_content_hash;
///
/// let a = wire_content_hash(r#"{"drum":[[36,0,4,100,"kick"]]}"#).unwrap();
/// let b = wire_content_hash(r#"{ "drum": [[36, 0, 4, 100, "kick"]] }"#).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn wire_content_hash(wire: &str) -> Result<String, SpecError> {
    let value: Value = serde_json::from_str(wire)?;
    Ok(canonical_value_hash(&value))
}

/// Derives a track identifier from a mint sequence number and the wire.
///
/// ```text
/// track_id = "track-" || hex(BLAKE3(sequence_le || wire))[..16]
/// ```
pub fn derive_track_id(sequence: u64, wire: &str) -> TrackId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&sequence.to_le_bytes());
    hasher.update(wire.as_bytes());
    TrackId(format!("track-{}", short_hex(&hasher.finalize())))
}

/// Derives a composition identifier from its session and ordered track ids.
pub fn derive_composition_id(session: SessionId, track_ids: &[TrackId]) -> CompositionId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&session.0.to_le_bytes());
    for id in track_ids {
        hasher.update(id.as_str().as_bytes());
        hasher.update(&[0]);
    }
    CompositionId(format!("composition-{}", short_hex(&hasher.finalize())))
}

fn short_hex(hash: &blake3::Hash) -> String {
    hash.to_hex()[..ID_DIGEST_LEN].to_string()
}

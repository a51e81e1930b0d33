#![no_main]

use libfuzzer_sys::fuzz_target;
use relayjam_spec::{decode, encode, validate, validate_detailed};

fuzz_target!(|data: &[u8]| {
    let Ok(wire) = std::str::from_utf8(data) else {
        return;
    };

    let decoded = decode(wire);
    assert_eq!(validate(wire), decoded.is_ok());
    assert_eq!(validate_detailed(wire).is_ok(), decoded.is_ok());

    // Anything that decodes must re-encode to an equivalent payload.
    if let Ok(tracks) = decoded {
        if tracks.is_empty() {
            return;
        }
        let reencoded = encode(&tracks).expect("decoded notes are in range");
        let left: serde_json::Value = serde_json::from_str(&reencoded).expect("encoder emits JSON");
        let again = decode(&reencoded).expect("re-encoded payload decodes");
        assert_eq!(again, tracks);
        assert!(left.is_object());
    }
});

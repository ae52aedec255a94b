//! Fuzz target for audit record decoding
//!
//! # Invariants
//!
//! - Decoding is total: every input yields a record, NEVER a panic
//! - Input with fewer than two delimiters is kept verbatim as the detail
//! - Otherwise re-encoding reproduces the input exactly

#![no_main]

use auditview_proto::{decode, FIELD_DELIMITER, UNKNOWN_EVENT_TYPE, UNKNOWN_USER};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let record = decode(&raw);

    if raw.matches(FIELD_DELIMITER).count() < 2 {
        assert_eq!(record.event_type(), UNKNOWN_EVENT_TYPE);
        assert_eq!(record.user(), UNKNOWN_USER);
        assert_eq!(record.detail(), raw);
    } else {
        assert_eq!(record.encode(), raw);
    }
});

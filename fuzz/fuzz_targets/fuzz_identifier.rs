#![no_main]

//! Fuzz testing for wire-format decoding.
//!
//! The zone API delivers identifiers as either JSON strings or JSON numbers.
//! This tests that arbitrary response bodies never panic the decoder.

use hcloud_dns01::api::{Record, RecordResponse, Zone, ZonesResponse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = serde_json::from_str::<Zone>(data);
    let _ = serde_json::from_str::<ZonesResponse>(data);
    let _ = serde_json::from_str::<RecordResponse>(data);

    // A decoded identifier is never blank.
    if let Ok(record) = serde_json::from_str::<Record>(data) {
        if let Some(id) = record.id {
            assert!(!id.trim().is_empty(), "identifier must not be blank");
        }
    }
});

#![no_main]

//! Fuzz testing for the relative record-name derivation.
//!
//! Arbitrary FQDN/zone pairs must never panic and must never derive an
//! empty record name (the apex case substitutes the challenge label).

use hcloud_dns01::challenge::relative_record_name;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (fqdn, zone) = data;
    let name = relative_record_name(fqdn, zone);
    assert!(!name.is_empty(), "derived record name must not be empty");
});

#![no_main]

//! Fuzz testing for challenge-info derivation.
//!
//! Arbitrary domain and key-authorization inputs must never panic, and the
//! derived FQDN must always be a dotted `_acme-challenge` name.

use hcloud_dns01::challenge::challenge_info;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (domain, key_auth) = data;
    let info = challenge_info(domain, key_auth);

    assert!(info.fqdn.starts_with("_acme-challenge."));
    assert!(info.fqdn.ends_with('.'));
    // The TXT value is always an unpadded base64url SHA-256 digest.
    assert_eq!(info.value.len(), 43);
});

//! Property tests for the record-name derivation and challenge info.

use hcloud_dns01::challenge::{challenge_info, relative_record_name, ACME_CHALLENGE_LABEL};
use proptest::prelude::*;

/// Strategy producing a plausible DNS label.
fn label() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,14}[a-z0-9]"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A name strictly inside the zone reduces to its prefix.
    #[test]
    fn subdomain_reduces_to_prefix(sub in label(), apex in label(), tld in label()) {
        let zone = format!("{apex}.{tld}");
        let fqdn = format!("{sub}.{zone}.");
        prop_assert_eq!(relative_record_name(&fqdn, &zone), sub);
    }

    /// The zone apex always maps to the challenge label.
    #[test]
    fn apex_maps_to_challenge_label(apex in label(), tld in label()) {
        let zone = format!("{apex}.{tld}");
        let fqdn = format!("{zone}.");
        prop_assert_eq!(relative_record_name(&fqdn, &zone), ACME_CHALLENGE_LABEL);
    }

    /// Case never changes the derived name.
    #[test]
    fn derivation_ignores_case(sub in label(), apex in label(), tld in label()) {
        let zone = format!("{apex}.{tld}");
        let fqdn = format!("{sub}.{zone}.");
        prop_assert_eq!(
            relative_record_name(&fqdn.to_uppercase(), &zone),
            relative_record_name(&fqdn, &zone.to_uppercase())
        );
    }

    /// A name outside the zone is passed through verbatim (lowercased).
    #[test]
    fn foreign_name_is_passed_through(sub in label(), apex in label(), tld in label()) {
        let zone = format!("{apex}.{tld}");
        let foreign = format!("{sub}.{apex}x.{tld}");
        prop_assert_eq!(relative_record_name(&format!("{foreign}."), &zone), foreign);
    }

    /// The challenge FQDN is always `_acme-challenge.<domain>.` and the value
    /// is always a 43-character unpadded base64url digest.
    #[test]
    fn challenge_info_shape(apex in label(), tld in label(), key_auth in "[ -~]{1,64}") {
        let domain = format!("{apex}.{tld}");
        let info = challenge_info(&domain, &key_auth);
        prop_assert_eq!(info.fqdn, format!("_acme-challenge.{domain}."));
        prop_assert_eq!(info.value.len(), 43);
        prop_assert!(info.value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }
}

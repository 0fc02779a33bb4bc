//! DNS-01 challenge naming and key-authorization digest.
//!
//! A DNS-01 challenge is satisfied by publishing a TXT record at
//! `_acme-challenge.<domain>` whose value is the base64url-encoded SHA-256
//! digest of the key authorization (RFC 8555 §8.4). This module derives both
//! halves and computes the record name relative to a located zone.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Label under which DNS-01 challenge records are published.
pub const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

/// Where and what to publish for one challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeInfo {
    /// Effective FQDN of the TXT record, with trailing dot.
    pub fqdn: String,
    /// TXT record value (the key-authorization digest).
    pub value: String,
}

/// Signature of the challenge-info derivation hook on the provider.
///
/// Replaceable for tests and for hosts that already computed the digest.
pub type ChallengeInfoFn = fn(domain: &str, key_auth: &str) -> ChallengeInfo;

/// Derives the effective FQDN and TXT value for a DNS-01 challenge.
///
/// The FQDN is `_acme-challenge.<domain>.`; the value is
/// `base64url(sha256(key_auth))` without padding.
pub fn challenge_info(domain: &str, key_auth: &str) -> ChallengeInfo {
    let digest = Sha256::digest(key_auth.as_bytes());
    ChallengeInfo {
        fqdn: format!("{ACME_CHALLENGE_LABEL}.{}.", domain.trim_end_matches('.')),
        value: URL_SAFE_NO_PAD.encode(digest),
    }
}

/// Computes the record name for `fqdn` relative to `zone`.
///
/// Trailing dots are ignored and the comparison is case-insensitive. An FQDN
/// equal to the zone yields the empty name, which is substituted with
/// [`ACME_CHALLENGE_LABEL`] so the record still lands at
/// `_acme-challenge.<zone>`; an FQDN outside the zone is returned verbatim as
/// a fallback. Already-prefixed names are never prefixed a second time.
pub fn relative_record_name(fqdn: &str, zone: &str) -> String {
    let fqdn = fqdn.trim_end_matches('.').to_ascii_lowercase();
    let zone = zone.trim_end_matches('.').to_ascii_lowercase();

    let relative = if fqdn == zone {
        String::new()
    } else if let Some(prefix) = fqdn.strip_suffix(&format!(".{zone}")) {
        prefix.to_string()
    } else {
        fqdn
    };

    if relative.is_empty() {
        ACME_CHALLENGE_LABEL.to_string()
    } else {
        relative
    }
}

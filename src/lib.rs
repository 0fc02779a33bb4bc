//! ACME DNS-01 challenge provider for Hetzner Cloud DNS.
//!
//! This crate publishes and removes the `_acme-challenge` TXT records that an
//! ACME client (e.g. Let's Encrypt) requires to validate DNS-01 challenges,
//! using the Hetzner Cloud DNS API with Bearer token authentication.
//!
//! The provider is a passive library component: a host ACME engine calls
//! [`Dns01Provider::present`] before it asks the CA to validate, polls DNS
//! propagation itself using the pair advertised by [`Dns01Provider::timeout`],
//! and finally calls [`Dns01Provider::cleanup`]. The provider performs no
//! propagation polling and keeps no state beyond two in-process caches.
//!
//! # Authentication
//!
//! Requires a Hetzner Cloud API token with Read & Write permissions for DNS:
//! - Create a token at: <https://console.hetzner.cloud/projects/*/security/tokens>
//!
//! # Example
//!
//! ```no_run
//! use hcloud_dns01::{Dns01Provider, HcloudProvider};
//!
//! # async fn example() -> Result<(), hcloud_dns01::Error> {
//! // Reads HCLOUD_TOKEN (required) and the optional HCLOUD_* tuning values.
//! let provider = HcloudProvider::from_env()?;
//!
//! provider.present("example.com", "token", "token.account-thumbprint").await?;
//!
//! let (propagation_timeout, polling_interval) = provider.timeout();
//! // ... host engine polls DNS until the TXT record is visible ...
//! # let _ = (propagation_timeout, polling_interval);
//!
//! provider.cleanup("example.com", "token", "token.account-thumbprint").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! A single provider instance is intended to serve many overlapping
//! challenges. Both internal caches are guarded by their own mutex, held only
//! across the map access and never across network I/O. Cancelling an
//! operation is dropping its future; in-flight requests are aborted.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod api;
pub mod challenge;
pub mod config;
pub mod locator;
mod provider;

pub use challenge::ChallengeInfo;
pub use config::{Config, ConfigError};
pub use locator::{FixedZoneLocator, SoaLocator, ZoneLocator};
pub use provider::HcloudProvider;

/// Contract consumed by a host ACME engine driving DNS-01 challenges.
///
/// `present` and `cleanup` are the two halves of the challenge lifecycle;
/// `timeout` advertises how long, and how often, the host should poll DNS
/// propagation between them. The `token` argument is the ACME challenge
/// token; `key_auth` is the key authorization string computed by the host
/// from the token and the account key.
#[async_trait]
pub trait Dns01Provider: Send + Sync {
    /// Publishes the challenge TXT record for `domain`.
    async fn present(&self, domain: &str, token: &str, key_auth: &str) -> Result<(), Error>;

    /// Removes the challenge TXT record published by a prior [`present`].
    ///
    /// Calling this for a domain that was never presented (or whose record
    /// was already removed) succeeds without touching the API.
    ///
    /// [`present`]: Dns01Provider::present
    async fn cleanup(&self, domain: &str, token: &str, key_auth: &str) -> Result<(), Error>;

    /// Returns `(propagation_timeout, polling_interval)` for the host poller.
    fn timeout(&self) -> (Duration, Duration);
}

/// Errors surfaced by the provider.
///
/// Every rendered message carries the `hcloud:` prefix so the host ACME log
/// shows the component at fault.
#[derive(Debug, Error)]
pub enum Error {
    /// Construction-time configuration problem.
    #[error("hcloud: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("hcloud: failed to build HTTP client: {0}")]
    Http(#[source] reqwest::Error),

    /// The zone locator could not map the challenge FQDN to a zone.
    #[error("hcloud: could not find zone for domain {domain}: {source}")]
    ZoneLocate {
        /// The domain the challenge was requested for.
        domain: String,
        /// The locator's failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The paginated zone listing produced no case-insensitive name match.
    #[error("hcloud: zone {name:?} not found")]
    ZoneNotFound {
        /// The zone name that was searched for.
        name: String,
    },

    /// The request never produced an HTTP response (DNS, TCP, TLS, write
    /// error). Not retried.
    #[error("hcloud: api request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The API kept answering 5xx through the whole retry budget.
    #[error("hcloud: {method} {path} failed with status {status}")]
    Upstream {
        /// HTTP method of the failed request.
        method: String,
        /// Request path including the query string.
        path: String,
        /// Final HTTP status code.
        status: u16,
    },

    /// The API rejected the request (4xx). The message is the response body
    /// when non-empty, the status line otherwise. Never retried.
    #[error("hcloud: {0}")]
    Api(String),

    /// A 2xx response could not be decoded as the expected JSON. Fatal,
    /// never retried.
    #[error("hcloud: failed to decode API response: {0}")]
    Decode(#[source] serde_json::Error),

    /// A 2xx response did not carry a usable identifier.
    #[error("hcloud: API response did not contain a usable identifier")]
    MissingIdentifier,
}

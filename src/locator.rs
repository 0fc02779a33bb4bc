//! Mapping a challenge FQDN to its authoritative zone.
//!
//! The provider needs to know which zone a challenge record belongs to
//! before it can talk to the zone API. Hosts that already know the zone
//! inject a [`FixedZoneLocator`] or a plain function; the default
//! [`SoaLocator`] discovers it by walking the name's parent labels and
//! querying SOA until an apex answers.

use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::Resolver;

/// Error type returned by zone locators.
pub type LocateError = Box<dyn std::error::Error + Send + Sync>;

/// Maps a challenge FQDN to the FQDN of its authoritative zone.
///
/// Implementations return the zone name with a trailing dot, e.g.
/// `example.com.` for `_acme-challenge.www.example.com.`.
#[async_trait]
pub trait ZoneLocator: Send + Sync {
    /// Returns the authoritative zone FQDN for `fqdn`.
    async fn zone_of(&self, fqdn: &str) -> Result<String, LocateError>;
}

/// Plain functions and closures locate zones too.
#[async_trait]
impl<F> ZoneLocator for F
where
    F: Fn(&str) -> Result<String, LocateError> + Send + Sync,
{
    async fn zone_of(&self, fqdn: &str) -> Result<String, LocateError> {
        self(fqdn)
    }
}

/// Locator that always answers with one preconfigured zone.
#[derive(Debug, Clone)]
pub struct FixedZoneLocator {
    zone: String,
}

impl FixedZoneLocator {
    /// Creates a locator answering `zone` for every FQDN.
    pub fn new(zone: impl Into<String>) -> Self {
        Self { zone: zone.into() }
    }
}

#[async_trait]
impl ZoneLocator for FixedZoneLocator {
    async fn zone_of(&self, _fqdn: &str) -> Result<String, LocateError> {
        Ok(self.zone.clone())
    }
}

/// Default locator: walks the FQDN's parent labels querying SOA.
///
/// The first candidate that answers an SOA query is the zone apex. Uses the
/// system resolver configuration unless one is supplied.
#[derive(Debug, Clone, Default)]
pub struct SoaLocator {
    config: ResolverConfig,
}

impl SoaLocator {
    /// Creates a locator using the default resolver configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a locator using a specific resolver configuration.
    pub fn with_resolver_config(config: ResolverConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ZoneLocator for SoaLocator {
    async fn zone_of(&self, fqdn: &str) -> Result<String, LocateError> {
        let resolver = Resolver::builder_with_config(
            self.config.clone(),
            TokioConnectionProvider::default(),
        )
        .build();

        let name = fqdn.trim_end_matches('.').to_ascii_lowercase();
        let mut labels: Vec<&str> = name.split('.').filter(|l| !l.is_empty()).collect();

        while !labels.is_empty() {
            let candidate = format!("{}.", labels.join("."));
            if let Ok(lookup) = resolver.soa_lookup(candidate.as_str()).await {
                if lookup.iter().next().is_some() {
                    return Ok(candidate);
                }
            }
            labels.remove(0);
        }

        Err(format!("no authoritative zone found for {fqdn}").into())
    }
}

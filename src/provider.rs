//! The Hetzner Cloud DNS-01 challenge provider.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::api::{self, CreateRecordRequest, RecordResponse, ZonesResponse, ZONES_PER_PAGE};
use crate::challenge::{self, ChallengeInfoFn};
use crate::config::{Config, ConfigError, DEFAULT_BASE_URL};
use crate::locator::{SoaLocator, ZoneLocator};
use crate::{Dns01Provider, Error};

const RECORD_TYPE_TXT: &str = "TXT";

/// DNS-01 challenge provider backed by Hetzner Cloud DNS zones.
///
/// One instance serves a whole ACME engine: it is `Send + Sync`, takes
/// `&self` everywhere, and may be used by many overlapping challenges. Zone
/// identifiers are cached for the process lifetime; record identifiers live
/// from a successful [`present`] to the matching successful [`cleanup`].
///
/// [`present`]: Dns01Provider::present
/// [`cleanup`]: Dns01Provider::cleanup
pub struct HcloudProvider {
    config: Config,
    client: api::Client,
    /// Lowercased zone name → zone identifier. Grows for the process
    /// lifetime, bounded by the account's zone count.
    zone_ids: Mutex<HashMap<String, String>>,
    /// Lowercased effective FQDN → record identifier, held between a
    /// successful present and the matching successful cleanup.
    record_ids: Mutex<HashMap<String, String>>,
    locator: Box<dyn ZoneLocator>,
    challenge_info: ChallengeInfoFn,
}

impl HcloudProvider {
    /// Builds a provider from the `HCLOUD_*` environment variables.
    ///
    /// `HCLOUD_TOKEN` is required; see [`Config::from_env`] for the rest.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_config(Some(Config::from_env()?))
    }

    /// Builds a provider from an explicit configuration.
    ///
    /// `None` and an empty token are rejected with distinct configuration
    /// errors. A missing `base_url` selects the production API root.
    pub fn from_config(config: Option<Config>) -> Result<Self, Error> {
        let config = config.ok_or(ConfigError::MissingConfig)?;
        if config.token.trim().is_empty() {
            return Err(ConfigError::MissingToken.into());
        }

        let raw_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw_url).map_err(|err| ConfigError::InvalidBaseUrl {
            url: raw_url.to_string(),
            reason: err.to_string(),
        })?;

        let client = api::Client::new(&config.token, base_url, config.http_timeout)?;

        Ok(Self {
            config,
            client,
            zone_ids: Mutex::new(HashMap::new()),
            record_ids: Mutex::new(HashMap::new()),
            locator: Box::new(SoaLocator::new()),
            challenge_info: challenge::challenge_info,
        })
    }

    /// Replaces the zone locator.
    ///
    /// Hosts with public-suffix knowledge (or tests with a mock API) inject
    /// their own mapping here.
    pub fn with_zone_locator(mut self, locator: impl ZoneLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Replaces the challenge-info derivation.
    pub fn with_challenge_info(mut self, challenge_info: ChallengeInfoFn) -> Self {
        self.challenge_info = challenge_info;
        self
    }

    /// Resolves a zone name (no trailing dot) to its API identifier.
    ///
    /// Cache hits are answered without I/O. On a miss the zone listing is
    /// paged through with a server-side name filter until a case-insensitive
    /// match appears. Concurrent misses for the same zone may both fetch;
    /// both writers store identical values.
    async fn zone_id(&self, zone_name: &str) -> Result<String, Error> {
        let key = zone_name.to_ascii_lowercase();
        if let Some(id) = lock(&self.zone_ids).get(&key) {
            return Ok(id.clone());
        }

        let mut page: i64 = 1;
        loop {
            let query = [
                ("name", zone_name.to_string()),
                ("page", page.to_string()),
                ("per_page", ZONES_PER_PAGE.to_string()),
            ];
            let response: ZonesResponse = self
                .client
                .get("v1/zones", &query)
                .await?
                .unwrap_or_default();

            if let Some(zone) = response
                .zones
                .into_iter()
                .find(|zone| zone.name.eq_ignore_ascii_case(zone_name))
            {
                let id = zone.id.ok_or(Error::MissingIdentifier)?;
                lock(&self.zone_ids).insert(key, id.clone());
                return Ok(id);
            }

            match response.meta.pagination.next_page {
                Some(next) if next > 0 => page = next,
                _ => break,
            }
        }

        Err(Error::ZoneNotFound {
            name: zone_name.to_string(),
        })
    }

    /// Runs the zone locator, tagging failures with the requesting domain.
    async fn locate_zone(&self, domain: &str, fqdn: &str) -> Result<String, Error> {
        self.locator
            .zone_of(fqdn)
            .await
            .map_err(|source| Error::ZoneLocate {
                domain: domain.to_string(),
                source,
            })
    }
}

#[async_trait]
impl Dns01Provider for HcloudProvider {
    async fn present(&self, domain: &str, _token: &str, key_auth: &str) -> Result<(), Error> {
        let info = (self.challenge_info)(domain, key_auth);
        let zone_fqdn = self.locate_zone(domain, &info.fqdn).await?;
        let zone_name = zone_fqdn.trim_end_matches('.');
        let zone_id = self.zone_id(zone_name).await?;

        let request = CreateRecordRequest {
            name: challenge::relative_record_name(&info.fqdn, zone_name),
            record_type: RECORD_TYPE_TXT.to_string(),
            value: info.value,
            ttl: self.config.ttl,
        };
        let response: RecordResponse = self
            .client
            .post(&format!("v1/zones/{zone_id}/records"), &request)
            .await?
            .ok_or(Error::MissingIdentifier)?;
        let record_id = response.record.id.ok_or(Error::MissingIdentifier)?;

        lock(&self.record_ids).insert(info.fqdn.to_ascii_lowercase(), record_id);
        Ok(())
    }

    async fn cleanup(&self, domain: &str, _token: &str, key_auth: &str) -> Result<(), Error> {
        let info = (self.challenge_info)(domain, key_auth);
        let zone_fqdn = self.locate_zone(domain, &info.fqdn).await?;

        let key = info.fqdn.to_ascii_lowercase();
        let record_id = match lock(&self.record_ids).get(&key) {
            Some(id) => id.clone(),
            // Nothing was presented for this FQDN: cleanup is a no-op.
            None => return Ok(()),
        };

        let zone_id = self.zone_id(zone_fqdn.trim_end_matches('.')).await?;
        self.client
            .delete(&format!("v1/zones/{zone_id}/records/{record_id}"))
            .await?;

        // Only forget the record once the API confirmed the delete; a failed
        // delete leaves the entry so a retry can still find it.
        lock(&self.record_ids).remove(&key);
        Ok(())
    }

    fn timeout(&self) -> (Duration, Duration) {
        (
            self.config.propagation_timeout,
            self.config.polling_interval,
        )
    }
}

/// Locks a cache, recovering the guard if a panicking thread poisoned it.
/// The maps hold plain strings, so any state is safe to reuse.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//! Low-level Hetzner Cloud DNS API client.
//!
//! This module provides the authenticated JSON transport used by
//! [`HcloudProvider`](crate::HcloudProvider). One private request routine
//! backs the three verbs the provider needs (GET, POST, DELETE) and owns the
//! retry policy: server errors (5xx) are retried up to three attempts total
//! with no delay between them, everything else fails fast. Network-layer
//! failures are never retried.
//!
//! Repeating a POST after a 5xx can create a duplicate record on the server.
//! That is accepted: a failed create also discards the record-ID binding, so
//! the stray record is left to the zone's normal lifecycle.
//!
//! # API Reference
//!
//! - [Hetzner Cloud API Documentation](https://docs.hetzner.cloud/)
//! - [DNS Zones API](https://docs.hetzner.cloud/reference/cloud#zones)

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::Error;

/// Total attempts per request: the initial try plus two retries.
pub const MAX_ATTEMPTS: u32 = 3;

/// Page size used for zone listings.
pub const ZONES_PER_PAGE: u32 = 50;

/// Authenticated JSON client for the zone API.
///
/// The Bearer token is installed as a sensitive default header; the
/// per-request timeout is installed on the underlying [`reqwest::Client`].
/// Cancellation is dropping the in-flight future.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// Creates a new client for the given API root.
    ///
    /// The base URL path is normalized to end in `/` so that endpoint paths
    /// resolve underneath it.
    pub fn new(token: &str, base_url: Url, timeout: Duration) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            crate::ConfigError::InvalidValue {
                name: crate::config::ENV_TOKEN,
                reason: "token contains characters not permitted in an HTTP header".to_string(),
            }
        })?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(Error::Http)?;

        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Issues a GET request and decodes the response body.
    ///
    /// Returns `None` when the 2xx response body is empty.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, Error> {
        let body = self.execute(Method::GET, path, query, None::<&()>).await?;
        decode(&body)
    }

    /// Issues a POST request with a JSON body and decodes the response body.
    ///
    /// Returns `None` when the 2xx response body is empty.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, Error> {
        let body = self.execute(Method::POST, path, &[], Some(body)).await?;
        decode(&body)
    }

    /// Issues a DELETE request, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        self.execute(Method::DELETE, path, &[], None::<&()>).await?;
        Ok(())
    }

    /// Sends one request, retrying server errors within the attempt budget.
    ///
    /// Returns the raw response body of the first 2xx response.
    async fn execute<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Vec<u8>, Error> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| crate::ConfigError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: err.to_string(),
            })?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let path_and_query = match url.query() {
            Some(q) => format!("{}?{q}", url.path()),
            None => url.path().to_string(),
        };

        let mut attempt = 1;
        loop {
            let mut request = self.http_client.request(method.clone(), url.clone());
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(Error::Request)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(Error::Request)?;

            if status.is_server_error() {
                warn!(
                    method = %method,
                    path = %path_and_query,
                    status = status.as_u16(),
                    attempt,
                    max_attempts = MAX_ATTEMPTS,
                    "hcloud API returned a server error",
                );
                if attempt >= MAX_ATTEMPTS {
                    return Err(Error::Upstream {
                        method: method.to_string(),
                        path: path_and_query,
                        status: status.as_u16(),
                    });
                }
                attempt += 1;
                continue;
            }

            if status.is_client_error() {
                return Err(Error::Api(client_error_message(status, &bytes)));
            }

            if status.is_success() {
                return Ok(bytes.to_vec());
            }

            // Informational and redirect statuses are outside the API's
            // contract (reqwest resolves redirects internally); fail them
            // with the status line rather than guessing at a body.
            return Err(Error::Api(status.to_string()));
        }
    }
}

/// Renders a 4xx response as an error message: the body when it carries
/// one, the status line otherwise.
fn client_error_message(status: StatusCode, body: &[u8]) -> String {
    let message = String::from_utf8_lossy(body);
    let message = message.trim();
    if message.is_empty() {
        status.to_string()
    } else {
        message.to_string()
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, Error> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(Error::Decode)
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a DNS record in a zone.
#[derive(Debug, Serialize)]
pub struct CreateRecordRequest {
    /// Record name relative to the zone.
    pub name: String,
    /// Record type, e.g. `TXT`.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value.
    pub value: String,
    /// TTL in seconds.
    pub ttl: u32,
}

// ============================================================================
// Response Types
// ============================================================================

/// A DNS zone as reported by the zone listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    /// Canonical zone identifier, absent when the API sent nothing usable.
    #[serde(default, deserialize_with = "deserialize_identifier")]
    pub id: Option<String>,
    /// Zone name, e.g. `example.com`.
    pub name: String,
}

/// Response wrapper for listing zones.
#[derive(Debug, Default, Deserialize)]
pub struct ZonesResponse {
    /// Zones on this page.
    #[serde(default)]
    pub zones: Vec<Zone>,
    /// Pagination metadata.
    #[serde(default)]
    pub meta: Meta,
}

/// Pagination metadata for list responses.
#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    /// Pagination details.
    #[serde(default)]
    pub pagination: Pagination,
}

/// Pagination details for list responses.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    /// Next page index, `None` on the last page.
    #[serde(default)]
    pub next_page: Option<i64>,
}

/// A DNS record as returned by the record-create endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    /// Canonical record identifier, absent when the API sent nothing usable.
    #[serde(default, deserialize_with = "deserialize_identifier")]
    pub id: Option<String>,
    /// Record name relative to the zone.
    #[serde(default)]
    pub name: String,
    /// Record type.
    #[serde(rename = "type", default)]
    pub record_type: String,
    /// Record value.
    #[serde(default)]
    pub value: String,
    /// TTL in seconds, absent when the zone default applies.
    #[serde(default)]
    pub ttl: Option<u32>,
}

/// Response wrapper for creating a record.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordResponse {
    /// The created record.
    pub record: Record,
}

/// Accepts an identifier as either a JSON string or a JSON number and
/// canonicalizes it to a decimal string.
///
/// One layer of surrounding double quotes is stripped from string forms.
/// Empty or blank identifiers become `None`; the caller decides whether an
/// identifier was required. Non-scalar forms are a decode error.
fn deserialize_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    match raw {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            let trimmed = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"')
            {
                trimmed[1..trimmed.len() - 1].trim()
            } else {
                trimmed
            };
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::Null => Ok(None),
        other => Err(serde::de::Error::custom(format!(
            "identifier must be a string or number, got {other}"
        ))),
    }
}

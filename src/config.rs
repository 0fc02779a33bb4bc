//! Provider configuration.
//!
//! Two construction paths exist: [`Config::from_env`] reads the `HCLOUD_*`
//! environment variables, and a [`Config`] can be assembled directly for
//! hosts that manage credentials themselves. Missing optional values fall
//! back to the defaults below; the token is the only required piece.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Environment variable holding the Hetzner Cloud API token (required).
pub const ENV_TOKEN: &str = "HCLOUD_TOKEN";
/// Environment variable overriding the API root URL.
pub const ENV_BASE_URL: &str = "HCLOUD_BASE_URL";
/// Environment variable overriding the TXT record TTL, in seconds.
pub const ENV_TTL: &str = "HCLOUD_TTL";
/// Environment variable overriding the advertised propagation timeout, in seconds.
pub const ENV_PROPAGATION_TIMEOUT: &str = "HCLOUD_PROPAGATION_TIMEOUT";
/// Environment variable overriding the advertised polling interval, in seconds.
pub const ENV_POLLING_INTERVAL: &str = "HCLOUD_POLLING_INTERVAL";
/// Environment variable overriding the per-request HTTP timeout, in seconds.
pub const ENV_HTTP_TIMEOUT: &str = "HCLOUD_HTTP_TIMEOUT";

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.hetzner.cloud";
/// Default TTL placed on created TXT records, in seconds.
pub const DEFAULT_TTL: u32 = 60;
/// Default propagation timeout advertised to the host poller.
pub const DEFAULT_PROPAGATION_TIMEOUT: Duration = Duration::from_secs(60);
/// Default polling interval advertised to the host poller.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(2);
/// Default per-request wall-clock timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Construction-time configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API token is absent or blank.
    #[error("missing required credential: HCLOUD_TOKEN")]
    MissingToken,

    /// No configuration was supplied at all.
    #[error("the provider configuration is missing")]
    MissingConfig,

    /// The configured base URL does not parse as an absolute URL.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// An environment variable is present but unparsable.
    #[error("invalid value for {name}: {reason}")]
    InvalidValue {
        /// The offending variable.
        name: &'static str,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Provider configuration, immutable after construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hetzner Cloud API token (Bearer token). Required, non-empty.
    pub token: String,
    /// API root URL. `None` selects [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
    /// TTL placed on created TXT records, in seconds.
    pub ttl: u32,
    /// Propagation timeout advertised to the host poller.
    pub propagation_timeout: Duration,
    /// Polling interval advertised to the host poller.
    pub polling_interval: Duration,
    /// Per-request wall-clock timeout.
    pub http_timeout: Duration,
}

impl Config {
    /// Creates a configuration with the given token and default tuning.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: None,
            ttl: DEFAULT_TTL,
            propagation_timeout: DEFAULT_PROPAGATION_TIMEOUT,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Reads the configuration from the `HCLOUD_*` environment variables.
    ///
    /// `HCLOUD_TOKEN` is required; the rest fall back to the crate defaults.
    /// A variable that is present but unparsable is an error naming the
    /// variable rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = env::var(ENV_TOKEN)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            token,
            base_url: env::var(ENV_BASE_URL).ok().filter(|url| !url.is_empty()),
            ttl: u32_from_env(ENV_TTL, DEFAULT_TTL)?,
            propagation_timeout: seconds_from_env(
                ENV_PROPAGATION_TIMEOUT,
                DEFAULT_PROPAGATION_TIMEOUT,
            )?,
            polling_interval: seconds_from_env(ENV_POLLING_INTERVAL, DEFAULT_POLLING_INTERVAL)?,
            http_timeout: seconds_from_env(ENV_HTTP_TIMEOUT, DEFAULT_HTTP_TIMEOUT)?,
        })
    }
}

fn u32_from_env(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|err: std::num::ParseIntError| ConfigError::InvalidValue {
                    name,
                    reason: err.to_string(),
                })
        }
        _ => Ok(default),
    }
}

fn seconds_from_env(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            let secs: u64 =
                raw.trim()
                    .parse()
                    .map_err(|err: std::num::ParseIntError| ConfigError::InvalidValue {
                        name,
                        reason: err.to_string(),
                    })?;
            Ok(Duration::from_secs(secs))
        }
        _ => Ok(default),
    }
}

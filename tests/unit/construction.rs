//! Construction-path tests: explicit configuration and the environment.

use std::env;
use std::time::Duration;

use hcloud_dns01::config::{
    self, DEFAULT_POLLING_INTERVAL, DEFAULT_PROPAGATION_TIMEOUT, DEFAULT_TTL,
};
use hcloud_dns01::{Config, Dns01Provider, HcloudProvider};

#[test]
fn missing_configuration_and_empty_token_are_distinct_errors() {
    let missing_config = HcloudProvider::from_config(None)
        .err()
        .expect("a missing configuration must be rejected");
    assert!(
        missing_config.to_string().contains("configuration"),
        "unexpected error: {missing_config}"
    );

    let empty_token = HcloudProvider::from_config(Some(Config::new("")))
        .err()
        .expect("an empty token must be rejected");
    assert!(
        empty_token.to_string().contains("HCLOUD_TOKEN"),
        "unexpected error: {empty_token}"
    );

    assert_ne!(missing_config.to_string(), empty_token.to_string());
}

#[test]
fn blank_token_is_rejected() {
    let err = HcloudProvider::from_config(Some(Config::new("   ")))
        .err()
        .expect("a blank token must be rejected");
    assert!(err.to_string().contains("HCLOUD_TOKEN"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let mut config = Config::new("token");
    config.base_url = Some("not an absolute url".to_string());

    let err = HcloudProvider::from_config(Some(config))
        .err()
        .expect("an unparsable base URL must be rejected");
    assert!(
        err.to_string().contains("invalid base URL"),
        "unexpected error: {err}"
    );
}

#[test]
fn missing_base_url_selects_the_default() {
    let config = Config::new("token");
    assert!(config.base_url.is_none());
    HcloudProvider::from_config(Some(config)).expect("default base URL must be valid");
}

#[test]
fn default_tuning_matches_the_documented_values() {
    let config = Config::new("token");
    assert_eq!(config.ttl, DEFAULT_TTL);
    assert_eq!(config.propagation_timeout, DEFAULT_PROPAGATION_TIMEOUT);
    assert_eq!(config.polling_interval, DEFAULT_POLLING_INTERVAL);
    assert_eq!(config.http_timeout, Duration::from_secs(30));
}

#[test]
fn timeout_advertises_the_configured_pair() {
    let mut config = Config::new("token");
    config.propagation_timeout = Duration::from_secs(300);
    config.polling_interval = Duration::from_secs(7);

    let provider = HcloudProvider::from_config(Some(config)).expect("valid configuration");
    assert_eq!(
        provider.timeout(),
        (Duration::from_secs(300), Duration::from_secs(7))
    );
}

/// All environment interaction lives in one test so parallel tests never
/// race on the process environment.
#[test]
fn environment_construction_reads_and_validates_hcloud_variables() {
    let all = [
        config::ENV_TOKEN,
        config::ENV_BASE_URL,
        config::ENV_TTL,
        config::ENV_PROPAGATION_TIMEOUT,
        config::ENV_POLLING_INTERVAL,
        config::ENV_HTTP_TIMEOUT,
    ];
    for name in all {
        env::remove_var(name);
    }

    // Absent token: a construction error naming the variable.
    let err = HcloudProvider::from_env()
        .err()
        .expect("from_env must fail without a token");
    assert!(
        err.to_string().contains("HCLOUD_TOKEN"),
        "unexpected error: {err}"
    );

    // Token alone: everything else falls back to defaults.
    env::set_var(config::ENV_TOKEN, "env-token");
    let config = Config::from_env().expect("token is set");
    assert_eq!(config.token, "env-token");
    assert!(config.base_url.is_none());
    assert_eq!(config.ttl, DEFAULT_TTL);

    // Full tuning set.
    env::set_var(config::ENV_BASE_URL, "https://hcloud.example.test");
    env::set_var(config::ENV_TTL, "120");
    env::set_var(config::ENV_PROPAGATION_TIMEOUT, "600");
    env::set_var(config::ENV_POLLING_INTERVAL, "5");
    env::set_var(config::ENV_HTTP_TIMEOUT, "10");
    let config = Config::from_env().expect("all variables are valid");
    assert_eq!(
        config.base_url.as_deref(),
        Some("https://hcloud.example.test")
    );
    assert_eq!(config.ttl, 120);
    assert_eq!(config.propagation_timeout, Duration::from_secs(600));
    assert_eq!(config.polling_interval, Duration::from_secs(5));
    assert_eq!(config.http_timeout, Duration::from_secs(10));
    HcloudProvider::from_env().expect("a fully specified environment constructs");

    // Unparsable numbers are errors naming the variable, not silent defaults.
    env::set_var(config::ENV_TTL, "sixty");
    let err = Config::from_env().err().expect("invalid TTL must fail");
    assert!(
        err.to_string().contains("HCLOUD_TTL"),
        "unexpected error: {err}"
    );

    for name in all {
        env::remove_var(name);
    }
}

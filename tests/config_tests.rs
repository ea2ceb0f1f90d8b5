use std::env;
use std::path::PathBuf;
use std::time::Duration;

use synapse::config::{self, ConfigError, Settings};

#[test]
fn test_sanitize_base_url_removes_trailing_slashes() {
    assert_eq!(config::sanitize_base_url("http://10.0.0.2:8000/"), "http://10.0.0.2:8000");
    assert_eq!(config::sanitize_base_url("http://10.0.0.2:8000///"), "http://10.0.0.2:8000");
    assert_eq!(config::sanitize_base_url("  https://synapse.lab/  "), "https://synapse.lab");
}

#[test]
fn test_parse_seconds() {
    assert_eq!(config::parse_seconds("SYNAPSE_POLL_INTERVAL_SECS", " 5 ").unwrap(), Duration::from_secs(5));
    assert!(matches!(
        config::parse_seconds("SYNAPSE_POLL_INTERVAL_SECS", "-1"),
        Err(ConfigError::InvalidSeconds { name: "SYNAPSE_POLL_INTERVAL_SECS", .. })
    ));
}

// Environment variables are process-wide, so every env case lives in one test.
#[test]
fn test_settings_from_env() {
    for key in [
        "SYNAPSE_API_BASE_URL",
        "SYNAPSE_POLL_INTERVAL_SECS",
        "SYNAPSE_SETTLE_DELAY_SECS",
        "SYNAPSE_SESSION_FILE",
    ] {
        env::remove_var(key);
    }

    let defaults = Settings::from_env().unwrap();
    assert_eq!(defaults.api_base_url, config::DEFAULT_API_BASE_URL);
    assert_eq!(defaults.poll_interval, Duration::from_secs(config::DEFAULT_POLL_INTERVAL_SECS));
    assert_eq!(defaults.settle_delay, Duration::from_secs(config::DEFAULT_SETTLE_DELAY_SECS));
    assert_eq!(defaults.session_file, PathBuf::from(config::DEFAULT_SESSION_FILE));

    env::set_var("SYNAPSE_API_BASE_URL", "   ");
    assert_eq!(config::get_api_base_url().unwrap(), config::DEFAULT_API_BASE_URL);

    env::set_var("SYNAPSE_API_BASE_URL", "https://synapse.lab/api-root/");
    env::set_var("SYNAPSE_POLL_INTERVAL_SECS", "7");
    env::set_var("SYNAPSE_SETTLE_DELAY_SECS", "1");
    env::set_var("SYNAPSE_SESSION_FILE", "/tmp/synapse.json");
    let custom = Settings::from_env().unwrap();
    assert_eq!(custom.api_base_url, "https://synapse.lab/api-root");
    assert_eq!(custom.poll_interval, Duration::from_secs(7));
    assert_eq!(custom.settle_delay, Duration::from_secs(1));
    assert_eq!(custom.session_file, PathBuf::from("/tmp/synapse.json"));

    env::set_var("SYNAPSE_API_BASE_URL", "ftp://synapse.lab");
    assert!(matches!(Settings::from_env(), Err(ConfigError::InvalidBaseUrl(_))));
    env::set_var("SYNAPSE_API_BASE_URL", "https://synapse.lab");

    env::set_var("SYNAPSE_SETTLE_DELAY_SECS", "0");
    assert!(matches!(Settings::from_env(), Err(ConfigError::InvalidSeconds { .. })));

    for key in [
        "SYNAPSE_API_BASE_URL",
        "SYNAPSE_POLL_INTERVAL_SECS",
        "SYNAPSE_SETTLE_DELAY_SECS",
        "SYNAPSE_SESSION_FILE",
    ] {
        env::remove_var(key);
    }
}

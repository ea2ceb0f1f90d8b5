use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 20;
pub const DEFAULT_SETTLE_DELAY_SECS: u64 = 3;
pub const DEFAULT_SESSION_FILE: &str = ".synapse-session.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SYNAPSE_API_BASE_URL is not a valid http(s) URL: {0}")]
    InvalidBaseUrl(String),
    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
}

/// Runtime settings shared by the dashboard and the CLI.
#[derive(Clone, Debug)]
pub struct Settings {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub session_file: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: get_api_base_url()?,
            poll_interval: read_seconds("SYNAPSE_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?,
            settle_delay: read_seconds("SYNAPSE_SETTLE_DELAY_SECS", DEFAULT_SETTLE_DELAY_SECS)?,
            session_file: get_session_file(),
        })
    }
}

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_api_base_url() -> Result<String, ConfigError> {
    let raw = env::var("SYNAPSE_API_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let url = sanitize_base_url(&raw);
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw));
    }
    Ok(url)
}

pub fn get_session_file() -> PathBuf {
    env::var("SYNAPSE_SESSION_FILE")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE))
}

fn read_seconds(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_seconds(name, &raw),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

pub fn parse_seconds(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Duration::from_secs(n)),
        _ => Err(ConfigError::InvalidSeconds {
            name,
            value: raw.to_string(),
        }),
    }
}

pub fn sanitize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        assert_eq!(sanitize_base_url(" http://api.local:8000/ "), "http://api.local:8000");
        assert_eq!(sanitize_base_url("https://x//"), "https://x");
    }

    #[test]
    fn seconds_must_be_positive() {
        assert_eq!(parse_seconds("X", "15").unwrap(), Duration::from_secs(15));
        assert!(parse_seconds("X", "0").is_err());
        assert!(parse_seconds("X", "soon").is_err());
    }
}

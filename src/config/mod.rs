//! Configuration handling for the application.
//!
//! Everything has a development default, so the demo binary runs with no
//! environment set up. `Config::from_env` performs the loading and validates
//! the numeric knobs.

use crate::api::ApiClientConfig;
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Environment variable names. Keeping them public lets other crates (tests,
/// build scripts) refer to them if needed later.
pub const ENV_FACTCHECK_BASE_URL: &str = "FACTCHECK_BASE_URL";
pub const ENV_FACTCHECK_API_KEY: &str = "FACTCHECK_API_KEY";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "MAX_RETRIES";
pub const ENV_REQUESTS_PER_MINUTE: &str = "REQUESTS_PER_MINUTE";

/// Default development values used when environment variables are absent.
const DEFAULT_FACTCHECK_BASE_URL: &str = "https://factcheck.example.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 10;

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    factcheck_base_url: String,
    factcheck_api_key: Option<String>,
    request_timeout_secs: u64,
    max_retries: u32,
    requests_per_minute: u32,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let factcheck_base_url = env::var(ENV_FACTCHECK_BASE_URL)
            .unwrap_or_else(|_| DEFAULT_FACTCHECK_BASE_URL.to_string());
        let factcheck_api_key = env::var(ENV_FACTCHECK_API_KEY).ok();
        let request_timeout_secs =
            parse_env(ENV_REQUEST_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let max_retries = parse_env(ENV_MAX_RETRIES, DEFAULT_MAX_RETRIES)?;
        let requests_per_minute =
            parse_env(ENV_REQUESTS_PER_MINUTE, DEFAULT_REQUESTS_PER_MINUTE)?;

        if url::Url::parse(&factcheck_base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: ENV_FACTCHECK_BASE_URL,
                reason: format!("not a valid URL: {factcheck_base_url}"),
            });
        }
        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_REQUEST_TIMEOUT_SECS,
                reason: "must be positive".to_string(),
            });
        }
        if requests_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_REQUESTS_PER_MINUTE,
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            factcheck_base_url,
            factcheck_api_key,
            request_timeout_secs,
            max_retries,
            requests_per_minute,
        })
    }

    /// Base URL of the external fact-check service.
    pub fn factcheck_base_url(&self) -> &str {
        &self.factcheck_base_url
    }
    /// API key for the fact-check service, when one is configured.
    pub fn factcheck_api_key(&self) -> Option<&str> {
        self.factcheck_api_key.as_deref()
    }

    /// Derive the resilient-client configuration from the loaded values.
    pub fn api_client_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            base_url: self.factcheck_base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_retries: self.max_retries,
            requests_per_minute: self.requests_per_minute,
            ..Default::default()
        }
    }

    /// Development defaults (mirrors `from_env` with no env overrides).
    pub fn default() -> Self {
        // not `Default` impl yet to keep explicit semantics
        Self {
            factcheck_base_url: DEFAULT_FACTCHECK_BASE_URL.to_string(),
            factcheck_api_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            field: key,
            reason: format!("not a valid number: {raw}"),
        }),
        Err(_) => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

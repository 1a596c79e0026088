//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `COMANDA_API_URL` - Backend base URL (default: `https://hamburguer-xmx8.onrender.com/api`)
//! - `COMANDA_STATE_PATH` - Local state file (default: `$HOME/.comanda/state.json`)
//! - `COMANDA_DELIVERY_COST` - Delivery fee in soles (default: 5.00)
//! - `COMANDA_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `COMANDA_LOOKUP_CACHE_SECS` - Checkout lookup cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

/// Backend used when `COMANDA_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "https://hamburguer-xmx8.onrender.com/api";

const DEFAULT_DELIVERY_COST: &str = "5.00";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";
const DEFAULT_LOOKUP_CACHE_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Ordering client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, always ending in `/`
    pub api_url: Url,
    /// File backing the local key/value store
    pub state_path: PathBuf,
    /// Fee added to delivery orders
    pub delivery_cost: Decimal,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// How long checkout lookups stay cached
    pub lookup_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value, or if
    /// no state path is given and `HOME` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_source<F>(source: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = parse_api_url(
            "COMANDA_API_URL",
            &or_default(&source, "COMANDA_API_URL", DEFAULT_API_URL),
        )?;

        let state_path = match source("COMANDA_STATE_PATH") {
            Some(path) => PathBuf::from(path),
            None => source("HOME")
                .map(|home| PathBuf::from(home).join(".comanda").join("state.json"))
                .ok_or_else(|| ConfigError::MissingEnvVar("COMANDA_STATE_PATH".to_string()))?,
        };

        let delivery_cost: Decimal = parse_var(
            "COMANDA_DELIVERY_COST",
            &or_default(&source, "COMANDA_DELIVERY_COST", DEFAULT_DELIVERY_COST),
        )?;
        if delivery_cost.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "COMANDA_DELIVERY_COST".to_string(),
                "must not be negative".to_string(),
            ));
        }

        let http_timeout = Duration::from_secs(parse_var(
            "COMANDA_HTTP_TIMEOUT_SECS",
            &or_default(&source, "COMANDA_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
        )?);
        let lookup_cache_ttl = Duration::from_secs(parse_var(
            "COMANDA_LOOKUP_CACHE_SECS",
            &or_default(&source, "COMANDA_LOOKUP_CACHE_SECS", DEFAULT_LOOKUP_CACHE_SECS),
        )?);

        Ok(Self {
            api_url,
            state_path,
            delivery_cost,
            http_timeout,
            lookup_cache_ttl,
            sentry_dsn: source("SENTRY_DSN").filter(|s| !s.is_empty()),
            sentry_environment: source("SENTRY_ENVIRONMENT").filter(|s| !s.is_empty()),
        })
    }

    /// Configuration pointing at `api_url` with default settings, for tests
    /// and tools that do not read the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an HTTP(S) URL.
    pub fn for_api_url(api_url: &str, state_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let state_path = state_path.into();
        let api_url = api_url.to_string();
        Self::from_source(move |key| match key {
            "COMANDA_API_URL" => Some(api_url.clone()),
            "COMANDA_STATE_PATH" => Some(state_path.display().to_string()),
            _ => None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn or_default<F>(source: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    source(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse a variable, naming it in the error.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the API base URL, normalizing it to end with `/` so relative
/// joins keep the `/api` prefix.
fn parse_api_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("HOME", "/home/ana")]).unwrap();
        assert_eq!(config.api_url.as_str(), "https://hamburguer-xmx8.onrender.com/api/");
        assert_eq!(config.state_path, PathBuf::from("/home/ana/.comanda/state.json"));
        assert_eq!(config.delivery_cost, Decimal::new(500, 2));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.lookup_cache_ttl, Duration::from_secs(300));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_home_and_state_path() {
        let err = config(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "COMANDA_STATE_PATH"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("COMANDA_API_URL", "http://127.0.0.1:8080/api/"),
            ("COMANDA_STATE_PATH", "/tmp/state.json"),
            ("COMANDA_DELIVERY_COST", "7.50"),
            ("COMANDA_HTTP_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8080/api/");
        assert_eq!(config.delivery_cost, Decimal::new(750, 2));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values() {
        let base = ("COMANDA_STATE_PATH", "/tmp/state.json");
        assert!(matches!(
            config(&[base, ("COMANDA_DELIVERY_COST", "-1")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            config(&[base, ("COMANDA_API_URL", "ftp://example.com")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            config(&[base, ("COMANDA_HTTP_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
    }

    #[test]
    fn test_for_api_url() {
        let config = ClientConfig::for_api_url("http://localhost:9000/api", "/tmp/s.json").unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:9000/api/");
        assert_eq!(config.state_path, PathBuf::from("/tmp/s.json"));
    }
}

//! Runtime configuration, read from the environment (and `.env` if present).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api::rate_limit::RetryPolicy;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub finnhub_api_key: String,
    pub finnhub_base_url: String,
    pub logo_api_key: Option<String>,
    /// Freshness window for quotes.
    pub quote_cache_ttl: Duration,
    /// Freshness window for assembled watchlists.
    pub watchlist_cache_ttl: Duration,
    /// Pause before every upstream quote request.
    pub rate_limit_delay: Duration,
    /// Pause before the single retry after a 429.
    pub rate_limit_backoff: Duration,
    pub http_timeout: Duration,
    pub watchlists_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            finnhub_api_key: String::new(),
            finnhub_base_url: "https://finnhub.io/api/v1".to_string(),
            logo_api_key: None,
            quote_cache_ttl: Duration::from_secs(60),
            watchlist_cache_ttl: Duration::from_secs(30),
            rate_limit_delay: Duration::from_millis(1000),
            rate_limit_backoff: Duration::from_millis(2000),
            http_timeout: Duration::from_secs(10),
            watchlists_file: PathBuf::from("watchlists.json"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key/value source, falling back to defaults
    /// for everything except the Finnhub key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let finnhub_api_key = get("FINNHUB_API_KEY")
            .ok_or_else(|| Error::Config("FINNHUB_API_KEY is not set".into()))?;

        Ok(Self {
            finnhub_api_key,
            finnhub_base_url: get("FINNHUB_BASE_URL").unwrap_or(defaults.finnhub_base_url),
            logo_api_key: get("LOGO_API_KEY"),
            quote_cache_ttl: secs(
                get("QUOTE_CACHE_TTL_SECS"),
                "QUOTE_CACHE_TTL_SECS",
                defaults.quote_cache_ttl,
            )?,
            watchlist_cache_ttl: secs(
                get("WATCHLIST_CACHE_TTL_SECS"),
                "WATCHLIST_CACHE_TTL_SECS",
                defaults.watchlist_cache_ttl,
            )?,
            rate_limit_delay: millis(
                get("RATE_LIMIT_DELAY_MS"),
                "RATE_LIMIT_DELAY_MS",
                defaults.rate_limit_delay,
            )?,
            rate_limit_backoff: millis(
                get("RATE_LIMIT_BACKOFF_MS"),
                "RATE_LIMIT_BACKOFF_MS",
                defaults.rate_limit_backoff,
            )?,
            http_timeout: secs(
                get("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                defaults.http_timeout,
            )?,
            watchlists_file: get("WATCHLISTS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.watchlists_file),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            delay: self.rate_limit_delay,
            backoff: self.rate_limit_backoff,
        }
    }
}

fn parse<T: FromStr>(value: &str, key: &str) -> Result<T> {
    value.parse().map_err(|_| {
        Error::Config(format!(
            "{} must be a non-negative integer, got {:?}",
            key, value
        ))
    })
}

fn secs(value: Option<String>, key: &str, default: Duration) -> Result<Duration> {
    match value {
        Some(v) => Ok(Duration::from_secs(parse(&v, key)?)),
        None => Ok(default),
    }
}

fn millis(value: Option<String>, key: &str, default: Duration) -> Result<Duration> {
    match value {
        Some(v) => Ok(Duration::from_millis(parse(&v, key)?)),
        None => Ok(default),
    }
}

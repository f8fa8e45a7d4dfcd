//! Runtime configuration
//!
//! Every value can be overridden through the environment; anything unset falls
//! back to the defaults the dashboard ships with.

use std::time::Duration;

use crate::error::{Error, Result};

/// Advisory backend configuration
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// API key for the text-generation backend
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Base URL of the REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-3-flash-preview".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Simulated latencies and refresh cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Interval between periodic balance refreshes
    pub refresh_interval: Duration,
    /// Latency of a single balance fetch
    pub balance_latency: Duration,
    /// Delay before a wallet connection completes
    pub connect_delay: Duration,
    /// Time spent in the encrypting phase of a transfer
    pub encrypt_delay: Duration,
    /// Time spent in the sending phase of a transfer
    pub send_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            balance_latency: Duration::from_millis(1200),
            connect_delay: Duration::from_millis(1500),
            encrypt_delay: Duration::from_millis(2000),
            send_delay: Duration::from_millis(2500),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub advisor: AdvisorConfig,
    pub timings: Timings,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AdvisorConfig::default();
        let advisor = AdvisorConfig {
            api_key: lookup("GEMINI_API_KEY")
                .or_else(|| lookup("API_KEY"))
                .filter(|key| !key.trim().is_empty()),
            model: lookup("ZHASH_ADVISOR_MODEL").unwrap_or(defaults.model),
            base_url: lookup("ZHASH_ADVISOR_BASE_URL").unwrap_or(defaults.base_url),
            timeout: parse_duration(&lookup, "ZHASH_ADVISOR_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(defaults.timeout),
        };

        let defaults = Timings::default();
        let timings = Timings {
            refresh_interval: parse_duration(&lookup, "ZHASH_REFRESH_INTERVAL_SECS", Duration::from_secs)?
                .unwrap_or(defaults.refresh_interval),
            balance_latency: parse_duration(&lookup, "ZHASH_BALANCE_LATENCY_MS", Duration::from_millis)?
                .unwrap_or(defaults.balance_latency),
            connect_delay: parse_duration(&lookup, "ZHASH_CONNECT_DELAY_MS", Duration::from_millis)?
                .unwrap_or(defaults.connect_delay),
            encrypt_delay: parse_duration(&lookup, "ZHASH_ENCRYPT_DELAY_MS", Duration::from_millis)?
                .unwrap_or(defaults.encrypt_delay),
            send_delay: parse_duration(&lookup, "ZHASH_SEND_DELAY_MS", Duration::from_millis)?
                .unwrap_or(defaults.send_delay),
        };

        if timings.refresh_interval.is_zero() {
            return Err(Error::Config("ZHASH_REFRESH_INTERVAL_SECS must be positive".to_string()));
        }

        Ok(Self { advisor, timings })
    }
}

fn parse_duration<F>(lookup: &F, key: &str, unit: fn(u64) -> Duration) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|value| Some(unit(value)))
            .map_err(|e| Error::Config(format!("Invalid value for {}: {} ({})", key, raw, e))),
        None => Ok(None),
    }
}

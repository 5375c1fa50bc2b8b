use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

use crate::cache::ReadThroughConfig;
use crate::storage::cached::TtlPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Soft bound on read-through cache entries (default: 500)
    pub cache_max_entries: usize,
    /// Background revalidation timeout in milliseconds, 0 disables (default: 10,000)
    pub cache_fetch_timeout_ms: u64,
    /// Seconds between cache sweeps (default: 60)
    pub cache_sweep_secs: u64,
    /// TTL for frequently changing content (default: 300)
    pub ttl_volatile_secs: u64,
    /// TTL for events (default: 900)
    pub ttl_moderate_secs: u64,
    /// TTL for site settings (default: 3,600)
    pub ttl_stable_secs: u64,
    /// Emit JSON logs (`LOG_FORMAT=json`)
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_max_entries: 500,
            cache_fetch_timeout_ms: 10_000,
            cache_sweep_secs: 60,
            ttl_volatile_secs: 300,
            ttl_moderate_secs: 900,
            ttl_stable_secs: 3_600,
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_MAX_ENTRIES`
    /// - `CACHE_FETCH_TIMEOUT_MS`
    /// - `CACHE_SWEEP_SECS`
    /// - `CACHE_TTL_VOLATILE_SECS`, `CACHE_TTL_MODERATE_SECS`, `CACHE_TTL_STABLE_SECS`
    /// - `LOG_FORMAT` (`json` or anything else for text)
    ///
    /// Unset variables take their default. Set but unparsable ones are an
    /// error, as are a zero entry bound and a zero sweep interval.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let parse = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            parse_var(&lookup, name, default)
        };

        let config = Self {
            cache_max_entries: parse_var(&lookup, "CACHE_MAX_ENTRIES", defaults.cache_max_entries)?,
            cache_fetch_timeout_ms: parse("CACHE_FETCH_TIMEOUT_MS", defaults.cache_fetch_timeout_ms)?,
            cache_sweep_secs: parse("CACHE_SWEEP_SECS", defaults.cache_sweep_secs)?,
            ttl_volatile_secs: parse("CACHE_TTL_VOLATILE_SECS", defaults.ttl_volatile_secs)?,
            ttl_moderate_secs: parse("CACHE_TTL_MODERATE_SECS", defaults.ttl_moderate_secs)?,
            ttl_stable_secs: parse("CACHE_TTL_STABLE_SECS", defaults.ttl_stable_secs)?,
            log_json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        };

        if config.cache_max_entries == 0 {
            return Err(ConfigError::Invalid {
                name: "CACHE_MAX_ENTRIES",
                value: "0".to_string(),
            });
        }
        if config.cache_sweep_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "CACHE_SWEEP_SECS",
                value: "0".to_string(),
            });
        }
        Ok(config)
    }

    pub fn read_through(&self) -> ReadThroughConfig {
        ReadThroughConfig {
            max_entries: self.cache_max_entries,
            fetch_timeout: (self.cache_fetch_timeout_ms > 0)
                .then(|| Duration::from_millis(self.cache_fetch_timeout_ms)),
        }
    }

    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy {
            volatile: Duration::from_secs(self.ttl_volatile_secs),
            moderate: Duration::from_secs(self.ttl_moderate_secs),
            stable: Duration::from_secs(self.ttl_stable_secs),
        }
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_secs)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

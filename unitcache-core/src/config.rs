//! Configuration for the cache stack
//!
//! Loaded from environment variables with the service's historical defaults.

use crate::constants::{
    DEFAULT_LRU_CACHE_SIZE, DEFAULT_REFRESH_PERIOD_SECS, ENV_LRU_CACHE_SIZE,
    ENV_REFRESH_PERIOD_SECS, MAX_REFRESH_PERIOD_SECS,
};
use crate::error::{ConfigError, UnitCacheError, UnitCacheResult};
use std::time::Duration;

/// Settings consumed by the bounded cache and the periodic resync task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitCacheConfig {
    /// Capacity of the least-recently-used cache.
    pub lru_cache_size: usize,

    /// Delay between the end of one full resync and the start of the next.
    pub refresh_period: Duration,
}

impl Default for UnitCacheConfig {
    fn default() -> Self {
        Self {
            lru_cache_size: DEFAULT_LRU_CACHE_SIZE,
            refresh_period: Duration::from_secs(DEFAULT_REFRESH_PERIOD_SECS),
        }
    }
}

impl UnitCacheConfig {
    /// Create UnitCacheConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `UNITCACHE_LRU_CACHE_SIZE`: LRU capacity in entries (default: 500)
    /// - `UNITCACHE_REFRESH_PERIOD_SECS`: Resync period in seconds (default: 3600)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Absent or unparseable
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lru_cache_size = lookup(ENV_LRU_CACHE_SIZE)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_LRU_CACHE_SIZE);

        let refresh_period = Duration::from_secs(
            lookup(ENV_REFRESH_PERIOD_SECS)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_REFRESH_PERIOD_SECS),
        );

        Self {
            lru_cache_size,
            refresh_period,
        }
    }

    pub fn with_lru_cache_size(mut self, size: usize) -> Self {
        self.lru_cache_size = size;
        self
    }

    pub fn with_refresh_period(mut self, period: Duration) -> Self {
        self.refresh_period = period;
        self
    }

    /// Validate the configuration.
    ///
    /// The refresh period must be non-zero and at most
    /// [`MAX_REFRESH_PERIOD_SECS`] so the resync deadline can always be computed.
    pub fn validate(&self) -> UnitCacheResult<()> {
        if self.lru_cache_size == 0 {
            return Err(UnitCacheError::Config(ConfigError::InvalidValue {
                field: "lru_cache_size".to_string(),
                value: self.lru_cache_size.to_string(),
                reason: "lru_cache_size must be greater than 0".to_string(),
            }));
        }

        if self.refresh_period.is_zero() {
            return Err(UnitCacheError::Config(ConfigError::InvalidValue {
                field: "refresh_period".to_string(),
                value: format!("{:?}", self.refresh_period),
                reason: "refresh_period must be positive".to_string(),
            }));
        }

        if self.refresh_period > Duration::from_secs(MAX_REFRESH_PERIOD_SECS) {
            return Err(UnitCacheError::Config(ConfigError::InvalidValue {
                field: "refresh_period".to_string(),
                value: format!("{:?}", self.refresh_period),
                reason: format!(
                    "refresh_period must not exceed {} seconds",
                    MAX_REFRESH_PERIOD_SECS
                ),
            }));
        }

        Ok(())
    }
}

//! Constants for the unit cache
//!
//! Defaults mirror the values the service has always shipped with.

// ============================================================================
// BOUNDED CACHE
// ============================================================================

/// Default capacity of the least-recently-used cache (entries)
pub const DEFAULT_LRU_CACHE_SIZE: usize = 500;

// ============================================================================
// PERIODIC RESYNC
// ============================================================================

/// Default period between full resyncs in seconds (1 hour)
pub const DEFAULT_REFRESH_PERIOD_SECS: u64 = 60 * 60;

/// Longest accepted period between full resyncs in seconds (365 days)
pub const MAX_REFRESH_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Environment variable overriding the LRU cache capacity
pub const ENV_LRU_CACHE_SIZE: &str = "UNITCACHE_LRU_CACHE_SIZE";

/// Environment variable overriding the resync period (seconds)
pub const ENV_REFRESH_PERIOD_SECS: &str = "UNITCACHE_REFRESH_PERIOD_SECS";

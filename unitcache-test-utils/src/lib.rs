//! UnitCache Test Utilities
//!
//! Centralized test infrastructure for the workspace:
//! - An in-memory persistent store that honours the store contract
//! - Test fixtures for common scenarios
//! - Proptest generators for units and id batches

pub mod fixtures;
pub mod generators;
pub mod persistent;

pub use fixtures::{make_unit, make_units, unit_ids};
pub use persistent::{MockPersistentStore, Operation};

// Re-export core types for convenience
pub use unitcache_core::{
    RawContent, StorageError, Timestamp, Unit, UnitCacheConfig, UnitCacheError, UnitCacheResult,
    UnitId, UnitStore,
};

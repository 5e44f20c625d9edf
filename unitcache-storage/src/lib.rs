//! UnitCache Storage - Layered Read-Through Cache
//!
//! Three stores share the [`UnitStore`] contract and stack by plain
//! composition:
//!
//! ```text
//! BoundedCache (LRU, capacity N)
//!   -> MirrorStore (unbounded in-memory copy)
//!     -> persistent store (source of truth)
//! ```
//!
//! Each layer answers reads from its own state before delegating, writes
//! through to the layer below before recording locally, and resolves batch
//! lookups through the shared [`fan_out`] resolver. The [`jobs::resync`]
//! task keeps the stack in step with the persistent dataset.

pub mod bounded;
pub mod fan_out;
pub mod jobs;
pub mod mirror;
pub mod stack;
pub mod stats;
pub mod telemetry;

pub use bounded::BoundedCache;
pub use fan_out::{deduplicate_ids, resolve_by_ids, BatchLayer};
pub use jobs::{resync_task, ResyncMetrics, ResyncSnapshot};
pub use mirror::MirrorStore;
pub use stack::{LayeredStore, UnitStack};
pub use stats::CacheStats;
pub use telemetry::init_tracing;

pub use unitcache_core::{
    StorageError, Unit, UnitCacheConfig, UnitCacheError, UnitCacheResult, UnitId, UnitStore,
};

//! UnitCache Core - Entity Types and Store Contract
//!
//! Pure data structures plus the six-operation [`UnitStore`] contract that
//! every layer of the cache stack both consumes and exposes. All other
//! crates depend on this one.

pub mod config;
pub mod constants;
pub mod entities;
pub mod error;
pub mod identity;
pub mod store;

pub use config::UnitCacheConfig;
pub use entities::Unit;
pub use error::{ConfigError, StorageError, UnitCacheError, UnitCacheResult};
pub use identity::{new_unit_id, RawContent, Timestamp, UnitId};
pub use store::UnitStore;

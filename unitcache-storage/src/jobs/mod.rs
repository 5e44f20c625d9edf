//! Background jobs for the cache stack.
//!
//! - `resync`: periodically refreshes the stack from the full persistent dataset
//!
//! # Usage
//!
//! Background jobs are typically spawned during startup, after the initial
//! synchronous hydration (see [`crate::stack::UnitStack`]):
//!
//! ```ignore
//! use unitcache_storage::jobs::resync_task;
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! tokio::spawn(resync_task(Arc::clone(&store), config.refresh_period, shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod resync;

pub use resync::{resync_task, ResyncMetrics, ResyncSnapshot};

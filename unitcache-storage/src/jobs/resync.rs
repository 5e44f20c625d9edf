//! Periodic Resync Background Task
//!
//! Keeps the cache stack in step with the persistent store by periodically
//! calling `fetch_all` on the outermost layer. Each layer refreshes itself
//! from the result on the way back up: the mirror overwrites every unit, the
//! bounded cache refreshes only the units it already holds.
//!
//! The timer is restarted after every fetch completes, so a slow fetch never
//! eats into the next interval. A failed fetch is logged and the loop keeps
//! going; the cache serves whatever it has until the next successful cycle.
//!
//! # Usage
//!
//! ```ignore
//! use unitcache_storage::jobs::resync_task;
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let handle = tokio::spawn(resync_task(store, Duration::from_secs(3600), shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! let metrics = handle.await?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use unitcache_core::constants::MAX_REFRESH_PERIOD_SECS;
use unitcache_core::UnitStore;

// ============================================================================
// METRICS
// ============================================================================

/// Counters for resync activity since the task started.
#[derive(Debug, Default)]
pub struct ResyncMetrics {
    /// Fetches that completed successfully
    pub resync_cycles: AtomicU64,

    /// Fetches that returned an error
    pub resync_errors: AtomicU64,

    /// Units returned across all successful fetches
    pub units_fetched: AtomicU64,
}

impl ResyncMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> ResyncSnapshot {
        ResyncSnapshot {
            resync_cycles: self.resync_cycles.load(Ordering::Relaxed),
            resync_errors: self.resync_errors.load(Ordering::Relaxed),
            units_fetched: self.units_fetched.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of resync metrics at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncSnapshot {
    pub resync_cycles: u64,
    pub resync_errors: u64,
    pub units_fetched: u64,
}

impl ResyncSnapshot {
    /// Total fetch attempts, successful or not.
    pub fn attempts(&self) -> u64 {
        self.resync_cycles + self.resync_errors
    }
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Background task that periodically resyncs `store` from the full dataset.
///
/// Runs until `shutdown_rx` observes `true` or its sender is dropped. The
/// first fetch happens one `period` after start; every later fetch happens
/// one `period` after the previous fetch finished. A zero period, or one
/// above [`MAX_REFRESH_PERIOD_SECS`], is logged and the task returns without
/// fetching.
///
/// # Returns
///
/// Metrics collected during the task's lifetime
pub async fn resync_task<S>(
    store: Arc<S>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<ResyncMetrics>
where
    S: UnitStore + ?Sized,
{
    let metrics = Arc::new(ResyncMetrics::new());

    let schedulable =
        !period.is_zero() && period <= Duration::from_secs(MAX_REFRESH_PERIOD_SECS);
    let first_tick = match Instant::now().checked_add(period) {
        Some(first_tick) if schedulable => first_tick,
        _ => {
            tracing::error!(?period, "Resync period unusable, resync task not started");
            return metrics;
        }
    };

    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(period_secs = period.as_secs_f64(), "Resync task started");

    if *shutdown_rx.borrow() {
        tracing::info!("Resync task cancelled before first cycle");
        return metrics;
    }

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("Resync task shutting down");
                    break;
                }
            }

            _ = ticker.tick() => {
                resync_once(store.as_ref(), &metrics).await;
                ticker.reset();
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        resync_cycles = snapshot.resync_cycles,
        resync_errors = snapshot.resync_errors,
        units_fetched = snapshot.units_fetched,
        "Resync task completed"
    );

    metrics
}

/// Perform one resync cycle. Failures are logged, never returned.
async fn resync_once<S>(store: &S, metrics: &ResyncMetrics)
where
    S: UnitStore + ?Sized,
{
    let started = Instant::now();
    match store.fetch_all().await {
        Ok(units) => {
            metrics.resync_cycles.fetch_add(1, Ordering::Relaxed);
            metrics
                .units_fetched
                .fetch_add(units.len() as u64, Ordering::Relaxed);
            tracing::debug!(
                units = units.len(),
                elapsed = ?started.elapsed(),
                "Resync cycle completed"
            );
        }
        Err(e) => {
            metrics.resync_errors.fetch_add(1, Ordering::Relaxed);
            tracing::error!(error = %e, "Failed to resync units");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

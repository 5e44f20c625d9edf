//! Startup wiring for the full cache stack.
//!
//! Builds persistent -> mirror -> bounded cache, hydrates the mirror with one
//! synchronous full fetch, then hands the outermost layer to the periodic
//! resync task. The bounded cache stays cold after hydration because a full
//! fetch only refreshes entries it already holds.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use unitcache_core::{UnitCacheConfig, UnitCacheResult, UnitStore};

use crate::bounded::BoundedCache;
use crate::jobs::resync::{resync_task, ResyncMetrics, ResyncSnapshot};
use crate::mirror::MirrorStore;

/// The outermost layer of a stack built over persistent store `P`.
pub type LayeredStore<P> = BoundedCache<MirrorStore<Arc<P>>>;

/// A running cache stack and its resync task.
pub struct UnitStack<P: UnitStore + ?Sized + 'static> {
    store: Arc<LayeredStore<P>>,
    shutdown_tx: watch::Sender<bool>,
    resync: JoinHandle<Arc<ResyncMetrics>>,
}

impl<P: UnitStore + ?Sized + 'static> UnitStack<P> {
    /// Build the stack over `persistent`, hydrate it and start resyncing.
    ///
    /// Fails if the configuration is invalid or the initial full fetch
    /// fails; no background task is left running in either case.
    pub async fn start(persistent: Arc<P>, config: &UnitCacheConfig) -> UnitCacheResult<Self> {
        config.validate()?;

        let mirror = MirrorStore::new(persistent);
        let store = Arc::new(BoundedCache::new(mirror, config.lru_cache_size)?);

        let hydrated = store.fetch_all().await?;
        tracing::info!(
            units = hydrated.len(),
            lru_cache_size = config.lru_cache_size,
            refresh_period_secs = config.refresh_period.as_secs(),
            "Initial units fetch completed"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let resync = tokio::spawn(resync_task(
            Arc::clone(&store),
            config.refresh_period,
            shutdown_rx,
        ));

        Ok(Self {
            store,
            shutdown_tx,
            resync,
        })
    }

    /// The outermost layer, for request handlers.
    pub fn store(&self) -> Arc<LayeredStore<P>> {
        Arc::clone(&self.store)
    }

    /// Stop the resync task and wait for it to finish.
    pub async fn shutdown(self) -> ResyncSnapshot {
        // The task also stops if the receiver is already gone.
        let _ = self.shutdown_tx.send(true);

        match self.resync.await {
            Ok(metrics) => metrics.snapshot(),
            Err(e) => {
                tracing::error!(error = %e, "Resync task did not finish cleanly");
                ResyncSnapshot::default()
            }
        }
    }
}

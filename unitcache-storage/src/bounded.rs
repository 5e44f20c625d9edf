//! Capacity-limited least-recently-used cache layer.
//!
//! Wraps the next layer exactly the way the mirror wraps the persistent
//! store, but holds at most `capacity` units. A full resync only refreshes
//! units that are already cached; it never loads new ones, so a large
//! `fetch_all` cannot push hot entries out in favour of cold ones.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use lru::LruCache;
use unitcache_core::{
    ConfigError, RawContent, StorageError, Unit, UnitCacheError, UnitCacheResult, UnitId,
    UnitStore,
};

use crate::fan_out::{resolve_by_ids, BatchLayer};
use crate::stats::{CacheStats, LayerCounters};

/// The LRU structure, with its own mutual exclusion.
#[derive(Debug)]
struct LruIndex {
    entries: Mutex<LruCache<UnitId, Unit>>,
    counters: LayerCounters,
}

impl LruIndex {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            counters: LayerCounters::default(),
        }
    }

    fn lock(&self) -> UnitCacheResult<MutexGuard<'_, LruCache<UnitId, Unit>>> {
        self.entries
            .lock()
            .map_err(|_| UnitCacheError::Storage(StorageError::LockPoisoned))
    }

    /// Lookup that counts as a recency touch.
    fn get(&self, id: &UnitId) -> UnitCacheResult<Option<Unit>> {
        let unit = self.lock()?.get(id).cloned();
        self.counters
            .record_lookups(1, usize::from(unit.is_some()));
        Ok(unit)
    }

    /// Insert or refresh `unit` as most recently used, evicting if full.
    fn add(&self, unit: Unit) -> UnitCacheResult<()> {
        let id = unit.id.clone();
        let displaced = self.lock()?.push(id.clone(), unit);
        if let Some((evicted_id, _)) = displaced {
            if evicted_id != id {
                self.counters.record_eviction();
                tracing::trace!(unit_id = %evicted_id, "Evicted least recently used unit");
            }
        }
        Ok(())
    }

    fn remove(&self, id: &UnitId) -> UnitCacheResult<()> {
        self.lock()?.pop(id);
        Ok(())
    }

    /// Refresh the units that are already cached; returns how many were.
    fn refresh_present(&self, units: &[Unit]) -> UnitCacheResult<usize> {
        let mut entries = self.lock()?;
        let mut refreshed = 0;
        for unit in units {
            if entries.contains(&unit.id) {
                entries.put(unit.id.clone(), unit.clone());
                refreshed += 1;
            }
        }
        Ok(refreshed)
    }
}

impl BatchLayer for LruIndex {
    fn read_batch(&self, ids: &[UnitId]) -> UnitCacheResult<Vec<Unit>> {
        let found: Vec<Unit> = {
            let mut entries = self.lock()?;
            ids.iter()
                .filter_map(|id| entries.get(id).cloned())
                .collect()
        };
        self.counters.record_lookups(ids.len(), found.len());
        Ok(found)
    }

    fn write_batch(&self, units: &[Unit]) -> UnitCacheResult<()> {
        for unit in units {
            self.add(unit.clone())?;
        }
        Ok(())
    }
}

/// Least-recently-used cache in front of the next layer.
#[derive(Debug)]
pub struct BoundedCache<S> {
    next: S,
    index: LruIndex,
    capacity: NonZeroUsize,
}

impl<S: UnitStore> BoundedCache<S> {
    /// Create an empty cache of `capacity` entries in front of `next`.
    ///
    /// A zero capacity is rejected.
    pub fn new(next: S, capacity: usize) -> UnitCacheResult<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            UnitCacheError::Config(ConfigError::InvalidValue {
                field: "lru_cache_size".to_string(),
                value: capacity.to_string(),
                reason: "cache capacity must be greater than 0".to_string(),
            })
        })?;

        Ok(Self {
            next,
            index: LruIndex::new(capacity),
            capacity,
        })
    }

    /// The layer this cache delegates to.
    pub fn next(&self) -> &S {
        &self.next
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of cached units.
    pub fn len(&self) -> usize {
        self.index.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is cached, without touching its recency.
    pub fn contains(&self, id: &UnitId) -> bool {
        self.index
            .lock()
            .map(|entries| entries.contains(id))
            .unwrap_or(false)
    }

    pub fn stats(&self) -> CacheStats {
        self.index.counters.snapshot(self.len())
    }
}

#[async_trait]
impl<S: UnitStore> UnitStore for BoundedCache<S> {
    async fn create(&self, unit: &Unit) -> UnitCacheResult<()> {
        self.next.create(unit).await?;
        self.index.add(unit.clone())
    }

    async fn update(&self, id: &UnitId, data: RawContent) -> UnitCacheResult<Unit> {
        let updated = self.next.update(id, data).await?;
        self.index.add(updated.clone())?;
        Ok(updated)
    }

    async fn delete(&self, id: &UnitId) -> UnitCacheResult<()> {
        self.next.delete(id).await?;
        self.index.remove(id)
    }

    async fn find_by_id(&self, id: &UnitId) -> UnitCacheResult<Unit> {
        if let Some(unit) = self.index.get(id)? {
            return Ok(unit);
        }

        tracing::debug!(unit_id = %id, "Cache miss");
        let unit = self.next.find_by_id(id).await?;
        self.index.add(unit.clone())?;
        Ok(unit)
    }

    async fn find_by_ids(&self, ids: &[UnitId]) -> UnitCacheResult<Vec<Unit>> {
        resolve_by_ids(&self.index, &self.next, ids).await
    }

    async fn fetch_all(&self) -> UnitCacheResult<Vec<Unit>> {
        let units = self.next.fetch_all().await?;
        let refreshed = self.index.refresh_present(&units)?;
        tracing::debug!(
            fetched = units.len(),
            refreshed,
            "Cache refreshed cached entries from full fetch"
        );
        Ok(units)
    }
}

//! Unbounded in-memory mirror of every unit the process has seen.
//!
//! Reads are served from the mirror when possible; writes go to the next
//! layer first and are recorded locally only once it accepts them. The map
//! lock is never held while the next layer is being called.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use unitcache_core::{
    RawContent, StorageError, Unit, UnitCacheError, UnitCacheResult, UnitId, UnitStore,
};

use crate::fan_out::{resolve_by_ids, BatchLayer};
use crate::stats::{CacheStats, LayerCounters};

/// The mirror's map, guarded by a single reader/writer lock.
#[derive(Debug, Default)]
struct MirrorIndex {
    units: RwLock<HashMap<UnitId, Unit>>,
    counters: LayerCounters,
}

impl MirrorIndex {
    fn read(&self) -> UnitCacheResult<RwLockReadGuard<'_, HashMap<UnitId, Unit>>> {
        self.units
            .read()
            .map_err(|_| UnitCacheError::Storage(StorageError::LockPoisoned))
    }

    fn write(&self) -> UnitCacheResult<RwLockWriteGuard<'_, HashMap<UnitId, Unit>>> {
        self.units
            .write()
            .map_err(|_| UnitCacheError::Storage(StorageError::LockPoisoned))
    }

    fn get(&self, id: &UnitId) -> UnitCacheResult<Option<Unit>> {
        let unit = self.read()?.get(id).cloned();
        self.counters
            .record_lookups(1, usize::from(unit.is_some()));
        Ok(unit)
    }

    fn insert(&self, unit: Unit) -> UnitCacheResult<()> {
        self.write()?.insert(unit.id.clone(), unit);
        Ok(())
    }

    fn remove(&self, id: &UnitId) -> UnitCacheResult<()> {
        self.write()?.remove(id);
        Ok(())
    }
}

impl BatchLayer for MirrorIndex {
    fn read_batch(&self, ids: &[UnitId]) -> UnitCacheResult<Vec<Unit>> {
        let found: Vec<Unit> = {
            let units = self.read()?;
            ids.iter().filter_map(|id| units.get(id).cloned()).collect()
        };
        self.counters.record_lookups(ids.len(), found.len());
        Ok(found)
    }

    fn write_batch(&self, units: &[Unit]) -> UnitCacheResult<()> {
        let mut stored = self.write()?;
        for unit in units {
            stored.insert(unit.id.clone(), unit.clone());
        }
        Ok(())
    }
}

/// Read-through, write-through mirror over the next layer.
///
/// The mirror never evicts: entries leave only through [`UnitStore::delete`].
#[derive(Debug)]
pub struct MirrorStore<S> {
    next: S,
    index: MirrorIndex,
}

impl<S: UnitStore> MirrorStore<S> {
    /// Create an empty mirror in front of `next`.
    pub fn new(next: S) -> Self {
        Self {
            next,
            index: MirrorIndex::default(),
        }
    }

    /// The layer this mirror delegates to.
    pub fn next(&self) -> &S {
        &self.next
    }

    /// Number of mirrored units.
    pub fn len(&self) -> usize {
        self.index.read().map(|units| units.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is mirrored, without counting as a lookup.
    pub fn contains(&self, id: &UnitId) -> bool {
        self.index
            .read()
            .map(|units| units.contains_key(id))
            .unwrap_or(false)
    }

    pub fn stats(&self) -> CacheStats {
        self.index.counters.snapshot(self.len())
    }
}

#[async_trait]
impl<S: UnitStore> UnitStore for MirrorStore<S> {
    async fn create(&self, unit: &Unit) -> UnitCacheResult<()> {
        self.next.create(unit).await?;
        self.index.insert(unit.clone())
    }

    async fn update(&self, id: &UnitId, data: RawContent) -> UnitCacheResult<Unit> {
        let updated = self.next.update(id, data).await?;
        self.index.insert(updated.clone())?;
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

        tracing::debug!(unit_id = %id, "Mirror miss");
        let unit = self.next.find_by_id(id).await?;
        self.index.insert(unit.clone())?;
        Ok(unit)
    }

    async fn find_by_ids(&self, ids: &[UnitId]) -> UnitCacheResult<Vec<Unit>> {
        resolve_by_ids(&self.index, &self.next, ids).await
    }

    async fn fetch_all(&self) -> UnitCacheResult<Vec<Unit>> {
        let units = self.next.fetch_all().await?;
        self.index.write_batch(&units)?;
        tracing::debug!(count = units.len(), "Mirror refreshed from full fetch");
        Ok(units)
    }
}

//! In-memory stand-in for the durable unit store.
//!
//! Behaves like the SQL-backed store: insert-if-absent on create, `NotFound`
//! on single-key misses, `IN (...)` semantics on batch lookups. Every call is
//! counted so tests can assert exactly how much traffic reached the bottom of
//! a cache stack.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;
use unitcache_core::{
    RawContent, StorageError, Unit, UnitCacheError, UnitCacheResult, UnitId, UnitStore,
};

/// The six contract operations, used to address counters and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    FindById,
    FindByIds,
    FetchAll,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::FindById,
        Operation::FindByIds,
        Operation::FetchAll,
    ];

    fn index(self) -> usize {
        match self {
            Operation::Create => 0,
            Operation::Update => 1,
            Operation::Delete => 2,
            Operation::FindById => 3,
            Operation::FindByIds => 4,
            Operation::FetchAll => 5,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Operation::Create => "units.Create",
            Operation::Update => "units.Update",
            Operation::Delete => "units.Delete",
            Operation::FindById => "units.FindByID",
            Operation::FindByIds => "units.FindByIDs",
            Operation::FetchAll => "units.FetchAll",
        }
    }
}

/// In-memory persistent store for testing.
#[derive(Debug, Default)]
pub struct MockPersistentStore {
    units: RwLock<BTreeMap<UnitId, Unit>>,
    calls: [AtomicU64; 6],
    find_by_ids_requests: Mutex<Vec<Vec<UnitId>>>,
    failures: Mutex<HashMap<Operation, StorageError>>,
    fetch_latency: Mutex<Option<Duration>>,
}

impl MockPersistentStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `units`.
    pub fn with_units(units: impl IntoIterator<Item = Unit>) -> Self {
        let store = Self::new();
        store.seed(units);
        store
    }

    /// Insert units directly, bypassing counters.
    pub fn seed(&self, units: impl IntoIterator<Item = Unit>) {
        let mut stored = self.units.write().unwrap_or_else(PoisonError::into_inner);
        for unit in units {
            stored.insert(unit.id.clone(), unit);
        }
    }

    /// Number of stored units.
    pub fn len(&self) -> usize {
        self.units.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.units.read().unwrap_or_else(PoisonError::into_inner).contains_key(id)
    }

    /// How many times `op` has been invoked.
    pub fn calls(&self, op: Operation) -> u64 {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    /// Invocations across all operations.
    pub fn total_calls(&self) -> u64 {
        Operation::ALL.iter().map(|op| self.calls(*op)).sum()
    }

    /// Zero every counter and forget recorded batch requests.
    pub fn reset_calls(&self) {
        for counter in &self.calls {
            counter.store(0, Ordering::SeqCst);
        }
        self.find_by_ids_requests.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// The id lists passed to `find_by_ids`, in call order.
    pub fn find_by_ids_requests(&self) -> Vec<Vec<UnitId>> {
        self.find_by_ids_requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Make every subsequent call to `op` fail with `error`.
    pub fn fail(&self, op: Operation, error: StorageError) {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner).insert(op, error);
    }

    /// Make `op` fail with a generic upstream error.
    pub fn fail_upstream(&self, op: Operation) {
        self.fail(op, StorageError::upstream(op.name(), "connection refused"));
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Delay every `fetch_all` by `latency`.
    pub fn set_fetch_latency(&self, latency: Duration) {
        *self.fetch_latency.lock().unwrap_or_else(PoisonError::into_inner) = Some(latency);
    }

    fn enter(&self, op: Operation) -> UnitCacheResult<()> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);
        let failures = self
            .failures
            .lock()
            .map_err(|_| UnitCacheError::Storage(StorageError::LockPoisoned))?;
        match failures.get(&op) {
            Some(err) => Err(UnitCacheError::Storage(err.clone())),
            None => Ok(()),
        }
    }

    fn read(
        &self,
    ) -> UnitCacheResult<std::sync::RwLockReadGuard<'_, BTreeMap<UnitId, Unit>>> {
        self.units
            .read()
            .map_err(|_| UnitCacheError::Storage(StorageError::LockPoisoned))
    }

    fn write(
        &self,
    ) -> UnitCacheResult<std::sync::RwLockWriteGuard<'_, BTreeMap<UnitId, Unit>>> {
        self.units
            .write()
            .map_err(|_| UnitCacheError::Storage(StorageError::LockPoisoned))
    }
}

#[async_trait]
impl UnitStore for MockPersistentStore {
    async fn create(&self, unit: &Unit) -> UnitCacheResult<()> {
        self.enter(Operation::Create)?;
        self.write()?
            .entry(unit.id.clone())
            .or_insert_with(|| unit.clone());
        Ok(())
    }

    async fn update(&self, id: &UnitId, data: RawContent) -> UnitCacheResult<Unit> {
        self.enter(Operation::Update)?;
        let mut units = self.write()?;
        let stored = units
            .get_mut(id)
            .ok_or_else(|| UnitCacheError::Storage(StorageError::not_found(id)))?;
        stored.data = data;
        Ok(stored.clone())
    }

    async fn delete(&self, id: &UnitId) -> UnitCacheResult<()> {
        self.enter(Operation::Delete)?;
        self.write()?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UnitCacheError::Storage(StorageError::not_found(id)))
    }

    async fn find_by_id(&self, id: &UnitId) -> UnitCacheResult<Unit> {
        self.enter(Operation::FindById)?;
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| UnitCacheError::Storage(StorageError::not_found(id)))
    }

    async fn find_by_ids(&self, ids: &[UnitId]) -> UnitCacheResult<Vec<Unit>> {
        self.find_by_ids_requests
            .lock()
            .map_err(|_| UnitCacheError::Storage(StorageError::LockPoisoned))?
            .push(ids.to_vec());
        self.enter(Operation::FindByIds)?;
        let units = self.read()?;
        let mut found: Vec<Unit> = Vec::with_capacity(ids.len());
        for id in ids {
            if found.iter().any(|u| &u.id == id) {
                continue;
            }
            if let Some(unit) = units.get(id) {
                found.push(unit.clone());
            }
        }
        Ok(found)
    }

    async fn fetch_all(&self) -> UnitCacheResult<Vec<Unit>> {
        self.enter(Operation::FetchAll)?;
        let latency = *self
            .fetch_latency
            .lock()
            .map_err(|_| UnitCacheError::Storage(StorageError::LockPoisoned))?;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self.read()?.values().cloned().collect())
    }
}

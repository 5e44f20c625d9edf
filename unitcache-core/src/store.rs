//! The six-operation unit store contract.
//!
//! The persistent layer implements it, and so does every cache layer stacked
//! on top of it. A layer holds an explicit reference to the next layer and
//! forwards each operation itself; nothing is delegated implicitly.

use crate::entities::Unit;
use crate::error::UnitCacheResult;
use crate::identity::{RawContent, UnitId};
use async_trait::async_trait;
use std::sync::Arc;

/// Async store contract shared by the persistent layer and every cache.
///
/// # Semantics
///
/// - `create` is insert-if-absent: a duplicate id is a silent no-op, not an error.
/// - `update`, `delete` and `find_by_id` report `StorageError::NotFound` for an
///   absent id. `update` returns the stored unit with its original `created_at`.
/// - `find_by_ids` returns whichever of the requested units exist; absent ids
///   are simply missing from the result.
/// - `fetch_all` returns every stored unit.
#[async_trait]
pub trait UnitStore: Send + Sync {
    /// Insert a unit unless one with the same id already exists.
    async fn create(&self, unit: &Unit) -> UnitCacheResult<()>;

    /// Replace the payload of an existing unit.
    async fn update(&self, id: &UnitId, data: RawContent) -> UnitCacheResult<Unit>;

    /// Remove a unit.
    async fn delete(&self, id: &UnitId) -> UnitCacheResult<()>;

    /// Get a unit by ID.
    async fn find_by_id(&self, id: &UnitId) -> UnitCacheResult<Unit>;

    /// Get every unit among `ids` that exists.
    async fn find_by_ids(&self, ids: &[UnitId]) -> UnitCacheResult<Vec<Unit>>;

    /// Get every unit.
    async fn fetch_all(&self) -> UnitCacheResult<Vec<Unit>>;
}

#[async_trait]
impl<S: UnitStore + ?Sized> UnitStore for Arc<S> {
    async fn create(&self, unit: &Unit) -> UnitCacheResult<()> {
        (**self).create(unit).await
    }

    async fn update(&self, id: &UnitId, data: RawContent) -> UnitCacheResult<Unit> {
        (**self).update(id, data).await
    }

    async fn delete(&self, id: &UnitId) -> UnitCacheResult<()> {
        (**self).delete(id).await
    }

    async fn find_by_id(&self, id: &UnitId) -> UnitCacheResult<Unit> {
        (**self).find_by_id(id).await
    }

    async fn find_by_ids(&self, ids: &[UnitId]) -> UnitCacheResult<Vec<Unit>> {
        (**self).find_by_ids(ids).await
    }

    async fn fetch_all(&self) -> UnitCacheResult<Vec<Unit>> {
        (**self).fetch_all().await
    }
}

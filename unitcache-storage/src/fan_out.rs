//! Multi-key lookup shared by every cache layer.
//!
//! A layer answers what it can from local state, asks the next layer for the
//! rest in a single call, and keeps whatever comes back. Both the mirror and
//! the bounded cache resolve batches through [`resolve_by_ids`]; they differ
//! only in the [`BatchLayer`] they supply.

use std::collections::HashSet;

use unitcache_core::{Unit, UnitCacheResult, UnitId, UnitStore};

/// Local state of one cache layer, as seen by the batch resolver.
pub trait BatchLayer: Send + Sync {
    /// Return the units among `ids` held locally, in `ids` order.
    fn read_batch(&self, ids: &[UnitId]) -> UnitCacheResult<Vec<Unit>>;

    /// Keep `units` locally.
    fn write_batch(&self, units: &[Unit]) -> UnitCacheResult<()>;
}

/// Drop repeated ids, keeping the first occurrence of each.
pub fn deduplicate_ids(ids: &[UnitId]) -> Vec<UnitId> {
    let mut seen: HashSet<&UnitId> = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Resolve `ids` against `layer`, delegating misses to `next`.
///
/// The result lists local hits first, then units fetched from `next`; it
/// follows discovery order, not request order, and never repeats a unit. If
/// the delegated lookup fails the whole call fails, local hits included.
pub async fn resolve_by_ids<L, N>(
    layer: &L,
    next: &N,
    ids: &[UnitId],
) -> UnitCacheResult<Vec<Unit>>
where
    L: BatchLayer + ?Sized,
    N: UnitStore + ?Sized,
{
    let unique_ids = deduplicate_ids(ids);

    let mut units = layer.read_batch(&unique_ids)?;
    if units.len() == unique_ids.len() {
        tracing::trace!(requested = unique_ids.len(), "Batch fully served locally");
        return Ok(units);
    }

    let found: HashSet<&UnitId> = units.iter().map(|u| &u.id).collect();
    let missed_ids: Vec<UnitId> = unique_ids
        .iter()
        .filter(|id| !found.contains(id))
        .cloned()
        .collect();
    if missed_ids.is_empty() {
        return Ok(units);
    }

    tracing::debug!(
        requested = unique_ids.len(),
        hits = units.len(),
        misses = missed_ids.len(),
        "Delegating batch misses to next layer"
    );

    let fetched = next.find_by_ids(&missed_ids).await?;
    layer.write_batch(&fetched)?;
    units.extend(fetched);

    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;
    use unitcache_test_utils::generators::{arb_id_batch, arb_unit_set};
    use unitcache_test_utils::{make_unit, unit_ids, MockPersistentStore, Operation};

    #[derive(Default)]
    struct MapLayer {
        units: RwLock<HashMap<UnitId, Unit>>,
    }

    impl MapLayer {
        fn holding(units: &[Unit]) -> Self {
            let layer = Self::default();
            layer.write_batch(units).unwrap();
            layer
        }

        fn len(&self) -> usize {
            self.units.read().unwrap().len()
        }
    }

    impl BatchLayer for MapLayer {
        fn read_batch(&self, ids: &[UnitId]) -> UnitCacheResult<Vec<Unit>> {
            let units = self.units.read().unwrap();
            Ok(ids.iter().filter_map(|id| units.get(id).cloned()).collect())
        }

        fn write_batch(&self, units: &[Unit]) -> UnitCacheResult<()> {
            let mut stored = self.units.write().unwrap();
            for unit in units {
                stored.insert(unit.id.clone(), unit.clone());
            }
            Ok(())
        }
    }

    fn ids(raw: &[&str]) -> Vec<UnitId> {
        raw.iter().map(|id| UnitId::from(*id)).collect()
    }

    #[test]
    fn test_deduplicate_ids_keeps_first_occurrence() {
        assert_eq!(
            deduplicate_ids(&ids(&["b", "a", "b", "c", "a"])),
            ids(&["b", "a", "c"])
        );
        assert!(deduplicate_ids(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_partial_hit_delegates_only_misses() {
        let (a, b, c, d) = (make_unit("a"), make_unit("b"), make_unit("c"), make_unit("d"));
        let layer = MapLayer::holding(&[a.clone(), b.clone(), c.clone()]);
        let next = MockPersistentStore::with_units([a.clone(), b.clone(), c.clone(), d.clone()]);

        let units = resolve_by_ids(&layer, &next, &ids(&["a", "b", "c", "d"]))
            .await
            .unwrap();

        assert_eq!(units, vec![a, b, c, d]);
        assert_eq!(next.find_by_ids_requests(), vec![ids(&["d"])]);
        assert_eq!(layer.len(), 4);
    }

    #[tokio::test]
    async fn test_duplicates_fully_served_locally() {
        let (a, b) = (make_unit("a"), make_unit("b"));
        let layer = MapLayer::holding(&[a.clone(), b.clone()]);
        let next = MockPersistentStore::new();

        let units = resolve_by_ids(&layer, &next, &ids(&["a", "a", "b"]))
            .await
            .unwrap();

        assert_eq!(units, vec![a, b]);
        assert_eq!(next.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_duplicated_miss_is_requested_once() {
        let a = make_unit("a");
        let layer = MapLayer::default();
        let next = MockPersistentStore::with_units([a.clone()]);

        let units = resolve_by_ids(&layer, &next, &ids(&["a", "a"])).await.unwrap();

        assert_eq!(units, vec![a]);
        assert_eq!(next.find_by_ids_requests(), vec![ids(&["a"])]);
    }

    #[tokio::test]
    async fn test_results_follow_discovery_order() {
        let (a, b) = (make_unit("a"), make_unit("b"));
        let layer = MapLayer::holding(&[b.clone()]);
        let next = MockPersistentStore::with_units([a.clone(), b.clone()]);

        let units = resolve_by_ids(&layer, &next, &ids(&["a", "b"])).await.unwrap();

        assert_eq!(units, vec![b, a]);
    }

    #[tokio::test]
    async fn test_ids_absent_everywhere_are_omitted() {
        let a = make_unit("a");
        let layer = MapLayer::holding(&[a.clone()]);
        let next = MockPersistentStore::new();

        let units = resolve_by_ids(&layer, &next, &ids(&["a", "ghost"])).await.unwrap();

        assert_eq!(units, vec![a]);
        assert_eq!(layer.len(), 1);
    }

    #[tokio::test]
    async fn test_next_layer_failure_discards_local_hits() {
        let a = make_unit("a");
        let layer = MapLayer::holding(&[a]);
        let next = MockPersistentStore::with_units([make_unit("b")]);
        next.fail_upstream(Operation::FindByIds);

        let result = resolve_by_ids(&layer, &next, &ids(&["a", "b"])).await;

        assert!(result.is_err());
        assert_eq!(layer.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_request_makes_no_calls() {
        let layer = MapLayer::default();
        let next = MockPersistentStore::new();

        let units = resolve_by_ids(&layer, &next, &[]).await.unwrap();

        assert!(units.is_empty());
        assert_eq!(next.total_calls(), 0);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn runtime() -> tokio::runtime::Runtime {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// Every requested id that exists somewhere comes back exactly once,
            /// and the next layer only ever sees ids the local layer lacked.
            #[test]
            fn prop_resolves_each_existing_id_once(
                local in arb_unit_set(),
                remote in arb_unit_set(),
                request in arb_id_batch(),
            ) {
                let layer = MapLayer::holding(&local);
                let next = MockPersistentStore::with_units(remote.clone());

                let units = runtime()
                    .block_on(resolve_by_ids(&layer, &next, &request))
                    .unwrap();

                let returned = unit_ids(&units);
                prop_assert_eq!(returned.len(), deduplicate_ids(&returned).len());

                let local_ids = unit_ids(&local);
                let remote_ids = unit_ids(&remote);
                for id in deduplicate_ids(&request) {
                    let exists = local_ids.contains(&id) || remote_ids.contains(&id);
                    prop_assert_eq!(returned.contains(&id), exists);
                }

                for batch in next.find_by_ids_requests() {
                    prop_assert!(!batch.is_empty());
                    for id in batch {
                        prop_assert!(!local_ids.contains(&id));
                    }
                }
            }
        }
    }
}

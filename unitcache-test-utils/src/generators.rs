//! Proptest generators.

use crate::fixtures::make_unit;
use proptest::prelude::*;
use unitcache_core::{Unit, UnitId};

/// Ids drawn from a small alphabet so batches collide often.
pub fn arb_unit_id() -> impl Strategy<Value = UnitId> {
    "[a-h]".prop_map(UnitId::new)
}

pub fn arb_unit() -> impl Strategy<Value = Unit> {
    (arb_unit_id(), prop::collection::vec(any::<u8>(), 0..32)).prop_map(|(id, data)| {
        let mut unit = make_unit(id.as_str());
        unit.data = data;
        unit
    })
}

/// A request batch that may contain duplicates.
pub fn arb_id_batch() -> impl Strategy<Value = Vec<UnitId>> {
    prop::collection::vec(arb_unit_id(), 0..12)
}

/// A set of distinct units (last write per id wins).
pub fn arb_unit_set() -> impl Strategy<Value = Vec<Unit>> {
    prop::collection::vec(arb_unit(), 0..8).prop_map(|units| {
        let mut distinct: Vec<Unit> = Vec::new();
        for unit in units {
            distinct.retain(|u| u.id != unit.id);
            distinct.push(unit);
        }
        distinct
    })
}

//! Fixtures for building units in tests.

use chrono::{TimeZone, Utc};
use unitcache_core::{Unit, UnitId};

/// A unit with a payload derived from its id and a fixed creation time.
pub fn make_unit(id: &str) -> Unit {
    Unit {
        id: UnitId::from(id),
        data: format!("data-{id}").into_bytes(),
        created_at: Utc
            .with_ymd_and_hms(2023, 1, 23, 14, 24, 39)
            .single()
            .unwrap_or_else(Utc::now),
    }
}

/// `count` units named `unit-000`, `unit-001`, ...
pub fn make_units(count: usize) -> Vec<Unit> {
    (0..count).map(|i| make_unit(&format!("unit-{i:03}"))).collect()
}

/// Ids of the given units, in order.
pub fn unit_ids(units: &[Unit]) -> Vec<UnitId> {
    units.iter().map(|u| u.id.clone()).collect()
}

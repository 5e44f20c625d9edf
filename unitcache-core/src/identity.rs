//! Identity types for units

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Raw binary content for BYTEA storage.
pub type RawContent = Vec<u8>;

/// Opaque unit identifier.
///
/// Identifiers are generated by callers before creation; the stores never
/// interpret them beyond equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UnitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for UnitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate a fresh unit identifier (UUIDv7 text, timestamp-sortable).
pub fn new_unit_id() -> UnitId {
    UnitId(Uuid::now_v7().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_id_display_matches_inner() {
        let id = UnitId::from("unit-42");
        assert_eq!(id.to_string(), "unit-42");
        assert_eq!(id.as_str(), "unit-42");
        assert_eq!(id.into_inner(), "unit-42".to_string());
    }

    #[test]
    fn test_new_unit_ids_are_distinct() {
        let first = new_unit_id();
        let second = new_unit_id();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }
}

//! The unit entity

use crate::identity::{RawContent, Timestamp, UnitId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// An opaque binary blob with an identifier and creation time.
///
/// `created_at` is owned by the persistent layer: it is fixed when the unit
/// is first inserted and every later update hands back the original value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub data: RawContent,
    pub created_at: Timestamp,
}

impl Unit {
    /// Build a unit stamped with the current time.
    pub fn new(id: impl Into<UnitId>, data: impl Into<RawContent>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            created_at: Utc::now(),
        }
    }

    /// Same identity and creation time, replacement payload.
    pub fn with_data(&self, data: RawContent) -> Self {
        Self {
            id: self.id.clone(),
            data,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_data_preserves_identity() {
        let unit = Unit::new("a", b"first".to_vec());
        let updated = unit.with_data(b"second".to_vec());

        assert_eq!(updated.id, unit.id);
        assert_eq!(updated.created_at, unit.created_at);
        assert_eq!(updated.data, b"second".to_vec());
    }
}

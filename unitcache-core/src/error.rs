//! Error types for unit cache operations

use crate::identity::UnitId;
use thiserror::Error;

/// Storage layer errors.
///
/// Every cache layer passes these through unchanged from the layer below.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Unit not found: {id}")]
    NotFound { id: UnitId },

    #[error("Upstream failure in {operation}: {reason}")]
    Upstream { operation: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn not_found(id: &UnitId) -> Self {
        Self::NotFound { id: id.clone() }
    }

    pub fn upstream(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Upstream {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all unit cache errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnitCacheError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl UnitCacheError {
    /// True when the error reports an absent unit.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound { .. }))
    }
}

/// Result type alias for unit cache operations.
pub type UnitCacheResult<T> = Result<T, UnitCacheError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::not_found(&UnitId::from("missing-unit"));
        let msg = format!("{}", err);
        assert!(msg.contains("Unit not found"));
        assert!(msg.contains("missing-unit"));
    }

    #[test]
    fn test_storage_error_display_upstream() {
        let err = StorageError::upstream("units.FetchAll", "connection reset");
        let msg = format!("{}", err);
        assert!(msg.contains("units.FetchAll"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "lru_cache_size".to_string(),
            value: "0".to_string(),
            reason: "must be greater than 0".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("lru_cache_size"));
        assert!(msg.contains("must be greater than 0"));
    }

    #[test]
    fn test_unit_cache_error_from_variants() {
        let storage = UnitCacheError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, UnitCacheError::Storage(_)));

        let config = UnitCacheError::from(ConfigError::InvalidValue {
            field: "refresh_period".to_string(),
            value: "0s".to_string(),
            reason: "must be positive".to_string(),
        });
        assert!(matches!(config, UnitCacheError::Config(_)));
    }

    #[test]
    fn test_is_not_found() {
        let not_found = UnitCacheError::from(StorageError::not_found(&UnitId::from("x")));
        assert!(not_found.is_not_found());

        let upstream = UnitCacheError::from(StorageError::upstream("op", "boom"));
        assert!(!upstream.is_not_found());
    }
}

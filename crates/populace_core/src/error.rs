//! Error types for the spawning engine.
//!
//! Placement rejections are ordinary control flow and never show up here.
//! These variants describe broken contracts in externally supplied data,
//! which the spawn pass logs loudly and then routes around.

use populace_data::{CategoryId, KindId};
use thiserror::Error;

/// Main error type for populace_core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpawnError {
    /// A candidate table named a kind the registry does not know.
    #[error("Unknown entity kind: {0}")]
    UnknownKind(KindId),

    /// A kind was registered twice with conflicting definitions.
    #[error("Duplicate entity kind: {0}")]
    DuplicateKind(KindId),

    /// A kind references a category missing from the spawn settings.
    #[error("Kind {kind} references unknown category {category}")]
    UnknownCategory { kind: KindId, category: CategoryId },
}

/// Result type alias for populace_core operations.
pub type Result<T> = std::result::Result<T, SpawnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpawnError::UnknownKind(KindId::new("ghast"));
        assert_eq!(err.to_string(), "Unknown entity kind: ghast");
    }

    #[test]
    fn test_unknown_category_display() {
        let err = SpawnError::UnknownCategory {
            kind: KindId::new("cod"),
            category: CategoryId::new("fish"),
        };
        assert!(err.to_string().contains("unknown category fish"));
    }
}

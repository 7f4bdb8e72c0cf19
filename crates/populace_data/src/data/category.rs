use super::block::FluidKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque population category name ("monster", "creature", ...).
///
/// The engine attaches no meaning to the name; caps, budgets and ordering
/// come from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Where an entity kind is allowed to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacementType {
    /// Stands on a supporting block with two clear cells of headroom.
    #[default]
    OnGround,
    /// Swims in the given fluid; the cell above must not be a solid conductor.
    InFluid { fluid: FluidKind },
    /// Lives submerged in the given fluid medium without further checks.
    InMedium { fluid: FluidKind },
    NoRestriction,
}

impl PlacementType {
    /// Kinds that live in a fluid tolerate fluid inside their bounding box.
    #[must_use]
    pub fn tolerates_fluid(self) -> bool {
        matches!(
            self,
            PlacementType::InFluid { .. } | PlacementType::InMedium { .. }
        )
    }
}

/// Surface height map queried when looking for a column's top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heightmap {
    /// Highest non-air block.
    #[default]
    WorldSurface,
    /// Highest block that blocks motion or holds fluid.
    MotionBlocking,
    /// Highest solid block below any fluid.
    OceanFloor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_serde_tagged() {
        let p: PlacementType =
            serde_json::from_str(r#"{"type":"in_fluid","fluid":"water"}"#).unwrap();
        assert_eq!(
            p,
            PlacementType::InFluid {
                fluid: FluidKind::Water
            }
        );
        assert!(p.tolerates_fluid());
        assert!(!PlacementType::OnGround.tolerates_fluid());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(CategoryId::from("monster").to_string(), "monster");
    }
}

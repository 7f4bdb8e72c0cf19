use super::category::CategoryId;
use super::geometry::{RegionKey, Vec3};
use super::weighted::{Weight, WeightedList};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }
    };
}

string_id!(
    /// Registered entity kind name.
    KindId
);
string_id!(
    /// Terrain/biome name used to index candidate tables.
    BiomeId
);
string_id!(
    /// Name of a structure volume (fortress, monument, ...).
    StructureId
);

/// Density cost of an entity kind: the charge it contributes to the
/// potential field and the largest potential change it tolerates when
/// spawning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnCost {
    pub energy_budget: f64,
    pub charge: f64,
}

impl SpawnCost {
    #[must_use]
    pub const fn new(energy_budget: f64, charge: f64) -> Self {
        Self {
            energy_budget,
            charge,
        }
    }
}

/// One entry of a candidate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnCandidate {
    pub kind: KindId,
    pub weight: u32,
    pub min_cluster: u32,
    pub max_cluster: u32,
    /// Overrides the world's per-position cost for this kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_cost: Option<SpawnCost>,
}

impl SpawnCandidate {
    #[must_use]
    pub fn new(kind: impl Into<String>, weight: u32, min_cluster: u32, max_cluster: u32) -> Self {
        Self {
            kind: KindId::new(kind),
            weight,
            min_cluster,
            max_cluster: max_cluster.max(min_cluster),
            spawn_cost: None,
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: SpawnCost) -> Self {
        self.spawn_cost = Some(cost);
        self
    }
}

impl Weight for SpawnCandidate {
    fn weight(&self) -> u32 {
        self.weight
    }
}

/// Shared empty list returned by tables with nothing to offer.
pub static NO_CANDIDATES: WeightedList<SpawnCandidate> = WeightedList::empty();

/// A placement proposal handed back to the host world, which owns the
/// actual entity creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub kind: KindId,
    pub category: CategoryId,
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub region: RegionKey,
    /// Cost resolved when the placement was accepted. Hosts keep it on the
    /// entity so later censuses charge the field with the same value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_cost: Option<SpawnCost>,
}

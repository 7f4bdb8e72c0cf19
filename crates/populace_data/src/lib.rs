//! Plain data shared by the spawning engine and its hosts.

pub mod data;

pub use data::block::{BlockState, FluidKind, Hazard};
pub use data::candidate::{
    BiomeId, KindId, SpawnCandidate, SpawnCost, SpawnRequest, StructureId, NO_CANDIDATES,
};
pub use data::category::{CategoryId, Heightmap, PlacementType};
pub use data::geometry::{Aabb, BlockPos, RegionKey, Vec3, REGION_SIZE};
pub use data::weighted::{Weight, WeightedList};

//! The host-world surface the spawner reads from.
//!
//! The engine owns no blocks, entities or viewers. Everything it needs is
//! pulled through [`SpawnWorld`]; the host keeps ownership of entity
//! lifecycles and applies the returned requests itself.

use crate::registry::EntityKind;
use populace_data::{
    Aabb, BiomeId, BlockPos, BlockState, CategoryId, Heightmap, KindId, RegionKey, SpawnCost,
    StructureId, Vec3,
};
use rand::RngCore;

/// A live entity as seen by the population scan.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveEntity {
    pub kind: KindId,
    /// `None` for kinds outside every spawning category.
    pub category: Option<CategoryId>,
    pub position: Vec3,
    /// Persistent entities never count toward caps.
    pub persistent: bool,
    /// Cost recorded at placement; `None` defers to [`SpawnWorld::spawn_cost`].
    pub spawn_cost: Option<SpawnCost>,
}

/// Someone whose presence keeps regions simulated and spawns happening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewer {
    pub position: Vec3,
    pub spectator: bool,
}

impl Viewer {
    #[must_use]
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            spectator: false,
        }
    }

    /// Squared horizontal distance to a point.
    #[must_use]
    pub fn horizontal_distance_sqr(&self, x: f64, z: f64) -> f64 {
        let dx = self.position.x - x;
        let dz = self.position.z - z;
        dx * dx + dz * dz
    }
}

/// Read access to the world the spawner places entities into.
pub trait SpawnWorld {
    fn live_entities(&self) -> impl Iterator<Item = LiveEntity> + '_;

    fn viewers(&self) -> impl Iterator<Item = Viewer> + '_;

    /// Regions eligible for spawning this tick.
    fn active_regions(&self) -> impl Iterator<Item = RegionKey> + '_;

    fn is_region_active(&self, region: RegionKey) -> bool;

    fn block_at(&self, pos: BlockPos) -> BlockState;

    /// Y of the first free cell above the column's top block for the given
    /// height map.
    fn height_at(&self, x: i32, z: i32, heightmap: Heightmap) -> i32;

    fn min_build_height(&self) -> i32;

    fn max_build_height(&self) -> i32;

    /// The world's shared spawn point.
    fn spawn_anchor(&self) -> BlockPos;

    fn biome_at(&self, pos: BlockPos) -> BiomeId;

    /// Structure volume containing `pos`, if any.
    fn structure_at(&self, _pos: BlockPos) -> Option<StructureId> {
        None
    }

    /// Density cost of `kind` at `pos`, from the local biome.
    fn spawn_cost(&self, pos: BlockPos, kind: &KindId) -> Option<SpawnCost>;

    /// Combined light level in `[0, 15]`.
    fn light_at(&self, pos: BlockPos) -> u8;

    fn within_border(&self, _pos: BlockPos) -> bool {
        true
    }

    fn has_ceiling(&self) -> bool {
        false
    }

    /// Kind-specific spawn rules beyond the category rules.
    fn check_spawn_rules(&self, _kind: &EntityKind, _pos: BlockPos, _rng: &mut dyn RngCore) -> bool {
        true
    }

    /// No full-collision block overlaps the box.
    fn no_collision(&self, aabb: &Aabb) -> bool {
        aabb.covered_blocks()
            .all(|pos| !self.block_at(pos).full_collision)
    }

    fn contains_fluid(&self, aabb: &Aabb) -> bool {
        aabb.covered_blocks().any(|pos| self.block_at(pos).has_fluid())
    }

    /// Closest non-spectator viewer, optionally limited to `max_range`.
    fn nearest_viewer(&self, pos: Vec3, max_range: Option<f64>) -> Option<Viewer> {
        let limit = max_range.map(|r| r * r);
        let mut best: Option<(f64, Viewer)> = None;
        for viewer in self.viewers().filter(|v| !v.spectator) {
            let d = viewer.position.distance_sqr(pos);
            if limit.is_some_and(|l| d >= l) {
                continue;
            }
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, viewer));
            }
        }
        best.map(|(_, v)| v)
    }
}

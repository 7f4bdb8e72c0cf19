//! A flat, column-based sandbox world hosting the spawner.
//!
//! Terrain is generated from [`WorldConfig`]: flat ground, water-filled
//! lakes, rectangular biome and structure areas. Individual blocks can be
//! overridden afterwards. Entities live in a `hecs` ECS.

use crate::model::config::WorldConfig;
use populace_core::registry::KindRegistry;
use populace_core::world::{LiveEntity, SpawnWorld, Viewer};
use populace_data::{
    BiomeId, BlockPos, BlockState, CategoryId, Heightmap, KindId, RegionKey, SpawnCost,
    SpawnRequest, StructureId, Vec3, REGION_SIZE,
};
use rand::Rng;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Stable identity of a spawned entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    pub id: Uuid,
    pub born_tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec3);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facing {
    pub yaw: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub kind: KindId,
    pub category: Option<CategoryId>,
    pub persistent: bool,
    pub spawn_cost: Option<SpawnCost>,
}

pub struct GridWorld {
    pub config: WorldConfig,
    pub ecs: hecs::World,
    pub tick: u64,
    viewers: Vec<Viewer>,
    active: BTreeSet<RegionKey>,
    overrides: HashMap<BlockPos, BlockState>,
    /// Extra height of columns raised by overrides.
    raised: HashMap<(i32, i32), i32>,
    costs: HashMap<BiomeId, HashMap<KindId, SpawnCost>>,
    light_overrides: HashMap<BlockPos, u8>,
}

impl GridWorld {
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            ecs: hecs::World::new(),
            tick: 0,
            viewers: Vec::new(),
            active: BTreeSet::new(),
            overrides: HashMap::new(),
            raised: HashMap::new(),
            costs: HashMap::new(),
            light_overrides: HashMap::new(),
        }
    }

    pub fn set_costs(&mut self, costs: HashMap<BiomeId, HashMap<KindId, SpawnCost>>) {
        self.costs = costs;
    }

    pub fn add_viewer(&mut self, viewer: Viewer) {
        self.viewers.push(viewer);
        self.refresh_active();
    }

    pub fn clear_viewers(&mut self) {
        self.viewers.clear();
        self.refresh_active();
    }

    /// Replaces one block. Non-air blocks above the ground raise the column.
    pub fn set_block(&mut self, pos: BlockPos, state: BlockState) {
        self.overrides.insert(pos, state);
        if !state.is_air() && pos.y >= self.config.ground_height {
            let top = self.raised.entry((pos.x, pos.z)).or_insert(pos.y + 1);
            *top = (*top).max(pos.y + 1);
        }
    }

    pub fn set_light(&mut self, pos: BlockPos, level: u8) {
        self.light_overrides.insert(pos, level.min(15));
    }

    /// Recomputes the regions within simulation distance of a viewer.
    pub fn refresh_active(&mut self) {
        let radius = self.config.simulation_distance;
        let mut active = BTreeSet::new();
        for viewer in self.viewers.iter().filter(|v| !v.spectator) {
            let center = viewer.position.block_pos().region();
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    let region = RegionKey::new(center.x + dx, center.z + dz);
                    if self.region_in_world(region) {
                        active.insert(region);
                    }
                }
            }
        }
        self.active = active;
    }

    #[must_use]
    pub fn region_in_world(&self, region: RegionKey) -> bool {
        region.x >= 0
            && region.z >= 0
            && region.x < self.config.regions_x
            && region.z < self.config.regions_z
    }

    /// Adds an entity directly, bypassing the spawner.
    pub fn insert_entity(&mut self, body: Body, position: Vec3) -> hecs::Entity {
        self.ecs.spawn((body, Position(position)))
    }

    /// Applies one spawn request and returns the new entity's identity.
    pub fn apply_request<R: Rng>(
        &mut self,
        request: &SpawnRequest,
        registry: &KindRegistry,
        persistent: bool,
        rng: &mut R,
    ) -> Uuid {
        let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        let body = Body {
            kind: request.kind.clone(),
            category: registry.category_of(&request.kind).cloned(),
            persistent,
            spawn_cost: request.spawn_cost,
        };
        self.ecs.spawn((
            Identity {
                id,
                born_tick: self.tick,
            },
            body,
            Position(request.position),
            Facing {
                yaw: request.yaw,
                pitch: request.pitch,
            },
        ));
        id
    }

    /// Looks up a spawned entity by identity.
    #[must_use]
    pub fn find(&self, id: Uuid) -> Option<LiveEntity> {
        let mut query = self.ecs.query::<(&Identity, &Body, &Position)>();
        query
            .iter()
            .find(|(_, (identity, _, _))| identity.id == id)
            .map(|(_, (_, body, pos))| live(body, pos))
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.ecs.len() as usize
    }

    /// Entities of `category`, persistent ones included.
    #[must_use]
    pub fn count_category(&self, category: &CategoryId) -> usize {
        let mut query = self.ecs.query::<&Body>();
        query
            .iter()
            .filter(|(_, body)| body.category.as_ref() == Some(category))
            .count()
    }

    fn lake_depth(&self, x: i32, z: i32) -> i32 {
        self.config
            .lakes
            .iter()
            .find(|l| l.area.contains(x, z))
            .map_or(0, |l| l.depth)
    }

    fn terrain_at(&self, pos: BlockPos) -> BlockState {
        if pos.y < self.config.min_build_height {
            return BlockState::BARRIER;
        }
        if pos.y >= self.config.max_build_height {
            return BlockState::AIR;
        }
        let ground = self.config.ground_height;
        let depth = self.lake_depth(pos.x, pos.z);
        if pos.y < ground - depth {
            BlockState::SOLID
        } else if pos.y < ground {
            BlockState::WATER
        } else {
            BlockState::AIR
        }
    }
}

fn live(body: &Body, pos: &Position) -> LiveEntity {
    LiveEntity {
        kind: body.kind.clone(),
        category: body.category.clone(),
        position: pos.0,
        persistent: body.persistent,
        spawn_cost: body.spawn_cost,
    }
}

impl SpawnWorld for GridWorld {
    fn live_entities(&self) -> impl Iterator<Item = LiveEntity> + '_ {
        let mut query = self.ecs.query::<(&Body, &Position)>();
        let entities: Vec<LiveEntity> = query.iter().map(|(_, (b, p))| live(b, p)).collect();
        entities.into_iter()
    }

    fn viewers(&self) -> impl Iterator<Item = Viewer> + '_ {
        self.viewers.iter().copied()
    }

    fn active_regions(&self) -> impl Iterator<Item = RegionKey> + '_ {
        self.active.iter().copied()
    }

    fn is_region_active(&self, region: RegionKey) -> bool {
        self.active.contains(&region)
    }

    fn block_at(&self, pos: BlockPos) -> BlockState {
        self.overrides
            .get(&pos)
            .copied()
            .unwrap_or_else(|| self.terrain_at(pos))
    }

    fn height_at(&self, x: i32, z: i32, heightmap: Heightmap) -> i32 {
        let ground = self.config.ground_height;
        let natural = match heightmap {
            Heightmap::WorldSurface | Heightmap::MotionBlocking => ground,
            Heightmap::OceanFloor => ground - self.lake_depth(x, z),
        };
        self.raised
            .get(&(x, z))
            .map_or(natural, |&top| top.max(natural))
    }

    fn min_build_height(&self) -> i32 {
        self.config.min_build_height
    }

    fn max_build_height(&self) -> i32 {
        self.config.max_build_height
    }

    fn spawn_anchor(&self) -> BlockPos {
        let [x, y, z] = self.config.spawn_anchor;
        BlockPos::new(x, y, z)
    }

    fn biome_at(&self, pos: BlockPos) -> BiomeId {
        self.config
            .biomes
            .iter()
            .find(|b| b.area.contains(pos.x, pos.z))
            .map_or_else(|| self.config.default_biome.clone(), |b| b.biome.clone())
    }

    fn structure_at(&self, pos: BlockPos) -> Option<StructureId> {
        self.config
            .structures
            .iter()
            .find(|s| s.area.contains(pos.x, pos.z) && pos.y >= s.min_y && pos.y < s.max_y)
            .map(|s| s.structure.clone())
    }

    fn spawn_cost(&self, pos: BlockPos, kind: &KindId) -> Option<SpawnCost> {
        self.costs
            .get(&self.biome_at(pos))
            .and_then(|c| c.get(kind))
            .copied()
    }

    fn light_at(&self, pos: BlockPos) -> u8 {
        if let Some(&level) = self.light_overrides.get(&pos) {
            return level;
        }
        if pos.y >= self.height_at(pos.x, pos.z, Heightmap::WorldSurface) {
            self.config.sky_light
        } else {
            0
        }
    }

    fn within_border(&self, pos: BlockPos) -> bool {
        let max_x = self.config.regions_x * REGION_SIZE;
        let max_z = self.config.regions_z * REGION_SIZE;
        pos.x >= 0 && pos.z >= 0 && pos.x < max_x && pos.z < max_z
    }

    fn has_ceiling(&self) -> bool {
        self.config.has_ceiling
    }
}

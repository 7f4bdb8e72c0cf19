pub mod macros;

use populace_core::candidates::{BiomeCandidateTable, BiomeSpawns, StructureSpawns, TableConfig};
use populace_core::config::{CategorySettings, SpawnSettings};
use populace_core::registry::{EntityKind, KindRegistry};
use populace_core::spawner::{run_spawn_pass, SpawnGate, SpawnReport};
use populace_core::{LocalCapTracker, ViewerDensityCapper, Viewer};
use populace_data::{
    BiomeId, BlockPos, BlockState, CategoryId, KindId, PlacementType, SpawnCandidate, StructureId,
    Vec3,
};
use populace_lib::model::config::{Area, StructureArea, WorldConfig};
use populace_lib::model::world::{Body, GridWorld};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

type WorldMod = Box<dyn FnOnce(&mut GridWorld)>;

/// Everything a spawn pass needs, built together.
#[allow(dead_code)]
pub struct Fixture {
    pub world: GridWorld,
    pub table: BiomeCandidateTable,
    pub registry: KindRegistry,
    pub settings: SpawnSettings,
}

#[allow(dead_code)]
impl Fixture {
    pub fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    /// One pass with per-viewer local caps and every category allowed.
    pub fn pass(&self, rng: &mut ChaCha8Rng) -> SpawnReport {
        let mut caps = ViewerDensityCapper::from_world(&self.world, &self.settings);
        self.pass_with(&mut caps, SpawnGate::ALL, rng)
    }

    pub fn pass_with<L: LocalCapTracker>(
        &self,
        caps: &mut L,
        gate: SpawnGate,
        rng: &mut ChaCha8Rng,
    ) -> SpawnReport {
        run_spawn_pass(
            &self.world,
            &self.table,
            &self.registry,
            &self.settings,
            caps,
            gate,
            rng,
        )
    }

    /// Applies a report's requests to the world.
    pub fn apply(&mut self, report: &SpawnReport, rng: &mut ChaCha8Rng) {
        for request in &report.requests {
            self.world
                .apply_request(request, &self.registry, false, rng);
        }
    }

    pub fn category(&self, id: &str) -> &CategorySettings {
        self.settings
            .category(&CategoryId::new(id))
            .expect("category not configured in fixture")
    }
}

#[allow(dead_code)]
pub struct WorldBuilder {
    config: WorldConfig,
    settings: SpawnSettings,
    kinds: Vec<EntityKind>,
    candidates: HashMap<CategoryId, Vec<SpawnCandidate>>,
    biomes: Vec<BiomeSpawns>,
    structures: Vec<StructureSpawns>,
    table_mods: Vec<Box<dyn FnOnce(&mut TableConfig)>>,
    world_mods: Vec<WorldMod>,
}

#[allow(dead_code)]
impl WorldBuilder {
    /// Flat 4x4-region plains world with a single `hostile` category, no
    /// viewers and the world spawn point far outside the map.
    pub fn new() -> Self {
        let config = WorldConfig {
            regions_x: 4,
            regions_z: 4,
            simulation_distance: 0,
            spawn_anchor: [10_000, 64, 10_000],
            biomes: Vec::new(),
            lakes: Vec::new(),
            ..WorldConfig::default()
        };
        let settings = SpawnSettings {
            categories: vec![CategorySettings::new("hostile", 70, false, false)],
            ..SpawnSettings::default()
        };
        Self {
            config,
            settings,
            kinds: vec![EntityKind::new(
                "zombie",
                "hostile",
                PlacementType::OnGround,
                0.6,
                1.95,
            )],
            candidates: HashMap::new(),
            biomes: Vec::new(),
            structures: Vec::new(),
            table_mods: Vec::new(),
            world_mods: Vec::new(),
        }
    }

    pub fn with_world<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut WorldConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_settings<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SpawnSettings),
    {
        modifier(&mut self.settings);
        self
    }

    pub fn with_category(mut self, category: CategorySettings) -> Self {
        self.settings.categories.retain(|c| c.id != category.id);
        self.settings.categories.push(category);
        self
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kinds.retain(|k| k.id != kind.id);
        self.kinds.push(kind);
        self
    }

    /// Adds a candidate to the default biome's list for `category`.
    pub fn with_candidate(mut self, category: &str, candidate: SpawnCandidate) -> Self {
        self.candidates
            .entry(CategoryId::new(category))
            .or_default()
            .push(candidate);
        self
    }

    pub fn with_biome(mut self, biome: BiomeSpawns) -> Self {
        self.biomes.push(biome);
        self
    }

    pub fn with_table<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut TableConfig) + 'static,
    {
        self.table_mods.push(Box::new(modifier));
        self
    }

    /// Covers `area` from `min_y` up to `max_y` with a structure that
    /// imposes `candidates` on `category`.
    pub fn with_structure(
        mut self,
        id: &str,
        area: Area,
        (min_y, max_y): (i32, i32),
        category: &str,
        candidates: Vec<SpawnCandidate>,
    ) -> Self {
        self.config.structures.push(StructureArea {
            structure: StructureId::new(id),
            area,
            min_y,
            max_y,
        });
        self.structures.push(StructureSpawns {
            id: StructureId::new(id),
            category: CategoryId::new(category),
            candidates,
        });
        self
    }

    pub fn with_viewer(mut self, x: f64, y: f64, z: f64) -> Self {
        self.world_mods.push(Box::new(move |world| {
            world.add_viewer(Viewer::at(x, y, z));
        }));
        self
    }

    pub fn with_spectator(mut self, x: f64, y: f64, z: f64) -> Self {
        self.world_mods.push(Box::new(move |world| {
            let mut viewer = Viewer::at(x, y, z);
            viewer.spectator = true;
            world.add_viewer(viewer);
        }));
        self
    }

    pub fn with_block(mut self, pos: BlockPos, state: BlockState) -> Self {
        self.world_mods.push(Box::new(move |world| {
            world.set_block(pos, state);
        }));
        self
    }

    pub fn with_light(mut self, pos: BlockPos, level: u8) -> Self {
        self.world_mods.push(Box::new(move |world| {
            world.set_light(pos, level);
        }));
        self
    }

    /// Places an existing entity of `kind` in `category`.
    pub fn with_entity(mut self, kind: &str, category: &str, x: f64, y: f64, z: f64) -> Self {
        let body = Body {
            kind: KindId::new(kind),
            category: Some(CategoryId::new(category)),
            persistent: false,
            spawn_cost: None,
        };
        self.world_mods.push(Box::new(move |world| {
            world.insert_entity(body, Vec3::new(x, y, z));
        }));
        self
    }

    pub fn with_persistent_entity(mut self, kind: &str, category: &str, x: f64, y: f64, z: f64) -> Self {
        let body = Body {
            kind: KindId::new(kind),
            category: Some(CategoryId::new(category)),
            persistent: true,
            spawn_cost: None,
        };
        self.world_mods.push(Box::new(move |world| {
            world.insert_entity(body, Vec3::new(x, y, z));
        }));
        self
    }

    pub fn build(self) -> Fixture {
        let default_biome = self.config.default_biome.clone();
        let mut biomes = self.biomes;
        if !self.candidates.is_empty() {
            biomes.push(BiomeSpawns {
                id: default_biome,
                creature_probability: 0.1,
                candidates: self.candidates,
                costs: HashMap::new(),
            });
        }
        let mut table_config = TableConfig {
            biomes,
            structures: self.structures,
            suppressions: Vec::new(),
        };
        for modifier in self.table_mods {
            modifier(&mut table_config);
        }

        let registry = KindRegistry::from_kinds(self.kinds, &self.settings)
            .expect("fixture kinds reference unknown categories");
        let mut world = GridWorld::new(self.config);
        world.set_costs(
            table_config
                .biomes
                .iter()
                .map(|b| (b.id.clone(), b.costs.clone()))
                .collect(),
        );
        for modifier in self.world_mods {
            modifier(&mut world);
        }

        Fixture {
            world,
            table: BiomeCandidateTable::new(table_config),
            registry,
            settings: self.settings,
        }
    }
}

/// Biome entry with a single candidate list.
#[allow(dead_code)]
pub fn biome(id: &str, category: &str, candidates: Vec<SpawnCandidate>) -> BiomeSpawns {
    BiomeSpawns {
        id: BiomeId::new(id),
        creature_probability: 0.1,
        candidates: HashMap::from([(CategoryId::new(category), candidates)]),
        costs: HashMap::new(),
    }
}

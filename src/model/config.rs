use anyhow::Context;
use populace_core::candidates::{BiomeSpawns, StructureSpawns, SuppressionRule, TableConfig};
use populace_core::config::SpawnSettings;
use populace_core::registry::EntityKind;
use populace_data::{
    BiomeId, CategoryId, FluidKind, Hazard, PlacementType, SpawnCandidate, SpawnCost, StructureId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Axis-aligned block rectangle `[x0, x1) x [z0, z1)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub x0: i32,
    pub z0: i32,
    pub x1: i32,
    pub z1: i32,
}

impl Area {
    #[must_use]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.x0 && x < self.x1 && z >= self.z0 && z < self.z1
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BiomeArea {
    pub biome: BiomeId,
    pub area: Area,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Lake {
    pub area: Area,
    pub depth: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StructureArea {
    pub structure: StructureId,
    pub area: Area,
    pub min_y: i32,
    pub max_y: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// World size in regions along X.
    pub regions_x: i32,
    /// World size in regions along Z.
    pub regions_z: i32,
    pub min_build_height: i32,
    pub max_build_height: i32,
    /// Y of the first free cell above flat ground.
    pub ground_height: i32,
    pub sky_light: u8,
    /// Chessboard radius, in regions, simulated around each viewer.
    pub simulation_distance: i32,
    pub spawn_anchor: [i32; 3],
    pub has_ceiling: bool,
    pub default_biome: BiomeId,
    #[serde(default)]
    pub biomes: Vec<BiomeArea>,
    #[serde(default)]
    pub lakes: Vec<Lake>,
    #[serde(default)]
    pub structures: Vec<StructureArea>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            regions_x: 16,
            regions_z: 16,
            min_build_height: 0,
            max_build_height: 256,
            ground_height: 64,
            sky_light: 15,
            simulation_distance: 4,
            spawn_anchor: [8, 64, 8],
            has_ceiling: false,
            default_biome: BiomeId::new("plains"),
            biomes: vec![BiomeArea {
                biome: BiomeId::new("river"),
                area: Area {
                    x0: 0,
                    z0: 120,
                    x1: 256,
                    z1: 136,
                },
            }],
            lakes: vec![Lake {
                area: Area {
                    x0: 0,
                    z0: 120,
                    x1: 256,
                    z1: 136,
                },
                depth: 6,
            }],
            structures: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub position: [f64; 3],
    #[serde(default)]
    pub spectator: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub seed: u64,
    pub spawn_friendlies: bool,
    pub spawn_enemies: bool,
    /// Chance per tick that an entity between the two despawn distances
    /// despawns.
    pub random_despawn_chance: f32,
    /// Run region generation population for regions seen for the first time.
    pub populate_new_regions: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            spawn_friendlies: true,
            spawn_enemies: true,
            random_despawn_chance: 1.0 / 800.0,
            populate_new_regions: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub world: WorldConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub spawn: SpawnSettings,
    pub kinds: Vec<EntityKind>,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub viewers: Vec<ViewerConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            simulation: SimulationConfig::default(),
            spawn: SpawnSettings::default(),
            kinds: default_kinds(),
            table: default_table(),
            viewers: vec![ViewerConfig {
                position: [128.0, 64.0, 128.0],
                spectator: false,
            }],
        }
    }
}

impl AppConfig {
    /// Loads `path`, writing the defaults there when the file is missing.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let default = Self::default();
            let text = toml::to_string(&default).context("Failed to serialize default config")?;
            if let Err(e) = fs::write(path, text) {
                tracing::warn!(error = %e, path = %path.display(), "Could not write default config");
            }
            return Ok(default);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the world layout and every nested section.
    pub fn validate(&self) -> anyhow::Result<()> {
        let world = &self.world;
        anyhow::ensure!(
            world.regions_x > 0 && world.regions_z > 0,
            "World must span at least one region"
        );
        anyhow::ensure!(
            world.min_build_height < world.ground_height
                && world.ground_height < world.max_build_height,
            "Ground height must lie inside the build range"
        );
        anyhow::ensure!(world.sky_light <= 15, "Sky light must be in [0, 15]");
        anyhow::ensure!(
            world.simulation_distance >= 0,
            "Simulation distance must be non-negative"
        );
        for lake in &world.lakes {
            anyhow::ensure!(
                lake.depth > 0 && world.ground_height - lake.depth > world.min_build_height,
                "Lake depth must be positive and above the world floor"
            );
        }
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.simulation.random_despawn_chance),
            "Random despawn chance must be in [0.0, 1.0]"
        );

        self.spawn.validate()?;
        for kind in &self.kinds {
            anyhow::ensure!(
                kind.width > 0.0 && kind.height > 0.0,
                "Kind {}: dimensions must be positive",
                kind.id
            );
            anyhow::ensure!(
                kind.max_cluster_size > 0,
                "Kind {}: max cluster size must be positive",
                kind.id
            );
            if let Some(category) = &kind.category {
                anyhow::ensure!(
                    self.spawn.category(category).is_some(),
                    "Kind {}: unknown category {}",
                    kind.id,
                    category
                );
            }
        }
        for biome in &self.table.biomes {
            anyhow::ensure!(
                (0.0..1.0).contains(&biome.creature_probability),
                "Biome {}: creature probability must be in [0.0, 1.0)",
                biome.id
            );
            for candidate in biome.candidates.values().flatten() {
                check_cluster_bounds(candidate, &biome.id)?;
            }
        }
        for structure in &self.table.structures {
            for candidate in &structure.candidates {
                check_cluster_bounds(candidate, &structure.id)?;
            }
        }
        for rule in &self.table.suppressions {
            anyhow::ensure!(
                (0.0..=1.0).contains(&rule.chance),
                "Suppression of {} in {}: chance must be in [0.0, 1.0]",
                rule.category,
                rule.biome
            );
        }
        Ok(())
    }
}

fn check_cluster_bounds(
    candidate: &SpawnCandidate,
    list: &impl std::fmt::Display,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        candidate.min_cluster > 0 && candidate.min_cluster <= candidate.max_cluster,
        "{}: cluster bounds of {} must satisfy 0 < min <= max, got {}..{}",
        list,
        candidate.kind,
        candidate.min_cluster,
        candidate.max_cluster
    );
    Ok(())
}

fn water(fluid: FluidKind) -> PlacementType {
    PlacementType::InFluid { fluid }
}

fn lava_walker() -> PlacementType {
    PlacementType::InMedium {
        fluid: FluidKind::Lava,
    }
}

fn default_kinds() -> Vec<EntityKind> {
    vec![
        EntityKind::new("zombie", "monster", PlacementType::OnGround, 0.6, 1.95),
        EntityKind::new("skeleton", "monster", PlacementType::OnGround, 0.6, 1.99),
        EntityKind::new("spider", "monster", PlacementType::OnGround, 1.4, 0.9),
        EntityKind::new("cow", "creature", PlacementType::OnGround, 0.9, 1.4),
        EntityKind::new("sheep", "creature", PlacementType::OnGround, 0.9, 1.3),
        EntityKind::new("bat", "ambient", PlacementType::NoRestriction, 0.5, 0.9)
            .with_max_cluster_size(8),
        EntityKind::new("squid", "water_creature", water(FluidKind::Water), 0.8, 0.8),
        EntityKind::new("salmon", "water_ambient", water(FluidKind::Water), 0.7, 0.4)
            .with_max_cluster_size(5),
        EntityKind::new("strider", "creature", lava_walker(), 0.9, 1.7).immune_to(Hazard::Fire),
    ]
}

fn default_table() -> TableConfig {
    let monster = CategoryId::new("monster");
    let creature = CategoryId::new("creature");
    let plains = BiomeSpawns {
        id: BiomeId::new("plains"),
        creature_probability: 0.1,
        candidates: HashMap::from([
            (
                monster.clone(),
                vec![
                    SpawnCandidate::new("zombie", 95, 4, 4),
                    SpawnCandidate::new("skeleton", 100, 4, 4),
                    SpawnCandidate::new("spider", 100, 4, 4),
                ],
            ),
            (
                creature.clone(),
                vec![
                    SpawnCandidate::new("cow", 8, 4, 4),
                    SpawnCandidate::new("sheep", 12, 4, 4),
                ],
            ),
            (
                CategoryId::new("ambient"),
                vec![SpawnCandidate::new("bat", 10, 8, 8)],
            ),
        ]),
        costs: HashMap::new(),
    };
    let river = BiomeSpawns {
        id: BiomeId::new("river"),
        creature_probability: 0.1,
        candidates: HashMap::from([
            (
                CategoryId::new("water_creature"),
                vec![SpawnCandidate::new("squid", 2, 1, 4)],
            ),
            (
                CategoryId::new("water_ambient"),
                vec![SpawnCandidate::new("salmon", 5, 1, 5)],
            ),
            (
                monster,
                vec![SpawnCandidate::new("zombie", 95, 4, 4)],
            ),
        ]),
        costs: HashMap::from([(
            populace_data::KindId::new("squid"),
            SpawnCost::new(0.12, 0.7),
        )]),
    };
    TableConfig {
        biomes: vec![plains, river],
        structures: Vec::<StructureSpawns>::new(),
        suppressions: vec![SuppressionRule {
            category: CategoryId::new("water_ambient"),
            biome: BiomeId::new("river"),
            chance: 0.98,
        }],
    }
}

//! Weighted spawn lists keyed by location.
//!
//! A [`CandidateTable`] answers "what may appear here" for a category. The
//! bundled [`BiomeCandidateTable`] indexes lists by biome, lets structures
//! override them, and can veto draws with configured suppression rules.

use crate::world::SpawnWorld;
use populace_data::{
    BiomeId, BlockPos, CategoryId, KindId, SpawnCandidate, SpawnCost, StructureId, WeightedList,
    NO_CANDIDATES,
};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default chance per roll of adding another passive cluster during region
/// generation.
pub const DEFAULT_CREATURE_PROBABILITY: f32 = 0.1;

fn default_creature_probability() -> f32 {
    DEFAULT_CREATURE_PROBABILITY
}

/// Source of spawn candidates for a world.
pub trait CandidateTable {
    /// Candidates for `category` at `pos`, biased by local terrain.
    fn candidates_at<W: SpawnWorld>(
        &self,
        world: &W,
        pos: BlockPos,
        category: &CategoryId,
    ) -> &WeightedList<SpawnCandidate>;

    /// Unbiased list used to re-check a drawn candidate at a jittered
    /// position.
    fn candidates_in_region<W: SpawnWorld>(
        &self,
        world: &W,
        pos: BlockPos,
        category: &CategoryId,
    ) -> &WeightedList<SpawnCandidate> {
        self.candidates_at(world, pos, category)
    }

    /// Replacement list when `pos` lies in a structure that dictates its own
    /// spawns.
    fn structure_override<W: SpawnWorld>(
        &self,
        _world: &W,
        _pos: BlockPos,
        _category: &CategoryId,
    ) -> Option<&WeightedList<SpawnCandidate>> {
        None
    }

    /// Vetoes a draw before it happens.
    fn suppress_draw<W: SpawnWorld>(
        &self,
        _world: &W,
        _pos: BlockPos,
        _category: &CategoryId,
        _rng: &mut dyn RngCore,
    ) -> bool {
        false
    }

    /// Chance per roll of another cluster during region generation.
    fn creature_probability<W: SpawnWorld>(&self, _world: &W, _pos: BlockPos) -> f32 {
        DEFAULT_CREATURE_PROBABILITY
    }
}

/// A drawn candidate plus whether it came from a structure override.
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub candidate: SpawnCandidate,
    pub overridden: bool,
}

/// Draws one candidate for `category` at `pos`.
pub fn draw_candidate<W, T, R>(
    table: &T,
    world: &W,
    pos: BlockPos,
    category: &CategoryId,
    rng: &mut R,
) -> Option<Draw>
where
    W: SpawnWorld,
    T: CandidateTable + ?Sized,
    R: Rng,
{
    if table.suppress_draw(world, pos, category, rng) {
        return None;
    }
    let (list, overridden) = match table.structure_override(world, pos, category) {
        Some(list) => (list, true),
        None => (table.candidates_at(world, pos, category), false),
    };
    list.pick(rng).map(|candidate| Draw {
        candidate: candidate.clone(),
        overridden,
    })
}

/// Whether `candidate` is still on offer at `pos`.
pub fn offers<W, T>(
    table: &T,
    world: &W,
    pos: BlockPos,
    category: &CategoryId,
    candidate: &SpawnCandidate,
) -> bool
where
    W: SpawnWorld,
    T: CandidateTable + ?Sized,
{
    match table.structure_override(world, pos, category) {
        Some(list) => list.contains(candidate),
        None => table
            .candidates_in_region(world, pos, category)
            .contains(candidate),
    }
}

/// Spawn data of one biome.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BiomeSpawns {
    pub id: BiomeId,
    #[serde(default = "default_creature_probability")]
    pub creature_probability: f32,
    #[serde(default)]
    pub candidates: HashMap<CategoryId, Vec<SpawnCandidate>>,
    /// Density costs of kinds in this biome.
    #[serde(default)]
    pub costs: HashMap<KindId, SpawnCost>,
}

/// Spawn list a structure imposes on one category.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StructureSpawns {
    pub id: StructureId,
    pub category: CategoryId,
    pub candidates: Vec<SpawnCandidate>,
}

/// Vetoes `chance` of the draws of `category` in `biome`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SuppressionRule {
    pub category: CategoryId,
    pub biome: BiomeId,
    pub chance: f32,
}

/// Serialized form of a [`BiomeCandidateTable`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct TableConfig {
    pub biomes: Vec<BiomeSpawns>,
    pub structures: Vec<StructureSpawns>,
    pub suppressions: Vec<SuppressionRule>,
}

#[derive(Debug, Clone, Default)]
struct BiomeEntry {
    creature_probability: f32,
    lists: HashMap<CategoryId, WeightedList<SpawnCandidate>>,
    costs: HashMap<KindId, SpawnCost>,
}

/// Candidate table indexed by the biome at the queried position.
#[derive(Debug, Clone, Default)]
pub struct BiomeCandidateTable {
    biomes: HashMap<BiomeId, BiomeEntry>,
    structures: HashMap<(StructureId, CategoryId), WeightedList<SpawnCandidate>>,
    suppressions: Vec<SuppressionRule>,
}

impl BiomeCandidateTable {
    #[must_use]
    pub fn new(config: TableConfig) -> Self {
        let biomes = config
            .biomes
            .into_iter()
            .map(|b| {
                let entry = BiomeEntry {
                    creature_probability: b.creature_probability,
                    lists: b
                        .candidates
                        .into_iter()
                        .map(|(category, list)| (category, WeightedList::new(list)))
                        .collect(),
                    costs: b.costs,
                };
                (b.id, entry)
            })
            .collect();
        let structures = config
            .structures
            .into_iter()
            .map(|s| ((s.id, s.category), WeightedList::new(s.candidates)))
            .collect();
        Self {
            biomes,
            structures,
            suppressions: config.suppressions,
        }
    }

    /// List for a biome, ignoring position.
    #[must_use]
    pub fn list(&self, biome: &BiomeId, category: &CategoryId) -> &WeightedList<SpawnCandidate> {
        self.biomes
            .get(biome)
            .and_then(|b| b.lists.get(category))
            .unwrap_or(&NO_CANDIDATES)
    }

    /// Configured cost of `kind` in `biome`.
    #[must_use]
    pub fn spawn_cost(&self, biome: &BiomeId, kind: &KindId) -> Option<SpawnCost> {
        self.biomes.get(biome).and_then(|b| b.costs.get(kind)).copied()
    }

    /// Every kind named anywhere in the table.
    pub fn kinds(&self) -> impl Iterator<Item = &KindId> + '_ {
        let from_biomes = self
            .biomes
            .values()
            .flat_map(|b| b.lists.values())
            .flat_map(|l| l.iter());
        from_biomes
            .chain(self.structures.values().flat_map(|l| l.iter()))
            .map(|c| &c.kind)
    }
}

impl CandidateTable for BiomeCandidateTable {
    fn candidates_at<W: SpawnWorld>(
        &self,
        world: &W,
        pos: BlockPos,
        category: &CategoryId,
    ) -> &WeightedList<SpawnCandidate> {
        self.list(&world.biome_at(pos), category)
    }

    fn structure_override<W: SpawnWorld>(
        &self,
        world: &W,
        pos: BlockPos,
        category: &CategoryId,
    ) -> Option<&WeightedList<SpawnCandidate>> {
        let structure = world.structure_at(pos)?;
        self.structures.get(&(structure, category.clone()))
    }

    fn suppress_draw<W: SpawnWorld>(
        &self,
        world: &W,
        pos: BlockPos,
        category: &CategoryId,
        rng: &mut dyn RngCore,
    ) -> bool {
        if !self.suppressions.iter().any(|r| &r.category == category) {
            return false;
        }
        let biome = world.biome_at(pos);
        self.suppressions
            .iter()
            .find(|r| &r.category == category && r.biome == biome)
            .is_some_and(|rule| rng.gen::<f32>() < rule.chance)
    }

    fn creature_probability<W: SpawnWorld>(&self, world: &W, pos: BlockPos) -> f32 {
        self.biomes
            .get(&world.biome_at(pos))
            .map_or(DEFAULT_CREATURE_PROBABILITY, |b| b.creature_probability)
    }
}

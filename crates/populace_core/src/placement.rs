//! Staged acceptance of a concrete (kind, position) pair.
//!
//! Stages run in a fixed order and stop at the first rejection. Position
//! stages (viewer distance, spawn anchor, region) only need the block
//! position and run before a candidate is drawn; the remaining stages need
//! the kind and run for every cluster member.

use crate::candidates::{offers, CandidateTable};
use crate::config::{CategorySettings, SpawnRule, SpawnSettings};
use crate::potential::PotentialField;
use crate::registry::EntityKind;
use crate::world::SpawnWorld;
use populace_data::{BlockPos, BlockState, PlacementType, RegionKey, SpawnCandidate, SpawnCost};
use rand::{Rng, RngCore};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Distance,
    SpawnAnchor,
    Region,
    Kind,
    Terrain,
    Collision,
    Rules,
    Budget,
}

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooCloseToViewer,
    TooFarFromViewers,
    NearSpawnAnchor,
    InactiveRegion,
    NotSpawnable,
    NotOffered,
    OutsideBorder,
    Terrain,
    Obstructed,
    RuleFailed,
    OverBudget,
}

impl Rejection {
    #[must_use]
    pub fn stage(self) -> Stage {
        match self {
            Rejection::TooCloseToViewer => Stage::Distance,
            Rejection::NearSpawnAnchor => Stage::SpawnAnchor,
            Rejection::InactiveRegion => Stage::Region,
            Rejection::TooFarFromViewers | Rejection::NotSpawnable | Rejection::NotOffered => {
                Stage::Kind
            }
            Rejection::OutsideBorder | Rejection::Terrain => Stage::Terrain,
            Rejection::Obstructed => Stage::Collision,
            Rejection::RuleFailed => Stage::Rules,
            Rejection::OverBudget => Stage::Budget,
        }
    }
}

pub type Verdict<T = ()> = Result<T, Rejection>;

/// How many checks entered each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounters {
    pub distance: u64,
    pub spawn_anchor: u64,
    pub region: u64,
    pub kind: u64,
    pub terrain: u64,
    pub collision: u64,
    pub rules: u64,
    pub budget: u64,
    pub accepted: u64,
}

impl StageCounters {
    pub fn enter(&mut self, stage: Stage) {
        *self.slot(stage) += 1;
    }

    #[must_use]
    pub fn entered(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Distance => self.distance,
            Stage::SpawnAnchor => self.spawn_anchor,
            Stage::Region => self.region,
            Stage::Kind => self.kind,
            Stage::Terrain => self.terrain,
            Stage::Collision => self.collision,
            Stage::Rules => self.rules,
            Stage::Budget => self.budget,
        }
    }

    /// Adds another pass's counts to these.
    pub fn absorb(&mut self, other: &StageCounters) {
        self.distance += other.distance;
        self.spawn_anchor += other.spawn_anchor;
        self.region += other.region;
        self.kind += other.kind;
        self.terrain += other.terrain;
        self.collision += other.collision;
        self.rules += other.rules;
        self.budget += other.budget;
        self.accepted += other.accepted;
    }

    fn slot(&mut self, stage: Stage) -> &mut u64 {
        match stage {
            Stage::Distance => &mut self.distance,
            Stage::SpawnAnchor => &mut self.spawn_anchor,
            Stage::Region => &mut self.region,
            Stage::Kind => &mut self.kind,
            Stage::Terrain => &mut self.terrain,
            Stage::Collision => &mut self.collision,
            Stage::Rules => &mut self.rules,
            Stage::Budget => &mut self.budget,
        }
    }
}

/// One cluster member awaiting validation.
#[derive(Debug, Clone, Copy)]
pub struct Attempt<'a> {
    pub kind: &'a EntityKind,
    pub candidate: &'a SpawnCandidate,
    pub category: &'a CategorySettings,
    pub pos: BlockPos,
    /// Squared distance to the nearest viewer.
    pub viewer_distance_sqr: f64,
    /// The candidate came from a structure override.
    pub overridden: bool,
}

/// Runs the placement stages and counts how far each check got.
#[derive(Debug, Clone)]
pub struct PlacementValidator<'s> {
    settings: &'s SpawnSettings,
    counters: StageCounters,
}

impl<'s> PlacementValidator<'s> {
    #[must_use]
    pub fn new(settings: &'s SpawnSettings) -> Self {
        Self {
            settings,
            counters: StageCounters::default(),
        }
    }

    #[must_use]
    pub fn counters(&self) -> &StageCounters {
        &self.counters
    }

    /// Position stages: viewer distance, spawn anchor exclusion and region
    /// membership.
    pub fn check_position<W: SpawnWorld>(
        &mut self,
        world: &W,
        pos: BlockPos,
        viewer_distance_sqr: f64,
        processing: RegionKey,
    ) -> Verdict {
        let distances = &self.settings.distances;

        self.counters.enter(Stage::Distance);
        let min = distances.min_viewer_distance;
        if viewer_distance_sqr <= min * min {
            return Err(Rejection::TooCloseToViewer);
        }

        self.counters.enter(Stage::SpawnAnchor);
        let exclusion = distances.spawn_anchor_exclusion;
        let anchor = world.spawn_anchor().center();
        if anchor.distance_sqr(pos.bottom_center()) < exclusion * exclusion {
            return Err(Rejection::NearSpawnAnchor);
        }

        self.counters.enter(Stage::Region);
        let region = pos.region();
        if region != processing && !world.is_region_active(region) {
            return Err(Rejection::InactiveRegion);
        }
        Ok(())
    }

    /// Kind stages. Returns the cost to charge into the field on success.
    pub fn check_candidate<W, T, R>(
        &mut self,
        world: &W,
        table: &T,
        field: &PotentialField,
        attempt: &Attempt<'_>,
        rng: &mut R,
    ) -> Verdict<Option<SpawnCost>>
    where
        W: SpawnWorld,
        T: CandidateTable + ?Sized,
        R: Rng,
    {
        let Attempt {
            kind,
            candidate,
            category,
            pos,
            viewer_distance_sqr,
            overridden,
        } = *attempt;

        self.counters.enter(Stage::Kind);
        if kind.category.is_none() || !kind.summonable {
            return Err(Rejection::NotSpawnable);
        }
        if !kind.can_spawn_far_from_viewers
            && !overridden
            && viewer_distance_sqr > category.despawn_distance_sqr()
        {
            return Err(Rejection::TooFarFromViewers);
        }
        if !offers(table, world, pos, &category.id, candidate) {
            return Err(Rejection::NotOffered);
        }

        self.counters.enter(Stage::Terrain);
        if kind.placement != PlacementType::NoRestriction && !world.within_border(pos) {
            return Err(Rejection::OutsideBorder);
        }
        if !is_spawn_position_ok(world, kind, pos) {
            return Err(Rejection::Terrain);
        }

        self.counters.enter(Stage::Collision);
        let aabb = kind.aabb_at(pos.bottom_center());
        if !world.no_collision(&aabb) {
            return Err(Rejection::Obstructed);
        }
        if !kind.placement.tolerates_fluid() && world.contains_fluid(&aabb) {
            return Err(Rejection::Obstructed);
        }

        self.counters.enter(Stage::Rules);
        if !category
            .rules
            .iter()
            .all(|rule| rule_passes(rule, world, pos, &mut *rng))
        {
            return Err(Rejection::RuleFailed);
        }
        if !world.check_spawn_rules(kind, pos, &mut *rng) {
            return Err(Rejection::RuleFailed);
        }

        self.counters.enter(Stage::Budget);
        let cost = candidate
            .spawn_cost
            .or_else(|| world.spawn_cost(pos, &kind.id));
        if let Some(cost) = cost {
            if field.potential_delta(pos, cost.charge) > cost.energy_budget {
                return Err(Rejection::OverBudget);
            }
        }

        self.counters.accepted += 1;
        Ok(cost)
    }
}

/// Terrain check for the kind's placement type.
pub fn is_spawn_position_ok<W: SpawnWorld>(world: &W, kind: &EntityKind, pos: BlockPos) -> bool {
    match kind.placement {
        PlacementType::NoRestriction => true,
        PlacementType::InFluid { fluid } => {
            world.block_at(pos).is_fluid_of(fluid) && !world.block_at(pos.above()).conductor
        }
        PlacementType::InMedium { fluid } => world.block_at(pos).is_fluid_of(fluid),
        PlacementType::OnGround => {
            if !world.block_at(pos.below()).spawn_support {
                return false;
            }
            is_valid_empty_spawn_block(&world.block_at(pos), kind)
                && is_valid_empty_spawn_block(&world.block_at(pos.above()), kind)
        }
    }
}

/// A cell an entity may occupy while spawning.
#[must_use]
pub fn is_valid_empty_spawn_block(state: &BlockState, kind: &EntityKind) -> bool {
    !state.full_collision
        && !state.signal_source
        && !state.has_fluid()
        && !state.prevents_spawning_inside
        && !kind.is_dangerous(state.hazard)
}

/// Evaluates one configured category rule.
pub fn rule_passes<W: SpawnWorld + ?Sized>(
    rule: &SpawnRule,
    world: &W,
    pos: BlockPos,
    rng: &mut dyn RngCore,
) -> bool {
    match *rule {
        SpawnRule::MaxLight { level } => world.light_at(pos) <= level,
        SpawnRule::MinLight { level } => world.light_at(pos) >= level,
        SpawnRule::BelowY { y } => pos.y < y,
        SpawnRule::AboveY { y } => pos.y >= y,
        SpawnRule::Chance { probability } => rng.gen::<f32>() < probability,
    }
}

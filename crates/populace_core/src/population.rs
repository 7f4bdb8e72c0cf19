use crate::local_cap::LocalCapTracker;
use crate::potential::PotentialField;
use crate::world::SpawnWorld;
use populace_data::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-category entity counts for one spawn pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounter {
    counts: BTreeMap<CategoryId, u32>,
}

/// What a census pass found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CensusSummary {
    pub counted: usize,
    pub skipped_persistent: usize,
    pub charges_seeded: usize,
}

impl PopulationCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans every live entity once.
    ///
    /// Persistent entities and entities without a category are skipped.
    /// Counted entities standing in an active region also seed `field` with
    /// their spawn cost charge and are reported to the local cap tracker.
    pub fn census<W: SpawnWorld, L: LocalCapTracker + ?Sized>(
        world: &W,
        field: &mut PotentialField,
        local_caps: &mut L,
    ) -> (Self, CensusSummary) {
        let mut counter = Self::new();
        let mut summary = CensusSummary::default();

        for entity in world.live_entities() {
            if entity.persistent {
                summary.skipped_persistent += 1;
                continue;
            }
            let Some(category) = entity.category else {
                continue;
            };

            let pos = entity.position.block_pos();
            let region = pos.region();
            if world.is_region_active(region) {
                let cost = entity
                    .spawn_cost
                    .or_else(|| world.spawn_cost(pos, &entity.kind));
                if let Some(cost) = cost {
                    if cost.charge != 0.0 {
                        field.add_charge(pos, cost.charge);
                        summary.charges_seeded += 1;
                    }
                }
                local_caps.record_existing(&category, region);
            }

            counter.increment(&category);
            summary.counted += 1;
        }

        (counter, summary)
    }

    pub fn increment(&mut self, category: &CategoryId) {
        *self.counts.entry(category.clone()).or_insert(0) += 1;
    }

    #[must_use]
    pub fn get(&self, category: &CategoryId) -> u32 {
        self.counts.get(category).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryId, u32)> {
        self.counts.iter().map(|(k, &v)| (k, v))
    }
}

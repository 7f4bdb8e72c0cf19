use crate::config::SpawnSettings;
use crate::world::{SpawnWorld, Viewer};
use populace_data::{CategoryId, RegionKey};
use std::collections::HashMap;

/// Neighbourhood cap checked alongside the global population counter.
pub trait LocalCapTracker {
    /// Whether one more entity of `category` may appear in `region`.
    fn can_spawn(&mut self, category: &CategoryId, region: RegionKey) -> bool;

    /// Records a successful placement.
    fn record_spawn(&mut self, category: &CategoryId, region: RegionKey);

    /// Records an entity found during the census.
    fn record_existing(&mut self, category: &CategoryId, region: RegionKey) {
        let _ = (category, region);
    }
}

/// Tracker that never refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl LocalCapTracker for Unbounded {
    fn can_spawn(&mut self, _category: &CategoryId, _region: RegionKey) -> bool {
        true
    }

    fn record_spawn(&mut self, _category: &CategoryId, _region: RegionKey) {}
}

/// Caps population around each viewer.
///
/// Every non-spectator viewer owns a tally per category covering the regions
/// whose centre lies within `local_cap_range` blocks horizontally. A region
/// may receive another entity while at least one viewer near it is under the
/// category's `max_per_region`; every entity in the region counts against all
/// viewers near it.
#[derive(Debug, Clone)]
pub struct ViewerDensityCapper {
    viewers: Vec<Viewer>,
    range_sqr: f64,
    caps: HashMap<CategoryId, u32>,
    tallies: Vec<HashMap<CategoryId, u32>>,
    near: HashMap<RegionKey, Vec<usize>>,
}

impl ViewerDensityCapper {
    #[must_use]
    pub fn new(viewers: Vec<Viewer>, settings: &SpawnSettings) -> Self {
        let viewers: Vec<Viewer> = viewers.into_iter().filter(|v| !v.spectator).collect();
        let range = settings.distances.local_cap_range;
        Self {
            tallies: vec![HashMap::new(); viewers.len()],
            viewers,
            range_sqr: range * range,
            caps: settings
                .categories
                .iter()
                .map(|c| (c.id.clone(), c.max_per_region))
                .collect(),
            near: HashMap::new(),
        }
    }

    pub fn from_world<W: SpawnWorld>(world: &W, settings: &SpawnSettings) -> Self {
        Self::new(world.viewers().collect(), settings)
    }

    fn viewers_near(&mut self, region: RegionKey) -> &[usize] {
        let viewers = &self.viewers;
        let range_sqr = self.range_sqr;
        self.near.entry(region).or_insert_with(|| {
            let (cx, cz) = region.center_xz();
            viewers
                .iter()
                .enumerate()
                .filter(|(_, v)| v.horizontal_distance_sqr(cx, cz) < range_sqr)
                .map(|(i, _)| i)
                .collect()
        })
    }

    fn bump(&mut self, category: &CategoryId, region: RegionKey) {
        let near = self.viewers_near(region).to_vec();
        for idx in near {
            *self.tallies[idx].entry(category.clone()).or_insert(0) += 1;
        }
    }

    /// Tally of one viewer, by index into the viewer list.
    #[must_use]
    pub fn tally(&self, viewer: usize, category: &CategoryId) -> u32 {
        self.tallies
            .get(viewer)
            .and_then(|t| t.get(category))
            .copied()
            .unwrap_or(0)
    }
}

impl LocalCapTracker for ViewerDensityCapper {
    fn can_spawn(&mut self, category: &CategoryId, region: RegionKey) -> bool {
        let cap = self.caps.get(category).copied().unwrap_or(0);
        let near = self.viewers_near(region).to_vec();
        near.iter()
            .any(|&idx| self.tallies[idx].get(category).copied().unwrap_or(0) < cap)
    }

    fn record_spawn(&mut self, category: &CategoryId, region: RegionKey) {
        self.bump(category, region);
    }

    fn record_existing(&mut self, category: &CategoryId, region: RegionKey) {
        self.bump(category, region);
    }
}

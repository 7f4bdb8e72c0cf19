use super::SpawnState;
use crate::candidates::{draw_candidate, CandidateTable, Draw};
use crate::config::{AnchorHeight, CategorySettings};
use crate::local_cap::LocalCapTracker;
use crate::placement::Attempt;
use crate::registry::EntityKind;
use crate::world::SpawnWorld;
use populace_data::{BlockPos, Heightmap, RegionKey, SpawnCost, SpawnRequest, REGION_SIZE};
use rand::Rng;

/// Where a cluster stands after one placement.
enum Progress {
    Continue,
    EndRound,
    Stop,
}

impl<'a, L: LocalCapTracker + ?Sized> SpawnState<'a, L> {
    /// Picks a random anchor inside `region` and spawns `category` there.
    pub fn spawn_category_for_region<W, T, R>(
        &mut self,
        world: &W,
        table: &T,
        category: &CategorySettings,
        region: RegionKey,
        rng: &mut R,
    ) where
        W: SpawnWorld,
        T: CandidateTable + ?Sized,
        R: Rng,
    {
        let anchor = random_anchor(world, region, self.settings.anchor, rng);
        self.spawn_category_at(world, table, category, region, anchor, rng);
    }

    /// Runs the cluster rounds of `category` around `anchor`.
    pub fn spawn_category_at<W, T, R>(
        &mut self,
        world: &W,
        table: &T,
        category: &CategorySettings,
        region: RegionKey,
        anchor: BlockPos,
        rng: &mut R,
    ) where
        W: SpawnWorld,
        T: CandidateTable + ?Sized,
        R: Rng,
    {
        if anchor.y < world.min_build_height() + 1 {
            return;
        }
        if world.block_at(anchor).conductor {
            return;
        }

        let registry = self.registry;
        let attempts = &self.settings.attempts;
        let (rounds, jitter, max_steps) = (attempts.rounds, attempts.jitter, attempts.max_steps);
        let mut cluster_size = 0u32;

        for _ in 0..rounds {
            let (mut x, mut z) = (anchor.x, anchor.z);
            let mut picked: Option<(Draw, &EntityKind)> = None;
            let mut group_size = 0u32;
            let mut steps = (rng.gen::<f32>() * max_steps as f32).ceil() as u32;
            let mut step = 0;

            while step < steps {
                step += 1;
                x += rng.gen_range(0..jitter) - rng.gen_range(0..jitter);
                z += rng.gen_range(0..jitter) - rng.gen_range(0..jitter);
                let pos = BlockPos::new(x, anchor.y, z);
                let feet = pos.bottom_center();

                let Some(viewer) = world.nearest_viewer(feet, None) else {
                    continue;
                };
                let viewer_distance_sqr = viewer.position.distance_sqr(feet);
                if let Err(rejection) =
                    self.validator
                        .check_position(world, pos, viewer_distance_sqr, region)
                {
                    tracing::trace!(?rejection, x, y = pos.y, z, "Position rejected");
                    continue;
                }

                if picked.is_none() {
                    let Some(draw) = draw_candidate(table, world, pos, &category.id, rng) else {
                        return;
                    };
                    let kind = match registry.get(&draw.candidate.kind) {
                        Ok(kind) => kind,
                        Err(e) => {
                            tracing::error!(error = %e, category = %category.id, "Candidate table named an unregistered kind");
                            self.defects += 1;
                            return;
                        }
                    };
                    let (min, max) = (draw.candidate.min_cluster, draw.candidate.max_cluster);
                    steps = min + rng.gen_range(0..=max.saturating_sub(min));
                    picked = Some((draw, kind));
                }
                let Some((draw, kind)) = picked.as_ref().map(|(d, k)| (d, *k)) else {
                    continue;
                };

                if self.limit_reached() || !self.has_capacity(category, region) {
                    return;
                }

                let attempt = Attempt {
                    kind,
                    candidate: &draw.candidate,
                    category,
                    pos,
                    viewer_distance_sqr,
                    overridden: draw.overridden,
                };
                match self
                    .validator
                    .check_candidate(world, table, &self.field, &attempt, rng)
                {
                    Ok(cost) => {
                        cluster_size += 1;
                        group_size += 1;
                        self.place(kind, category, region, pos, cost, rng);
                        match cluster_progress(kind, cluster_size, group_size) {
                            Progress::Stop => return,
                            Progress::EndRound => break,
                            Progress::Continue => {}
                        }
                    }
                    Err(rejection) => {
                        tracing::trace!(?rejection, kind = %kind.id, x, y = pos.y, z, "Placement rejected");
                    }
                }
            }
        }
    }

    fn place<R: Rng>(
        &mut self,
        kind: &EntityKind,
        category: &CategorySettings,
        region: RegionKey,
        pos: BlockPos,
        cost: Option<SpawnCost>,
        rng: &mut R,
    ) {
        let request = SpawnRequest {
            kind: kind.id.clone(),
            category: category.id.clone(),
            position: pos.bottom_center(),
            yaw: rng.gen::<f32>() * 360.0,
            pitch: 0.0,
            region,
            spawn_cost: cost,
        };
        if let Some(cost) = cost {
            self.field.add_charge(pos, cost.charge);
        }
        self.counter.increment(&category.id);
        self.local_caps.record_spawn(&category.id, pos.region());
        tracing::debug!(kind = %kind.id, x = pos.x, y = pos.y, z = pos.z, "Spawn accepted");
        self.requests.push(request);
    }
}

fn cluster_progress(kind: &EntityKind, cluster_size: u32, group_size: u32) -> Progress {
    if cluster_size >= kind.max_cluster_size {
        Progress::Stop
    } else if kind.max_group_size.is_some_and(|max| group_size >= max) {
        Progress::EndRound
    } else {
        Progress::Continue
    }
}

/// Random column of `region` at a height drawn per `mode`.
pub(crate) fn random_anchor<W: SpawnWorld, R: Rng>(
    world: &W,
    region: RegionKey,
    mode: AnchorHeight,
    rng: &mut R,
) -> BlockPos {
    let x = region.min_block_x() + rng.gen_range(0..REGION_SIZE);
    let z = region.min_block_z() + rng.gen_range(0..REGION_SIZE);
    let min = world.min_build_height();
    let y = match mode {
        AnchorHeight::SurfaceBounded => {
            let top = world.height_at(x, z, Heightmap::WorldSurface).max(min);
            rng.gen_range(min..=top)
        }
        AnchorHeight::FullRange => {
            let max = world.max_build_height().max(min + 1);
            rng.gen_range(min..max)
        }
    };
    BlockPos::new(x, y, z)
}

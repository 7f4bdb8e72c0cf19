use crate::candidates::CandidateTable;
use crate::config::SpawnSettings;
use crate::placement::{is_spawn_position_ok, rule_passes};
use crate::registry::{EntityKind, KindRegistry};
use crate::world::SpawnWorld;
use populace_data::{BlockPos, PlacementType, RegionKey, SpawnRequest, Vec3, REGION_SIZE};
use rand::Rng;

/// Seeds a freshly generated region with passive clusters.
///
/// Runs the configured generation category only. Caps, viewers and the
/// potential field play no part; every placement must still be collision
/// free and pass the category and kind rules.
pub fn populate_region<W, T, R>(
    world: &W,
    table: &T,
    registry: &KindRegistry,
    settings: &SpawnSettings,
    region: RegionKey,
    rng: &mut R,
) -> Vec<SpawnRequest>
where
    W: SpawnWorld,
    T: CandidateTable + ?Sized,
    R: Rng,
{
    let generation = &settings.generation;
    let category = settings.category(&generation.category);
    let (min_x, min_z) = (region.min_block_x(), region.min_block_z());
    let probe = BlockPos::new(min_x, world.max_build_height() - 1, min_z);

    let list = table.candidates_at(world, probe, &generation.category);
    if list.is_empty() {
        return Vec::new();
    }
    let probability = table.creature_probability(world, probe);
    let mut requests = Vec::new();

    while rng.gen::<f32>() < probability {
        let Some(candidate) = list.pick(rng) else {
            break;
        };
        let kind = match registry.get(&candidate.kind) {
            Ok(kind) => kind,
            Err(e) => {
                tracing::error!(error = %e, ?region, "Generation table named an unregistered kind");
                break;
            }
        };

        let spread = candidate.max_cluster.saturating_sub(candidate.min_cluster);
        let members = candidate.min_cluster + rng.gen_range(0..=spread);
        let origin_x = min_x + rng.gen_range(0..REGION_SIZE);
        let origin_z = min_z + rng.gen_range(0..REGION_SIZE);
        let (mut x, mut z) = (origin_x, origin_z);

        for _ in 0..members {
            let mut placed = false;
            let mut tries = 0;
            while !placed && tries < generation.tries_per_member {
                tries += 1;
                let pos = top_non_colliding_pos(world, kind, x, z);
                if kind.summonable && is_spawn_position_ok(world, kind, pos) {
                    let width = kind.width;
                    let fx = f64::from(x).clamp(
                        f64::from(min_x) + width,
                        f64::from(min_x + REGION_SIZE) - width,
                    );
                    let fz = f64::from(z).clamp(
                        f64::from(min_z) + width,
                        f64::from(min_z + REGION_SIZE) - width,
                    );
                    let feet = Vec3::new(fx, f64::from(pos.y), fz);
                    if !world.no_collision(&kind.aabb_at(feet)) {
                        continue;
                    }
                    let rules_ok = category.map_or(true, |c| {
                        c.rules
                            .iter()
                            .all(|rule| rule_passes(rule, world, pos, &mut *rng))
                    });
                    if !rules_ok || !world.check_spawn_rules(kind, pos, &mut *rng) {
                        continue;
                    }

                    requests.push(SpawnRequest {
                        kind: kind.id.clone(),
                        category: generation.category.clone(),
                        position: feet,
                        yaw: rng.gen::<f32>() * 360.0,
                        pitch: 0.0,
                        region,
                        spawn_cost: candidate.spawn_cost,
                    });
                    placed = true;
                }

                x += rng.gen_range(0..generation.jitter) - rng.gen_range(0..generation.jitter);
                z += rng.gen_range(0..generation.jitter) - rng.gen_range(0..generation.jitter);
                while x < min_x || x >= min_x + REGION_SIZE || z < min_z || z >= min_z + REGION_SIZE
                {
                    x = origin_x + rng.gen_range(0..generation.jitter)
                        - rng.gen_range(0..generation.jitter);
                    z = origin_z + rng.gen_range(0..generation.jitter)
                        - rng.gen_range(0..generation.jitter);
                }
            }
        }
    }

    if !requests.is_empty() {
        tracing::debug!(?region, placed = requests.len(), "Populated new region");
    }
    requests
}

/// Highest free position in column `(x, z)` for `kind`.
///
/// Under a ceiling the scan drops below the roof and stops on the first
/// floor it meets. Ground kinds sink into a pathfindable top block such as snow or grass.
pub fn top_non_colliding_pos<W: SpawnWorld>(world: &W, kind: &EntityKind, x: i32, z: i32) -> BlockPos {
    let min = world.min_build_height();
    let mut pos = BlockPos::new(x, world.height_at(x, z, kind.heightmap), z);

    if world.has_ceiling() {
        loop {
            pos = pos.below();
            if world.block_at(pos).is_air() || pos.y <= min {
                break;
            }
        }
        loop {
            pos = pos.below();
            if !world.block_at(pos).is_air() {
                pos = pos.above();
                break;
            }
            if pos.y <= min {
                break;
            }
        }
    }

    if kind.placement == PlacementType::OnGround {
        let below = pos.below();
        if world.block_at(below).pathfindable {
            return below;
        }
    }
    pos
}

use populace_data::{CategoryId, KindId, RegionKey, SpawnRequest, Vec3};
use populace_lib::app::App;
use populace_lib::model::config::AppConfig;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn quiet_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.simulation.populate_new_regions = false;
    config.simulation.spawn_enemies = false;
    config.simulation.spawn_friendlies = false;
    config
}

fn request(kind: &str, category: &str, x: f64, z: f64) -> SpawnRequest {
    SpawnRequest {
        kind: KindId::new(kind),
        category: CategoryId::new(category),
        position: Vec3::new(x, 64.0, z),
        yaw: 0.0,
        pitch: 0.0,
        region: RegionKey::containing(x as i32, z as i32),
        spawn_cost: None,
    }
}

#[test]
fn test_despawn_sweep_removes_distant_monsters() {
    let mut app = App::new(quiet_config()).expect("valid config");
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let far = app.world.apply_request(
        &request("zombie", "monster", 250.5, 250.5),
        &app.registry,
        false,
        &mut rng,
    );
    let near = app.world.apply_request(
        &request("zombie", "monster", 140.5, 128.5),
        &app.registry,
        false,
        &mut rng,
    );
    let herd = app.world.apply_request(
        &request("cow", "creature", 250.5, 250.5),
        &app.registry,
        false,
        &mut rng,
    );
    let tagged = app.world.apply_request(
        &request("zombie", "monster", 251.5, 250.5),
        &app.registry,
        true,
        &mut rng,
    );

    let removed = app.despawn_sweep();

    assert_eq!(removed, 1);
    assert!(app.world.find(far).is_none(), "Far zombie should despawn");
    assert!(app.world.find(near).is_some(), "Near zombie is inside the keep radius");
    assert!(app.world.find(herd).is_some(), "Persistent categories stay");
    assert!(app.world.find(tagged).is_some(), "Persistent entities stay");
}

#[test]
fn test_despawn_sweep_needs_a_viewer() {
    let mut config = quiet_config();
    config.viewers.clear();
    let mut app = App::new(config).expect("valid config");
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let lonely = app.world.apply_request(
        &request("zombie", "monster", 250.5, 250.5),
        &app.registry,
        false,
        &mut rng,
    );
    assert_eq!(app.despawn_sweep(), 0);
    assert!(app.world.find(lonely).is_some());
}

#[test]
fn test_quiet_run_spawns_nothing() {
    let mut app = App::new(quiet_config()).expect("valid config");
    let summary = app.run(50);

    assert_eq!(summary.ticks, 50);
    assert_eq!(summary.spawned, 0);
    assert_eq!(summary.generated, 0);
    assert_eq!(summary.entities_alive, 0);
    assert_eq!(summary.defects, 0);
}

#[test]
fn test_generation_populates_viewer_neighbourhood() {
    let mut config = AppConfig::default();
    config.simulation.seed = 9;
    let app = App::new(config).expect("valid config");

    let summary = app.summary();
    assert_eq!(summary.generated as usize, app.world.entity_count());
    assert_eq!(
        summary.alive_by_category.get("creature").copied().unwrap_or(0),
        app.world.entity_count()
    );
}

#[test]
fn test_spawned_entities_get_identities() {
    let mut app = App::new(quiet_config()).expect("valid config");
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let a = app.world.apply_request(
        &request("zombie", "monster", 130.5, 130.5),
        &app.registry,
        false,
        &mut rng,
    );
    let b = app.world.apply_request(
        &request("zombie", "monster", 130.5, 130.5),
        &app.registry,
        false,
        &mut rng,
    );

    assert_ne!(a, b);
    let found = app.world.find(a).expect("entity is live");
    assert_eq!(found.kind.as_str(), "zombie");
    assert_eq!(found.category, Some(CategoryId::new("monster")));
}

use populace_lib::app::App;
use populace_lib::model::config::AppConfig;

fn seeded(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.simulation.seed = seed;
    config.spawn.rare_interval = 20;
    config
}

#[test]
fn test_determinism_consistency() {
    let mut app1 = App::new(seeded(12345)).expect("default config is valid");
    let mut app2 = App::new(seeded(12345)).expect("default config is valid");

    assert_eq!(
        app1.world.entity_count(),
        app2.world.entity_count(),
        "Generation population should match"
    );

    for tick in 0..100 {
        let r1 = app1.step();
        let r2 = app2.step();
        assert_eq!(r1.requests, r2.requests, "Requests diverged at tick {}", tick);
        assert_eq!(r1.stages, r2.stages, "Stage counters diverged at tick {}", tick);
        assert_eq!(r1.counts, r2.counts, "Counts diverged at tick {}", tick);
    }

    let s1 = app1.summary();
    let s2 = app2.summary();
    assert_eq!(s1.entities_alive, s2.entities_alive);
    assert_eq!(s1.spawned, s2.spawned);
    assert_eq!(s1.generated, s2.generated);
    assert_eq!(s1.despawned, s2.despawned);
    assert_eq!(s1.alive_by_category, s2.alive_by_category);
    assert_eq!(s1.config_fingerprint, s2.config_fingerprint);
}

#[test]
fn test_generation_independent_of_thread_schedule() {
    // Parallel region population must not depend on which worker finishes
    // first, so repeated construction yields the same herds.
    let counts: Vec<usize> = (0..4)
        .map(|_| {
            App::new(seeded(777))
                .expect("default config is valid")
                .world
                .entity_count()
        })
        .collect();
    assert!(counts.windows(2).all(|w| w[0] == w[1]), "{counts:?}");
}

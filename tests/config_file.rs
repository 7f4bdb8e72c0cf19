use populace_lib::model::config::AppConfig;

#[test]
fn test_bundled_config_parses() {
    let config = AppConfig::from_toml(include_str!("../config.toml")).expect("bundled config");

    assert_eq!(config.spawn.categories.len(), 5);
    assert_eq!(config.spawn.caps.normalization, 289);
    assert_eq!(config.kinds.len(), 7);
    assert_eq!(config.viewers.len(), 1);
    assert_eq!(config.table.suppressions.len(), 1);
}

#[test]
fn test_missing_file_writes_defaults() {
    let path = std::env::temp_dir().join(format!("populace-{}.toml", uuid::Uuid::new_v4()));
    let loaded = AppConfig::load(&path).expect("defaults load");
    assert!(path.exists(), "Defaults should be written for next time");

    let reloaded = AppConfig::load(&path).expect("written defaults parse");
    assert_eq!(reloaded.spawn, loaded.spawn);
    assert_eq!(reloaded.world, loaded.world);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_kind_in_unknown_category_is_rejected() {
    let mut config = AppConfig::default();
    config.kinds[0].category = Some("nowhere".into());
    let text = toml::to_string(&config).expect("serializable");
    assert!(AppConfig::from_toml(&text).is_err());
}

#[test]
fn test_inverted_cluster_bounds_are_rejected() {
    let mut config = AppConfig::default();
    let zombie = config.table.biomes[0]
        .candidates
        .values_mut()
        .flatten()
        .find(|c| c.kind.as_str() == "zombie")
        .expect("plains lists zombies");
    zombie.min_cluster = 4;
    zombie.max_cluster = 2;
    let text = toml::to_string(&config).expect("serializable");

    let err = AppConfig::from_toml(&text).expect_err("inverted bounds must not load");
    assert!(format!("{err:#}").contains("cluster bounds"), "{err:#}");
}

#[test]
fn test_empty_cluster_is_rejected() {
    let mut config = AppConfig::default();
    for candidate in config.table.biomes[1].candidates.values_mut().flatten() {
        candidate.min_cluster = 0;
    }
    assert!(config.validate().is_err());
}

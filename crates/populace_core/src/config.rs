//! Configuration for the natural spawning engine.
//!
//! All tunables map onto a `[spawn]` table in `config.toml`. Category
//! definitions are opaque data: the engine only reads their caps, distances
//! and rules, and iterates them in the configured order.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [spawn]
//! order = "declared"
//! rare_interval = 400
//!
//! [[spawn.categories]]
//! id = "monster"
//! max_per_region = 70
//! friendly = false
//! persistent = false
//! despawn_distance = 128
//! rules = [{ rule = "max_light", level = 7 }]
//! ```

use populace_data::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Extra acceptance predicate attached to a category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SpawnRule {
    /// Light level at the position must not exceed `level`.
    MaxLight { level: u8 },
    /// Light level at the position must be at least `level`.
    MinLight { level: u8 },
    /// Position must be strictly below this height.
    BelowY { y: i32 },
    /// Position must be at or above this height.
    AboveY { y: i32 },
    /// Accept with the given probability (consumes one RNG draw).
    Chance { probability: f32 },
}

/// Caps, distances and rules of one population category.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategorySettings {
    pub id: CategoryId,
    /// Cap per region before scaling by the active region count.
    pub max_per_region: u32,
    pub friendly: bool,
    /// Only spawned on rare ticks.
    pub persistent: bool,
    pub despawn_distance: u32,
    #[serde(default = "default_no_despawn_distance")]
    pub no_despawn_distance: u32,
    #[serde(default)]
    pub rules: Vec<SpawnRule>,
}

fn default_no_despawn_distance() -> u32 {
    32
}

impl CategorySettings {
    #[must_use]
    pub fn new(id: &str, max_per_region: u32, friendly: bool, persistent: bool) -> Self {
        Self {
            id: CategoryId::new(id),
            max_per_region,
            friendly,
            persistent,
            despawn_distance: 128,
            no_despawn_distance: default_no_despawn_distance(),
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_despawn_distance(mut self, distance: u32) -> Self {
        self.despawn_distance = distance;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: SpawnRule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn despawn_distance_sqr(&self) -> f64 {
        let d = f64::from(self.despawn_distance);
        d * d
    }
}

/// Order in which categories are tried within a region.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrder {
    /// Declaration order of `categories`.
    #[default]
    Declared,
    Reversed,
    /// Fresh permutation per region, drawn from the pass RNG.
    Shuffled,
}

/// How the anchor height of a spawn attempt is sampled.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnchorHeight {
    /// Uniform in `[min_build_height, surface + 1]`.
    #[default]
    SurfaceBounded,
    /// Uniform in `[min_build_height, max_build_height)`.
    FullRange,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DistanceSettings {
    /// Viewers closer than this block the position.
    pub min_viewer_distance: f64,
    /// Radius around the world spawn anchor kept free of natural spawns.
    pub spawn_anchor_exclusion: f64,
    /// Horizontal range within which a viewer owns a region's local cap.
    pub local_cap_range: f64,
}

impl Default for DistanceSettings {
    fn default() -> Self {
        Self {
            min_viewer_distance: 24.0,
            spawn_anchor_exclusion: 24.0,
            local_cap_range: 128.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CapSettings {
    /// Divisor of the global cap formula; 17² regions by default.
    pub normalization: u32,
    pub rate_limit_enabled: bool,
    pub max_spawns_per_tick: usize,
}

impl Default for CapSettings {
    fn default() -> Self {
        Self {
            normalization: 17 * 17,
            rate_limit_enabled: false,
            max_spawns_per_tick: 64,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttemptSettings {
    /// Sub-attempt rounds per anchor.
    pub rounds: u32,
    /// Exclusive bound of each jitter draw; the step is `rand(j) - rand(j)`.
    pub jitter: i32,
    /// Step budget before a candidate is drawn is `ceil(rand_f32 * max_steps)`.
    pub max_steps: u32,
}

impl Default for AttemptSettings {
    fn default() -> Self {
        Self {
            rounds: 3,
            jitter: 6,
            max_steps: 4,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// Category populated when a region is first generated.
    pub category: CategoryId,
    pub jitter: i32,
    pub tries_per_member: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            category: CategoryId::new("creature"),
            jitter: 5,
            tries_per_member: 4,
        }
    }
}

/// Top-level spawning configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnSettings {
    pub categories: Vec<CategorySettings>,
    pub order: CategoryOrder,
    pub anchor: AnchorHeight,
    pub distances: DistanceSettings,
    pub caps: CapSettings,
    pub attempts: AttemptSettings,
    pub generation: GenerationSettings,
    /// Persistent categories only spawn on ticks divisible by this.
    pub rare_interval: u64,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            categories: vec![
                CategorySettings::new("monster", 70, false, false)
                    .with_rule(SpawnRule::MaxLight { level: 7 }),
                CategorySettings::new("creature", 10, true, true)
                    .with_rule(SpawnRule::MinLight { level: 9 }),
                CategorySettings::new("ambient", 15, true, false),
                CategorySettings::new("axolotls", 5, true, false),
                CategorySettings::new("underground_water_creature", 5, true, false),
                CategorySettings::new("water_creature", 5, true, false),
                CategorySettings::new("water_ambient", 20, true, false).with_despawn_distance(64),
            ],
            order: CategoryOrder::Declared,
            anchor: AnchorHeight::SurfaceBounded,
            distances: DistanceSettings::default(),
            caps: CapSettings::default(),
            attempts: AttemptSettings::default(),
            generation: GenerationSettings::default(),
            rare_interval: 400,
        }
    }
}

impl SpawnSettings {
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&CategorySettings> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Global cap of a category for the given number of active regions,
    /// rounded down.
    #[must_use]
    pub fn global_cap(&self, category: &CategorySettings, active_regions: usize) -> u64 {
        u64::from(category.max_per_region) * active_regions as u64
            / u64::from(self.caps.normalization.max(1))
    }

    /// Validates all spawning parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a
    /// description of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.categories.is_empty(),
            "At least one category must be configured"
        );
        let mut seen = HashSet::new();
        for category in &self.categories {
            anyhow::ensure!(
                seen.insert(&category.id),
                "Duplicate category id: {}",
                category.id
            );
            anyhow::ensure!(
                category.despawn_distance >= category.no_despawn_distance,
                "Category {}: despawn distance must not be below no-despawn distance",
                category.id
            );
            for rule in &category.rules {
                if let SpawnRule::Chance { probability } = rule {
                    anyhow::ensure!(
                        (0.0..=1.0).contains(probability),
                        "Category {}: chance must be in [0.0, 1.0]",
                        category.id
                    );
                }
            }
        }

        anyhow::ensure!(
            self.caps.normalization > 0,
            "Cap normalization must be positive"
        );
        anyhow::ensure!(
            !self.caps.rate_limit_enabled || self.caps.max_spawns_per_tick > 0,
            "Max spawns per tick must be positive when rate limiting"
        );
        anyhow::ensure!(
            self.distances.min_viewer_distance >= 0.0,
            "Minimum viewer distance must be non-negative"
        );
        anyhow::ensure!(
            self.distances.spawn_anchor_exclusion >= 0.0,
            "Spawn anchor exclusion must be non-negative"
        );
        anyhow::ensure!(
            self.distances.local_cap_range > 0.0,
            "Local cap range must be positive"
        );
        anyhow::ensure!(self.attempts.rounds > 0, "Attempt rounds must be positive");
        anyhow::ensure!(self.attempts.jitter > 0, "Jitter must be positive");
        anyhow::ensure!(self.attempts.max_steps > 0, "Max steps must be positive");
        anyhow::ensure!(self.generation.jitter > 0, "Generation jitter must be positive");
        anyhow::ensure!(self.rare_interval > 0, "Rare interval must be positive");

        Ok(())
    }

    /// Parses and validates settings from TOML.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let settings = toml::from_str::<Self>(content)?;
        settings.validate()?;
        Ok(settings)
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.categories).as_bytes());
        hasher.update(format!("{:?}", self.order).as_bytes());
        hasher.update(format!("{:?}", self.anchor).as_bytes());
        hasher.update(format!("{:?}", self.distances).as_bytes());
        hasher.update(format!("{:?}", self.caps).as_bytes());
        hasher.update(format!("{:?}", self.attempts).as_bytes());
        hasher.update(format!("{:?}", self.generation).as_bytes());
        hasher.update(self.rare_interval.to_le_bytes());
        hex::encode(hasher.finalize())
    }
}

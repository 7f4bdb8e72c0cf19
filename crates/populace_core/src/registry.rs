use crate::config::SpawnSettings;
use crate::error::{Result, SpawnError};
use populace_data::{Aabb, CategoryId, Hazard, Heightmap, KindId, PlacementType, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_cluster_size() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

/// Static definition of a spawnable entity kind.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EntityKind {
    pub id: KindId,
    /// `None` marks kinds that never take part in natural spawning.
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub placement: PlacementType,
    #[serde(default)]
    pub heightmap: Heightmap,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub can_spawn_far_from_viewers: bool,
    #[serde(default = "default_true")]
    pub summonable: bool,
    #[serde(default)]
    pub immune_to: Vec<Hazard>,
    /// Placements from one anchor stop once this many succeeded.
    #[serde(default = "default_cluster_size")]
    pub max_cluster_size: u32,
    /// Ends the current round once a group reaches this size.
    #[serde(default)]
    pub max_group_size: Option<u32>,
}

impl EntityKind {
    #[must_use]
    pub fn new(id: &str, category: &str, placement: PlacementType, width: f64, height: f64) -> Self {
        Self {
            id: KindId::new(id),
            category: Some(CategoryId::new(category)),
            placement,
            heightmap: Heightmap::default(),
            width,
            height,
            can_spawn_far_from_viewers: false,
            summonable: true,
            immune_to: Vec::new(),
            max_cluster_size: default_cluster_size(),
            max_group_size: None,
        }
    }

    #[must_use]
    pub fn with_heightmap(mut self, heightmap: Heightmap) -> Self {
        self.heightmap = heightmap;
        self
    }

    #[must_use]
    pub fn immune_to(mut self, hazard: Hazard) -> Self {
        self.immune_to.push(hazard);
        self
    }

    #[must_use]
    pub fn with_max_cluster_size(mut self, size: u32) -> Self {
        self.max_cluster_size = size;
        self
    }

    #[must_use]
    pub fn with_max_group_size(mut self, size: u32) -> Self {
        self.max_group_size = Some(size);
        self
    }

    #[must_use]
    pub fn far_spawning(mut self) -> Self {
        self.can_spawn_far_from_viewers = true;
        self
    }

    /// Bounding box with the feet at `feet`.
    #[must_use]
    pub fn aabb_at(&self, feet: Vec3) -> Aabb {
        Aabb::from_feet(feet, self.width, self.height)
    }

    #[must_use]
    pub fn is_dangerous(&self, hazard: Option<Hazard>) -> bool {
        hazard.is_some_and(|h| !self.immune_to.contains(&h))
    }
}

/// Lookup of entity kinds by id.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: HashMap<KindId, EntityKind>,
}

impl KindRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: EntityKind) -> Result<()> {
        if let Some(existing) = self.kinds.get(&kind.id) {
            if existing != &kind {
                return Err(SpawnError::DuplicateKind(kind.id));
            }
            return Ok(());
        }
        self.kinds.insert(kind.id.clone(), kind);
        Ok(())
    }

    /// Builds a registry and checks every kind's category against the
    /// configured ones.
    pub fn from_kinds(kinds: impl IntoIterator<Item = EntityKind>, settings: &SpawnSettings) -> Result<Self> {
        let mut registry = Self::new();
        for kind in kinds {
            if let Some(category) = &kind.category {
                if settings.category(category).is_none() {
                    return Err(SpawnError::UnknownCategory {
                        kind: kind.id.clone(),
                        category: category.clone(),
                    });
                }
            }
            registry.register(kind)?;
        }
        Ok(registry)
    }

    pub fn get(&self, id: &KindId) -> Result<&EntityKind> {
        self.kinds
            .get(id)
            .ok_or_else(|| SpawnError::UnknownKind(id.clone()))
    }

    #[must_use]
    pub fn category_of(&self, id: &KindId) -> Option<&CategoryId> {
        self.kinds.get(id).and_then(|k| k.category.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

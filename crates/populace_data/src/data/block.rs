use serde::{Deserialize, Serialize};

/// Fluid filling a block cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidKind {
    Water,
    Lava,
}

/// Damage source a block inflicts on entities standing in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hazard {
    Fire,
    Freezing,
    Thorns,
    Wither,
}

/// The properties of a block the placement pipeline cares about.
///
/// Hosts translate their own block model into this shape; the engine never
/// sees block identities, only these predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    /// Collision shape is the full unit cube.
    pub full_collision: bool,
    /// Opaque full block that conducts signals.
    pub conductor: bool,
    pub signal_source: bool,
    pub fluid: Option<FluidKind>,
    /// Tagged to keep entities from spawning inside (rails, pressure plates).
    pub prevents_spawning_inside: bool,
    /// Whether entities may stand on top of this block when spawning.
    pub spawn_support: bool,
    /// Ground pathfinding can walk through this block.
    pub pathfindable: bool,
    pub hazard: Option<Hazard>,
}

impl BlockState {
    pub const AIR: BlockState = BlockState {
        full_collision: false,
        conductor: false,
        signal_source: false,
        fluid: None,
        prevents_spawning_inside: false,
        spawn_support: false,
        pathfindable: true,
        hazard: None,
    };

    /// Ordinary opaque ground block (stone, dirt, grass).
    pub const SOLID: BlockState = BlockState {
        full_collision: true,
        conductor: true,
        signal_source: false,
        fluid: None,
        prevents_spawning_inside: false,
        spawn_support: true,
        pathfindable: false,
        hazard: None,
    };

    /// Full collision block that cannot be spawned on (glass, barriers).
    pub const BARRIER: BlockState = BlockState {
        full_collision: true,
        conductor: false,
        signal_source: false,
        fluid: None,
        prevents_spawning_inside: false,
        spawn_support: false,
        pathfindable: false,
        hazard: None,
    };

    pub const WATER: BlockState = BlockState {
        fluid: Some(FluidKind::Water),
        pathfindable: false,
        ..BlockState::AIR
    };

    pub const LAVA: BlockState = BlockState {
        fluid: Some(FluidKind::Lava),
        pathfindable: false,
        hazard: Some(Hazard::Fire),
        ..BlockState::AIR
    };

    /// Thin non-colliding block that emits a signal (levers, buttons).
    pub const SIGNAL: BlockState = BlockState {
        signal_source: true,
        ..BlockState::AIR
    };

    #[must_use]
    pub fn is_air(&self) -> bool {
        *self == BlockState::AIR
    }

    #[must_use]
    pub fn is_fluid_of(&self, kind: FluidKind) -> bool {
        self.fluid == Some(kind)
    }

    #[must_use]
    pub fn has_fluid(&self) -> bool {
        self.fluid.is_some()
    }

    #[must_use]
    pub fn with_hazard(mut self, hazard: Hazard) -> Self {
        self.hazard = Some(hazard);
        self
    }
}

impl Default for BlockState {
    fn default() -> Self {
        BlockState::AIR
    }
}

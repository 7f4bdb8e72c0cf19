//! # Populace Core
//!
//! The natural spawning engine for Populace: once per tick, per active
//! region, it decides whether new entities should appear, which kind, and
//! where.
//!
//! This crate contains:
//! - A sparse potential field that discourages tight clustering
//! - Population counting with global and per-viewer caps
//! - Weighted candidate tables keyed by biome and structure
//! - A staged placement validator
//! - The per-tick spawn pass and region generation population
//! - Configuration, metrics and structured logging
//!
//! ## Architecture
//!
//! The engine owns no world state. Everything is read through the
//! [`SpawnWorld`] trait and every accepted placement comes back as a
//! [`SpawnRequest`] for the host to apply. All randomness flows through one
//! explicitly passed RNG, so a seeded `ChaCha8Rng` replays a pass exactly.
//!
//! ## Example
//!
//! ```
//! use populace_core::PotentialField;
//! use populace_data::BlockPos;
//!
//! let mut field = PotentialField::new();
//! field.add_charge(BlockPos::new(0, 64, 0), 0.7);
//! let delta = field.potential_delta(BlockPos::new(4, 64, 0), 0.7);
//! assert!((delta - 0.1225).abs() < 1e-9);
//! ```

/// Weighted candidate tables and the biome-indexed implementation
pub mod candidates;
/// Configuration management for spawning parameters
pub mod config;
/// Error types for broken data contracts
pub mod error;
/// Per-region caps owned by nearby viewers
pub mod local_cap;
/// Performance metrics collection and logging
pub mod metrics;
/// Staged placement validation
pub mod placement;
/// Per-category population counts
pub mod population;
/// Inverse-distance spawn pressure field
pub mod potential;
/// Entity kind definitions and lookup
pub mod registry;
/// The spawn pass and region generation population
pub mod spawner;
/// The host-world interface
pub mod world;

pub use candidates::{BiomeCandidateTable, CandidateTable, TableConfig};
pub use config::{CategorySettings, SpawnSettings};
pub use error::SpawnError;
pub use local_cap::{LocalCapTracker, Unbounded, ViewerDensityCapper};
pub use metrics::{init_logging, Metrics};
pub use placement::{PlacementValidator, Rejection, Stage, StageCounters};
pub use population::PopulationCounter;
pub use potential::PotentialField;
pub use registry::{EntityKind, KindRegistry};
pub use spawner::{populate_region, run_spawn_pass, SpawnGate, SpawnReport, SpawnState};
pub use world::{LiveEntity, SpawnWorld, Viewer};

pub use populace_data::SpawnRequest;

//! Populace: a headless sandbox around the natural spawning engine.
//!
//! [`model::world::GridWorld`] hosts the engine, [`app::App`] drives it tick
//! by tick.

pub mod app;
pub mod model;

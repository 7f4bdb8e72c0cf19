//! Core data structures for the Populace spawning engine.

pub mod block;
pub mod candidate;
pub mod category;
pub mod geometry;
pub mod weighted;

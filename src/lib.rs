//! Dota 2 match harvesting pipeline.
//!
//! See [`harvest`] for the module map.

pub mod harvest;

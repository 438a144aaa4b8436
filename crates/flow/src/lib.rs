#![deny(unsafe_code)]
//! 3D noise flow field.
//!
//! A box of cubic cells holds one unit direction per cell, recomputed every
//! tick from gradient noise whose sample point drifts over time. Particles
//! spawned inside the box turn toward the direction of the cell they occupy
//! at a bounded angular rate, move forward at a fixed speed, and wrap to the
//! opposite face when they leave the box.

pub mod config;
pub mod field;
pub mod grid;
pub mod sampler;
pub mod spawn;

pub use config::FlowFieldConfig;
pub use field::{Diagnostics, FlowField};
pub use grid::{DirectionGrid, DirectionMapping};
pub use sampler::{NoiseKind, NoiseSampler};
pub use spawn::{SpawnObserver, SpawnReport};

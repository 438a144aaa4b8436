#![deny(unsafe_code)]
//! Core types and traits for the noise-flow particle system.
//!
//! Provides the `Engine` trait, the `Particle` data type and its steering
//! primitives, world `Bounds`, `Rgba`/`Gradient` colors for modulation output,
//! the `Xorshift64` PRNG, `Seed` run descriptions, and parameter helpers.

pub mod bounds;
pub mod color;
pub mod engine;
pub mod error;
pub mod gradient;
pub mod params;
pub mod particle;
pub mod prng;
pub mod seed;

pub use bounds::Bounds;
pub use color::Rgba;
pub use engine::Engine;
pub use error::EngineError;
pub use gradient::{Gradient, GradientKey};
pub use particle::Particle;
pub use prng::Xorshift64;
pub use seed::Seed;

//! The `Engine` trait every flow simulation implements.
//!
//! The trait is object-safe so drivers (CLI, snapshot renderer) can hold a
//! `Box<dyn Engine>` and switch between plain and audio-reactive fields.

use crate::bounds::Bounds;
use crate::color::Rgba;
use crate::error::EngineError;
use crate::particle::Particle;
use serde_json::Value;

/// A frame-driven particle simulation.
///
/// Drivers call [`Engine::tick`] once per frame and then read particle
/// transforms for rendering. Particles are exposed read-only; the only
/// writable surface is the implementation's own knob setters.
pub trait Engine {
    /// Advances the simulation by `dt` seconds.
    ///
    /// Returns `EngineError::InvalidTimeStep` for negative or non-finite `dt`,
    /// leaving the state untouched.
    fn tick(&mut self, dt: f32) -> Result<(), EngineError>;

    /// All particles in spawn order.
    fn particles(&self) -> &[Particle];

    /// Current world-space bounds of the simulation volume.
    ///
    /// Refreshed at the start of every tick and whenever an implementation
    /// moves its volume (e.g. `FlowField::set_origin`).
    fn bounds(&self) -> Bounds;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all parameters, their types, ranges and defaults.
    fn param_schema(&self) -> Value;

    /// Optional display color for the particle at `index`.
    ///
    /// Returns `None` by default; audio-reactive engines report band colors.
    fn particle_tint(&self, _index: usize) -> Option<Rgba> {
        None
    }
}

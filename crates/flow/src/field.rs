//! The flow-field orchestrator.
//!
//! [`FlowField`] owns the direction grid, the particle collection and the
//! cached bounds. Each tick runs in a fixed order: refresh bounds from the
//! current origin, advance the noise phase and recompute the whole grid, then
//! update every particle (wrap, look up cell, steer, apply knobs, advance).
//! Every particle therefore steers with the current tick's field.

use crate::config::FlowFieldConfig;
use crate::grid::DirectionGrid;
use crate::sampler::NoiseSampler;
use crate::spawn::{place_particles, SpawnObserver, SpawnReport, SpawnSettings};
use glam::Vec3;
use noise_flow_core::bounds::Bounds;
use noise_flow_core::error::EngineError;
use noise_flow_core::particle::Particle;
use noise_flow_core::prng::Xorshift64;
use noise_flow_core::Engine;
use serde::Serialize;
use serde_json::Value;

/// Running counts of numerical fallbacks since initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub ticks: u64,
    /// Grid cells whose noise produced no usable direction.
    pub degenerate_directions: u64,
    /// Particle updates where steering was skipped.
    pub skipped_steering: u64,
    /// Particle updates whose displacement was non-finite and dropped.
    pub dropped_displacements: u64,
}

/// 3D noise flow field with its particles.
pub struct FlowField {
    config: FlowFieldConfig,
    sampler: Box<dyn NoiseSampler>,
    grid: DirectionGrid,
    particles: Vec<Particle>,
    origin: Vec3,
    bounds: Bounds,
    phase: Vec3,
    move_speed: f32,
    rotation_speed: f32,
    particle_scale: f32,
    spawn_report: SpawnReport,
    diagnostics: Diagnostics,
}

impl FlowField {
    /// Validates `config`, builds the grid and spawns particles with a PRNG
    /// seeded from `seed`.
    pub fn initialize(
        config: FlowFieldConfig,
        seed: u64,
    ) -> Result<(Self, SpawnReport), EngineError> {
        Self::initialize_with(config, seed, &mut [])
    }

    /// Like [`initialize`](Self::initialize), notifying each observer once
    /// spawning completes.
    pub fn initialize_with(
        config: FlowFieldConfig,
        seed: u64,
        observers: &mut [&mut dyn SpawnObserver],
    ) -> Result<(Self, SpawnReport), EngineError> {
        let sampler = config.noise.sampler(config.noise_seed, config.noise_frequency);
        Self::with_sampler(config, sampler, seed, observers)
    }

    /// Builds a field driven by a caller-supplied noise sampler.
    ///
    /// The sampler overrides the config's `noise`, `noise_seed` and
    /// `noise_frequency` settings.
    pub fn with_sampler(
        config: FlowFieldConfig,
        sampler: Box<dyn NoiseSampler>,
        seed: u64,
        observers: &mut [&mut dyn SpawnObserver],
    ) -> Result<(Self, SpawnReport), EngineError> {
        config.validate()?;
        let grid = DirectionGrid::new(config.extent)?;
        let origin = config.origin;
        let bounds = Bounds::from_grid(origin, config.extent, config.cell_size);

        let mut rng = Xorshift64::new(seed);
        let settings = SpawnSettings {
            count: config.particle_count,
            radius: config.spawn_radius,
            attempts: config.spawn_attempts,
            scale: config.particle_scale,
        };
        let (mut particles, report) = place_particles(&bounds, settings, &mut rng)?;

        if report.skipped > 0 {
            log::warn!(
                "spawned {} of {} particles: {} slots found no position {} apart in {} attempts",
                report.placed,
                report.requested,
                report.skipped,
                config.spawn_radius,
                config.spawn_attempts
            );
        } else {
            log::info!("spawned {} particles", report.placed);
        }

        for observer in observers.iter_mut() {
            observer.particles_generated(&mut particles);
        }

        let field = Self {
            sampler,
            grid,
            particles,
            origin,
            bounds,
            phase: config.phase,
            move_speed: config.move_speed,
            rotation_speed: config.rotation_speed,
            particle_scale: config.particle_scale,
            spawn_report: report,
            diagnostics: Diagnostics::default(),
            config,
        };
        Ok((field, report))
    }

    /// Builds a field from a flat JSON params object (see
    /// [`FlowFieldConfig::from_json`]).
    pub fn from_json(seed: u64, params: &Value) -> Result<Self, EngineError> {
        Self::initialize(FlowFieldConfig::from_json(params), seed).map(|(field, _)| field)
    }

    /// Advances the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Result<(), EngineError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(EngineError::InvalidTimeStep(dt));
        }
        self.update_bounds();
        self.phase += self.config.phase_rate * dt;
        let degenerate = self.recompute_directions();
        let (skipped, dropped) = self.update_particles(dt)?;

        let d = &mut self.diagnostics;
        d.ticks += 1;
        d.degenerate_directions += degenerate as u64;
        d.skipped_steering += skipped as u64;
        d.dropped_displacements += dropped as u64;

        if degenerate > 0 {
            log::warn!("tick {}: {degenerate} cells fell back to a default direction", d.ticks);
        }
        if dropped > 0 {
            log::warn!("tick {}: dropped {dropped} non-finite particle displacements", d.ticks);
        }
        log::debug!(
            "tick {}: phase {}, {} particles",
            d.ticks,
            self.phase,
            self.particles.len()
        );
        Ok(())
    }

    /// Recomputes the cached bounds from the current origin.
    pub fn update_bounds(&mut self) {
        self.bounds = Bounds::from_grid(self.origin, self.config.extent, self.config.cell_size);
    }

    /// Recomputes the whole grid at the current phase without advancing it.
    ///
    /// Returns the number of cells that needed a fallback direction.
    pub fn recompute_directions(&mut self) -> usize {
        self.grid.recompute(
            self.sampler.as_ref(),
            self.config.mapping,
            self.phase,
            self.config.increment,
        )
    }

    /// One pass over all particles. Returns (skipped steering, dropped displacements).
    fn update_particles(&mut self, dt: f32) -> Result<(usize, usize), EngineError> {
        let bounds = self.bounds;
        let origin = self.origin;
        let cell_size = self.config.cell_size;
        let grid = &self.grid;
        let mut skipped = 0;
        let mut dropped = 0;

        for particle in &mut self.particles {
            particle.position = bounds.wrap(particle.position);
            let [x, y, z] = grid
                .cell_of(particle.position, origin, cell_size)
                .ok_or_else(|| {
                    let [ex, ey, ez] = grid.extent();
                    EngineError::InvalidExtent {
                        x: ex,
                        y: ey,
                        z: ez,
                    }
                })?;
            let direction = grid.get(x, y, z)?;
            if !particle.steer_towards(direction, self.rotation_speed, dt) {
                skipped += 1;
            }
            particle.move_speed = self.move_speed;
            particle.scale = self.particle_scale * particle.scale_multiplier;
            if !particle.advance(dt) {
                dropped += 1;
            }
        }
        Ok((skipped, dropped))
    }

    // -- knobs --

    /// Sets the travel speed applied to every particle on the next tick.
    pub fn set_move_speed(&mut self, speed: f32) -> Result<(), EngineError> {
        self.move_speed = finite("move_speed", speed)?;
        Ok(())
    }

    /// Sets the maximum steering rate in degrees per second.
    pub fn set_rotation_speed(&mut self, degrees_per_second: f32) -> Result<(), EngineError> {
        self.rotation_speed = finite("rotation_speed", degrees_per_second)?;
        Ok(())
    }

    /// Sets the global particle scale.
    pub fn set_particle_scale(&mut self, scale: f32) -> Result<(), EngineError> {
        self.particle_scale = finite("particle_scale", scale)?;
        Ok(())
    }

    /// Sets the per-particle factor applied on top of the global scale.
    pub fn set_scale_multiplier(&mut self, index: usize, value: f32) -> Result<(), EngineError> {
        let value = finite("scale_multiplier", value)?;
        let len = self.particles.len();
        let particle = self
            .particles
            .get_mut(index)
            .ok_or(EngineError::IndexOutOfBounds { index, len })?;
        particle.scale_multiplier = value;
        Ok(())
    }

    /// Moves the grid so its minimum corner sits at `origin`.
    pub fn set_origin(&mut self, origin: Vec3) -> Result<(), EngineError> {
        if !origin.is_finite() {
            return Err(EngineError::invalid_param("origin", "must be finite"));
        }
        self.origin = origin;
        self.update_bounds();
        Ok(())
    }

    // -- read-only state --

    pub fn config(&self) -> &FlowFieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn directions(&self) -> &DirectionGrid {
        &self.grid
    }

    /// Current noise phase.
    pub fn phase(&self) -> Vec3 {
        self.phase
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn particle_scale(&self) -> f32 {
        self.particle_scale
    }

    pub fn spawn_report(&self) -> SpawnReport {
        self.spawn_report
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }
}

fn finite(name: &str, v: f32) -> Result<f32, EngineError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EngineError::invalid_param(name, format!("{v} is not finite")))
    }
}

impl Engine for FlowField {
    fn tick(&mut self, dt: f32) -> Result<(), EngineError> {
        FlowField::tick(self, dt)
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The construction config with the live knob values and origin.
    fn params(&self) -> Value {
        let mut params = self.config.to_json();
        params["origin"] = serde_json::json!(self.origin.to_array());
        params["move_speed"] = serde_json::json!(self.move_speed);
        params["rotation_speed"] = serde_json::json!(self.rotation_speed);
        params["particle_scale"] = serde_json::json!(self.particle_scale);
        params
    }

    fn param_schema(&self) -> Value {
        FlowFieldConfig::schema()
    }
}

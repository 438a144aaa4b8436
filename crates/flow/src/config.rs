//! Flow-field configuration: defaults, JSON extraction, schema and validation.

use crate::grid::DirectionMapping;
use crate::sampler::{NoiseKind, DEFAULT_FREQUENCY, DEFAULT_NOISE_SEED};
use crate::spawn::DEFAULT_SPAWN_ATTEMPTS;
use glam::Vec3;
use noise_flow_core::error::EngineError;
use noise_flow_core::particle::Particle;
use noise_flow_core::params::{
    param_extent, param_f32, param_string, param_u32, param_usize, param_vec3,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default grid extent in cells per axis.
const DEFAULT_EXTENT: [usize; 3] = [16, 16, 16];
/// Default cell edge length in world units.
const DEFAULT_CELL_SIZE: f32 = 1.0;
/// Default noise-space distance between neighbouring cells.
const DEFAULT_INCREMENT: f32 = 3.0;
/// Default noise phase advance per second, per axis.
const DEFAULT_PHASE_RATE: f32 = 1.0;
/// Default number of particles to spawn.
const DEFAULT_PARTICLE_COUNT: usize = 100;
/// Default minimum distance between spawned particles.
const DEFAULT_SPAWN_RADIUS: f32 = 1.0;
/// Default particle visual scale.
const DEFAULT_PARTICLE_SCALE: f32 = 1.0;
/// Default particle travel speed, world units per second.
const DEFAULT_MOVE_SPEED: f32 = 10.0;
/// Default maximum steering rate, degrees per second.
const DEFAULT_ROTATION_SPEED: f32 = 90.0;

/// Largest allocation a `Vec` may request.
const MAX_ALLOC_BYTES: usize = isize::MAX as usize;

/// Everything needed to build a [`FlowField`](crate::field::FlowField).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowFieldConfig {
    /// Cells per axis.
    pub extent: [usize; 3],
    /// Cell edge length in world units.
    pub cell_size: f32,
    /// World position of the grid's minimum corner.
    pub origin: Vec3,
    /// Noise-space step between neighbouring cells, per axis. Independent of
    /// `cell_size`: it sets how fast the field varies across the grid.
    pub increment: Vec3,
    /// Noise phase advance per second, per axis.
    pub phase_rate: Vec3,
    /// Initial noise phase.
    pub phase: Vec3,
    pub noise: NoiseKind,
    pub noise_seed: u32,
    /// Frequency applied to noise-space coordinates before sampling.
    pub noise_frequency: f32,
    pub mapping: DirectionMapping,
    /// Target number of particles; fewer may be placed.
    pub particle_count: usize,
    /// Minimum distance between any two spawned particles.
    pub spawn_radius: f32,
    /// Placement attempts per particle before the slot is skipped.
    pub spawn_attempts: usize,
    pub particle_scale: f32,
    pub move_speed: f32,
    /// Maximum steering rate in degrees per second.
    pub rotation_speed: f32,
}

impl Default for FlowFieldConfig {
    fn default() -> Self {
        Self {
            extent: DEFAULT_EXTENT,
            cell_size: DEFAULT_CELL_SIZE,
            origin: Vec3::ZERO,
            increment: Vec3::splat(DEFAULT_INCREMENT),
            phase_rate: Vec3::splat(DEFAULT_PHASE_RATE),
            phase: Vec3::ZERO,
            noise: NoiseKind::Simplex,
            noise_seed: DEFAULT_NOISE_SEED,
            noise_frequency: DEFAULT_FREQUENCY,
            mapping: DirectionMapping::Faithful,
            particle_count: DEFAULT_PARTICLE_COUNT,
            spawn_radius: DEFAULT_SPAWN_RADIUS,
            spawn_attempts: DEFAULT_SPAWN_ATTEMPTS,
            particle_scale: DEFAULT_PARTICLE_SCALE,
            move_speed: DEFAULT_MOVE_SPEED,
            rotation_speed: DEFAULT_ROTATION_SPEED,
        }
    }
}

impl FlowFieldConfig {
    /// Extracts a config from a flat JSON object, falling back to defaults
    /// for missing or mistyped keys.
    ///
    /// `increment` and `phase_rate` accept either a number (all axes) or a
    /// `[x, y, z]` array. Unknown `noise`/`mapping` names fall back to the
    /// defaults.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            extent: param_extent(params, "extent", d.extent),
            cell_size: param_f32(params, "cell_size", d.cell_size),
            origin: param_vec3(params, "origin", d.origin),
            increment: param_axes(params, "increment", d.increment),
            phase_rate: param_axes(params, "phase_rate", d.phase_rate),
            phase: param_vec3(params, "phase", d.phase),
            noise: NoiseKind::from_name(&param_string(params, "noise", d.noise.name()))
                .unwrap_or(d.noise),
            noise_seed: param_u32(params, "noise_seed", d.noise_seed),
            noise_frequency: param_f32(params, "noise_frequency", d.noise_frequency),
            mapping: DirectionMapping::from_name(&param_string(
                params,
                "mapping",
                d.mapping.name(),
            ))
            .unwrap_or(d.mapping),
            particle_count: param_usize(params, "particle_count", d.particle_count),
            spawn_radius: param_f32(params, "spawn_radius", d.spawn_radius),
            spawn_attempts: param_usize(params, "spawn_attempts", d.spawn_attempts),
            particle_scale: param_f32(params, "particle_scale", d.particle_scale),
            move_speed: param_f32(params, "move_speed", d.move_speed),
            rotation_speed: param_f32(params, "rotation_speed", d.rotation_speed),
        }
    }

    /// The config as a flat JSON object using the same keys as [`from_json`](Self::from_json).
    pub fn to_json(&self) -> Value {
        json!({
            "extent": self.extent,
            "cell_size": self.cell_size,
            "origin": self.origin.to_array(),
            "increment": self.increment.to_array(),
            "phase_rate": self.phase_rate.to_array(),
            "phase": self.phase.to_array(),
            "noise": self.noise.name(),
            "noise_seed": self.noise_seed,
            "noise_frequency": self.noise_frequency,
            "mapping": self.mapping.name(),
            "particle_count": self.particle_count,
            "spawn_radius": self.spawn_radius,
            "spawn_attempts": self.spawn_attempts,
            "particle_scale": self.particle_scale,
            "move_speed": self.move_speed,
            "rotation_speed": self.rotation_speed,
        })
    }

    /// Schema for every key accepted by [`from_json`](Self::from_json).
    pub fn schema() -> Value {
        let d = Self::default();
        json!({
            "extent": {
                "type": "array",
                "items": "integer",
                "default": d.extent,
                "min": 1,
                "description": "Grid cells per axis [x, y, z]"
            },
            "cell_size": {
                "type": "number",
                "default": d.cell_size,
                "min": 0.0,
                "exclusive_min": true,
                "description": "Cell edge length in world units"
            },
            "origin": {
                "type": "array",
                "items": "number",
                "default": d.origin.to_array(),
                "description": "World position of the grid's minimum corner"
            },
            "increment": {
                "type": "number | array",
                "default": DEFAULT_INCREMENT,
                "description": "Noise-space step between neighbouring cells"
            },
            "phase_rate": {
                "type": "number | array",
                "default": DEFAULT_PHASE_RATE,
                "description": "Noise phase advance per second, per axis"
            },
            "phase": {
                "type": "array",
                "items": "number",
                "default": d.phase.to_array(),
                "description": "Initial noise phase"
            },
            "noise": {
                "type": "string",
                "enum": NoiseKind::NAMES,
                "default": d.noise.name(),
                "description": "Gradient noise driving the field"
            },
            "noise_seed": {
                "type": "integer",
                "default": d.noise_seed,
                "description": "Seed of the noise generator"
            },
            "noise_frequency": {
                "type": "number",
                "default": d.noise_frequency,
                "description": "Frequency applied to noise-space coordinates"
            },
            "mapping": {
                "type": "string",
                "enum": DirectionMapping::NAMES,
                "default": d.mapping.name(),
                "description": "Noise-to-direction mapping"
            },
            "particle_count": {
                "type": "integer",
                "default": d.particle_count,
                "min": 0,
                "description": "Target number of particles"
            },
            "spawn_radius": {
                "type": "number",
                "default": d.spawn_radius,
                "min": 0.0,
                "description": "Minimum distance between spawned particles"
            },
            "spawn_attempts": {
                "type": "integer",
                "default": d.spawn_attempts,
                "min": 1,
                "description": "Placement attempts per particle before it is skipped"
            },
            "particle_scale": {
                "type": "number",
                "default": d.particle_scale,
                "description": "Particle visual scale"
            },
            "move_speed": {
                "type": "number",
                "default": d.move_speed,
                "description": "Particle travel speed in world units per second"
            },
            "rotation_speed": {
                "type": "number",
                "default": d.rotation_speed,
                "description": "Maximum steering rate in degrees per second"
            }
        })
    }

    /// Rejects configurations that would produce an empty or undefined
    /// simulation.
    pub fn validate(&self) -> Result<(), EngineError> {
        let [x, y, z] = self.extent;
        if x == 0 || y == 0 || z == 0 {
            return Err(EngineError::InvalidExtent { x, y, z });
        }
        let cells = x
            .checked_mul(y)
            .and_then(|n| n.checked_mul(z))
            .ok_or(EngineError::InvalidExtent { x, y, z })?;
        if cells > MAX_ALLOC_BYTES / std::mem::size_of::<Vec3>() {
            return Err(EngineError::InvalidExtent { x, y, z });
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(EngineError::InvalidCellSize(self.cell_size));
        }
        for (name, v) in [
            ("origin", self.origin),
            ("increment", self.increment),
            ("phase_rate", self.phase_rate),
            ("phase", self.phase),
        ] {
            if !v.is_finite() {
                return Err(EngineError::invalid_param(name, "must be finite"));
            }
        }
        for (name, v) in [
            ("noise_frequency", self.noise_frequency),
            ("particle_scale", self.particle_scale),
            ("move_speed", self.move_speed),
            ("rotation_speed", self.rotation_speed),
        ] {
            if !v.is_finite() {
                return Err(EngineError::invalid_param(name, "must be finite"));
            }
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return Err(EngineError::invalid_param(
                "spawn_radius",
                "must be finite and non-negative",
            ));
        }
        if self.particle_count > MAX_ALLOC_BYTES / std::mem::size_of::<Particle>() {
            return Err(EngineError::invalid_param(
                "particle_count",
                "exceeds the addressable particle count",
            ));
        }
        if self.spawn_attempts == 0 {
            return Err(EngineError::invalid_param(
                "spawn_attempts",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A per-axis value given either as one number or as `[x, y, z]`.
fn param_axes(params: &Value, name: &str, default: Vec3) -> Vec3 {
    match params.get(name).and_then(Value::as_f64) {
        Some(v) => Vec3::splat(v as f32),
        None => param_vec3(params, name, default),
    }
}

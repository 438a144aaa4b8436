#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations and provides CPU-side
//! snapshot rendering.
//!
//! This crate sits between `noise-flow-core` (which defines the `Engine` trait)
//! and the engine crates (`noise-flow-field`, `noise-flow-audio`). The CLI
//! depends on it so name-based dispatch lives in one place.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use noise_flow_audio::{AudioFlowField, AudioFrame};
use noise_flow_core::bounds::Bounds;
use noise_flow_core::color::Rgba;
use noise_flow_core::error::EngineError;
use noise_flow_core::particle::Particle;
use noise_flow_core::{Engine, Seed};
use noise_flow_field::FlowField;
use serde_json::Value;

/// All available engine names.
const ENGINE_NAMES: &[&str] = &["noise-flow", "audio-flow"];

/// Enumeration of all available flow engines.
///
/// Wraps each engine implementation and delegates `Engine` trait methods.
/// Use [`EngineKind::from_name`] for string-based construction.
pub enum EngineKind {
    /// Plain noise flow field.
    NoiseFlow(FlowField),
    /// Flow field modulated by audio frames.
    AudioFlow(AudioFlowField),
}

impl EngineKind {
    /// Constructs an engine by name.
    ///
    /// Returns `EngineError::UnknownEngine` if the name is not recognized.
    pub fn from_name(name: &str, seed: u64, params: &Value) -> Result<Self, EngineError> {
        match name {
            "noise-flow" => Ok(EngineKind::NoiseFlow(FlowField::from_json(seed, params)?)),
            "audio-flow" => Ok(EngineKind::AudioFlow(AudioFlowField::from_json(
                seed, params,
            )?)),
            _ => Err(EngineError::UnknownEngine(name.to_string())),
        }
    }

    /// Constructs the engine a validated [`Seed`] describes.
    pub fn from_seed(seed: &Seed) -> Result<Self, EngineError> {
        seed.validate()?;
        Self::from_name(&seed.engine, seed.seed, &seed.params)
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }

    /// Feeds an audio frame to engines that react to sound.
    ///
    /// Returns `false` if this engine ignores audio.
    pub fn set_audio_frame(&mut self, frame: AudioFrame) -> bool {
        match self {
            EngineKind::NoiseFlow(_) => false,
            EngineKind::AudioFlow(e) => {
                e.set_frame(frame);
                true
            }
        }
    }

    /// The underlying flow field, for diagnostics and knobs.
    pub fn flow_field(&self) -> &FlowField {
        match self {
            EngineKind::NoiseFlow(e) => e,
            EngineKind::AudioFlow(e) => e.field(),
        }
    }
}

impl Engine for EngineKind {
    fn tick(&mut self, dt: f32) -> Result<(), EngineError> {
        match self {
            EngineKind::NoiseFlow(e) => e.tick(dt),
            EngineKind::AudioFlow(e) => e.tick(dt),
        }
    }

    fn particles(&self) -> &[Particle] {
        match self {
            EngineKind::NoiseFlow(e) => e.particles(),
            EngineKind::AudioFlow(e) => e.particles(),
        }
    }

    fn bounds(&self) -> Bounds {
        match self {
            EngineKind::NoiseFlow(e) => e.bounds(),
            EngineKind::AudioFlow(e) => e.bounds(),
        }
    }

    fn params(&self) -> Value {
        match self {
            EngineKind::NoiseFlow(e) => e.params(),
            EngineKind::AudioFlow(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EngineKind::NoiseFlow(e) => e.param_schema(),
            EngineKind::AudioFlow(e) => e.param_schema(),
        }
    }

    fn particle_tint(&self, index: usize) -> Option<Rgba> {
        match self {
            EngineKind::NoiseFlow(e) => e.particle_tint(index),
            EngineKind::AudioFlow(e) => e.particle_tint(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn small() -> Value {
        json!({"extent": [4, 4, 4], "particle_count": 10, "spawn_radius": 0.5})
    }

    #[test]
    fn from_name_known_engines_succeed() {
        for name in EngineKind::list_engines() {
            assert!(EngineKind::from_name(name, 42, &small()).is_ok(), "{name}");
        }
    }

    #[test]
    fn from_name_unknown_returns_error() {
        let result = EngineKind::from_name("nonexistent", 42, &json!({}));
        assert!(matches!(result, Err(EngineError::UnknownEngine(_))));
    }

    #[test]
    fn from_name_propagates_config_errors() {
        let result = EngineKind::from_name("noise-flow", 42, &json!({"cell_size": -1.0}));
        assert!(matches!(result, Err(EngineError::InvalidCellSize(_))));
    }

    #[test]
    fn from_seed_validates_first() {
        let mut seed = Seed::new("noise-flow", 1);
        seed.params = small();
        assert!(EngineKind::from_seed(&seed).is_ok());
        seed.dt = f32::NAN;
        assert!(matches!(
            EngineKind::from_seed(&seed),
            Err(EngineError::InvalidTimeStep(_))
        ));
    }

    #[test]
    fn trait_delegation_tick_and_particles() {
        let mut engine = EngineKind::from_name("noise-flow", 42, &small()).unwrap();
        assert_eq!(engine.particles().len(), 10);
        assert_eq!(engine.bounds().max, glam::Vec3::splat(4.0));
        engine.tick(0.1).unwrap();
        assert_eq!(engine.flow_field().diagnostics().ticks, 1);
    }

    #[test]
    fn trait_delegation_params_and_schema() {
        let engine = EngineKind::from_name("audio-flow", 42, &small()).unwrap();
        let params = engine.params();
        assert!(params.get("move_speed").is_some());
        assert!(params.get("color1_threshold").is_some());
        let schema = engine.param_schema();
        assert!(schema.get("rotation_range").is_some());
    }

    #[test]
    fn audio_frames_only_reach_audio_engine() {
        let mut plain = EngineKind::from_name("noise-flow", 42, &small()).unwrap();
        let mut audio = EngineKind::from_name("audio-flow", 42, &small()).unwrap();
        assert!(!plain.set_audio_frame(AudioFrame::synthetic(0.3)));
        assert!(audio.set_audio_frame(AudioFrame::synthetic(0.3)));
        assert!(plain.particle_tint(0).is_none());
        assert!(audio.particle_tint(0).is_some());
    }

    #[test]
    fn determinism_same_seed() {
        let mut a = EngineKind::from_name("noise-flow", 99, &small()).unwrap();
        let mut b = EngineKind::from_name("noise-flow", 99, &small()).unwrap();
        for _ in 0..30 {
            a.tick(1.0 / 60.0).unwrap();
            b.tick(1.0 / 60.0).unwrap();
        }
        assert!(a
            .particles()
            .iter()
            .zip(b.particles())
            .all(|(pa, pb)| pa.position.to_array().map(f32::to_bits)
                == pb.position.to_array().map(f32::to_bits)));
    }

    #[test]
    fn object_safety() {
        let engine = EngineKind::from_name("noise-flow", 42, &small()).unwrap();
        let boxed: Box<dyn Engine> = Box::new(engine);
        assert_eq!(boxed.particles().len(), 10);
    }
}

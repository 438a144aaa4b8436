//! Audio-reactive flow field engine.

use crate::frame::AudioFrame;
use crate::modulator::{Modulator, ModulatorConfig};
use noise_flow_core::bounds::Bounds;
use noise_flow_core::color::Rgba;
use noise_flow_core::error::EngineError;
use noise_flow_core::particle::Particle;
use noise_flow_core::Engine;
use noise_flow_field::{FlowField, FlowFieldConfig, SpawnReport};
use serde_json::Value;

/// A [`FlowField`] whose knobs follow the most recent [`AudioFrame`].
///
/// The frame set with [`set_frame`](Self::set_frame) is applied at the start
/// of every tick, before the field advances.
pub struct AudioFlowField {
    field: FlowField,
    modulator: Modulator,
    frame: AudioFrame,
}

impl AudioFlowField {
    pub fn new(
        flow: FlowFieldConfig,
        modulation: ModulatorConfig,
        seed: u64,
    ) -> Result<(Self, SpawnReport), EngineError> {
        let mut modulator = Modulator::new(modulation)?;
        let (field, report) = FlowField::initialize_with(flow, seed, &mut [&mut modulator])?;
        let engine = Self {
            field,
            modulator,
            frame: AudioFrame::silent(),
        };
        Ok((engine, report))
    }

    /// Builds from one flat params object holding both flow and modulation keys.
    pub fn from_json(seed: u64, params: &Value) -> Result<Self, EngineError> {
        let flow = FlowFieldConfig::from_json(params);
        let modulation = ModulatorConfig::from_json(params);
        Self::new(flow, modulation, seed).map(|(engine, _)| engine)
    }

    /// Replaces the frame applied on subsequent ticks.
    pub fn set_frame(&mut self, frame: AudioFrame) {
        self.frame = frame;
    }

    pub fn field(&self) -> &FlowField {
        &self.field
    }

    pub fn modulator(&self) -> &Modulator {
        &self.modulator
    }
}

impl Engine for AudioFlowField {
    fn tick(&mut self, dt: f32) -> Result<(), EngineError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(EngineError::InvalidTimeStep(dt));
        }
        self.modulator.apply(&self.frame, &mut self.field)?;
        self.field.tick(dt)
    }

    fn particles(&self) -> &[Particle] {
        self.field.particles()
    }

    fn bounds(&self) -> Bounds {
        self.field.bounds()
    }

    fn params(&self) -> Value {
        let mut params = Engine::params(&self.field);
        if let (Value::Object(out), Value::Object(extra)) =
            (&mut params, self.modulator.config().to_json())
        {
            out.extend(extra);
        }
        params
    }

    fn param_schema(&self) -> Value {
        let mut schema = FlowFieldConfig::schema();
        if let (Value::Object(out), Value::Object(extra)) =
            (&mut schema, ModulatorConfig::schema())
        {
            out.extend(extra);
        }
        schema
    }

    /// Color of the first channel for the particle's band.
    fn particle_tint(&self, index: usize) -> Option<Rgba> {
        let particle = self.field.particles().get(index)?;
        self.modulator.tint(particle.band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::BAND_COUNT;
    use serde_json::json;

    fn engine(count: usize) -> AudioFlowField {
        AudioFlowField::from_json(
            3,
            &json!({"extent": [6, 6, 6], "particle_count": count, "spawn_radius": 0.2}),
        )
        .unwrap()
    }

    #[test]
    fn spawned_particles_carry_bands() {
        let e = engine(12);
        for (i, p) in e.particles().iter().enumerate() {
            assert_eq!(p.band, i % BAND_COUNT);
        }
    }

    #[test]
    fn tick_applies_current_frame_first() {
        let mut e = engine(4);
        e.set_frame(AudioFrame {
            amplitude: 1.0,
            band_buffer: [1.0; BAND_COUNT],
            band: [1.0; BAND_COUNT],
        });
        e.tick(0.0).unwrap();
        assert_eq!(e.field().move_speed(), 50.0);
        assert_eq!(e.field().rotation_speed(), 250.0);
        for p in e.particles() {
            assert_eq!(p.scale, 3.0);
        }
    }

    #[test]
    fn silent_frame_freezes_particles() {
        let mut e = engine(5);
        let before: Vec<_> = e.particles().iter().map(|p| p.position).collect();
        e.tick(0.1).unwrap();
        // Amplitude 0 maps to the bottom of the speed range.
        for (p, b) in e.particles().iter().zip(&before) {
            assert_eq!(p.position, *b);
        }
    }

    #[test]
    fn bad_dt_does_not_apply_frame() {
        let mut e = engine(2);
        e.set_frame(AudioFrame {
            amplitude: 1.0,
            ..Default::default()
        });
        assert!(e.tick(f32::NAN).is_err());
        assert_eq!(e.field().move_speed(), 10.0);
    }

    #[test]
    fn tint_comes_from_first_channel() {
        let mut e = engine(9);
        assert_eq!(e.particle_tint(0), Some(Rgba::TRANSPARENT));
        e.set_frame(AudioFrame {
            band_buffer: [0.9; BAND_COUNT],
            ..Default::default()
        });
        e.tick(0.01).unwrap();
        assert_eq!(e.particle_tint(8), Some(e.modulator().colors1()[0]));
        assert_ne!(e.particle_tint(8), Some(Rgba::TRANSPARENT));
        assert!(e.particle_tint(100).is_none());
    }

    #[test]
    fn params_and_schema_merge_both_configs() {
        let e = engine(1);
        let params = e.params();
        assert!(params.get("extent").is_some());
        assert!(params.get("speed_range").is_some());
        let schema = e.param_schema();
        for key in params.as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
        }
    }

    #[test]
    fn invalid_modulation_is_rejected() {
        let result = AudioFlowField::from_json(1, &json!({"speed_range": [0, 1e39]}));
        assert!(result.is_err());
    }
}

//! Maps audio frames onto flow-field knobs and per-band colors.
//!
//! Each apply runs up to four stages in order: speed (global move and
//! rotation speed from amplitude), scale (per-particle multiplier from the
//! particle's band), and two color channels producing one color per band.
//! Colors are outputs only; a renderer looks them up by a particle's band.

use crate::frame::{AudioFrame, BAND_COUNT};
use noise_flow_core::color::Rgba;
use noise_flow_core::error::EngineError;
use noise_flow_core::gradient::Gradient;
use noise_flow_core::params::{param_bool, param_f32, param_range, param_string};
use noise_flow_core::particle::Particle;
use noise_flow_field::{FlowField, SpawnObserver};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const DEFAULT_SPEED_RANGE: (f32, f32) = (0.0, 50.0);
const DEFAULT_ROTATION_RANGE: (f32, f32) = (50.0, 250.0);
const DEFAULT_SCALE_RANGE: (f32, f32) = (0.0, 3.0);

/// Linear interpolation across `range` with `t` clamped to [0, 1].
pub fn lerp_clamped(range: (f32, f32), t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    range.0 + (range.1 - range.0) * t
}

/// One per-band color output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorChannel {
    pub enabled: bool,
    /// Material property the renderer should write, e.g. `_Color`.
    pub property: String,
    /// Band `i` takes its base color at position `i / BAND_COUNT`.
    pub gradient: Gradient,
    /// Smoothed band energy must exceed this for the band to light up.
    pub threshold: f32,
    pub multiplier: f32,
}

impl ColorChannel {
    /// Diffuse channel: `_Color`, threshold 0.2.
    pub fn primary() -> Self {
        Self {
            enabled: true,
            property: "_Color".to_string(),
            gradient: Gradient::spectrum(),
            threshold: 0.2,
            multiplier: 1.0,
        }
    }

    /// Emissive channel: `_EmissionColor`, threshold 0.5.
    pub fn emission() -> Self {
        Self {
            enabled: true,
            property: "_EmissionColor".to_string(),
            gradient: Gradient::ember(),
            threshold: 0.5,
            multiplier: 1.0,
        }
    }

    fn from_json(params: &Value, prefix: &str, default: Self) -> Self {
        let key = |suffix: &str| format!("{prefix}_{suffix}");
        Self {
            enabled: param_bool(params, &format!("use_{prefix}"), default.enabled),
            property: param_string(params, &key("property"), &default.property),
            gradient: param_gradient(params, &key("gradient"), default.gradient),
            threshold: param_f32(params, &key("threshold"), default.threshold),
            multiplier: param_f32(params, &key("multiplier"), default.multiplier),
        }
    }

    fn write_json(&self, prefix: &str, out: &mut Map<String, Value>) {
        let hexes: Vec<String> = self
            .gradient
            .keys()
            .iter()
            .map(|k| k.color.to_hex())
            .collect();
        out.insert(format!("use_{prefix}"), json!(self.enabled));
        out.insert(format!("{prefix}_property"), json!(self.property));
        out.insert(format!("{prefix}_gradient"), json!(hexes));
        out.insert(format!("{prefix}_threshold"), json!(self.threshold));
        out.insert(format!("{prefix}_multiplier"), json!(self.multiplier));
    }

    fn write_schema(&self, prefix: &str, out: &mut Map<String, Value>) {
        out.insert(
            format!("use_{prefix}"),
            json!({"type": "boolean", "default": self.enabled, "description": "Enable this color channel"}),
        );
        out.insert(
            format!("{prefix}_property"),
            json!({"type": "string", "default": self.property, "description": "Material property name"}),
        );
        out.insert(
            format!("{prefix}_gradient"),
            json!({"type": "array", "items": "string", "description": "Evenly spaced hex colors sampled per band"}),
        );
        out.insert(
            format!("{prefix}_threshold"),
            json!({"type": "number", "default": self.threshold, "min": 0.0, "max": 1.0,
                   "description": "Smoothed band energy needed to light the band"}),
        );
        out.insert(
            format!("{prefix}_multiplier"),
            json!({"type": "number", "default": self.multiplier, "description": "Color intensity factor"}),
        );
    }

    fn validate(&self, prefix: &str) -> Result<(), EngineError> {
        if !self.threshold.is_finite() {
            return Err(EngineError::invalid_param(
                &format!("{prefix}_threshold"),
                "must be finite",
            ));
        }
        if !self.multiplier.is_finite() {
            return Err(EngineError::invalid_param(
                &format!("{prefix}_multiplier"),
                "must be finite",
            ));
        }
        Ok(())
    }

    fn base_colors(&self) -> [Rgba; BAND_COUNT] {
        std::array::from_fn(|i| self.gradient.evaluate(i as f32 / BAND_COUNT as f32))
    }
}

/// A gradient given as an array of hex strings; anything unparsable yields `default`.
fn param_gradient(params: &Value, name: &str, default: Gradient) -> Gradient {
    let Some(items) = params.get(name).and_then(Value::as_array) else {
        return default;
    };
    let hexes: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
    match hexes.map(|h| Gradient::from_hex(&h)) {
        Some(Ok(gradient)) => gradient,
        Some(Err(e)) => {
            log::warn!("ignoring '{name}': {e}");
            default
        }
        None => default,
    }
}

/// Modulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulatorConfig {
    pub use_speed: bool,
    /// Move speed at amplitude 0 and 1.
    pub speed_range: (f32, f32),
    /// Rotation speed (degrees per second) at amplitude 0 and 1.
    pub rotation_range: (f32, f32),
    pub use_scale: bool,
    /// Scale multiplier at band energy 0 and 1.
    pub scale_range: (f32, f32),
    pub color1: ColorChannel,
    pub color2: ColorChannel,
}

impl Default for ModulatorConfig {
    fn default() -> Self {
        Self {
            use_speed: true,
            speed_range: DEFAULT_SPEED_RANGE,
            rotation_range: DEFAULT_ROTATION_RANGE,
            use_scale: true,
            scale_range: DEFAULT_SCALE_RANGE,
            color1: ColorChannel::primary(),
            color2: ColorChannel::emission(),
        }
    }
}

impl ModulatorConfig {
    /// Reads flat keys; missing or mistyped values keep their defaults.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            use_speed: param_bool(params, "use_speed", d.use_speed),
            speed_range: param_range(params, "speed_range", d.speed_range),
            rotation_range: param_range(params, "rotation_range", d.rotation_range),
            use_scale: param_bool(params, "use_scale", d.use_scale),
            scale_range: param_range(params, "scale_range", d.scale_range),
            color1: ColorChannel::from_json(params, "color1", d.color1),
            color2: ColorChannel::from_json(params, "color2", d.color2),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("use_speed".into(), json!(self.use_speed));
        out.insert("speed_range".into(), json!([self.speed_range.0, self.speed_range.1]));
        out.insert(
            "rotation_range".into(),
            json!([self.rotation_range.0, self.rotation_range.1]),
        );
        out.insert("use_scale".into(), json!(self.use_scale));
        out.insert("scale_range".into(), json!([self.scale_range.0, self.scale_range.1]));
        self.color1.write_json("color1", &mut out);
        self.color2.write_json("color2", &mut out);
        Value::Object(out)
    }

    pub fn schema() -> Value {
        let d = Self::default();
        let mut out = Map::new();
        out.insert(
            "use_speed".into(),
            json!({"type": "boolean", "default": d.use_speed, "description": "Drive speeds from amplitude"}),
        );
        out.insert(
            "speed_range".into(),
            json!({"type": "array", "items": "number", "default": [d.speed_range.0, d.speed_range.1],
                   "description": "Move speed at amplitude [0, 1]"}),
        );
        out.insert(
            "rotation_range".into(),
            json!({"type": "array", "items": "number", "default": [d.rotation_range.0, d.rotation_range.1],
                   "description": "Rotation speed in degrees per second at amplitude [0, 1]"}),
        );
        out.insert(
            "use_scale".into(),
            json!({"type": "boolean", "default": d.use_scale, "description": "Drive particle scale from band energy"}),
        );
        out.insert(
            "scale_range".into(),
            json!({"type": "array", "items": "number", "default": [d.scale_range.0, d.scale_range.1],
                   "description": "Scale multiplier at band energy [0, 1]"}),
        );
        d.color1.write_schema("color1", &mut out);
        d.color2.write_schema("color2", &mut out);
        Value::Object(out)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, (lo, hi)) in [
            ("speed_range", self.speed_range),
            ("rotation_range", self.rotation_range),
            ("scale_range", self.scale_range),
        ] {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(EngineError::invalid_param(name, "bounds must be finite"));
            }
        }
        self.color1.validate("color1")?;
        self.color2.validate("color2")
    }
}

/// Applies audio frames to a [`FlowField`] and keeps the per-band colors.
#[derive(Debug, Clone)]
pub struct Modulator {
    config: ModulatorConfig,
    base1: [Rgba; BAND_COUNT],
    base2: [Rgba; BAND_COUNT],
    colors1: [Rgba; BAND_COUNT],
    colors2: [Rgba; BAND_COUNT],
}

impl Modulator {
    pub fn new(config: ModulatorConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let base1 = config.color1.base_colors();
        let base2 = config.color2.base_colors();
        Ok(Self {
            config,
            base1,
            base2,
            colors1: [Rgba::TRANSPARENT; BAND_COUNT],
            colors2: [Rgba::TRANSPARENT; BAND_COUNT],
        })
    }

    pub fn config(&self) -> &ModulatorConfig {
        &self.config
    }

    /// Runs every enabled stage for `frame`.
    pub fn apply(&mut self, frame: &AudioFrame, field: &mut FlowField) -> Result<(), EngineError> {
        if self.config.use_speed {
            self.apply_speed(frame.amplitude, field)?;
        }
        if self.config.use_scale {
            self.apply_scale(&frame.band_buffer, field)?;
        }
        if self.config.color1.enabled {
            self.colors1 = band_colors(
                &self.base1,
                &self.config.color1,
                &frame.band_buffer,
                &frame.band_buffer,
            );
        }
        if self.config.color2.enabled {
            self.colors2 = band_colors(
                &self.base2,
                &self.config.color2,
                &frame.band_buffer,
                &frame.band,
            );
        }
        Ok(())
    }

    fn apply_speed(&self, amplitude: f32, field: &mut FlowField) -> Result<(), EngineError> {
        if !amplitude.is_finite() {
            log::debug!("skipping speed modulation: amplitude {amplitude} is not finite");
            return Ok(());
        }
        field.set_move_speed(lerp_clamped(self.config.speed_range, amplitude))?;
        field.set_rotation_speed(lerp_clamped(self.config.rotation_range, amplitude))
    }

    fn apply_scale(
        &self,
        band_buffer: &[f32; BAND_COUNT],
        field: &mut FlowField,
    ) -> Result<(), EngineError> {
        for index in 0..field.particle_count() {
            let band = field.particles()[index].band % BAND_COUNT;
            let ratio = band_buffer[band];
            if !ratio.is_finite() {
                continue;
            }
            field.set_scale_multiplier(index, lerp_clamped(self.config.scale_range, ratio))?;
        }
        Ok(())
    }

    /// Current colors of the first channel, indexed by band.
    pub fn colors1(&self) -> &[Rgba; BAND_COUNT] {
        &self.colors1
    }

    /// Current colors of the second channel, indexed by band.
    pub fn colors2(&self) -> &[Rgba; BAND_COUNT] {
        &self.colors2
    }

    /// First-channel color for a particle's band, or `None` if that channel is off.
    pub fn tint(&self, band: usize) -> Option<Rgba> {
        self.config
            .color1
            .enabled
            .then(|| self.colors1[band % BAND_COUNT])
    }
}

/// Per-band color: `base * intensity * multiplier` where the gate value
/// exceeds the threshold, transparent black elsewhere.
fn band_colors(
    base: &[Rgba; BAND_COUNT],
    channel: &ColorChannel,
    gate: &[f32; BAND_COUNT],
    intensity: &[f32; BAND_COUNT],
) -> [Rgba; BAND_COUNT] {
    std::array::from_fn(|i| {
        if gate[i] > channel.threshold {
            base[i] * intensity[i] * channel.multiplier
        } else {
            Rgba::TRANSPARENT
        }
    })
}

impl SpawnObserver for Modulator {
    /// Assigns bands round-robin in spawn order.
    fn particles_generated(&mut self, particles: &mut [Particle]) {
        for (i, particle) in particles.iter_mut().enumerate() {
            particle.band = i % BAND_COUNT;
        }
        log::debug!("assigned {} particles to {BAND_COUNT} bands", particles.len());
    }
}

//! Scalar 3D noise samplers feeding the direction grid.
//!
//! A [`NoiseSampler`] maps a 3D coordinate to a coherent scalar in roughly
//! [-1, 1]. Gradient samplers wrap the `noise` crate and apply a frequency
//! to the input coordinates; [`ConstantSampler`] returns a fixed value and is
//! used to pin the field for calibration and tests.
//!
//! All implementations are deterministic: same seed and inputs, same output.

use noise::{NoiseFn, OpenSimplex, Perlin};
use serde::{Deserialize, Serialize};

/// Default input frequency applied to grid coordinates before sampling.
pub const DEFAULT_FREQUENCY: f32 = 0.01;
/// Default noise seed.
pub const DEFAULT_NOISE_SEED: u32 = 1337;

/// A source of scalar 3D noise.
pub trait NoiseSampler: Send + Sync {
    /// Samples the noise at `(x, y, z)`.
    fn sample(&self, x: f32, y: f32, z: f32) -> f32;
}

/// OpenSimplex gradient noise.
pub struct SimplexSampler {
    noise: OpenSimplex,
    frequency: f64,
}

/// Classic Perlin gradient noise.
pub struct PerlinSampler {
    noise: Perlin,
    frequency: f64,
}

/// Returns the same value everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSampler(pub f32);

impl SimplexSampler {
    pub fn new(seed: u32, frequency: f32) -> Self {
        Self {
            noise: OpenSimplex::new(seed),
            frequency: frequency as f64,
        }
    }
}

impl PerlinSampler {
    pub fn new(seed: u32, frequency: f32) -> Self {
        Self {
            noise: Perlin::new(seed),
            frequency: frequency as f64,
        }
    }
}

impl NoiseSampler for SimplexSampler {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let f = self.frequency;
        self.noise.get([x as f64 * f, y as f64 * f, z as f64 * f]) as f32
    }
}

impl NoiseSampler for PerlinSampler {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let f = self.frequency;
        self.noise.get([x as f64 * f, y as f64 * f, z as f64 * f]) as f32
    }
}

impl NoiseSampler for ConstantSampler {
    fn sample(&self, _x: f32, _y: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Which gradient noise drives the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    #[default]
    Simplex,
    Perlin,
}

impl NoiseKind {
    pub const NAMES: &'static [&'static str] = &["simplex", "perlin"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "simplex" => Some(NoiseKind::Simplex),
            "perlin" => Some(NoiseKind::Perlin),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NoiseKind::Simplex => "simplex",
            NoiseKind::Perlin => "perlin",
        }
    }

    /// Builds a boxed sampler of this kind.
    pub fn sampler(self, seed: u32, frequency: f32) -> Box<dyn NoiseSampler> {
        match self {
            NoiseKind::Simplex => Box::new(SimplexSampler::new(seed, frequency)),
            NoiseKind::Perlin => Box::new(PerlinSampler::new(seed, frequency)),
        }
    }
}

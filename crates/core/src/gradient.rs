//! Color gradient sampled by position, used to derive per-band colors.
//!
//! A gradient is a sorted list of color keys in [0, 1]. Sampling between two
//! keys interpolates linearly in RGBA; sampling outside the key range returns
//! the nearest end key.

use crate::color::Rgba;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// A color stop at `position` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientKey {
    pub position: f32,
    pub color: Rgba,
}

/// Piecewise-linear RGBA gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GradientKey>", into = "Vec<GradientKey>")]
pub struct Gradient {
    keys: Vec<GradientKey>,
}

impl Gradient {
    /// Builds a gradient from keys in any order.
    ///
    /// Requires at least one key, and every position finite and in [0, 1].
    pub fn new(mut keys: Vec<GradientKey>) -> Result<Self, EngineError> {
        if keys.is_empty() {
            return Err(EngineError::InvalidGradient(
                "gradient requires at least 1 key".to_string(),
            ));
        }
        if let Some(bad) = keys
            .iter()
            .find(|k| !(0.0..=1.0).contains(&k.position))
        {
            return Err(EngineError::InvalidGradient(format!(
                "key position {} outside [0, 1]",
                bad.position
            )));
        }
        keys.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(Self { keys })
    }

    /// Evenly spaced keys from hex strings (`"#rrggbb"` or `"#rrggbbaa"`).
    pub fn from_hex(hexes: &[&str]) -> Result<Self, EngineError> {
        let colors = hexes
            .iter()
            .map(|h| Rgba::from_hex(h))
            .collect::<Result<Vec<_>, _>>()?;
        Self::evenly_spaced(&colors)
    }

    /// Evenly spaced keys from colors. A single color yields a flat gradient.
    pub fn evenly_spaced(colors: &[Rgba]) -> Result<Self, EngineError> {
        let n = colors.len();
        let keys = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| GradientKey {
                position: if n <= 1 {
                    0.0
                } else {
                    i as f32 / (n - 1) as f32
                },
                color,
            })
            .collect();
        Self::new(keys)
    }

    pub fn keys(&self) -> &[GradientKey] {
        &self.keys
    }

    /// Samples the gradient at `t`. NaN samples the first key.
    pub fn evaluate(&self, t: f32) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t };
        let Some(first) = self.keys.first() else {
            return Rgba::TRANSPARENT;
        };
        if t <= first.position {
            return first.color;
        }
        for pair in self.keys.windows(2) {
            let (k0, k1) = (pair[0], pair[1]);
            if t <= k1.position {
                let span = k1.position - k0.position;
                if span <= 0.0 {
                    return k1.color;
                }
                return k0.color.lerp(k1.color, (t - k0.position) / span);
            }
        }
        self.keys[self.keys.len() - 1].color
    }

    /// Blue through green to red: the default low-to-high band ramp.
    pub fn spectrum() -> Self {
        Self {
            keys: vec![
                GradientKey {
                    position: 0.0,
                    color: Rgba::new(0.1, 0.2, 1.0, 1.0),
                },
                GradientKey {
                    position: 0.5,
                    color: Rgba::new(0.1, 1.0, 0.4, 1.0),
                },
                GradientKey {
                    position: 1.0,
                    color: Rgba::new(1.0, 0.15, 0.1, 1.0),
                },
            ],
        }
    }

    /// Warm white to orange, used for the emissive channel.
    pub fn ember() -> Self {
        Self {
            keys: vec![
                GradientKey {
                    position: 0.0,
                    color: Rgba::new(1.0, 0.95, 0.8, 1.0),
                },
                GradientKey {
                    position: 1.0,
                    color: Rgba::new(1.0, 0.45, 0.05, 1.0),
                },
            ],
        }
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::spectrum()
    }
}

impl TryFrom<Vec<GradientKey>> for Gradient {
    type Error = EngineError;

    fn try_from(keys: Vec<GradientKey>) -> Result<Self, Self::Error> {
        Gradient::new(keys)
    }
}

impl From<Gradient> for Vec<GradientKey> {
    fn from(g: Gradient) -> Self {
        g.keys
    }
}

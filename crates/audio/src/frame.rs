//! Per-frame audio analysis values consumed by the modulator.

use serde::{Deserialize, Serialize};

/// Number of frequency bands in an [`AudioFrame`].
pub const BAND_COUNT: usize = 8;

/// One frame of band-split audio energy.
///
/// Values are nominally in [0, 1] but are not required to be; the modulator
/// clamps interpolation factors and skips NaN inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFrame {
    /// Smoothed overall amplitude.
    pub amplitude: f32,
    /// Smoothed per-band energy.
    pub band_buffer: [f32; BAND_COUNT],
    /// Raw per-band energy.
    pub band: [f32; BAND_COUNT],
}

impl AudioFrame {
    /// A frame with every value at zero.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Deterministic test signal at time `t` seconds.
    ///
    /// Each band pulses at its own rate; the raw value leads the smoothed one
    /// slightly so the two color channels differ.
    pub fn synthetic(t: f32) -> Self {
        let mut frame = Self::default();
        for i in 0..BAND_COUNT {
            let rate = 0.5 + i as f32 * 0.35;
            let phase = i as f32 * 0.9;
            frame.band_buffer[i] = 0.5 + 0.5 * (t * rate + phase).sin();
            frame.band[i] = 0.5 + 0.5 * ((t + 0.1) * rate + phase).sin();
        }
        frame.amplitude = frame.band_buffer.iter().sum::<f32>() / BAND_COUNT as f32;
        frame
    }

    /// Parses a JSON array of frames. Missing fields default to zero.
    pub fn sequence_from_json(json: &str) -> Result<Vec<AudioFrame>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

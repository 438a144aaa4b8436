//! CPU-side PNG rendering of an engine's particles.
//!
//! This module is feature-gated behind `png` (default on) so lean builds can
//! depend on the `engines` crate without pulling in the `image` crate.
//! The pixel buffer conversion itself lives in [`crate::pixel`] (always available).

use noise_flow_core::error::EngineError;
use noise_flow_core::Engine;
use std::path::Path;

use crate::pixel::project_to_rgba;

/// Writes an orthographic XY snapshot of `engine` as a PNG image.
///
/// Returns `EngineError::InvalidParameter` if the image dimensions are zero or
/// overflow `u32`, or `EngineError::Io` on write failure.
pub fn write_png(
    engine: &dyn Engine,
    width: usize,
    height: usize,
    path: &Path,
) -> Result<(), EngineError> {
    let dims = |name: &str, v: usize| {
        u32::try_from(v)
            .ok()
            .filter(|&v| v > 0)
            .ok_or_else(|| EngineError::invalid_param(name, format!("{v} is not a valid image size")))
    };
    let w = dims("width", width)?;
    let h = dims("height", height)?;
    let rgba = project_to_rgba(engine, width, height);
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

//! Pure-computation pixel buffer conversion from an [`Engine`]'s particles.
//!
//! This module is always available (no feature gate) so callers without the
//! `png` feature can still get raw RGBA8 frames.
//!
//! The projection is orthographic along -Z: world X maps to image columns and
//! world Y to image rows (up is up). The bounds' XY rectangle is fitted to the
//! image with uniform scale and centred.

use glam::{Vec2, Vec3};
use noise_flow_core::bounds::Bounds;
use noise_flow_core::color::Rgba;
use noise_flow_core::Engine;

/// Color of the bounds outline.
const OUTLINE: [u8; 4] = [64, 64, 64, 255];
/// Fraction of the image left as margin around the bounds.
const MARGIN: f32 = 0.05;
/// Largest dot half-width in pixels.
const MAX_DOT_RADIUS: f32 = 8.0;

/// Maps world XY into pixel coordinates for a fixed image size.
#[derive(Debug, Clone, Copy)]
struct Projection {
    center: Vec2,
    scale: f32,
    width: usize,
    height: usize,
}

impl Projection {
    fn fit(bounds: &Bounds, width: usize, height: usize) -> Self {
        let size = bounds.size().truncate();
        let usable = 1.0 - 2.0 * MARGIN;
        let sx = width as f32 * usable / size.x.max(f32::EPSILON);
        let sy = height as f32 * usable / size.y.max(f32::EPSILON);
        Self {
            center: bounds.center().truncate(),
            scale: sx.min(sy),
            width,
            height,
        }
    }

    fn to_pixel(self, p: Vec3) -> Vec2 {
        let rel = (p.truncate() - self.center) * self.scale;
        Vec2::new(
            self.width as f32 * 0.5 + rel.x,
            self.height as f32 * 0.5 - rel.y,
        )
    }
}

/// Renders particles over a black background as an RGBA8 buffer of length
/// `width * height * 4`.
///
/// Each particle is a square dot sized by its scale, colored by
/// [`Engine::particle_tint`] (alpha-composited over black) or white when the
/// engine reports no tint. The outline of the bounds is drawn first.
pub fn project_to_rgba(engine: &dyn Engine, width: usize, height: usize) -> Vec<u8> {
    let mut buf = vec![0u8; width * height * 4];
    for px in buf.chunks_exact_mut(4) {
        px[3] = 255;
    }
    if width == 0 || height == 0 {
        return buf;
    }

    let bounds = engine.bounds();
    let proj = Projection::fit(&bounds, width, height);

    for (a, b) in bounds.wire_edges() {
        draw_line(&mut buf, proj, proj.to_pixel(a), proj.to_pixel(b), OUTLINE);
    }

    for (i, particle) in engine.particles().iter().enumerate() {
        if !particle.position.is_finite() {
            continue;
        }
        let color = match engine.particle_tint(i) {
            Some(tint) => over_black(tint),
            None => Rgba::WHITE.to_rgba8(),
        };
        let radius = (particle.scale.abs() * 0.5 * proj.scale)
            .clamp(0.5, MAX_DOT_RADIUS);
        let center = proj.to_pixel(particle.position);
        fill_square(&mut buf, proj, center, radius, color);
    }
    buf
}

fn over_black(c: Rgba) -> [u8; 4] {
    let a = if c.a.is_nan() { 0.0 } else { c.a.clamp(0.0, 1.0) };
    Rgba::new(c.r * a, c.g * a, c.b * a, 1.0).to_rgba8()
}

fn put(buf: &mut [u8], proj: Projection, x: i64, y: i64, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= proj.width || y as usize >= proj.height {
        return;
    }
    let i = (y as usize * proj.width + x as usize) * 4;
    buf[i..i + 4].copy_from_slice(&color);
}

fn draw_line(buf: &mut [u8], proj: Projection, a: Vec2, b: Vec2, color: [u8; 4]) {
    let steps = (b - a).abs().max_element().ceil().max(1.0) as i64;
    for s in 0..=steps {
        let p = a.lerp(b, s as f32 / steps as f32);
        put(buf, proj, p.x.floor() as i64, p.y.floor() as i64, color);
    }
}

fn fill_square(buf: &mut [u8], proj: Projection, center: Vec2, radius: f32, color: [u8; 4]) {
    let x0 = (center.x - radius).floor() as i64;
    let x1 = (center.x + radius).ceil() as i64;
    let y0 = (center.y - radius).floor() as i64;
    let y1 = (center.y + radius).ceil() as i64;
    for y in y0..y1 {
        for x in x0..x1 {
            put(buf, proj, x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise_flow_core::error::EngineError;
    use noise_flow_core::particle::Particle;
    use serde_json::{json, Value};

    /// Fixed particles in a unit box, optionally tinted.
    struct Still {
        particles: Vec<Particle>,
        tint: Option<Rgba>,
    }

    impl Engine for Still {
        fn tick(&mut self, _dt: f32) -> Result<(), EngineError> {
            Ok(())
        }
        fn particles(&self) -> &[Particle] {
            &self.particles
        }
        fn bounds(&self) -> Bounds {
            Bounds {
                min: Vec3::ZERO,
                max: Vec3::ONE,
            }
        }
        fn params(&self) -> Value {
            json!({})
        }
        fn param_schema(&self) -> Value {
            json!({})
        }
        fn particle_tint(&self, _index: usize) -> Option<Rgba> {
            self.tint
        }
    }

    fn pixel(buf: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
        let i = (y * width + x) * 4;
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    }

    fn still(tint: Option<Rgba>) -> Still {
        Still {
            particles: vec![Particle::new(Vec3::new(0.5, 0.5, 0.5), 0.1)],
            tint,
        }
    }

    #[test]
    fn buffer_has_rgba_length_and_opaque_alpha() {
        let buf = project_to_rgba(&still(None), 8, 4);
        assert_eq!(buf.len(), 8 * 4 * 4);
        assert!(buf.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn untinted_particle_is_white_at_center() {
        let buf = project_to_rgba(&still(None), 64, 64);
        assert_eq!(pixel(&buf, 64, 32, 32), [255, 255, 255, 255]);
        // Corners are outside the margin and stay black.
        assert_eq!(pixel(&buf, 64, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn tinted_particle_uses_tint() {
        let buf = project_to_rgba(&still(Some(Rgba::new(1.0, 0.0, 0.0, 1.0))), 64, 64);
        assert_eq!(pixel(&buf, 64, 32, 32), [255, 0, 0, 255]);
    }

    #[test]
    fn transparent_tint_is_invisible() {
        let buf = project_to_rgba(&still(Some(Rgba::TRANSPARENT)), 64, 64);
        assert_eq!(pixel(&buf, 64, 32, 32), [0, 0, 0, 255]);
    }

    #[test]
    fn outline_is_drawn() {
        let buf = project_to_rgba(&still(None), 100, 100);
        // Margin is 5 px; the left edge of the box sits at x = 5.
        assert_eq!(pixel(&buf, 100, 5, 50), OUTLINE);
    }

    #[test]
    fn y_axis_points_up() {
        let mut e = still(None);
        e.particles[0].position = Vec3::new(0.5, 0.9, 0.0);
        let buf = project_to_rgba(&e, 100, 100);
        let top_half_white = (0..50).any(|y| pixel(&buf, 100, 50, y) == [255, 255, 255, 255]);
        assert!(top_half_white);
    }

    #[test]
    fn zero_size_image_is_empty() {
        assert!(project_to_rgba(&still(None), 0, 10).is_empty());
    }
}

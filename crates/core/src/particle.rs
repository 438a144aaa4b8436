//! A single flow-field particle and its motion primitives.
//!
//! Particles are plain data: position, orientation and a few scalars that
//! the orchestrator and the modulation layer write. Rendering handles never
//! live here; a renderer reads particles by index.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Squared length below which a vector is treated as having no direction.
const DEGENERATE_LENGTH_SQ: f32 = 1e-12;

/// A moving point that steers along the direction field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// World-space position.
    pub position: Vec3,
    /// Orientation; the particle travels along `rotation * +Z`.
    pub rotation: Quat,
    /// Distance travelled per second along the facing direction.
    pub move_speed: f32,
    /// Visual scale written by the orchestrator every tick.
    pub scale: f32,
    /// Per-particle factor on the orchestrator's scale (modulation knob).
    pub scale_multiplier: f32,
    /// Consumer-assigned band index. The simulation never reads it.
    pub band: usize,
}

impl Particle {
    /// Creates a particle at `position` facing +Z with the given initial scale.
    pub fn new(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            move_speed: 0.0,
            scale,
            scale_multiplier: 1.0,
            band: 0,
        }
    }

    /// Unit vector the particle is currently travelling along.
    pub fn facing(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Rotates toward facing `direction` by at most `degrees_per_second * dt` degrees.
    ///
    /// Returns `false` and leaves the orientation untouched when `direction`
    /// has no usable heading (zero length or non-finite).
    pub fn steer_towards(&mut self, direction: Vec3, degrees_per_second: f32, dt: f32) -> bool {
        let Some(target) = look_rotation(direction) else {
            return false;
        };
        let max_radians = (degrees_per_second * dt).to_radians();
        self.rotation = rotate_towards(self.rotation, target, max_radians);
        true
    }

    /// Moves along the facing direction by `move_speed * dt`.
    ///
    /// A non-finite displacement is dropped (the particle stays put) and
    /// `false` is returned so the caller can count it.
    pub fn advance(&mut self, dt: f32) -> bool {
        let displacement = self.facing() * self.move_speed * dt;
        if !displacement.is_finite() {
            return false;
        }
        self.position += displacement;
        true
    }
}

/// Orientation whose +Z axis points along `forward`, with +Y kept as close to
/// world up as possible.
///
/// When `forward` is parallel to world up, world +Z stands in as the up
/// reference. Returns `None` for zero-length or non-finite input.
pub fn look_rotation(forward: Vec3) -> Option<Quat> {
    if !forward.is_finite() || forward.length_squared() < DEGENERATE_LENGTH_SQ {
        return None;
    }
    let f = forward.normalize();
    let mut right = Vec3::Y.cross(f);
    if right.length_squared() < 1e-8 {
        right = Vec3::Z.cross(f);
    }
    let right = right.normalize();
    let up = f.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, f)).normalize())
}

/// Rotates `from` toward `to` by an angle of at most `max_radians`.
///
/// Reaches `to` exactly once the remaining angle fits in the budget. A
/// non-positive budget leaves `from` unchanged.
pub fn rotate_towards(from: Quat, to: Quat, max_radians: f32) -> Quat {
    if max_radians <= 0.0 || !max_radians.is_finite() {
        return from;
    }
    let dot = from.dot(to).abs().min(1.0);
    let angle = 2.0 * dot.acos();
    if angle <= max_radians {
        return to;
    }
    from.slerp(to, max_radians / angle).normalize()
}

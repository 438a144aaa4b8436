//! Axis-aligned world-space bounds of the simulation volume.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box spanned by the grid: `min = origin`,
/// `max = origin + extent * cell_size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Bounds of a grid anchored at `origin`.
    pub fn from_grid(origin: Vec3, extent: [usize; 3], cell_size: f32) -> Self {
        let span = Vec3::new(
            extent[0] as f32 * cell_size,
            extent[1] as f32 * cell_size,
            extent[2] as f32 * cell_size,
        );
        Self {
            min: origin,
            max: origin + span,
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive containment on every axis.
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Toroidal wrap: a coordinate beyond `max` teleports to `min` and one
    /// below `min` teleports to `max`, independently per axis.
    ///
    /// Coordinates exactly on a face are in bounds and left alone.
    pub fn wrap(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            wrap_axis(p.x, self.min.x, self.max.x),
            wrap_axis(p.y, self.min.y, self.max.y),
            wrap_axis(p.z, self.min.z, self.max.z),
        )
    }

    /// The 12 edges of the box as line segments, for debug wireframes.
    ///
    /// Order: four edges of the `min.z` face, four of the `max.z` face, then
    /// the four edges parallel to Z.
    pub fn wire_edges(&self) -> [(Vec3, Vec3); 12] {
        let (a, b) = (self.min, self.max);
        let corner = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        let c000 = corner(a.x, a.y, a.z);
        let c100 = corner(b.x, a.y, a.z);
        let c110 = corner(b.x, b.y, a.z);
        let c010 = corner(a.x, b.y, a.z);
        let c001 = corner(a.x, a.y, b.z);
        let c101 = corner(b.x, a.y, b.z);
        let c111 = corner(b.x, b.y, b.z);
        let c011 = corner(a.x, b.y, b.z);
        [
            (c000, c100),
            (c100, c110),
            (c110, c010),
            (c010, c000),
            (c001, c101),
            (c101, c111),
            (c111, c011),
            (c011, c001),
            (c000, c001),
            (c100, c101),
            (c110, c111),
            (c010, c011),
        ]
    }
}

fn wrap_axis(v: f32, min: f32, max: f32) -> f32 {
    if v > max {
        min
    } else if v < min {
        max
    } else {
        v
    }
}

//! Dense 3D grid of unit direction vectors derived from noise.
//!
//! Storage is a flat `Vec<Vec3>` in x-major, z-fastest order, which matches
//! the nested x/y/z walk of [`DirectionGrid::recompute`] so the hot loop
//! writes sequentially. All coordinate-to-slot mapping goes through
//! [`DirectionGrid::index`].

use crate::sampler::NoiseSampler;
use glam::Vec3;
use noise_flow_core::error::EngineError;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

/// Direction stored in a cell that has never held a valid direction.
pub const FALLBACK_DIRECTION: Vec3 = Vec3::Z;

/// Offset between the two samples of the isotropic mapping.
const ISOTROPIC_SHIFT: f32 = 100.0;

/// How a noise value becomes a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionMapping {
    /// `(cos nπ, sin nπ, cos nπ)`: one angle drives all three axes, so x and
    /// z always agree and directions lie in a single tilted plane.
    #[default]
    Faithful,
    /// Two samples give azimuth and polar angle, covering the full sphere.
    Isotropic,
}

impl DirectionMapping {
    pub const NAMES: &'static [&'static str] = &["faithful", "isotropic"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "faithful" => Some(DirectionMapping::Faithful),
            "isotropic" => Some(DirectionMapping::Isotropic),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DirectionMapping::Faithful => "faithful",
            DirectionMapping::Isotropic => "isotropic",
        }
    }

    /// Raw (unnormalized) direction for the noise at `(x, y, z)`.
    ///
    /// Noise is shifted from [-1, 1] into [0, 2] before it becomes an angle.
    pub fn direction(self, sampler: &dyn NoiseSampler, x: f32, y: f32, z: f32) -> Vec3 {
        let n = sampler.sample(x, y, z) + 1.0;
        let theta = n * PI;
        match self {
            DirectionMapping::Faithful => Vec3::new(theta.cos(), theta.sin(), theta.cos()),
            DirectionMapping::Isotropic => {
                let m = sampler.sample(
                    x + ISOTROPIC_SHIFT,
                    y + ISOTROPIC_SHIFT,
                    z + ISOTROPIC_SHIFT,
                ) + 1.0;
                let phi = m * FRAC_PI_2;
                Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
            }
        }
    }
}

/// A 3D grid of unit direction vectors, one per cell.
#[derive(Debug, Clone)]
pub struct DirectionGrid {
    extent: [usize; 3],
    cells: Vec<Vec3>,
}

impl DirectionGrid {
    /// Creates a grid with every cell set to the zero vector.
    ///
    /// A zero extent on any axis yields an empty grid. Returns
    /// `EngineError::InvalidExtent` if the cell count overflows `usize` or
    /// the cell storage cannot be allocated.
    pub fn new(extent: [usize; 3]) -> Result<Self, EngineError> {
        let invalid = || EngineError::InvalidExtent {
            x: extent[0],
            y: extent[1],
            z: extent[2],
        };
        let len = extent[0]
            .checked_mul(extent[1])
            .and_then(|n| n.checked_mul(extent[2]))
            .ok_or_else(invalid)?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| invalid())?;
        cells.resize(len, Vec3::ZERO);
        Ok(Self { extent, cells })
    }

    pub fn extent(&self) -> [usize; 3] {
        self.extent
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read-only access to the flat cell storage.
    pub fn data(&self) -> &[Vec3] {
        &self.cells
    }

    /// Flat slot of cell `(x, y, z)`, or `None` outside the extent.
    pub fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let [ex, ey, ez] = self.extent;
        (x < ex && y < ey && z < ez).then(|| (x * ey + y) * ez + z)
    }

    /// Direction stored at cell `(x, y, z)`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Result<Vec3, EngineError> {
        self.index(x, y, z)
            .map(|i| self.cells[i])
            .ok_or(EngineError::CellOutOfBounds {
                x,
                y,
                z,
                ex: self.extent[0],
                ey: self.extent[1],
                ez: self.extent[2],
            })
    }

    /// Cell containing `position` for a grid anchored at `origin`.
    ///
    /// Each axis is clamped to `[0, extent - 1]` before flooring, so points
    /// on or slightly past the far faces map to the last cell. Returns `None`
    /// for an empty grid.
    pub fn cell_of(&self, position: Vec3, origin: Vec3, cell_size: f32) -> Option<[usize; 3]> {
        if self.is_empty() {
            return None;
        }
        let rel = (position - origin) / cell_size;
        let axis = |v: f32, n: usize| -> usize {
            if v.is_nan() {
                return 0;
            }
            v.clamp(0.0, (n - 1) as f32).floor() as usize
        };
        Some([
            axis(rel.x, self.extent[0]),
            axis(rel.y, self.extent[1]),
            axis(rel.z, self.extent[2]),
        ])
    }

    /// Overwrites every cell from noise sampled at
    /// `(x * increment.x + phase.x, y * increment.y + phase.y, z * increment.z + phase.z)`.
    ///
    /// A non-finite or zero-length direction keeps the cell's previous value,
    /// or [`FALLBACK_DIRECTION`] if the cell never held one. Returns the number
    /// of cells that needed the fallback. Pure with respect to its inputs:
    /// recomputing at the same phase gives the same grid.
    pub fn recompute(
        &mut self,
        sampler: &dyn NoiseSampler,
        mapping: DirectionMapping,
        phase: Vec3,
        increment: Vec3,
    ) -> usize {
        let [ex, ey, ez] = self.extent;
        let mut degenerate = 0;
        let mut slot = 0;
        for x in 0..ex {
            let sx = x as f32 * increment.x + phase.x;
            for y in 0..ey {
                let sy = y as f32 * increment.y + phase.y;
                for z in 0..ez {
                    let sz = z as f32 * increment.z + phase.z;
                    let raw = mapping.direction(sampler, sx, sy, sz);
                    let len_sq = raw.length_squared();
                    let cell = &mut self.cells[slot];
                    if raw.is_finite() && len_sq > 1e-12 {
                        *cell = raw / len_sq.sqrt();
                    } else {
                        degenerate += 1;
                        if *cell == Vec3::ZERO {
                            *cell = FALLBACK_DIRECTION;
                        }
                    }
                    slot += 1;
                }
            }
        }
        degenerate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{ConstantSampler, NoiseKind};

    const EPSILON: f32 = 1e-5;

    /// Sampler returning NaN everywhere.
    struct NanSampler;

    impl NoiseSampler for NanSampler {
        fn sample(&self, _x: f32, _y: f32, _z: f32) -> f32 {
            f32::NAN
        }
    }

    /// Sampler that records nothing but echoes the x coordinate.
    struct EchoX;

    impl NoiseSampler for EchoX {
        fn sample(&self, x: f32, _y: f32, _z: f32) -> f32 {
            (x * 0.1).sin()
        }
    }

    #[test]
    fn new_allocates_product_of_extent() {
        let g = DirectionGrid::new([3, 4, 5]).unwrap();
        assert_eq!(g.len(), 60);
        assert!(g.data().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn zero_extent_is_an_empty_grid() {
        let mut g = DirectionGrid::new([0, 4, 4]).unwrap();
        assert!(g.is_empty());
        assert!(g.cell_of(Vec3::ZERO, Vec3::ZERO, 1.0).is_none());
        assert_eq!(
            g.recompute(&ConstantSampler(0.0), DirectionMapping::Faithful, Vec3::ZERO, Vec3::ONE),
            0
        );
    }

    #[test]
    fn new_rejects_overflowing_extent() {
        assert!(matches!(
            DirectionGrid::new([usize::MAX, 2, 1]),
            Err(EngineError::InvalidExtent { .. })
        ));
    }

    #[test]
    fn new_rejects_unallocatable_extent() {
        // 2^62 cells of 12 bytes each exceed any address space.
        assert!(matches!(
            DirectionGrid::new([1 << 21, 1 << 21, 1 << 20]),
            Err(EngineError::InvalidExtent { .. })
        ));
    }

    #[test]
    fn index_is_z_fastest_and_bounds_checked() {
        let g = DirectionGrid::new([2, 3, 4]).unwrap();
        assert_eq!(g.index(0, 0, 0), Some(0));
        assert_eq!(g.index(0, 0, 1), Some(1));
        assert_eq!(g.index(0, 1, 0), Some(4));
        assert_eq!(g.index(1, 0, 0), Some(12));
        assert_eq!(g.index(1, 2, 3), Some(23));
        assert_eq!(g.index(2, 0, 0), None);
        assert_eq!(g.index(0, 3, 0), None);
        assert_eq!(g.index(0, 0, 4), None);
    }

    #[test]
    fn get_out_of_bounds_is_an_error() {
        let g = DirectionGrid::new([2, 2, 2]).unwrap();
        assert!(g.get(1, 1, 1).is_ok());
        assert!(matches!(
            g.get(2, 0, 0),
            Err(EngineError::CellOutOfBounds { x: 2, .. })
        ));
    }

    #[test]
    fn constant_noise_fills_every_cell_with_the_same_direction() {
        let mut g = DirectionGrid::new([2, 2, 2]).unwrap();
        g.recompute(
            &ConstantSampler(0.5),
            DirectionMapping::Faithful,
            Vec3::ZERO,
            Vec3::splat(3.0),
        );
        let a = 1.5 * PI;
        let expected = Vec3::new(a.cos(), a.sin(), a.cos()).normalize();
        assert_eq!(g.len(), 8);
        for v in g.data() {
            assert!((*v - expected).length() < EPSILON, "{v} != {expected}");
        }
    }

    #[test]
    fn faithful_mapping_couples_x_and_z() {
        let mut g = DirectionGrid::new([4, 4, 4]).unwrap();
        let sampler = NoiseKind::Simplex.sampler(1337, 0.01);
        g.recompute(
            sampler.as_ref(),
            DirectionMapping::Faithful,
            Vec3::new(0.3, 1.2, -4.0),
            Vec3::splat(3.0),
        );
        for v in g.data() {
            assert!((v.x - v.z).abs() < EPSILON);
        }
    }

    #[test]
    fn isotropic_mapping_decouples_x_and_z() {
        let mut g = DirectionGrid::new([6, 6, 6]).unwrap();
        let sampler = NoiseKind::Simplex.sampler(1337, 0.05);
        g.recompute(
            sampler.as_ref(),
            DirectionMapping::Isotropic,
            Vec3::ZERO,
            Vec3::splat(3.0),
        );
        assert!(g.data().iter().any(|v| (v.x - v.z).abs() > 1e-3));
        for v in g.data() {
            assert!((v.length() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn nan_noise_falls_back_instead_of_propagating() {
        let mut g = DirectionGrid::new([2, 3, 2]).unwrap();
        let degenerate =
            g.recompute(&NanSampler, DirectionMapping::Faithful, Vec3::ZERO, Vec3::ONE);
        assert_eq!(degenerate, 12);
        assert!(g.data().iter().all(|v| *v == FALLBACK_DIRECTION));
    }

    #[test]
    fn degenerate_recompute_keeps_previous_direction() {
        let mut g = DirectionGrid::new([2, 2, 2]).unwrap();
        g.recompute(&ConstantSampler(0.25), DirectionMapping::Faithful, Vec3::ZERO, Vec3::ONE);
        let before = g.data().to_vec();
        g.recompute(&NanSampler, DirectionMapping::Faithful, Vec3::ZERO, Vec3::ONE);
        assert_eq!(g.data(), before.as_slice());
    }

    #[test]
    fn sampling_uses_increment_not_cell_size() {
        // With an x-echo sampler, cells along x differ only if the increment
        // moves the sample point; along y and z they stay equal.
        let mut g = DirectionGrid::new([3, 2, 2]).unwrap();
        g.recompute(&EchoX, DirectionMapping::Faithful, Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0));
        let a = g.get(0, 0, 0).unwrap();
        let b = g.get(1, 0, 0).unwrap();
        assert!((a - b).length() > 1e-3);
        assert_eq!(g.get(1, 0, 0).unwrap(), g.get(1, 1, 1).unwrap());
    }

    #[test]
    fn recompute_is_idempotent_at_fixed_phase() {
        let sampler = NoiseKind::Simplex.sampler(7, 0.01);
        let mut g = DirectionGrid::new([5, 4, 3]).unwrap();
        let phase = Vec3::new(12.5, -3.0, 0.25);
        g.recompute(sampler.as_ref(), DirectionMapping::Faithful, phase, Vec3::splat(3.0));
        let first = g.data().to_vec();
        g.recompute(sampler.as_ref(), DirectionMapping::Faithful, phase, Vec3::splat(3.0));
        assert!(first
            .iter()
            .zip(g.data())
            .all(|(a, b)| a.to_array().map(f32::to_bits) == b.to_array().map(f32::to_bits)));
    }

    #[test]
    fn cell_of_floors_and_clamps() {
        let g = DirectionGrid::new([4, 4, 4]).unwrap();
        let origin = Vec3::new(10.0, 0.0, -2.0);
        assert_eq!(
            g.cell_of(Vec3::new(11.5, 3.99, -2.0), origin, 1.0),
            Some([1, 3, 0])
        );
        // Exactly on the far face, and past it, clamp to the last cell.
        assert_eq!(
            g.cell_of(Vec3::new(14.0, 100.0, -50.0), origin, 1.0),
            Some([3, 3, 0])
        );
        assert_eq!(
            g.cell_of(Vec3::new(f32::NAN, 0.5, 0.0), origin, 1.0),
            Some([0, 0, 2])
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn recompute_yields_unit_vectors_for_any_extent(
                ex in 0_usize..6,
                ey in 0_usize..6,
                ez in 0_usize..6,
                px in -1e3_f32..1e3,
                py in -1e3_f32..1e3,
                pz in -1e3_f32..1e3,
                inc in 0.0_f32..10.0,
                isotropic: bool,
            ) {
                let mapping = if isotropic {
                    DirectionMapping::Isotropic
                } else {
                    DirectionMapping::Faithful
                };
                let sampler = NoiseKind::Simplex.sampler(1337, 0.01);
                let mut g = DirectionGrid::new([ex, ey, ez]).unwrap();
                g.recompute(sampler.as_ref(), mapping, Vec3::new(px, py, pz), Vec3::splat(inc));
                prop_assert_eq!(g.len(), ex * ey * ez);
                for v in g.data() {
                    prop_assert!(v.is_finite());
                    prop_assert!((v.length() - 1.0).abs() < 1e-4, "length {}", v.length());
                }
            }

            #[test]
            fn cell_of_is_always_in_range(
                x in -100.0_f32..100.0,
                y in -100.0_f32..100.0,
                z in -100.0_f32..100.0,
                cell in 0.1_f32..5.0,
            ) {
                let g = DirectionGrid::new([3, 5, 7]).unwrap();
                let [cx, cy, cz] = g.cell_of(Vec3::new(x, y, z), Vec3::ZERO, cell).unwrap();
                prop_assert!(g.index(cx, cy, cz).is_some());
            }
        }
    }
}

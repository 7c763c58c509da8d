//! Volumetric scalar fields: a 3D grid of values plus the affine that places it in an atlas space.

use nalgebra::Point3;
use ndarray::Array3;

use crate::affine::Affine;
use crate::error::{Result, VolsurfError};
use crate::space::{AtlasSpace, Interpolation};

/// A 3D scalar image, e.g. a statistical map. Index order is `[i, j, k]` (x fastest on disk).
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarVolume {
    pub data: Array3<f32>,
    /// Maps voxel indices to world coordinates in `space`.
    pub affine: Affine,
    pub space: AtlasSpace,
}

/// A binary mask on the same grid as a [`ScalarVolume`].
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeMask {
    pub inside: Array3<bool>,
}

const EDGE_TOLERANCE: f64 = 1e-6;

/// Locate a continuous voxel coordinate along one axis of length `n`.
///
/// Returns the lower and upper neighbour index and the fractional weight of the upper one,
/// or `None` if the position lies outside the grid.
fn axis_neighbours(pos: f64, n: usize) -> Option<(usize, usize, f64)> {
    if n == 0 || !pos.is_finite() {
        return None;
    }
    let max = (n - 1) as f64;
    if pos < -EDGE_TOLERANCE || pos > max + EDGE_TOLERANCE {
        return None;
    }
    let p = pos.max(0.0).min(max);
    if n == 1 {
        return Some((0, 0, 0.0));
    }
    let lower = (p.floor() as usize).min(n - 2);
    Some((lower, lower + 1, p - lower as f64))
}

fn nearest_index(pos: f64, n: usize) -> Option<usize> {
    if n == 0 || !pos.is_finite() {
        return None;
    }
    let r = pos.round();
    if r < 0.0 || r > (n - 1) as f64 {
        None
    } else {
        Some(r as usize)
    }
}

/// The 8 corner indices and trilinear weights around a continuous voxel position.
fn trilinear_corners(
    data_dim: (usize, usize, usize),
    vox: &Point3<f64>,
) -> Option<[([usize; 3], f64); 8]> {
    let (x0, x1, fx) = axis_neighbours(vox.x, data_dim.0)?;
    let (y0, y1, fy) = axis_neighbours(vox.y, data_dim.1)?;
    let (z0, z1, fz) = axis_neighbours(vox.z, data_dim.2)?;
    Some([
        ([x0, y0, z0], (1.0 - fx) * (1.0 - fy) * (1.0 - fz)),
        ([x1, y0, z0], fx * (1.0 - fy) * (1.0 - fz)),
        ([x0, y1, z0], (1.0 - fx) * fy * (1.0 - fz)),
        ([x1, y1, z0], fx * fy * (1.0 - fz)),
        ([x0, y0, z1], (1.0 - fx) * (1.0 - fy) * fz),
        ([x1, y0, z1], fx * (1.0 - fy) * fz),
        ([x0, y1, z1], (1.0 - fx) * fy * fz),
        ([x1, y1, z1], fx * fy * fz),
    ])
}

impl ScalarVolume {
    pub fn new(data: Array3<f32>, affine: Affine, space: AtlasSpace) -> ScalarVolume {
        ScalarVolume { data, affine, space }
    }

    pub fn shape(&self) -> [usize; 3] {
        let (a, b, c) = self.data.dim();
        [a, b, c]
    }

    /// Convert a world coordinate to a continuous voxel coordinate.
    pub fn world_to_voxel(&self, world: &Point3<f64>) -> Result<Point3<f64>> {
        let inv = self
            .affine
            .inverse()
            .ok_or_else(|| VolsurfError::InvalidNifti(String::from("volume affine is singular")))?;
        Ok(inv.apply(world))
    }

    /// Sample the volume at a continuous voxel coordinate. `None` if the position is outside the
    /// grid.
    pub fn sample_voxel(&self, vox: &Point3<f64>, interp: Interpolation) -> Option<f32> {
        match interp {
            Interpolation::Nearest => {
                let (nx, ny, nz) = self.data.dim();
                let i = nearest_index(vox.x, nx)?;
                let j = nearest_index(vox.y, ny)?;
                let k = nearest_index(vox.z, nz)?;
                Some(self.data[[i, j, k]])
            }
            Interpolation::Linear => {
                let corners = trilinear_corners(self.data.dim(), vox)?;
                let mut acc = 0.0f64;
                for (idx, w) in corners.iter() {
                    if *w > 0.0 {
                        acc += *w * self.data[*idx] as f64;
                    }
                }
                Some(acc as f32)
            }
        }
    }

    /// Trilinear sampling restricted to voxels inside `mask`.
    ///
    /// The weights of in-mask corners are renormalised to sum to one. Returns `None` if the
    /// position is outside the grid or none of the contributing corners lies inside the mask.
    pub fn sample_voxel_masked(&self, vox: &Point3<f64>, mask: &VolumeMask) -> Option<f32> {
        let corners = trilinear_corners(self.data.dim(), vox)?;
        let mut acc = 0.0f64;
        let mut weight = 0.0f64;
        for (idx, w) in corners.iter() {
            if *w > 0.0 && mask.inside[*idx] {
                acc += *w * self.data[*idx] as f64;
                weight += *w;
            }
        }
        if weight > 0.0 {
            Some((acc / weight) as f32)
        } else {
            None
        }
    }
}

impl VolumeMask {
    /// Every voxel with a non-zero, finite value is inside the mask.
    pub fn from_volume(vol: &ScalarVolume) -> VolumeMask {
        VolumeMask { inside: vol.data.mapv(|v| v != 0.0 && v.is_finite()) }
    }

    /// Check that this mask is on the same grid as `vol`.
    pub fn check_matches(&self, vol: &ScalarVolume) -> Result<()> {
        let expected = vol.shape().to_vec();
        let found = self.inside.shape().to_vec();
        if expected != found {
            return Err(VolsurfError::ShapeMismatch(String::from("mask"), expected, found));
        }
        Ok(())
    }

    pub fn num_inside(&self) -> usize {
        self.inside.iter().filter(|&&b| b).count()
    }
}

//! Affine mappings between voxel indices and world (scanner / template) coordinates.

use nalgebra::{Matrix3, Matrix4, Point3, Quaternion, UnitQuaternion, Vector3};

/// A 4x4 homogeneous affine. The last row is always `0 0 0 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub m: Matrix4<f64>,
}

impl Default for Affine {
    fn default() -> Affine {
        Affine::identity()
    }
}

impl Affine {
    pub fn identity() -> Affine {
        Affine { m: Matrix4::identity() }
    }

    /// Build an affine from the three NIfTI `srow` vectors.
    pub fn from_rows(x: [f64; 4], y: [f64; 4], z: [f64; 4]) -> Affine {
        Affine {
            m: Matrix4::new(
                x[0], x[1], x[2], x[3],
                y[0], y[1], y[2], y[3],
                z[0], z[1], z[2], z[3],
                0.0, 0.0, 0.0, 1.0,
            ),
        }
    }

    /// A diagonal scaling affine, used when a NIfTI file has neither sform nor qform.
    pub fn scaling(sx: f64, sy: f64, sz: f64) -> Affine {
        Affine { m: Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)) }
    }

    /// Build the qform affine from the NIfTI quaternion parameters.
    ///
    /// `qfac` is `pixdim[0]`, which must be -1 or 1 (0 is treated as 1).
    pub fn from_quaternion(
        b: f64,
        c: f64,
        d: f64,
        offset: [f64; 3],
        pixdim: [f64; 3],
        qfac: f64,
    ) -> Affine {
        let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
        let qfac = if qfac < 0.0 { -1.0 } else { 1.0 };

        let rotation =
            UnitQuaternion::from_quaternion(Quaternion::new(a, b, c, d)).to_rotation_matrix();
        let scale = Matrix3::from_diagonal(&Vector3::new(pixdim[0], pixdim[1], pixdim[2] * qfac));
        let linear = rotation.matrix() * scale;

        let mut m = linear.to_homogeneous();
        m[(0, 3)] = offset[0];
        m[(1, 3)] = offset[1];
        m[(2, 3)] = offset[2];
        Affine { m }
    }

    /// Map a point through this affine.
    pub fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        self.m.transform_point(p)
    }

    /// The inverse affine, or `None` if the linear part is singular.
    pub fn inverse(&self) -> Option<Affine> {
        let det = self.m.fixed_view::<3, 3>(0, 0).determinant();
        if det.abs() < 1e-12 || !det.is_finite() {
            return None;
        }
        self.m.try_inverse().map(|m| Affine { m })
    }
}

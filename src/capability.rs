//! The registration and resampling collaborators used by the transform chains.
//!
//! The pipeline never does the numerical work of a stage itself. It calls a [`Resampler`], one
//! method per stage, and relies only on each method's input/output contract. Errors from a
//! resampler are passed to the caller unchanged.

use crate::error::Result;
use crate::field::SurfaceField;
use crate::hemi::Hemisphere;
use crate::mesh::{BrainMesh, MeshSpace};
use crate::space::Interpolation;
use crate::volume::{ScalarVolume, VolumeMask};

/// Geometry anchoring a volume-to-surface sample for one hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct RibbonMeshes {
    pub pial: BrainMesh,
    pub white: BrainMesh,
    /// The standard space both meshes are in.
    pub space: MeshSpace,
}

pub trait Resampler {
    /// Sample a volume onto a native mesh, averaging along the ribbon between the white and pial
    /// surfaces. Voxels outside `mask` do not contribute. Interpolation is always linear.
    ///
    /// The result has one value per vertex of `meshes`, in `meshes.space`.
    fn sample_volume_to_mesh(
        &self,
        volume: &ScalarVolume,
        mask: &VolumeMask,
        meshes: &RibbonMeshes,
    ) -> Result<SurfaceField>;

    /// Resample a surface field into another standard mesh space of the same hemisphere.
    fn resample_mesh_to_mesh(
        &self,
        field: &SurfaceField,
        target: MeshSpace,
    ) -> Result<SurfaceField>;

    /// Map a volume in an atlas space directly into the canonical surface space of one hemisphere.
    fn fuse_volume_to_canonical(
        &self,
        volume: &ScalarVolume,
        hemi: Hemisphere,
        interp: Interpolation,
    ) -> Result<SurfaceField>;
}

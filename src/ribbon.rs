//! Ribbon sampling: projecting a volume onto a surface by averaging along the cortical thickness.
//!
//! For each vertex, sample points are placed evenly on the straight segment from the white surface
//! vertex (depth 0) to the matching pial surface vertex (depth 1). Every point is sampled with
//! mask-aware trilinear interpolation, and the vertex value is the mean over all points that hit
//! the mask. Vertices without any such point get NaN.

use crate::capability::RibbonMeshes;
use crate::error::{Result, VolsurfError};
use crate::volume::{ScalarVolume, VolumeMask};

pub const DEFAULT_RIBBON_SAMPLES: usize = 10;

/// Relative depths of the sample points, from white (0) to pial (1).
pub fn ribbon_depths(n_samples: usize) -> Vec<f64> {
    match n_samples {
        0 => Vec::new(),
        1 => vec![0.5],
        n => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

/// Sample `volume` onto the vertices of the ribbon meshes. Returns one value per vertex.
pub fn sample_ribbon(
    volume: &ScalarVolume,
    mask: &VolumeMask,
    meshes: &RibbonMeshes,
    n_samples: usize,
) -> Result<Vec<f32>> {
    if meshes.pial.num_vertices() != meshes.white.num_vertices() {
        return Err(VolsurfError::VertexCountMismatch(
            format!("white surface paired with pial surface of {}", meshes.space),
            meshes.pial.num_vertices(),
            meshes.white.num_vertices(),
        ));
    }
    mask.check_matches(volume)?;
    if n_samples == 0 {
        return Err(VolsurfError::Capability(
            "ribbon sampling",
            String::from("at least one sample per vertex is required"),
        ));
    }
    let inv = volume
        .affine
        .inverse()
        .ok_or_else(|| VolsurfError::InvalidNifti(String::from("volume affine is singular")))?;
    let depths = ribbon_depths(n_samples);

    let mut values: Vec<f32> = Vec::with_capacity(meshes.pial.num_vertices());
    for idx in 0..meshes.pial.num_vertices() {
        let inner = meshes.white.point(idx);
        let thickness = meshes.pial.point(idx) - inner;
        let mut sum = 0.0f64;
        let mut hits = 0usize;
        for depth in depths.iter() {
            let world = inner + thickness * *depth;
            if let Some(v) = volume.sample_voxel_masked(&inv.apply(&world), mask) {
                sum += v as f64;
                hits += 1;
            }
        }
        values.push(if hits > 0 { (sum / hits as f64) as f32 } else { f32::NAN });
    }
    Ok(values)
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::affine::Affine;
    use crate::hemi::Hemisphere;
    use crate::mesh::{BrainMesh, MeshSpace};
    use crate::space::AtlasSpace;
    use ndarray::Array3;

    fn slab_volume() -> (ScalarVolume, VolumeMask) {
        // Value equals the x index; the mask covers x < 6.
        let data = Array3::from_shape_fn((10, 4, 4), |(i, _, _)| i as f32);
        let mask = VolumeMask { inside: Array3::from_shape_fn((10, 4, 4), |(i, _, _)| i < 6) };
        (ScalarVolume::new(data, Affine::identity(), AtlasSpace::default()), mask)
    }

    fn meshes(white: Vec<f32>, pial: Vec<f32>) -> RibbonMeshes {
        let faces = vec![0, 1, 2];
        RibbonMeshes {
            white: BrainMesh::new(white, faces.clone()).unwrap(),
            pial: BrainMesh::new(pial, faces).unwrap(),
            space: MeshSpace::native(Hemisphere::Left),
        }
    }

    #[test]
    fn depths_span_white_to_pial() {
        assert_eq!(vec![0.0, 0.25, 0.5, 0.75, 1.0], ribbon_depths(5));
        assert_eq!(vec![0.5], ribbon_depths(1));
    }

    #[test]
    fn values_are_averaged_along_the_ribbon() {
        let (vol, mask) = slab_volume();
        let m = meshes(
            vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 8.0, 1.0, 1.0],
            vec![3.0, 1.0, 1.0, 2.0, 2.0, 2.0, 9.0, 1.0, 1.0],
        );
        let values = sample_ribbon(&vol, &mask, &m, 5).unwrap();
        assert_eq!(3, values.len());
        assert!((values[0] - 2.0).abs() < 1e-6);
        assert_eq!(2.0, values[1]);
        assert!(values[2].is_nan(), "vertex outside the mask has no data");
    }

    #[test]
    fn pial_and_white_must_have_the_same_vertices() {
        let (vol, mask) = slab_volume();
        let m = RibbonMeshes {
            white: BrainMesh::new(vec![0.0; 12], vec![0, 1, 2]).unwrap(),
            pial: BrainMesh::new(vec![0.0; 9], vec![0, 1, 2]).unwrap(),
            space: MeshSpace::native(Hemisphere::Right),
        };
        let err = sample_ribbon(&vol, &mask, &m, 3).unwrap_err();
        assert!(matches!(err, VolsurfError::VertexCountMismatch(..)));
    }
}

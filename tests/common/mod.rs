//! Shared fixtures for the integration tests: a deterministic stub resampler and synthetic input
//! files.

#![allow(dead_code)]

use nalgebra::Point3;
use ndarray::Array3;
use std::path::{Path, PathBuf};

use volsurf::affine::Affine;
use volsurf::ribbon::sample_ribbon;
use volsurf::{
    write_nifti, write_surf, AtlasSpace, BrainMesh, Hemisphere, Intent, Interpolation, MeshSpace,
    Resampler, RibbonMeshes, ScalarVolume, SurfaceField, VolsurfError, VolumeMask,
};

pub const FSAVERAGE_164K: usize = 163842;

/// Stands in for the registration resources: fusion reads voxels in a fixed order, ribbon sampling
/// uses the real sampler with 3 points, and mesh resampling copies values by vertex index.
#[derive(Debug, Default)]
pub struct StubResampler {
    /// Fail every stage for this hemisphere.
    pub fail_on: Option<Hemisphere>,
}

impl StubResampler {
    pub fn failing_on(hemi: Hemisphere) -> StubResampler {
        StubResampler { fail_on: Some(hemi) }
    }

    fn check(&self, stage: &'static str, hemi: Hemisphere) -> volsurf::Result<()> {
        if self.fail_on == Some(hemi) {
            return Err(VolsurfError::Capability(stage, format!("stub failure for {}", hemi)));
        }
        Ok(())
    }
}

impl Resampler for StubResampler {
    fn sample_volume_to_mesh(
        &self,
        volume: &ScalarVolume,
        mask: &VolumeMask,
        meshes: &RibbonMeshes,
    ) -> volsurf::Result<SurfaceField> {
        self.check("ribbon sampling", meshes.space.hemi)?;
        let values = sample_ribbon(volume, mask, meshes, 3)?;
        SurfaceField::on_mesh(values, &meshes.pial, meshes.space, Intent::None)
    }

    fn resample_mesh_to_mesh(
        &self,
        field: &SurfaceField,
        target: MeshSpace,
    ) -> volsurf::Result<SurfaceField> {
        self.check("mesh resampling", target.hemi)?;
        SurfaceField::new(field.values.to_vec(), target, field.intent.clone())
    }

    fn fuse_volume_to_canonical(
        &self,
        volume: &ScalarVolume,
        hemi: Hemisphere,
        interp: Interpolation,
    ) -> volsurf::Result<SurfaceField> {
        self.check("registration fusion", hemi)?;
        let [nx, ny, nz] = volume.shape();
        let offset = match hemi {
            Hemisphere::Left => 0.0,
            Hemisphere::Right => 1000.0,
        };
        let values = (0..FSAVERAGE_164K)
            .map(|i| {
                let vox = Point3::new(
                    (i % nx) as f64 + 0.25,
                    ((i / nx) % ny) as f64,
                    ((i / (nx * ny)) % nz) as f64,
                );
                volume.sample_voxel(&vox, interp).unwrap_or(0.0) + offset
            })
            .collect();
        SurfaceField::new(values, MeshSpace::canonical(hemi), Intent::TimeSeries)
    }
}


/// An 8x8x8 volume with distinct values, identity affine, written as `stat.nii.gz` in `dir`.
pub fn write_stat_volume(dir: &Path) -> PathBuf {
    let data = Array3::from_shape_fn((8, 8, 8), |(i, j, k)| {
        i as f32 + 10.0 * j as f32 + 100.0 * k as f32 - 0.5
    });
    let path = dir.join("stat.nii.gz");
    write_nifti(&path, &identity_volume(data)).unwrap();
    path
}

/// A 10x10x10 volume of ones for x < 5 and fives elsewhere, and a mask covering x < 5.
pub fn write_masked_volume(dir: &Path) -> (PathBuf, PathBuf) {
    let data = Array3::from_shape_fn((10, 10, 10), |(i, _, _)| if i < 5 { 1.0 } else { 5.0 });
    let mask = Array3::from_shape_fn((10, 10, 10), |(i, _, _)| if i < 5 { 1.0 } else { 0.0 });
    let vol_path = dir.join("ones.nii.gz");
    let mask_path = dir.join("mask.nii");
    write_nifti(&vol_path, &identity_volume(data)).unwrap();
    write_nifti(&mask_path, &identity_volume(mask)).unwrap();
    (vol_path, mask_path)
}

fn identity_volume(data: Array3<f32>) -> ScalarVolume {
    ScalarVolume::new(data, Affine::identity(), AtlasSpace::default())
}

/// Number of vertices of the synthetic native meshes that lie outside the mask.
pub const OUTSIDE_VERTICES: usize = 10;

/// White and pial fsLR 164k stand-ins: the ribbon of every vertex runs one voxel along x inside the
/// mask, except for the last [`OUTSIDE_VERTICES`], whose ribbon lies at x = 8.
pub fn native_meshes(hemi: Hemisphere) -> (BrainMesh, BrainMesh) {
    let n = FSAVERAGE_164K;
    let mut white = Vec::with_capacity(n * 3);
    let mut pial = Vec::with_capacity(n * 3);
    for i in 0..n {
        let x = if i >= n - OUTSIDE_VERTICES { 8.0 } else { 1.0 + (i % 2) as f32 };
        let y = 1.0 + (i % 7) as f32;
        let z = match hemi {
            Hemisphere::Left => 2.0,
            Hemisphere::Right => 6.0,
        };
        white.extend_from_slice(&[x, y, z]);
        pial.extend_from_slice(&[x + 1.0, y + 0.5, z]);
    }
    let faces = vec![0, 1, 2, 1, 2, 3];
    (BrainMesh::new(white, faces.clone()).unwrap(), BrainMesh::new(pial, faces).unwrap())
}

/// Write the native meshes for both hemispheres as FreeSurfer surf files.
/// Returns `[lh_pial, lh_white, rh_pial, rh_white]`.
pub fn write_native_meshes(dir: &Path) -> [PathBuf; 4] {
    let mut paths = Vec::new();
    for hemi in Hemisphere::BOTH.iter() {
        let (white, pial) = native_meshes(*hemi);
        let pial_path = dir.join(format!("{}.pial", hemi));
        let white_path = dir.join(format!("{}.white", hemi));
        write_surf(&pial_path, &pial).unwrap();
        write_surf(&white_path, &white).unwrap();
        paths.push(pial_path);
        paths.push(white_path);
    }
    [paths[0].clone(), paths[1].clone(), paths[2].clone(), paths[3].clone()]
}

/// Names of all files in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

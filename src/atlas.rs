//! Precomputed registration resources, and the [`Resampler`] implementation built on them.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::capability::{Resampler, RibbonMeshes};
use crate::error::{Result, VolsurfError};
use crate::field::SurfaceField;
use crate::fusion::{fuse, CoordinateMapping};
use crate::gifti::Intent;
use crate::hemi::Hemisphere;
use crate::mesh::{read_mesh, MeshFamily, MeshSpace};
use crate::ribbon::{sample_ribbon, DEFAULT_RIBBON_SAMPLES};
use crate::space::Interpolation;
use crate::sphere::SphereCorrespondence;
use crate::volume::{ScalarVolume, VolumeMask};

pub const DEFAULT_DATA_DIR: &str = "atlas_data";

/// A directory holding the registration resources, with the file names used by the upstream
/// distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasData {
    pub root: PathBuf,
}

impl Default for AtlasData {
    fn default() -> AtlasData {
        AtlasData::new(DEFAULT_DATA_DIR)
    }
}

impl AtlasData {
    pub fn new<P: AsRef<Path>>(root: P) -> AtlasData {
        AtlasData { root: root.as_ref().to_path_buf() }
    }

    /// Use the first candidate that exists, or the first candidate if none does, so the I/O error
    /// names it.
    fn first_existing(&self, candidates: Vec<String>) -> PathBuf {
        candidates
            .iter()
            .map(|c| self.root.join(c))
            .find(|p| p.is_file())
            .unwrap_or_else(|| self.root.join(&candidates[0]))
    }

    /// The RF-ANTs vertex-to-atlas coordinate table for the given fusion template.
    pub fn fusion_mapping(&self, hemi: Hemisphere, template: &str) -> PathBuf {
        let base = format!(
            "{}.avgMapping_allSub_RF_ANTs_{}_to_fsaverage.txt",
            hemi.prefix(),
            template
        );
        self.first_existing(vec![base.clone(), format!("{}.gz", base)])
    }

    /// The fsLR 164k sphere, deformed into registration with fsaverage.
    pub fn fslr_sphere(&self, hemi: Hemisphere) -> PathBuf {
        let base =
            format!("fs_LR-deformed_to-fsaverage.{}.sphere.164k_fs_LR.surf.gii", hemi.letter());
        self.first_existing(vec![base.clone(), format!("{}.gz", base)])
    }

    /// The standard fsaverage 164k sphere.
    pub fn fsaverage_sphere(&self, hemi: Hemisphere) -> PathBuf {
        let letter = hemi.letter();
        let base = format!("fsaverage_std_sphere.{}.164k_fsavg_{}.surf.gii", letter, letter);
        self.first_existing(vec![base.clone(), format!("{}.gz", base)])
    }
}


/// The resampler backed by an [`AtlasData`] directory.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasResampler {
    pub data: AtlasData,
    /// Sample points per vertex for ribbon sampling.
    pub ribbon_samples: usize,
}

impl AtlasResampler {
    pub fn new(data: AtlasData) -> AtlasResampler {
        AtlasResampler { data, ribbon_samples: DEFAULT_RIBBON_SAMPLES }
    }

    pub fn with_ribbon_samples(mut self, n: usize) -> AtlasResampler {
        self.ribbon_samples = n;
        self
    }
}

impl Resampler for AtlasResampler {
    fn sample_volume_to_mesh(
        &self,
        volume: &ScalarVolume,
        mask: &VolumeMask,
        meshes: &RibbonMeshes,
    ) -> Result<SurfaceField> {
        debug!(
            samples = self.ribbon_samples,
            vertices = meshes.pial.num_vertices(),
            "ribbon sampling onto {}",
            meshes.space
        );
        let values = sample_ribbon(volume, mask, meshes, self.ribbon_samples)?;
        SurfaceField::on_mesh(values, &meshes.pial, meshes.space, Intent::None)
    }

    fn resample_mesh_to_mesh(
        &self,
        field: &SurfaceField,
        target: MeshSpace,
    ) -> Result<SurfaceField> {
        let source = field.space;
        let registered = source.hemi == target.hemi
            && source.family == MeshFamily::FsLR
            && target == MeshSpace::canonical(target.hemi);
        if !registered {
            return Err(VolsurfError::Capability(
                "mesh resampling",
                format!("no registration available from {} to {}", source, target),
            ));
        }
        let src_path = self.data.fslr_sphere(source.hemi);
        let dst_path = self.data.fsaverage_sphere(target.hemi);
        debug!(
            "resampling {} to {} via {} and {}",
            source,
            target,
            src_path.display(),
            dst_path.display()
        );

        let src_sphere = read_mesh(&src_path)?;
        let dst_sphere = read_mesh(&dst_path)?;
        let correspondence = SphereCorrespondence::compute(&src_sphere, &dst_sphere)?;
        let values = correspondence.apply(&field.values.to_vec())?;
        SurfaceField::new(values, target, field.intent.clone())
    }

    fn fuse_volume_to_canonical(
        &self,
        volume: &ScalarVolume,
        hemi: Hemisphere,
        interp: Interpolation,
    ) -> Result<SurfaceField> {
        let template = volume.space.fusion_template()?;
        let mapping_path = self.data.fusion_mapping(hemi, template);
        debug!(%interp, "registration fusion for {} using {}", hemi, mapping_path.display());

        let mapping = CoordinateMapping::from_file(&mapping_path)?;
        let values = fuse(volume, &mapping, interp)?;
        SurfaceField::new(values, MeshSpace::canonical(hemi), Intent::TimeSeries)
    }
}

//! The pipeline orchestrator: runs the selected transform chain for both hemispheres and writes the
//! overlays.
//!
//! All inputs are read and checked before anything is written: the volume, the mask and, for
//! Two-Stage, the native meshes of both hemispheres. Hemispheres are then processed one after the
//! other, left first, each through every stage of the chain before the next one starts. Nothing
//! computed for one hemisphere is used for the other. All errors end the run. If the right
//! hemisphere fails, the left hemisphere's finished overlay stays in place.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::capability::{Resampler, RibbonMeshes};
use crate::chain::{ChainInputs, Step, TransformChain};
use crate::error::{Result, VolsurfError};
use crate::field::SurfaceField;
use crate::gifti::{write_gifti, Encoding};
use crate::hemi::Hemisphere;
use crate::mesh::{read_mesh, BrainMesh, MeshSpace};
use crate::nifti::{read_nifti, read_nifti_mask};
use crate::normalize::{normalize_intent, write_shape_field};
use crate::output::{intermediate_file_name, shape_file_path, OutputFormat};
use crate::util::ensure_dir;
use crate::volume::{ScalarVolume, VolumeMask};

/// Where and how the overlays are written.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    /// Encoding of all GIFTI files written, final and intermediate.
    pub encoding: Encoding,
}

impl PipelineConfig {
    pub fn new<P: AsRef<Path>>(out_dir: P) -> PipelineConfig {
        PipelineConfig {
            out_dir: out_dir.as_ref().to_path_buf(),
            format: OutputFormat::default(),
            encoding: Encoding::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> PipelineConfig {
        self.format = format;
        self
    }
}


/// The files produced by a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub pipeline: &'static str,
    pub lh: PathBuf,
    pub rh: PathBuf,
    /// Intermediate files, in processing order.
    pub intermediates: Vec<PathBuf>,
}

impl PipelineOutput {
    pub fn path(&self, hemi: Hemisphere) -> &Path {
        match hemi {
            Hemisphere::Left => &self.lh,
            Hemisphere::Right => &self.rh,
        }
    }

    /// A Freeview command line showing both overlays on the fsaverage inflated surfaces.
    pub fn freeview_command(&self) -> String {
        format!(
            "freeview -f $SUBJECTS_DIR/fsaverage/surf/lh.inflated:overlay={} \
             $SUBJECTS_DIR/fsaverage/surf/rh.inflated:overlay={}",
            self.lh.display(),
            self.rh.display()
        )
    }
}

impl fmt::Display for PipelineOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} overlays:\n  {}\n  {}", self.pipeline, self.lh.display(), self.rh.display())
    }
}


/// What one hemisphere run produced.
struct HemisphereOutput {
    shape: PathBuf,
    intermediate: Option<PathBuf>,
}

/// The inputs one hemisphere run reads from.
struct HemisphereInputs<'v> {
    volume: &'v ScalarVolume,
    mask: Option<&'v VolumeMask>,
    meshes: Option<&'v RibbonMeshes>,
}


pub struct Pipeline<'a, R: Resampler> {
    resampler: &'a R,
    config: PipelineConfig,
}

impl<'a, R: Resampler> Pipeline<'a, R> {
    pub fn new(resampler: &'a R, config: PipelineConfig) -> Pipeline<'a, R> {
        Pipeline { resampler, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Select a chain from `inputs` and run it. Fails without touching any file if no chain fits.
    pub fn run(&self, inputs: &ChainInputs) -> Result<PipelineOutput> {
        let chain = TransformChain::select(inputs)?;
        self.run_chain(&chain)
    }

    pub fn run_chain(&self, chain: &TransformChain) -> Result<PipelineOutput> {
        info!("running {} on {}", chain, chain.volume().display());
        let volume = read_nifti(chain.volume(), chain.space())?;
        let (mask, meshes) = match chain {
            TransformChain::TwoStage { mask, .. } => {
                let mask = read_nifti_mask(mask)?;
                mask.check_matches(&volume)?;
                info!("mask covers {} voxels", mask.num_inside());
                let meshes = Hemisphere::BOTH
                    .iter()
                    .map(|hemi| read_native_meshes(chain, *hemi))
                    .collect::<Result<Vec<RibbonMeshes>>>()?;
                (Some(mask), meshes)
            }
            TransformChain::DirectFusion { .. } => (None, Vec::new()),
        };

        ensure_dir(&self.config.out_dir)?;

        let mut shapes: Vec<PathBuf> = Vec::with_capacity(2);
        let mut intermediates: Vec<PathBuf> = Vec::new();
        for (idx, hemi) in Hemisphere::BOTH.iter().enumerate() {
            let inputs =
                HemisphereInputs { volume: &volume, mask: mask.as_ref(), meshes: meshes.get(idx) };
            match self.process_hemisphere(chain, *hemi, &inputs) {
                Ok(out) => {
                    shapes.push(out.shape);
                    intermediates.extend(out.intermediate);
                }
                Err(e) => {
                    for written in shapes.iter() {
                        warn!(
                            "{} failed, leaving finished overlay {} in place",
                            hemi,
                            written.display()
                        );
                    }
                    return Err(e);
                }
            }
        }

        let rh = shapes.pop().unwrap_or_default();
        let lh = shapes.pop().unwrap_or_default();
        Ok(PipelineOutput { pipeline: chain.pipeline_name(), lh, rh, intermediates })
    }

    fn process_hemisphere(
        &self,
        chain: &TransformChain,
        hemi: Hemisphere,
        inputs: &HemisphereInputs,
    ) -> Result<HemisphereOutput> {
        let mut field: Option<SurfaceField> = None;
        let mut intermediate: Option<PathBuf> = None;
        let canonical = MeshSpace::canonical(hemi);

        for step in chain.steps() {
            info!(hemi = %hemi, "{}", step);
            field = Some(match (step, chain, field.take()) {
                (Step::FuseVolumeToCanonical, TransformChain::DirectFusion { interp, .. }, _) => {
                    self.resampler.fuse_volume_to_canonical(inputs.volume, hemi, *interp)?
                }
                (Step::SampleVolumeToNative, TransformChain::TwoStage { .. }, _) => {
                    let (native, path) = self.sample_native(hemi, inputs)?;
                    intermediate = Some(path);
                    native
                }
                (Step::ResampleNativeToCanonical, _, Some(native)) => {
                    self.resampler.resample_mesh_to_mesh(&native, canonical)?
                }
                (Step::NormalizeIntent, _, Some(f)) => normalize_intent(&f),
                (step, _, _) => {
                    return Err(VolsurfError::InconsistentChain(format!(
                        "step '{}' has no input in the {}",
                        step, chain
                    )));
                }
            });
        }

        let field =
            field.ok_or_else(|| {
                VolsurfError::InconsistentChain(format!("{} produced no field", chain))
            })?;
        check_canonical(&field, canonical)?;

        let shape =
            shape_file_path(&self.config.out_dir, hemi, chain.pipeline_name(), self.config.format);
        write_shape_field(&field, &shape, self.config.format, self.config.encoding)?;

        let summary = field.summary();
        info!(
            hemi = %hemi,
            vertices = summary.num_vertices,
            finite = summary.num_finite,
            min = summary.min,
            max = summary.max,
            "wrote {}",
            shape.display()
        );
        Ok(HemisphereOutput { shape, intermediate })
    }

    /// Ribbon-sample onto the native meshes of `hemi` and persist the result as the intermediate
    /// file.
    fn sample_native(
        &self,
        hemi: Hemisphere,
        inputs: &HemisphereInputs,
    ) -> Result<(SurfaceField, PathBuf)> {
        let (mask, meshes) = match (inputs.mask, inputs.meshes) {
            (Some(mask), Some(meshes)) => (mask, meshes),
            _ => {
                return Err(VolsurfError::InconsistentChain(format!(
                    "ribbon sampling for {} without a mask and native meshes",
                    hemi
                )))
            }
        };

        let native = self.resampler.sample_volume_to_mesh(inputs.volume, mask, meshes)?;
        if native.space != meshes.space {
            return Err(VolsurfError::InconsistentChain(format!(
                "sampled field is in {}, expected {}",
                native.space, meshes.space
            )));
        }
        if native.len() != meshes.pial.num_vertices() {
            return Err(VolsurfError::VertexCountMismatch(
                format!("sampled field on {}", meshes.space),
                meshes.pial.num_vertices(),
                native.len(),
            ));
        }

        let path = self.config.out_dir.join(intermediate_file_name(hemi));
        write_gifti(&path, &native.to_gifti(), self.config.encoding)?;
        info!(hemi = %hemi, "saved intermediate {}", path.display());
        Ok((native, path))
    }
}


/// Read the pial and white meshes of `hemi`, both of which must be in the native space.
fn read_native_meshes(chain: &TransformChain, hemi: Hemisphere) -> Result<RibbonMeshes> {
    let paths = chain
        .meshes(hemi)
        .ok_or_else(|| VolsurfError::MissingInputs(format!("{} pial and white meshes", hemi)))?;
    let space = MeshSpace::native(hemi);
    let pial = read_mesh(&paths.pial)?;
    check_mesh(&pial, space, &paths.pial)?;
    let white = read_mesh(&paths.white)?;
    check_mesh(&white, space, &paths.white)?;
    Ok(RibbonMeshes { pial, white, space })
}

fn check_mesh(mesh: &BrainMesh, space: MeshSpace, path: &Path) -> Result<()> {
    match space.vertex_count() {
        Some(expected) if expected != mesh.num_vertices() => Err(VolsurfError::VertexCountMismatch(
            format!("{} mesh {}", space, path.display()),
            expected,
            mesh.num_vertices(),
        )),
        _ => Ok(()),
    }
}

/// A final field must be in the canonical space of its hemisphere, with one value per canonical
/// vertex.
fn check_canonical(field: &SurfaceField, canonical: MeshSpace) -> Result<()> {
    if field.space != canonical {
        return Err(VolsurfError::InconsistentChain(format!(
            "final field is in {}, expected {}",
            field.space, canonical
        )));
    }
    if let Some(expected) = canonical.vertex_count() {
        if field.len() != expected {
            return Err(VolsurfError::VertexCountMismatch(
                format!("final field in {}", canonical),
                expected,
                field.len(),
            ));
        }
    }
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::gifti::Intent;
    use crate::hemi::Hemisphere;

    #[test]
    fn freeview_command_lists_both_overlays() {
        let out = PipelineOutput {
            pipeline: "regfusion",
            lh: PathBuf::from("out/lh.regfusion.shape.gii"),
            rh: PathBuf::from("out/rh.regfusion.shape.gii"),
            intermediates: Vec::new(),
        };
        assert_eq!(
            "freeview -f $SUBJECTS_DIR/fsaverage/surf/lh.inflated:\
             overlay=out/lh.regfusion.shape.gii \
             $SUBJECTS_DIR/fsaverage/surf/rh.inflated:overlay=out/rh.regfusion.shape.gii",
            out.freeview_command()
        );
        assert_eq!(Path::new("out/rh.regfusion.shape.gii"), out.path(Hemisphere::Right));
    }

    #[test]
    fn final_fields_must_be_canonical() {
        let lh = MeshSpace::canonical(Hemisphere::Left);
        let rh = MeshSpace::canonical(Hemisphere::Right);
        let field = SurfaceField::new(vec![0.0; 163842], lh, Intent::Shape).unwrap();
        assert!(check_canonical(&field, lh).is_ok());
        assert!(matches!(check_canonical(&field, rh), Err(VolsurfError::InconsistentChain(_))));
        let native_space = MeshSpace::native(Hemisphere::Left);
        let native = SurfaceField::new(vec![0.0; 163842], native_space, Intent::Shape).unwrap();
        assert!(check_canonical(&native, lh).is_err());
    }

    #[test]
    fn meshes_must_match_the_declared_space() {
        let mesh = BrainMesh::new(vec![0.0; 9], vec![0, 1, 2]).unwrap();
        let native_space = MeshSpace::native(Hemisphere::Left);
        let err = check_mesh(&mesh, native_space, Path::new("lh.pial")).unwrap_err();
        assert!(matches!(err, VolsurfError::VertexCountMismatch(_, 163842, 3)));
    }
}

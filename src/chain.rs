//! Transform-chain selection.
//!
//! Which chain runs is decided once, from the inputs that were supplied, before any file is
//! touched. A volume plus an atlas space descriptor selects Direct-Fusion. A volume plus a mask
//! plus pial and white meshes for both hemispheres selects Two-Stage. Anything else is a
//! configuration error.

use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, VolsurfError};
use crate::hemi::Hemisphere;
use crate::space::{AtlasSpace, Interpolation};

/// Everything a caller may supply to a run. Only the presence of the optional items matters for
/// selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainInputs {
    pub volume: Option<PathBuf>,
    pub space: Option<String>,
    pub mask: Option<PathBuf>,
    pub lh_pial: Option<PathBuf>,
    pub lh_white: Option<PathBuf>,
    pub rh_pial: Option<PathBuf>,
    pub rh_white: Option<PathBuf>,
    pub interp: Interpolation,
}

impl ChainInputs {
    /// Inputs for the Direct-Fusion chain.
    pub fn direct<P: Into<PathBuf>>(volume: P, space: &str, interp: Interpolation) -> ChainInputs {
        ChainInputs {
            volume: Some(volume.into()),
            space: Some(String::from(space)),
            interp,
            ..Default::default()
        }
    }

    /// Inputs for the Two-Stage chain, with meshes given as `[lh_pial, lh_white, rh_pial,
    /// rh_white]`.
    pub fn two_stage<P: Into<PathBuf>>(volume: P, mask: P, meshes: [PathBuf; 4]) -> ChainInputs {
        let [lh_pial, lh_white, rh_pial, rh_white] = meshes;
        ChainInputs {
            volume: Some(volume.into()),
            mask: Some(mask.into()),
            lh_pial: Some(lh_pial),
            lh_white: Some(lh_white),
            rh_pial: Some(rh_pial),
            rh_white: Some(rh_white),
            ..Default::default()
        }
    }

    fn any_native_input(&self) -> bool {
        self.mask.is_some()
            || self.lh_pial.is_some()
            || self.lh_white.is_some()
            || self.rh_pial.is_some()
            || self.rh_white.is_some()
    }
}

/// The pial and white surfaces of one hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct HemiMeshPaths {
    pub pial: PathBuf,
    pub white: PathBuf,
}

/// One named stage of a chain, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FuseVolumeToCanonical,
    SampleVolumeToNative,
    ResampleNativeToCanonical,
    NormalizeIntent,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Step::FuseVolumeToCanonical => "fuse volume to canonical mesh",
            Step::SampleVolumeToNative => "sample volume to native mesh",
            Step::ResampleNativeToCanonical => "resample native mesh to canonical mesh",
            Step::NormalizeIntent => "normalize intent",
        };
        write!(f, "{}", name)
    }
}

/// A selected chain together with the inputs it runs on. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformChain {
    DirectFusion {
        volume: PathBuf,
        space: AtlasSpace,
        interp: Interpolation,
    },
    TwoStage {
        volume: PathBuf,
        space: AtlasSpace,
        mask: PathBuf,
        lh: HemiMeshPaths,
        rh: HemiMeshPaths,
    },
}

impl TransformChain {
    /// Select the chain for `inputs`. Performs no I/O.
    pub fn select(inputs: &ChainInputs) -> Result<TransformChain> {
        let volume = inputs
            .volume
            .clone()
            .ok_or_else(|| VolsurfError::MissingInputs(String::from("volumetric input file")))?;

        if inputs.any_native_input() {
            let named = [
                ("mask", &inputs.mask),
                ("lh pial mesh", &inputs.lh_pial),
                ("lh white mesh", &inputs.lh_white),
                ("rh pial mesh", &inputs.rh_pial),
                ("rh white mesh", &inputs.rh_white),
            ];
            let missing: Vec<&str> =
                named.iter().filter(|(_, p)| p.is_none()).map(|(name, _)| *name).collect();
            if !missing.is_empty() {
                return Err(VolsurfError::MissingInputs(missing.join(", ")));
            }
            let space = match &inputs.space {
                Some(s) => s.parse::<AtlasSpace>()?,
                None => AtlasSpace::default(),
            };
            return Ok(TransformChain::TwoStage {
                volume,
                space,
                mask: inputs.mask.clone().unwrap_or_default(),
                lh: HemiMeshPaths {
                    pial: inputs.lh_pial.clone().unwrap_or_default(),
                    white: inputs.lh_white.clone().unwrap_or_default(),
                },
                rh: HemiMeshPaths {
                    pial: inputs.rh_pial.clone().unwrap_or_default(),
                    white: inputs.rh_white.clone().unwrap_or_default(),
                },
            });
        }

        match &inputs.space {
            Some(s) => {
                let space = s.parse::<AtlasSpace>()?;
                space.fusion_template()?;
                Ok(TransformChain::DirectFusion { volume, space, interp: inputs.interp })
            }
            None => Err(VolsurfError::MissingInputs(String::from(
                "atlas space descriptor, or a mask plus pial and white meshes for both hemispheres",
            ))),
        }
    }

    /// The name used in output file names.
    pub fn pipeline_name(&self) -> &'static str {
        match self {
            TransformChain::DirectFusion { .. } => "regfusion",
            TransformChain::TwoStage { .. } => "fsaverage",
        }
    }

    pub fn steps(&self) -> Vec<Step> {
        match self {
            TransformChain::DirectFusion { .. } => {
                vec![Step::FuseVolumeToCanonical, Step::NormalizeIntent]
            }
            TransformChain::TwoStage { .. } => vec![
                Step::SampleVolumeToNative,
                Step::ResampleNativeToCanonical,
                Step::NormalizeIntent,
            ],
        }
    }

    pub fn volume(&self) -> &PathBuf {
        match self {
            TransformChain::DirectFusion { volume, .. } => volume,
            TransformChain::TwoStage { volume, .. } => volume,
        }
    }

    pub fn space(&self) -> AtlasSpace {
        match self {
            TransformChain::DirectFusion { space, .. } => *space,
            TransformChain::TwoStage { space, .. } => *space,
        }
    }

    /// The native meshes for `hemi`, if this chain uses any.
    pub fn meshes(&self, hemi: Hemisphere) -> Option<&HemiMeshPaths> {
        match self {
            TransformChain::DirectFusion { .. } => None,
            TransformChain::TwoStage { lh, rh, .. } => match hemi {
                Hemisphere::Left => Some(lh),
                Hemisphere::Right => Some(rh),
            },
        }
    }
}

impl fmt::Display for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let steps: Vec<String> = self.steps().iter().map(|s| s.to_string()).collect();
        write!(f, "{} chain ({})", self.pipeline_name(), steps.join(" -> "))
    }
}

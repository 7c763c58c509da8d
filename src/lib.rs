//! Projection of volumetric statistical maps in MNI152 space onto fsaverage cortical surfaces.
//!
//! Two transform chains are available. Direct-Fusion maps the volume straight onto fsaverage
//! through a precomputed registration fusion table. Two-Stage samples the volume onto fsLR 164k
//! meshes along the cortical ribbon, then resamples the result onto fsaverage 164k. Both write one
//! overlay per hemisphere, tagged `NIFTI_INTENT_SHAPE`.
//!
//! The file formats involved (NIfTI-1 volumes, GIFTI, FreeSurfer surf and curv) are read and
//! written here too.

pub mod affine;
pub mod atlas;
pub mod capability;
pub mod chain;
pub mod error;
pub mod field;
pub mod fs_curv;
pub mod fs_surface;
pub mod fusion;
pub mod gifti;
pub mod hemi;
pub mod logging;
pub mod mesh;
pub mod nifti;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod ribbon;
pub mod space;
pub mod sphere;
pub mod util;
pub mod volume;

pub use atlas::{AtlasData, AtlasResampler};
pub use capability::{Resampler, RibbonMeshes};
pub use chain::{ChainInputs, HemiMeshPaths, Step, TransformChain};
pub use error::{Result, VolsurfError};
pub use field::{FieldSummary, SurfaceField};
pub use fs_curv::{read_curv, write_curv, CurvHeader, FsCurv};
pub use fs_surface::{read_surf, write_surf, FsSurface, FsSurfaceHeader};
pub use gifti::{read_gifti, write_gifti, DataArray, Encoding, GiftiImage, Intent};
pub use hemi::Hemisphere;
pub use mesh::{read_mesh, BrainMesh, MeshDensity, MeshFamily, MeshSpace};
pub use nifti::{read_nifti, read_nifti_mask, write_nifti, NiftiHeader};
pub use normalize::{normalize_gifti, normalize_gifti_file, normalize_intent};
pub use output::OutputFormat;
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
pub use space::{AtlasSpace, Interpolation};
pub use volume::{ScalarVolume, VolumeMask};

//! Surface scalar fields: one value per vertex of a known mesh space, plus the intent
//! classification.

use ndarray::Array1;
use ndarray_stats::QuantileExt;

use std::fmt;
use std::path::Path;

use crate::error::{Result, VolsurfError};
use crate::gifti::{read_gifti, DataArray, GiftiImage, Intent};
use crate::mesh::{BrainMesh, MeshSpace};

/// A per-vertex scalar overlay. `values.len()` always equals the vertex count of `space`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceField {
    pub values: Array1<f32>,
    pub space: MeshSpace,
    pub intent: Intent,
}

impl SurfaceField {
    /// Create a field, checking the value count against the vertex count of `space` where the space
    /// defines one.
    pub fn new(values: Vec<f32>, space: MeshSpace, intent: Intent) -> Result<SurfaceField> {
        if let Some(expected) = space.vertex_count() {
            if values.len() != expected {
                return Err(VolsurfError::VertexCountMismatch(
                    format!("surface field in {}", space),
                    expected,
                    values.len(),
                ));
            }
        }
        Ok(SurfaceField { values: Array1::from(values), space, intent })
    }

    /// Create a field sampled onto `mesh`, which must have exactly one vertex per value and, where
    /// `space` defines a vertex count, be a mesh of that space.
    pub fn on_mesh(
        values: Vec<f32>,
        mesh: &BrainMesh,
        space: MeshSpace,
        intent: Intent,
    ) -> Result<SurfaceField> {
        if values.len() != mesh.num_vertices() {
            return Err(VolsurfError::VertexCountMismatch(
                format!("surface field on {} mesh", space),
                mesh.num_vertices(),
                values.len(),
            ));
        }
        SurfaceField::new(values, space, intent)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The field as a single-array GIFTI image, tagged with its intent and hemisphere.
    pub fn to_gifti(&self) -> GiftiImage {
        let mut array = DataArray::from_values(self.values.to_vec(), self.intent.clone());
        array.metadata.push((String::from("Name"), format!("{}", self.space)));
        GiftiImage {
            metadata: vec![(
                String::from("AnatomicalStructurePrimary"),
                String::from(self.space.hemi.anatomical_structure()),
            )],
            arrays: vec![array],
        }
    }

    /// Read the first data array of a GIFTI file as a field in `space`. The stored intent is kept
    /// as is.
    pub fn from_gifti_file<P: AsRef<Path>>(path: P, space: MeshSpace) -> Result<SurfaceField> {
        let img = read_gifti(path)?;
        SurfaceField::from_gifti(&img, space)
    }

    pub fn from_gifti(img: &GiftiImage, space: MeshSpace) -> Result<SurfaceField> {
        let array = img
            .arrays
            .first()
            .ok_or_else(|| {
                VolsurfError::InvalidGifti(String::from("file contains no data arrays"))
            })?;
        SurfaceField::new(array.data.to_f32(), space, array.intent.clone())
    }

    /// Summary statistics over the finite values, for reporting.
    pub fn summary(&self) -> FieldSummary {
        let finite = self.values.iter().filter(|v| v.is_finite()).count();
        let (min, max) = if finite > 0 {
            (*self.values.min_skipnan(), *self.values.max_skipnan())
        } else {
            (f32::NAN, f32::NAN)
        };
        FieldSummary { num_vertices: self.len(), num_finite: finite, min, max }
    }
}


/// Basic statistics of a [`SurfaceField`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSummary {
    pub num_vertices: usize,
    pub num_finite: usize,
    pub min: f32,
    pub max: f32,
}

impl fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} with data, range [{}, {}]",
            self.num_vertices, self.num_finite, self.min, self.max
        )
    }
}

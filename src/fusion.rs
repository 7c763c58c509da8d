//! Registration fusion: direct projection of an atlas-space volume onto the canonical surface.
//!
//! A precomputed mapping stores, for every vertex of the canonical mesh, the atlas coordinate (in
//! mm) that the vertex corresponds to after averaging many subject registrations. Projecting a
//! volume then means sampling it at those coordinates. Coordinates that fall outside the volume
//! yield 0.

use std::io::Read;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{Result, VolsurfError};
use crate::space::Interpolation;
use crate::util::open_input;
use crate::volume::ScalarVolume;

/// Atlas coordinates, one per canonical mesh vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapping {
    pub coords: Vec<Point3<f64>>,
}

impl CoordinateMapping {
    /// Parse a whitespace separated text table, either 3 rows of N columns or N rows of 3 columns.
    /// Lines starting with '#' are ignored.
    pub fn from_text(text: &str) -> Result<CoordinateMapping> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        for (line_idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(|t| {
                    t.parse::<f64>().map_err(|_| {
                        let msg = format!("line {}: invalid number '{}'", line_idx + 1, t);
                        VolsurfError::InvalidMapping(msg)
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }

        if rows.len() == 3 && rows.iter().all(|r| r.len() == rows[0].len()) && rows[0].len() != 3 {
            let n = rows[0].len();
            let coords = (0..n).map(|i| Point3::new(rows[0][i], rows[1][i], rows[2][i])).collect();
            return Ok(CoordinateMapping { coords });
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != 3) {
            return Err(VolsurfError::InvalidMapping(format!(
                "expected 3 coordinates per row, row {} has {}",
                bad + 1,
                rows[bad].len()
            )));
        }
        let coords = rows.iter().map(|r| Point3::new(r[0], r[1], r[2])).collect();
        Ok(CoordinateMapping { coords })
    }

    /// Read a mapping table from a file. If the file's name ends with ".gz", the file is assumed to
    /// need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<CoordinateMapping> {
        let mut input = open_input(path)?;
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        CoordinateMapping::from_text(&text)
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Sample `volume` at every mapped atlas coordinate.
pub fn fuse(
    volume: &ScalarVolume,
    mapping: &CoordinateMapping,
    interp: Interpolation,
) -> Result<Vec<f32>> {
    let inv = volume
        .affine
        .inverse()
        .ok_or_else(|| VolsurfError::InvalidNifti(String::from("volume affine is singular")))?;
    Ok(mapping
        .coords
        .iter()
        .map(|c| volume.sample_voxel(&inv.apply(c), interp).unwrap_or(0.0))
        .collect())
}

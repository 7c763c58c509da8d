//! Intent normalization for final overlays.
//!
//! Intermediate surface files are commonly tagged as functional data (`NIFTI_INTENT_TIME_SERIES` or
//! no intent at all), which makes viewers treat a single statistical map like a time course.
//! Normalization retags the data as `NIFTI_INTENT_SHAPE` and leaves every value unchanged.

use std::path::Path;

use tracing::debug;

use crate::error::{Result, VolsurfError};
use crate::field::SurfaceField;
use crate::fs_curv::encode_curv;
use crate::gifti::{read_gifti, DataArray, Encoding, GiftiImage, Intent};
use crate::output::OutputFormat;
use crate::util::write_atomically;

/// The same field, classified as shape data.
pub fn normalize_intent(field: &SurfaceField) -> SurfaceField {
    SurfaceField { values: field.values.clone(), space: field.space, intent: Intent::Shape }
}

/// Reduce a GIFTI image to its first data array, as float32, tagged as shape data.
///
/// File level metadata is kept. Array metadata is dropped, as it describes the array's previous
/// meaning.
pub fn normalize_gifti(img: &GiftiImage) -> Result<GiftiImage> {
    let first = img
        .arrays
        .first()
        .ok_or_else(|| VolsurfError::InvalidGifti(String::from("file contains no data arrays")))?;
    if first.intent == Intent::PointSet || first.intent == Intent::Triangle {
        let msg = format!("first array is {}, not per-vertex data", first.intent);
        return Err(VolsurfError::InvalidGifti(msg));
    }
    Ok(GiftiImage {
        metadata: img.metadata.clone(),
        arrays: vec![DataArray::from_values(first.data.to_f32(), Intent::Shape)],
    })
}

/// Normalize the GIFTI file at `in_path` and write the result to `out_path`. Both may be the same
/// file.
pub fn normalize_gifti_file<P: AsRef<Path>, Q: AsRef<Path>>(
    in_path: P,
    out_path: Q,
    encoding: Encoding,
) -> Result<GiftiImage> {
    let normalized = normalize_gifti(&read_gifti(in_path.as_ref())?)?;
    let bytes = normalized.to_bytes(encoding)?;
    write_atomically(out_path.as_ref(), &bytes)?;
    debug!("wrote {} with intent {}", out_path.as_ref().display(), Intent::Shape);
    Ok(normalized)
}

/// Write a normalized field as a final overlay.
///
/// The file is encoded completely in memory and then moved into place, so a failure leaves no
/// partial or wrongly tagged file behind.
pub fn write_shape_field<P: AsRef<Path>>(
    field: &SurfaceField,
    path: P,
    format: OutputFormat,
    encoding: Encoding,
) -> Result<()> {
    if field.intent != Intent::Shape {
        let msg = format!("refusing to write a {} field as a shape overlay", field.intent);
        return Err(VolsurfError::InvalidGifti(msg));
    }
    let bytes = match format {
        OutputFormat::Gifti => field.to_gifti().to_bytes(encoding)?,
        OutputFormat::Curv => encode_curv(&field.values.to_vec(), 0)?,
    };
    write_atomically(path, &bytes)
}

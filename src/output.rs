//! Output formats and file naming.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, VolsurfError};
use crate::hemi::Hemisphere;

/// File format of the final per-hemisphere overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// GIFTI, carrying the shape intent in the file.
    Gifti,
    /// FreeSurfer curv. Has no intent field, the classification is in the file name only.
    Curv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Gifti => "gii",
            OutputFormat::Curv => "curv",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> OutputFormat {
        OutputFormat::Gifti
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = VolsurfError;

    fn from_str(s: &str) -> Result<OutputFormat> {
        match s.trim_start_matches('.') {
            "gii" | "gifti" => Ok(OutputFormat::Gifti),
            "curv" => Ok(OutputFormat::Curv),
            _ => Err(VolsurfError::UnknownOutputFormat(s.to_string())),
        }
    }
}

/// The final overlay name, `{hemi}.{pipeline}.shape.{ext}`.
pub fn shape_file_name(hemi: Hemisphere, pipeline: &str, format: OutputFormat) -> String {
    format!("{}.{}.shape.{}", hemi.prefix(), pipeline, format.extension())
}

pub fn shape_file_path<P: AsRef<Path>>(
    out_dir: P,
    hemi: Hemisphere,
    pipeline: &str,
    format: OutputFormat,
) -> PathBuf {
    out_dir.as_ref().join(shape_file_name(hemi, pipeline, format))
}

/// The native-mesh intermediate written by the Two-Stage chain, `{hemi}.fslr.func.gii`.
pub fn intermediate_file_name(hemi: Hemisphere) -> String {
    format!("{}.fslr.func.gii", hemi.prefix())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shape_names_carry_hemisphere_pipeline_and_extension() {
        let (lh, rh) = (Hemisphere::Left, Hemisphere::Right);
        assert_eq!(
            "lh.regfusion.shape.gii",
            shape_file_name(lh, "regfusion", OutputFormat::Gifti)
        );
        assert_eq!(
            "rh.fsaverage.shape.curv",
            shape_file_name(rh, "fsaverage", OutputFormat::Curv)
        );
        assert_eq!(
            PathBuf::from("out/rh.regfusion.shape.gii"),
            shape_file_path("out", rh, "regfusion", OutputFormat::Gifti)
        );
        assert_eq!("lh.fslr.func.gii", intermediate_file_name(Hemisphere::Left));
    }

    #[test]
    fn formats_parse_from_extensions() {
        assert_eq!(OutputFormat::Gifti, "gii".parse::<OutputFormat>().unwrap());
        assert_eq!(OutputFormat::Curv, ".curv".parse::<OutputFormat>().unwrap());
        assert!(matches!("mgh".parse::<OutputFormat>(), Err(VolsurfError::UnknownOutputFormat(_))));
    }
}

//! Volumetric atlas spaces and interpolation modes accepted by the transform chains.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VolsurfError};

/// A named volumetric template space.
///
/// Only MNI152-family spaces are recognized. Of those, only `MNI152NLin6Asym` has a transform
/// chain; the others parse, so that the error can name them, but [`AtlasSpace::fusion_template`]
/// rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtlasSpace {
    Mni152NLin6Asym,
    Mni152NLin2009cAsym,
}

impl AtlasSpace {
    pub fn name(&self) -> &'static str {
        match self {
            AtlasSpace::Mni152NLin6Asym => "MNI152NLin6Asym",
            AtlasSpace::Mni152NLin2009cAsym => "MNI152NLin2009cAsym",
        }
    }

    /// The registration fusion template identifier for this space.
    ///
    /// `MNI152NLin6Asym` is the FSL MNI152 template that the RF-ANTs mappings were computed on.
    pub fn fusion_template(&self) -> Result<&'static str> {
        match self {
            AtlasSpace::Mni152NLin6Asym => Ok("MNI152_orig"),
            other => Err(VolsurfError::UnsupportedSpace(other.name().to_string())),
        }
    }
}

impl Default for AtlasSpace {
    fn default() -> AtlasSpace {
        AtlasSpace::Mni152NLin6Asym
    }
}

impl fmt::Display for AtlasSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AtlasSpace {
    type Err = VolsurfError;

    fn from_str(s: &str) -> Result<AtlasSpace> {
        let normalized = s.trim().trim_start_matches("tpl-").to_ascii_lowercase();
        match normalized.as_str() {
            "mni152nlin6asym" | "mni152_orig" | "fsl" => Ok(AtlasSpace::Mni152NLin6Asym),
            "mni152nlin2009casym" => Ok(AtlasSpace::Mni152NLin2009cAsym),
            _ => Err(VolsurfError::UnsupportedSpace(s.to_string())),
        }
    }
}


/// How a volume is sampled at a non-grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    Linear,
    Nearest,
}

impl Default for Interpolation {
    fn default() -> Interpolation {
        Interpolation::Linear
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Interpolation::Linear => write!(f, "linear"),
            Interpolation::Nearest => write!(f, "nearest"),
        }
    }
}

impl FromStr for Interpolation {
    type Err = VolsurfError;

    fn from_str(s: &str) -> Result<Interpolation> {
        match s {
            "linear" => Ok(Interpolation::Linear),
            "nearest" => Ok(Interpolation::Nearest),
            _ => Err(VolsurfError::UnknownInterpolation(s.to_string())),
        }
    }
}

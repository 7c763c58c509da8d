//! Brain hemispheres. Every pipeline stage is run once per hemisphere, independently.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VolsurfError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    /// Both hemispheres in processing order: left before right.
    pub const BOTH: [Hemisphere; 2] = [Hemisphere::Left, Hemisphere::Right];

    /// The FreeSurfer file name prefix, `lh` or `rh`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }

    /// The single letter used in HCP / fsLR file names, `L` or `R`.
    pub fn letter(&self) -> &'static str {
        match self {
            Hemisphere::Left => "L",
            Hemisphere::Right => "R",
        }
    }

    /// The GIFTI `AnatomicalStructurePrimary` value.
    pub fn anatomical_structure(&self) -> &'static str {
        match self {
            Hemisphere::Left => "CortexLeft",
            Hemisphere::Right => "CortexRight",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

impl FromStr for Hemisphere {
    type Err = VolsurfError;

    fn from_str(s: &str) -> Result<Hemisphere> {
        match s.to_ascii_lowercase().as_str() {
            "lh" | "l" | "left" => Ok(Hemisphere::Left),
            "rh" | "r" | "right" => Ok(Hemisphere::Right),
            _ => Err(VolsurfError::UnknownHemisphere(s.to_string())),
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn left_is_processed_before_right() {
        assert_eq!([Hemisphere::Left, Hemisphere::Right], Hemisphere::BOTH);
    }

    #[test]
    fn hemisphere_names_are_parsed() {
        assert_eq!(Hemisphere::Left, "lh".parse::<Hemisphere>().unwrap());
        assert_eq!(Hemisphere::Right, "R".parse::<Hemisphere>().unwrap());
        let err = "both".parse::<Hemisphere>().unwrap_err();
        assert!(matches!(err, VolsurfError::UnknownHemisphere(name) if name == "both"));
        assert_eq!("rh", Hemisphere::Right.to_string());
    }
}

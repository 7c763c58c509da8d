// Functions for managing FreeSurfer per-vertex data in binary 'curv' files. These files store 1
// scalar value (typically a morphological descriptor, like cortical thickness at that point) for
// each vertex of the respective brain surface mesh. They are one of the output formats of the
// projection.


use byteordered::{ByteOrdered};

use std::io::{Read};
use std::path::{Path};

use crate::util::{header_len, open_input, truncation_as, write_atomically, MAX_PREALLOCATED};
use crate::error::{VolsurfError, Result};

pub const CURV_MAGIC_FILE_TYPE_NUMBER: [u8; 3] = [255; 3];


#[derive(Debug, Clone, PartialEq)]
pub struct CurvHeader {
    pub curv_magic: [u8; 3],
    pub num_vertices: i32,
    pub num_faces: i32,
    pub num_values_per_vertex: i32,
}


impl Default for CurvHeader {
    fn default() -> CurvHeader {
        CurvHeader {
            curv_magic: CURV_MAGIC_FILE_TYPE_NUMBER,
            num_vertices: 0,
            num_faces: 0,
            num_values_per_vertex: 1,
        }
    }
}

impl CurvHeader {

    /// Read a Curv header from a file. If the file's name ends with ".gz", the file is assumed to
    /// need GZip decoding. This is not typically the case for FreeSurfer Curv files, but very handy
    /// (and it helps us to reduce the size of our test data).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<CurvHeader> {
        let mut input = open_input(path)?;
        CurvHeader::from_reader(&mut input)
    }


    /// Read a Curv header from the given byte stream.
    /// It is assumed that the input is currently at the start of the
    /// Curv header.
    pub fn from_reader<S>(input: &mut S) -> Result<CurvHeader>
    where
        S: Read,
    {
        let mut hdr = CurvHeader::default();

        let mut input = ByteOrdered::be(input);

        for v in &mut hdr.curv_magic {
            *v = input.read_u8()?;
        }
        if hdr.curv_magic != CURV_MAGIC_FILE_TYPE_NUMBER {
            return Err(VolsurfError::InvalidCurvFormat);
        }

        hdr.num_vertices = input.read_i32()?;
        hdr.num_faces = input.read_i32()?;
        hdr.num_values_per_vertex = input.read_i32()?;

        if hdr.num_vertices < 0 || hdr.num_values_per_vertex != 1 {
            return Err(VolsurfError::InvalidCurvFormat);
        }
        Ok(hdr)
    }

}


/// A FreeSurfer curv file: one value per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct FsCurv {
    pub header: CurvHeader,
    pub data: Vec<f32>,
}


/// Read per-vertex data from a FreeSurfer curv file.
pub fn read_curv<P: AsRef<Path>>(path: P) -> Result<FsCurv> {
    let mut input = open_input(path)?;
    let header = CurvHeader::from_reader(&mut input)?;

    let mut input = ByteOrdered::be(input);
    let truncated = truncation_as(|| VolsurfError::InvalidCurvFormat);
    let num_values = header_len(header.num_vertices, 1).ok_or(VolsurfError::InvalidCurvFormat)?;
    let mut data: Vec<f32> = Vec::with_capacity(num_values.min(MAX_PREALLOCATED));
    for _ in 0..num_values {
        data.push(input.read_f32().map_err(&truncated)?);
    }
    Ok(FsCurv { header, data })
}


/// Encode per-vertex values in FreeSurfer curv format. `num_faces` is informational only.
pub fn encode_curv(data: &[f32], num_faces: i32) -> Result<Vec<u8>> {
    let mut out = ByteOrdered::be(Vec::with_capacity(15 + data.len() * 4));
    for b in CURV_MAGIC_FILE_TYPE_NUMBER.iter() {
        out.write_u8(*b)?;
    }
    out.write_i32(data.len() as i32)?;
    out.write_i32(num_faces)?;
    out.write_i32(1)?;
    for v in data.iter() {
        out.write_f32(*v)?;
    }
    Ok(out.into_inner())
}


/// Write per-vertex values to a FreeSurfer curv file.
pub fn write_curv<P: AsRef<Path>>(path: P, data: &[f32]) -> Result<()> {
    write_atomically(path, &encode_curv(data, 0)?)
}

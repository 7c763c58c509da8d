// Functions for managing FreeSurfer brain surface meshes in binary 'surf' files.
// These files store a triangular mesh, where each vertex if defined by its x,y,z coord and
// each face is defined by 3 vertices, stored as 3 indices into the vertices.
// They are accepted as pial/white geometry wherever GIFTI surfaces are.


use byteordered::{ByteOrdered};

use std::io::{Read};
use std::path::{Path};

use crate::mesh::BrainMesh;
use crate::util::{header_len, open_input, truncation_as, write_atomically, MAX_PREALLOCATED};
use crate::error::{VolsurfError, Result};

pub const TRIS_MAGIC_FILE_TYPE_NUMBER: i32 = 16777214;

#[derive(Debug, Clone, PartialEq)]
pub struct FsSurfaceHeader {
    pub surf_magic: [u8; 3],
    pub info_line: String,
    pub num_vertices: i32,
    pub num_faces: i32,
}


impl Default for FsSurfaceHeader {
    fn default() -> FsSurfaceHeader {
        FsSurfaceHeader {
            surf_magic: [255; 3],
            info_line: String::from(""),
            num_vertices: 0,
            num_faces: 0
        }
    }
}

impl FsSurfaceHeader {

    /// Read an FsSurface header from the given byte stream.
    /// It is assumed that the input is currently at the start of the
    /// FsSurface header. The info line is consumed up to and including its "\n\n" terminator.
    pub fn from_reader<S>(input: &mut S) -> Result<FsSurfaceHeader>
    where
        S: Read,
    {
        let mut hdr = FsSurfaceHeader::default();

        let mut input = ByteOrdered::be(input);

        for v in &mut hdr.surf_magic {
            *v = input.read_u8()?;
        }

        let [b1, b2, b3] = hdr.surf_magic;
        let magic: i32 = interpret_fs_int24(b1, b2, b3);
        if magic != TRIS_MAGIC_FILE_TYPE_NUMBER {
            return Err(VolsurfError::InvalidFsSurfaceFormat);
        }

        // The creation line ends with two newline characters.
        let mut info_line = String::new();
        let mut prev_char = '\0';
        loop {
            let cur_char = input.read_u8()? as char;
            if cur_char == '\n' && prev_char == '\n' {
                break;
            }
            info_line.push(cur_char);
            prev_char = cur_char;
        }

        hdr.info_line = info_line.trim_end().to_string();
        hdr.num_vertices = input.read_i32()?;
        hdr.num_faces = input.read_i32()?;

        if hdr.num_vertices < 0 || hdr.num_faces < 0 {
            return Err(VolsurfError::InvalidFsSurfaceFormat);
        }
        Ok(hdr)
    }
}


/// Interpret three bytes as a single 24 bit integer, FreeSurfer style.
pub fn interpret_fs_int24(b1: u8, b2:u8, b3:u8) -> i32 {
    ((b1 as i32) << 16) + ((b2 as i32) << 8) + b3 as i32
}


// An FsSurface object
#[derive(Debug, PartialEq, Clone)]
pub struct FsSurface {
    pub header: FsSurfaceHeader,
    pub mesh: BrainMesh,
}


/// Read a brain mesh from a FreeSurfer surf file, like `lh.white` or `lh.pial`.
pub fn read_surf<P: AsRef<Path>>(path: P) -> Result<FsSurface> {
    FsSurface::from_file(path)
}


impl FsSurface {
    /// Read an FsSurface instance from a file. If the file's name ends with ".gz", the file is
    /// assumed to need GZip decoding. This is not typically the case for FreeSurfer Surface files,
    /// but very handy (and it helps us to reduce the size of our test data).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<FsSurface> {
        let mut input = open_input(path)?;
        FsSurface::from_reader(&mut input)
    }

    pub fn from_reader<S>(input: &mut S) -> Result<FsSurface>
    where
        S: Read,
    {
        let hdr = FsSurfaceHeader::from_reader(input)?;
        let mesh = FsSurface::mesh_from_reader(input, &hdr)?;
        Ok(FsSurface { header : hdr, mesh })
    }

    /// Read the vertex and face data that follows the header.
    pub fn mesh_from_reader<S>(input: &mut S, hdr: &FsSurfaceHeader) -> Result<BrainMesh>
    where
        S: Read,
    {
        let mut input = ByteOrdered::be(input);
        let truncated = truncation_as(|| VolsurfError::InvalidFsSurfaceFormat);

        let num_coords =
            header_len(hdr.num_vertices, 3).ok_or(VolsurfError::InvalidFsSurfaceFormat)?;
        let num_indices = header_len(hdr.num_faces, 3).ok_or(VolsurfError::InvalidFsSurfaceFormat)?;

        let mut vertex_data : Vec<f32> = Vec::with_capacity(num_coords.min(MAX_PREALLOCATED));
        for _ in 0..num_coords {
            vertex_data.push(input.read_f32().map_err(&truncated)?);
        }

        let mut face_data : Vec<i32> = Vec::with_capacity(num_indices.min(MAX_PREALLOCATED));
        for _ in 0..num_indices {
            face_data.push(input.read_i32().map_err(&truncated)?);
        }

        BrainMesh::new(vertex_data, face_data)
    }
}


/// Encode a mesh in FreeSurfer surf format.
pub fn encode_surf(mesh: &BrainMesh, info_line: &str) -> Result<Vec<u8>> {
    let capacity = mesh.vertices.len() * 4 + mesh.faces.len() * 4 + 64;
    let mut out = ByteOrdered::be(Vec::with_capacity(capacity));
    out.write_u8(0xff)?;
    out.write_u8(0xff)?;
    out.write_u8(0xfe)?;
    for b in info_line.bytes().filter(|&b| b != b'\n') {
        out.write_u8(b)?;
    }
    out.write_u8(b'\n')?;
    out.write_u8(b'\n')?;
    out.write_i32(mesh.num_vertices() as i32)?;
    out.write_i32(mesh.num_faces() as i32)?;
    for v in mesh.vertices.iter() {
        out.write_f32(*v)?;
    }
    for f in mesh.faces.iter() {
        out.write_i32(*f)?;
    }
    Ok(out.into_inner())
}


/// Write a mesh to a FreeSurfer surf file.
pub fn write_surf<P: AsRef<Path>>(path: P, mesh: &BrainMesh) -> Result<()> {
    let bytes = encode_surf(mesh, "created by volsurf")?;
    write_atomically(path, &bytes)
}

//! Functions for reading and writing volumes in single-file NIfTI-1 format ('.nii' and '.nii.gz').

use byteordered::{ByteOrdered, Endianness};
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{Array3, ShapeBuilder};

use std::io::{Read, Write};
use std::path::Path;

use crate::affine::Affine;
use crate::error::{Result, VolsurfError};
use crate::space::AtlasSpace;
use crate::util::{
    is_gz_file, open_input, read_fixed_length_string, skip_bytes, write_atomically,
    MAX_PREALLOCATED,
};
use crate::volume::{ScalarVolume, VolumeMask};

pub const NIFTI1_HEADER_SIZE: i32 = 348;

pub const DT_UINT8: i16 = 2;
pub const DT_INT16: i16 = 4;
pub const DT_INT32: i16 = 8;
pub const DT_FLOAT32: i16 = 16;
pub const DT_FLOAT64: i16 = 64;
pub const DT_INT8: i16 = 256;
pub const DT_UINT16: i16 = 512;
pub const DT_UINT32: i16 = 768;


/// The subset of the NIfTI-1 header that is needed to interpret the image data.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    pub endianness: Endianness,
    pub dim: [i16; 8],
    pub intent_code: i16,
    pub datatype: i16,
    pub bitpix: i16,
    pub pixdim: [f32; 8],
    pub vox_offset: f32,
    pub scl_slope: f32,
    pub scl_inter: f32,
    pub descrip: String,
    pub qform_code: i16,
    pub sform_code: i16,
    pub quatern: [f32; 3],
    pub qoffset: [f32; 3],
    pub srow_x: [f32; 4],
    pub srow_y: [f32; 4],
    pub srow_z: [f32; 4],
    pub intent_name: String,
    pub magic: String,
}

impl Default for NiftiHeader {
    fn default() -> NiftiHeader {
        NiftiHeader {
            endianness: Endianness::Little,
            dim: [3, 1, 1, 1, 1, 1, 1, 1],
            intent_code: 0,
            datatype: DT_FLOAT32,
            bitpix: 32,
            pixdim: [1.0; 8],
            vox_offset: 352.0,
            scl_slope: 1.0,
            scl_inter: 0.0,
            descrip: String::new(),
            qform_code: 0,
            sform_code: 0,
            quatern: [0.0; 3],
            qoffset: [0.0; 3],
            srow_x: [1.0, 0.0, 0.0, 0.0],
            srow_y: [0.0, 1.0, 0.0, 0.0],
            srow_z: [0.0, 0.0, 1.0, 0.0],
            intent_name: String::new(),
            magic: String::from("n+1"),
        }
    }
}

impl NiftiHeader {

    /// Read a NIfTI-1 header from a file.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NiftiHeader> {
        let mut input = open_input(path)?;
        NiftiHeader::from_reader(&mut input)
    }


    /// Read a NIfTI-1 header from the given byte stream. It is assumed that the input is currently
    /// at the start of the header. Exactly 348 bytes are consumed.
    pub fn from_reader<S>(input: &mut S) -> Result<NiftiHeader>
    where
        S: Read,
    {
        let mut hdr = NiftiHeader::default();

        let mut sizeof_hdr = [0u8; 4];
        input.read_exact(&mut sizeof_hdr)?;
        hdr.endianness = if i32::from_le_bytes(sizeof_hdr) == NIFTI1_HEADER_SIZE {
            Endianness::Little
        } else if i32::from_be_bytes(sizeof_hdr) == NIFTI1_HEADER_SIZE {
            Endianness::Big
        } else {
            let msg = String::from("sizeof_hdr is not 348, not a NIfTI-1 file");
            return Err(VolsurfError::InvalidNifti(msg));
        };

        let mut input = ByteOrdered::runtime(input, hdr.endianness);

        // data_type, db_name, extents, session_error, regular, dim_info
        skip_bytes(&mut input, 36)?;
        for d in hdr.dim.iter_mut() {
            *d = input.read_i16()?;
        }
        skip_bytes(&mut input, 12)?; // intent_p1..3
        hdr.intent_code = input.read_i16()?;
        hdr.datatype = input.read_i16()?;
        hdr.bitpix = input.read_i16()?;
        skip_bytes(&mut input, 2)?; // slice_start
        for p in hdr.pixdim.iter_mut() {
            *p = input.read_f32()?;
        }
        hdr.vox_offset = input.read_f32()?;
        hdr.scl_slope = input.read_f32()?;
        hdr.scl_inter = input.read_f32()?;
        skip_bytes(&mut input, 28)?; // slice_end .. glmin
        hdr.descrip = read_fixed_length_string(&mut input, 80)?;
        skip_bytes(&mut input, 24)?; // aux_file
        hdr.qform_code = input.read_i16()?;
        hdr.sform_code = input.read_i16()?;
        for q in hdr.quatern.iter_mut() {
            *q = input.read_f32()?;
        }
        for q in hdr.qoffset.iter_mut() {
            *q = input.read_f32()?;
        }
        for s in hdr.srow_x.iter_mut() {
            *s = input.read_f32()?;
        }
        for s in hdr.srow_y.iter_mut() {
            *s = input.read_f32()?;
        }
        for s in hdr.srow_z.iter_mut() {
            *s = input.read_f32()?;
        }
        hdr.intent_name = read_fixed_length_string(&mut input, 16)?;
        hdr.magic = read_fixed_length_string(&mut input, 4)?;

        if hdr.magic != "n+1" {
            return Err(VolsurfError::InvalidNifti(format!(
                "unsupported magic '{}', only single-file NIfTI-1 is supported",
                hdr.magic
            )));
        }
        Ok(hdr)
    }


    /// The spatial dimensions of the volume. Trailing dimensions must be 1, so that 3D+1 images are
    /// accepted.
    pub fn volume_dims(&self) -> Result<(usize, usize, usize)> {
        let ndim = self.dim[0];
        if !(1..=7).contains(&ndim) {
            let msg = format!("invalid number of dimensions {}", ndim);
            return Err(VolsurfError::InvalidNifti(msg));
        }
        let ndim = ndim as usize;
        let extent = |i: usize| -> Result<usize> {
            if i > ndim {
                return Ok(1);
            }
            let d = self.dim[i];
            if d < 1 {
                let msg = format!("dimension {} has invalid length {}", i, d);
                return Err(VolsurfError::InvalidNifti(msg));
            }
            Ok(d as usize)
        };
        for i in 4..=7 {
            if extent(i)? != 1 {
                return Err(VolsurfError::InvalidNifti(format!(
                    "expected a 3D volume, but dimension {} has length {}",
                    i, self.dim[i]
                )));
            }
        }
        Ok((extent(1)?, extent(2)?, extent(3)?))
    }


    /// The voxel-to-world affine. Prefers the sform, then the qform, then plain voxel scaling.
    pub fn affine(&self) -> Affine {
        if self.sform_code > 0 {
            let row = |r: &[f32; 4]| [r[0] as f64, r[1] as f64, r[2] as f64, r[3] as f64];
            Affine::from_rows(row(&self.srow_x), row(&self.srow_y), row(&self.srow_z))
        } else if self.qform_code > 0 {
            Affine::from_quaternion(
                self.quatern[0] as f64,
                self.quatern[1] as f64,
                self.quatern[2] as f64,
                [self.qoffset[0] as f64, self.qoffset[1] as f64, self.qoffset[2] as f64],
                [self.pixdim[1] as f64, self.pixdim[2] as f64, self.pixdim[3] as f64],
                self.pixdim[0] as f64,
            )
        } else {
            Affine::scaling(self.pixdim[1] as f64, self.pixdim[2] as f64, self.pixdim[3] as f64)
        }
    }
}


fn read_values<S>(
    input: &mut ByteOrdered<S, Endianness>,
    datatype: i16,
    count: usize,
) -> Result<Vec<f32>>
where
    S: Read,
{
    let mut values: Vec<f32> = Vec::with_capacity(count.min(MAX_PREALLOCATED));
    for _ in 0..count {
        let v = match datatype {
            DT_UINT8 => input.read_u8()? as f32,
            DT_INT8 => input.read_i8()? as f32,
            DT_INT16 => input.read_i16()? as f32,
            DT_UINT16 => input.read_u16()? as f32,
            DT_INT32 => input.read_i32()? as f32,
            DT_UINT32 => input.read_u32()? as f32,
            DT_FLOAT32 => input.read_f32()?,
            DT_FLOAT64 => input.read_f64()? as f32,
            other => {
                let msg = format!("unsupported datatype code {}", other);
                return Err(VolsurfError::InvalidNifti(msg));
            }
        };
        values.push(v);
    }
    Ok(values)
}


/// Read a volume from a NIfTI-1 file, tagging it with the atlas space it is declared to be in.
///
/// No space detection is performed: the caller states which space the file is in.
pub fn read_nifti<P: AsRef<Path>>(path: P, space: AtlasSpace) -> Result<ScalarVolume> {
    let mut input = open_input(path)?;
    let hdr = NiftiHeader::from_reader(&mut input)?;
    let (nx, ny, nz) = hdr.volume_dims()?;

    let vox_offset = hdr.vox_offset.max(NIFTI1_HEADER_SIZE as f32) as u64;
    skip_bytes(&mut input, vox_offset - NIFTI1_HEADER_SIZE as u64)?;

    let mut input = ByteOrdered::runtime(input, hdr.endianness);
    let mut values = read_values(&mut input, hdr.datatype, nx * ny * nz)?;

    let identity_scaling = hdr.scl_slope == 1.0 && hdr.scl_inter == 0.0;
    if hdr.scl_slope != 0.0 && hdr.scl_slope.is_finite() && !identity_scaling {
        for v in values.iter_mut() {
            *v = *v * hdr.scl_slope + hdr.scl_inter;
        }
    }

    let data = Array3::from_shape_vec((nx, ny, nz).f(), values)
        .map_err(|e| VolsurfError::InvalidNifti(e.to_string()))?;
    Ok(ScalarVolume::new(data, hdr.affine(), space))
}


/// Read a binary mask from a NIfTI-1 file. Non-zero voxels are inside the mask.
pub fn read_nifti_mask<P: AsRef<Path>>(path: P) -> Result<VolumeMask> {
    let vol = read_nifti(path, AtlasSpace::default())?;
    Ok(VolumeMask::from_volume(&vol))
}


/// Encode a volume as little-endian float32 single-file NIfTI-1 bytes, with the affine stored as
/// sform.
pub fn encode_nifti(vol: &ScalarVolume) -> Result<Vec<u8>> {
    let (nx, ny, nz) = vol.data.dim();
    let mut out = ByteOrdered::le(Vec::with_capacity(352 + nx * ny * nz * 4));

    out.write_i32(NIFTI1_HEADER_SIZE)?;
    out.write_all(&[0u8; 36])?;
    let dim: [i16; 8] = [3, nx as i16, ny as i16, nz as i16, 1, 1, 1, 1];
    for d in dim.iter() {
        out.write_i16(*d)?;
    }
    out.write_all(&[0u8; 14])?; // intent_p1..3, intent_code
    out.write_i16(DT_FLOAT32)?;
    out.write_i16(32)?;
    out.write_i16(0)?;
    let m = &vol.affine.m;
    let voxel_size = |c: usize| m.fixed_view::<3, 1>(0, c).norm() as f32;
    let pixdim: [f32; 8] = [1.0, voxel_size(0), voxel_size(1), voxel_size(2), 1.0, 1.0, 1.0, 1.0];
    for p in pixdim.iter() {
        out.write_f32(*p)?;
    }
    out.write_f32(352.0)?;
    out.write_f32(1.0)?;
    out.write_f32(0.0)?;
    out.write_all(&[0u8; 28])?;
    let mut descrip = [0u8; 80];
    let text = format!("volsurf {}", vol.space);
    descrip[..text.len().min(79)].copy_from_slice(&text.as_bytes()[..text.len().min(79)]);
    out.write_all(&descrip)?;
    out.write_all(&[0u8; 24])?;
    out.write_i16(0)?; // qform_code
    out.write_i16(4)?; // sform_code: NIFTI_XFORM_MNI_152
    out.write_all(&[0u8; 24])?; // quatern, qoffset
    for r in 0..3 {
        for c in 0..4 {
            out.write_f32(m[(r, c)] as f32)?;
        }
    }
    out.write_all(&[0u8; 16])?;
    out.write_all(b"n+1\0")?;
    out.write_all(&[0u8; 4])?; // no extensions

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                out.write_f32(vol.data[[i, j, k]])?;
            }
        }
    }
    Ok(out.into_inner())
}


/// Write a volume to a NIfTI-1 file. If the file's name ends with ".gz", the output is GZip
/// compressed.
pub fn write_nifti<P: AsRef<Path>>(path: P, vol: &ScalarVolume) -> Result<()> {
    let raw = encode_nifti(vol)?;
    let bytes = if is_gz_file(&path) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        encoder.finish()?
    } else {
        raw
    };
    write_atomically(path, &bytes)
}

//! Functions for reading and writing GIFTI files, the XML format for surface geometry and
//! per-vertex data.
//!
//! A GIFTI file holds a list of data arrays. Each array carries an intent code telling consumers
//! what kind of data it is: mesh coordinates (`NIFTI_INTENT_POINTSET`), faces
//! (`NIFTI_INTENT_TRIANGLE`), a time series (`NIFTI_INTENT_TIME_SERIES`), or a single
//! morphometry-like value per vertex (`NIFTI_INTENT_SHAPE`). Viewers like Freeview use the intent
//! to decide how to display an overlay, so it must be right.
//!
//! Supported encodings are `ASCII`, `Base64Binary` and `GZipBase64Binary`. External data files are
//! not supported.

use base64::{engine::general_purpose, Engine as _};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Result, VolsurfError};
use crate::mesh::BrainMesh;
use crate::util::{open_input, write_atomically};

pub const GIFTI_DOCTYPE: &str =
    "GIFTI SYSTEM \"http://www.nitrc.org/frs/download.php/115/gifti.dtd\"";


/// The NIfTI intent code of a data array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    None,
    Shape,
    TimeSeries,
    PointSet,
    Triangle,
    Other(String),
}

impl Intent {
    pub fn from_name(name: &str) -> Intent {
        match name.trim() {
            "NIFTI_INTENT_NONE" | "" => Intent::None,
            "NIFTI_INTENT_SHAPE" => Intent::Shape,
            "NIFTI_INTENT_TIME_SERIES" => Intent::TimeSeries,
            "NIFTI_INTENT_POINTSET" => Intent::PointSet,
            "NIFTI_INTENT_TRIANGLE" => Intent::Triangle,
            other => Intent::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Intent::None => "NIFTI_INTENT_NONE",
            Intent::Shape => "NIFTI_INTENT_SHAPE",
            Intent::TimeSeries => "NIFTI_INTENT_TIME_SERIES",
            Intent::PointSet => "NIFTI_INTENT_POINTSET",
            Intent::Triangle => "NIFTI_INTENT_TRIANGLE",
            Intent::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}


/// How the values of a data array are stored inside the `<Data>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Base64Binary,
    GZipBase64Binary,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Ascii => "ASCII",
            Encoding::Base64Binary => "Base64Binary",
            Encoding::GZipBase64Binary => "GZipBase64Binary",
        }
    }

    fn from_name(name: &str) -> Result<Encoding> {
        match name {
            "ASCII" => Ok(Encoding::Ascii),
            "Base64Binary" => Ok(Encoding::Base64Binary),
            "GZipBase64Binary" => Ok(Encoding::GZipBase64Binary),
            other => Err(VolsurfError::InvalidGifti(format!("unsupported encoding '{}'", other))),
        }
    }
}

impl Default for Encoding {
    fn default() -> Encoding {
        Encoding::GZipBase64Binary
    }
}


/// The values of a data array. Integer types are widened to `i32`, float types are stored as `f32`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Float32(Vec<f32>),
    Int32(Vec<i32>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Float32(v) => v.len(),
            ArrayData::Int32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The values as `f32`, casting integers.
    pub fn to_f32(&self) -> Vec<f32> {
        match self {
            ArrayData::Float32(v) => v.clone(),
            ArrayData::Int32(v) => v.iter().map(|&x| x as f32).collect(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ArrayData::Float32(_) => "NIFTI_TYPE_FLOAT32",
            ArrayData::Int32(_) => "NIFTI_TYPE_INT32",
        }
    }
}


/// Ordered name/value pairs of a `<MetaData>` element.
pub type MetaData = Vec<(String, String)>;


/// A single GIFTI data array. Values are always kept in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    pub intent: Intent,
    pub dims: Vec<usize>,
    pub data: ArrayData,
    pub metadata: MetaData,
}

impl DataArray {
    /// A one-dimensional float array, one value per vertex.
    pub fn from_values(values: Vec<f32>, intent: Intent) -> DataArray {
        DataArray {
            intent,
            dims: vec![values.len()],
            data: ArrayData::Float32(values),
            metadata: Vec::new(),
        }
    }

    pub fn meta(&self, name: &str) -> Option<&str> {
        self.metadata.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }
}


/// A GIFTI file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GiftiImage {
    pub metadata: MetaData,
    pub arrays: Vec<DataArray>,
}


/// Read a GIFTI file. If the file's name ends with ".gz", the file is assumed to need GZip
/// decoding.
pub fn read_gifti<P: AsRef<Path>>(path: P) -> Result<GiftiImage> {
    let mut input = open_input(path)?;
    GiftiImage::from_reader(&mut input)
}


/// Write a GIFTI file, encoding every data array with `encoding`.
pub fn write_gifti<P: AsRef<Path>>(path: P, img: &GiftiImage, encoding: Encoding) -> Result<()> {
    let bytes = img.to_bytes(encoding)?;
    write_atomically(path, &bytes)
}


/// Read a triangle mesh from a GIFTI surface file containing a POINTSET and a TRIANGLE array.
pub fn read_gifti_mesh<P: AsRef<Path>>(path: P) -> Result<BrainMesh> {
    let img = read_gifti(path)?;
    img.to_mesh()
}


#[derive(Debug, Default)]
struct PendingArray {
    intent: String,
    datatype: String,
    encoding: String,
    endian: String,
    column_major: bool,
    dims: Vec<usize>,
    metadata: MetaData,
    text: String,
}

fn attribute_map(e: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn pending_from_attributes(attrs: &[(String, String)]) -> Result<PendingArray> {
    let mut pending = PendingArray::default();
    let mut dimensionality: usize = 0;
    let mut dims = [0usize; 6];
    for (key, value) in attrs.iter() {
        match key.as_str() {
            "Intent" => pending.intent = value.clone(),
            "DataType" => pending.datatype = value.clone(),
            "Encoding" => pending.encoding = value.clone(),
            "Endian" => pending.endian = value.clone(),
            "ArrayIndexingOrder" => pending.column_major = value == "ColumnMajorOrder",
            "Dimensionality" => {
                dimensionality = value.trim().parse().map_err(|_| {
                    VolsurfError::InvalidGifti(format!("invalid Dimensionality '{}'", value))
                })?
            }
            k if k.starts_with("Dim") => {
                let idx: usize = k[3..]
                    .parse()
                    .map_err(|_| VolsurfError::InvalidGifti(format!("invalid attribute '{}'", k)))?;
                if idx < dims.len() {
                    dims[idx] = value.trim().parse().map_err(|_| {
                        VolsurfError::InvalidGifti(format!("invalid {} '{}'", k, value))
                    })?;
                }
            }
            _ => {}
        }
    }
    if dimensionality == 0 || dimensionality > dims.len() {
        let msg = format!("unsupported Dimensionality {}", dimensionality);
        return Err(VolsurfError::InvalidGifti(msg));
    }
    pending.dims = dims[..dimensionality].to_vec();
    Ok(pending)
}

fn decode_binary(raw: &[u8], datatype: &str, big_endian: bool, count: usize) -> Result<ArrayData> {
    let width = match datatype {
        "NIFTI_TYPE_UINT8" => 1,
        "NIFTI_TYPE_INT32" | "NIFTI_TYPE_FLOAT32" => 4,
        "NIFTI_TYPE_FLOAT64" => 8,
        other => {
            return Err(VolsurfError::InvalidGifti(format!("unsupported DataType '{}'", other)))
        }
    };
    if raw.len() != count * width {
        return Err(VolsurfError::InvalidGifti(format!(
            "expected {} bytes of data, found {}",
            count * width,
            raw.len()
        )));
    }
    let word = |chunk: &[u8]| -> [u8; 8] {
        let mut b = [0u8; 8];
        b[..chunk.len()].copy_from_slice(chunk);
        if big_endian {
            b[..chunk.len()].reverse();
        }
        b
    };
    let data = match datatype {
        "NIFTI_TYPE_UINT8" => ArrayData::Int32(raw.iter().map(|&b| b as i32).collect()),
        "NIFTI_TYPE_INT32" => ArrayData::Int32(raw.chunks_exact(4).map(|c| {
            let b = word(c);
            i32::from_le_bytes([b[0], b[1], b[2], b[3]])
        }).collect()),
        "NIFTI_TYPE_FLOAT32" => ArrayData::Float32(raw.chunks_exact(4).map(|c| {
            let b = word(c);
            f32::from_le_bytes([b[0], b[1], b[2], b[3]])
        }).collect()),
        _ => ArrayData::Float32(
            raw.chunks_exact(8).map(|c| f64::from_le_bytes(word(c)) as f32).collect(),
        ),
    };
    Ok(data)
}

fn decode_ascii(text: &str, datatype: &str, count: usize) -> Result<ArrayData> {
    let tokens = text.split_whitespace();
    let data = match datatype {
        "NIFTI_TYPE_UINT8" | "NIFTI_TYPE_INT32" => ArrayData::Int32(
            tokens
                .map(|t| {
                    t.parse::<i32>()
                        .map_err(|_| VolsurfError::InvalidGifti(format!("invalid integer '{}'", t)))
                })
                .collect::<Result<Vec<i32>>>()?,
        ),
        "NIFTI_TYPE_FLOAT32" | "NIFTI_TYPE_FLOAT64" => ArrayData::Float32(
            tokens
                .map(|t| {
                    t.parse::<f32>()
                        .map_err(|_| VolsurfError::InvalidGifti(format!("invalid float '{}'", t)))
                })
                .collect::<Result<Vec<f32>>>()?,
        ),
        other => {
            return Err(VolsurfError::InvalidGifti(format!("unsupported DataType '{}'", other)))
        }
    };
    if data.len() != count {
        let msg = format!("expected {} values, found {}", count, data.len());
        return Err(VolsurfError::InvalidGifti(msg));
    }
    Ok(data)
}

/// Reorder column-major 2D data to row-major.
fn to_row_major<T: Copy>(values: &[T], rows: usize, cols: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len());
    for r in 0..rows {
        for c in 0..cols {
            out.push(values[c * rows + r]);
        }
    }
    out
}

impl PendingArray {
    fn finish(self) -> Result<DataArray> {
        let count: usize = self.dims.iter().product();
        let data = match Encoding::from_name(&self.encoding)? {
            Encoding::Ascii => decode_ascii(&self.text, &self.datatype, count)?,
            encoding => {
                let compact: String = self.text.split_whitespace().collect();
                let mut raw = general_purpose::STANDARD.decode(compact.as_bytes())?;
                if encoding == Encoding::GZipBase64Binary {
                    let mut inflated = Vec::new();
                    ZlibDecoder::new(&raw[..]).read_to_end(&mut inflated)?;
                    raw = inflated;
                }
                decode_binary(&raw, &self.datatype, self.endian == "BigEndian", count)?
            }
        };
        let data = if self.column_major && self.dims.len() == 2 && self.dims[1] > 1 {
            let (rows, cols) = (self.dims[0], self.dims[1]);
            match data {
                ArrayData::Float32(v) => ArrayData::Float32(to_row_major(&v, rows, cols)),
                ArrayData::Int32(v) => ArrayData::Int32(to_row_major(&v, rows, cols)),
            }
        } else {
            data
        };
        Ok(DataArray {
            intent: Intent::from_name(&self.intent),
            dims: self.dims,
            data,
            metadata: self.metadata,
        })
    }
}


impl GiftiImage {

    /// A GIFTI image holding a single per-vertex array.
    pub fn from_values(values: Vec<f32>, intent: Intent) -> GiftiImage {
        GiftiImage { metadata: Vec::new(), arrays: vec![DataArray::from_values(values, intent)] }
    }

    /// A GIFTI surface holding the mesh as POINTSET and TRIANGLE arrays.
    pub fn from_mesh(mesh: &BrainMesh) -> GiftiImage {
        let points = DataArray {
            intent: Intent::PointSet,
            dims: vec![mesh.num_vertices(), 3],
            data: ArrayData::Float32(mesh.vertices.clone()),
            metadata: Vec::new(),
        };
        let tris = DataArray {
            intent: Intent::Triangle,
            dims: vec![mesh.num_faces(), 3],
            data: ArrayData::Int32(mesh.faces.clone()),
            metadata: Vec::new(),
        };
        GiftiImage { metadata: Vec::new(), arrays: vec![points, tris] }
    }

    pub fn meta(&self, name: &str) -> Option<&str> {
        self.metadata.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// The first array with the given intent.
    pub fn array_with_intent(&self, intent: &Intent) -> Option<&DataArray> {
        self.arrays.iter().find(|a| &a.intent == intent)
    }

    /// Extract the mesh from the POINTSET and TRIANGLE arrays.
    pub fn to_mesh(&self) -> Result<BrainMesh> {
        let missing = |intent: &str| {
            VolsurfError::InvalidGifti(format!("no {} array, not a surface file", intent))
        };
        let points = self
            .array_with_intent(&Intent::PointSet)
            .ok_or_else(|| missing("NIFTI_INTENT_POINTSET"))?;
        let tris = self
            .array_with_intent(&Intent::Triangle)
            .ok_or_else(|| missing("NIFTI_INTENT_TRIANGLE"))?;
        let faces = match &tris.data {
            ArrayData::Int32(v) => v.clone(),
            ArrayData::Float32(_) => {
                let msg = String::from("TRIANGLE array must have an integer type");
                return Err(VolsurfError::InvalidGifti(msg));
            }
        };
        BrainMesh::new(points.data.to_f32(), faces)
    }

    /// Parse a GIFTI document from a byte stream.
    pub fn from_reader<S>(input: &mut S) -> Result<GiftiImage>
    where
        S: Read,
    {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        GiftiImage::from_xml(&text)
    }

    /// Parse a GIFTI document.
    pub fn from_xml(xml: &str) -> Result<GiftiImage> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut img = GiftiImage::default();
        let mut seen_root = false;
        let mut path: Vec<String> = Vec::new();
        let mut pending: Option<PendingArray> = None;
        let mut md_name = String::new();
        let mut md_value = String::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    match name.as_str() {
                        "GIFTI" => seen_root = true,
                        "DataArray" => {
                            pending = Some(pending_from_attributes(&attribute_map(&e)?)?)
                        }
                        "MD" => {
                            md_name.clear();
                            md_value.clear();
                        }
                        _ => {}
                    }
                    path.push(name);
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    match name.as_str() {
                        "GIFTI" => seen_root = true,
                        "DataArray" => {
                            let p = pending_from_attributes(&attribute_map(&e)?)?;
                            img.arrays.push(p.finish()?);
                        }
                        _ => {}
                    }
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    path.pop();
                    match name.as_str() {
                        "MD" => {
                            let entry = (md_name.trim().to_string(), md_value.trim().to_string());
                            match pending.as_mut() {
                                Some(p) if path.iter().any(|n| n == "DataArray") => {
                                    p.metadata.push(entry)
                                }
                                _ => img.metadata.push(entry),
                            }
                        }
                        "DataArray" => {
                            let p = pending.take().ok_or_else(|| {
                                VolsurfError::InvalidGifti(String::from("unbalanced DataArray"))
                            })?;
                            img.arrays.push(p.finish()?);
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    push_text(&path, &mut pending, &mut md_name, &mut md_value, &text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).to_string();
                    push_text(&path, &mut pending, &mut md_name, &mut md_value, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(VolsurfError::InvalidGifti(String::from("no <GIFTI> root element")));
        }
        Ok(img)
    }

    /// Serialize to a GIFTI XML document.
    pub fn to_bytes(&self, encoding: Encoding) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::DocType(BytesText::from_escaped(GIFTI_DOCTYPE)))?;

        let num_arrays = self.arrays.len().to_string();
        writer.write_event(Event::Start(BytesStart::new("GIFTI").with_attributes(vec![
            ("Version", "1.0"),
            ("NumberOfDataArrays", num_arrays.as_str()),
        ])))?;
        write_metadata(&mut writer, &self.metadata)?;
        writer.write_event(Event::Empty(BytesStart::new("LabelTable")))?;

        for array in self.arrays.iter() {
            write_array(&mut writer, array, encoding)?;
        }

        writer.write_event(Event::End(BytesEnd::new("GIFTI")))?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn push_text(
    path: &[String],
    pending: &mut Option<PendingArray>,
    md_name: &mut String,
    md_value: &mut String,
    text: &str,
) {
    match path.last().map(|s| s.as_str()) {
        Some("Data") => {
            if let Some(p) = pending.as_mut() {
                p.text.push_str(text);
            }
        }
        Some("Name") => md_name.push_str(text),
        Some("Value") => md_value.push_str(text),
        _ => {}
    }
}

fn write_metadata<W: Write>(writer: &mut Writer<W>, metadata: &MetaData) -> Result<()> {
    if metadata.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("MetaData")))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("MetaData")))?;
    for (name, value) in metadata.iter() {
        writer.write_event(Event::Start(BytesStart::new("MD")))?;
        writer.write_event(Event::Start(BytesStart::new("Name")))?;
        writer.write_event(Event::CData(BytesCData::new(name.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new("Name")))?;
        writer.write_event(Event::Start(BytesStart::new("Value")))?;
        writer.write_event(Event::CData(BytesCData::new(value.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new("Value")))?;
        writer.write_event(Event::End(BytesEnd::new("MD")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("MetaData")))?;
    Ok(())
}

fn encode_data(data: &ArrayData, encoding: Encoding) -> Result<String> {
    if encoding == Encoding::Ascii {
        let tokens: Vec<String> = match data {
            ArrayData::Float32(v) => v.iter().map(|x| x.to_string()).collect(),
            ArrayData::Int32(v) => v.iter().map(|x| x.to_string()).collect(),
        };
        return Ok(tokens.join(" "));
    }
    let mut raw: Vec<u8> = Vec::with_capacity(data.len() * 4);
    match data {
        ArrayData::Float32(v) => v.iter().for_each(|x| raw.extend_from_slice(&x.to_le_bytes())),
        ArrayData::Int32(v) => v.iter().for_each(|x| raw.extend_from_slice(&x.to_le_bytes())),
    }
    if encoding == Encoding::GZipBase64Binary {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        raw = encoder.finish()?;
    }
    Ok(general_purpose::STANDARD.encode(&raw))
}

fn write_array<W: Write>(
    writer: &mut Writer<W>,
    array: &DataArray,
    encoding: Encoding,
) -> Result<()> {
    let dim_values: Vec<String> = array.dims.iter().map(|d| d.to_string()).collect();
    let dim_keys: Vec<String> = (0..array.dims.len()).map(|i| format!("Dim{}", i)).collect();
    let dimensionality = array.dims.len().to_string();

    let mut attrs: Vec<(&str, &str)> = vec![
        ("Intent", array.intent.name()),
        ("DataType", array.data.type_name()),
        ("ArrayIndexingOrder", "RowMajorOrder"),
        ("Dimensionality", dimensionality.as_str()),
    ];
    for (k, v) in dim_keys.iter().zip(dim_values.iter()) {
        attrs.push((k.as_str(), v.as_str()));
    }
    attrs.push(("Encoding", encoding.name()));
    attrs.push(("Endian", "LittleEndian"));
    attrs.push(("ExternalFileName", ""));
    attrs.push(("ExternalFileOffset", ""));

    writer.write_event(Event::Start(BytesStart::new("DataArray").with_attributes(attrs)))?;
    write_metadata(writer, &array.metadata)?;

    if array.intent == Intent::PointSet {
        writer.write_event(Event::Start(BytesStart::new("CoordinateSystemTransformMatrix")))?;
        for tag in ["DataSpace", "TransformedSpace"].iter() {
            writer.write_event(Event::Start(BytesStart::new(*tag)))?;
            writer.write_event(Event::CData(BytesCData::new("NIFTI_XFORM_TALAIRACH")))?;
            writer.write_event(Event::End(BytesEnd::new(*tag)))?;
        }
        writer.write_event(Event::Start(BytesStart::new("MatrixData")))?;
        writer.write_event(Event::Text(BytesText::new("1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1")))?;
        writer.write_event(Event::End(BytesEnd::new("MatrixData")))?;
        writer.write_event(Event::End(BytesEnd::new("CoordinateSystemTransformMatrix")))?;
    }

    let payload = encode_data(&array.data, encoding)?;
    writer.write_event(Event::Start(BytesStart::new("Data")))?;
    writer.write_event(Event::Text(BytesText::new(&payload)))?;
    writer.write_event(Event::End(BytesEnd::new("Data")))?;
    writer.write_event(Event::End(BytesEnd::new("DataArray")))?;
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;

    const ASCII_FUNC_FILE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE GIFTI SYSTEM "http://www.nitrc.org/frs/download.php/115/gifti.dtd">
<GIFTI Version="1.0"  NumberOfDataArrays="1">
   <MetaData>
      <MD>
         <Name><![CDATA[AnatomicalStructurePrimary]]></Name>
         <Value><![CDATA[CortexLeft]]></Value>
      </MD>
   </MetaData>
   <LabelTable/>
   <DataArray Intent="NIFTI_INTENT_TIME_SERIES"
              DataType="NIFTI_TYPE_FLOAT32"
              ArrayIndexingOrder="RowMajorOrder"
              Dimensionality="1"
              Dim0="4"
              Encoding="ASCII"
              Endian="LittleEndian"
              ExternalFileName=""
              ExternalFileOffset="">
      <MetaData/>
      <Data>0.5 1 -2.25
         3e2</Data>
   </DataArray>
</GIFTI>
"#;

    #[test]
    fn ascii_func_files_can_be_parsed() {
        let img = GiftiImage::from_xml(ASCII_FUNC_FILE).unwrap();
        assert_eq!(Some("CortexLeft"), img.meta("AnatomicalStructurePrimary"));
        assert_eq!(1, img.arrays.len());
        let arr = &img.arrays[0];
        assert_eq!(Intent::TimeSeries, arr.intent);
        assert_eq!(vec![4], arr.dims);
        assert_eq!(ArrayData::Float32(vec![0.5, 1.0, -2.25, 300.0]), arr.data);
    }

    #[test]
    fn every_encoding_preserves_values_exactly() {
        let values = vec![0.1f32, -7.5, f32::MAX, 1.0e-30, 0.0];
        let encodings = [Encoding::Ascii, Encoding::Base64Binary, Encoding::GZipBase64Binary];
        for encoding in encodings.iter() {
            let img = GiftiImage::from_values(values.clone(), Intent::Shape);
            let bytes = img.to_bytes(*encoding).unwrap();
            let back = GiftiImage::from_xml(std::str::from_utf8(&bytes).unwrap()).unwrap();
            assert_eq!(img, back, "encoding {:?}", encoding);
        }
    }

    #[test]
    fn meshes_survive_a_write_and_read() {
        let vertices = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = BrainMesh::new(vertices, vec![0, 1, 2]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lh.white.surf.gii");
        write_gifti(&path, &GiftiImage::from_mesh(&mesh), Encoding::GZipBase64Binary).unwrap();
        assert_eq!(mesh, read_gifti_mesh(&path).unwrap());
    }

    #[test]
    fn column_major_arrays_are_reordered() {
        let xml = r#"<GIFTI Version="1.0" NumberOfDataArrays="1">
<DataArray Intent="NIFTI_INTENT_TRIANGLE" DataType="NIFTI_TYPE_INT32"
 ArrayIndexingOrder="ColumnMajorOrder" Dimensionality="2" Dim0="2" Dim1="3"
 Encoding="ASCII" Endian="LittleEndian"><Data>0 3 1 4 2 5</Data></DataArray>
</GIFTI>"#;
        let img = GiftiImage::from_xml(xml).unwrap();
        assert_eq!(ArrayData::Int32(vec![0, 1, 2, 3, 4, 5]), img.arrays[0].data);
    }

    #[test]
    fn big_endian_binary_data_is_decoded() {
        let raw: Vec<u8> = [1.5f32, -2.0].iter().flat_map(|v| v.to_be_bytes().to_vec()).collect();
        let data = decode_binary(&raw, "NIFTI_TYPE_FLOAT32", true, 2).unwrap();
        assert_eq!(ArrayData::Float32(vec![1.5, -2.0]), data);
    }

    #[test]
    fn value_count_must_match_dimensions() {
        let xml = ASCII_FUNC_FILE.replace("Dim0=\"4\"", "Dim0=\"5\"");
        assert!(GiftiImage::from_xml(&xml).is_err());
    }

    #[test]
    fn a_surface_without_triangles_is_not_a_mesh() {
        let img = GiftiImage::from_values(vec![1.0, 2.0, 3.0], Intent::Shape);
        assert!(img.to_mesh().is_err());
    }

    #[test]
    fn non_gifti_documents_are_rejected() {
        assert!(GiftiImage::from_xml("<html></html>").is_err());
    }
}

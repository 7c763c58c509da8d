//! Utility functions used in all other volsurf modules.

use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::Path;

use byteordered::byteorder::ReadBytesExt;
use flate2::bufread::GzDecoder;
use tempfile::NamedTempFile;

use crate::error::{Result, VolsurfError};

/// Check whether the file extension ends with ".gz".
pub fn is_gz_file<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}


/// Open a file for buffered reading. If the file's name ends with ".gz", the stream is GZip decoded
/// on the fly.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn Read>> {
    let gz = is_gz_file(&path);
    let file = BufReader::new(File::open(path)?);
    if gz {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}


/// Read a fixed length zero-terminated byte string of the given length from the input. Embedded
/// '\0' chars are allowed, but not added to the returned String.
pub fn read_fixed_length_string<S>(input: &mut S, len: usize) -> Result<String>
where
    S: Read,
{
    let mut info_line = String::with_capacity(len);
    for _  in 0..len   {
        let cur_char = input.read_u8()? as char;
        if cur_char != '\0'  {
            info_line.push(cur_char);
        }
    }
    Ok(info_line)
}


/// Largest buffer pre-allocated from a count found in a file header. Bigger buffers grow while
/// reading.
pub const MAX_PREALLOCATED: usize = 1 << 22;

/// Number of scalars in `count` records of `width` values each, where `count` comes from a file
/// header.
pub fn header_len(count: i32, width: usize) -> Option<usize> {
    usize::try_from(count).ok()?.checked_mul(width)
}

/// Map a premature end of input to the format error `invalid`. Other I/O errors are kept.
pub fn truncation_as<F>(invalid: F) -> impl Fn(std::io::Error) -> VolsurfError
where
    F: Fn() -> VolsurfError,
{
    move |e: std::io::Error| {
        if e.kind() == ErrorKind::UnexpectedEof {
            invalid()
        } else {
            VolsurfError::Io(e)
        }
    }
}


/// Discard `len` bytes from the input. Used instead of seeking, because GZ streams cannot seek.
pub fn skip_bytes<S>(input: &mut S, len: u64) -> Result<()>
where
    S: Read,
{
    let copied = std::io::copy(&mut (&mut *input).take(len), &mut std::io::sink())?;
    if copied != len {
        let msg = "input ended while skipping bytes";
        return Err(std::io::Error::new(ErrorKind::UnexpectedEof, msg).into());
    }
    Ok(())
}


/// Write the given bytes to `path` so that the file either appears complete or not at all.
///
/// The bytes go to a temporary file in the target directory first, which is then renamed over
/// `path`. An existing file at `path` is replaced.
pub fn write_atomically<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}


/// Create the directory and all its parents. Succeeds if it already exists.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gz_files_are_detected_by_name() {
        assert!(is_gz_file("stat.nii.gz"));
        assert!(!is_gz_file("stat.nii"));
        assert!(!is_gz_file("/"));
    }

    #[test]
    fn fixed_length_strings_drop_zero_bytes() {
        let mut input: &[u8] = b"n+1\0rest";
        let s = read_fixed_length_string(&mut input, 4).unwrap();
        assert_eq!("n+1", s);
        assert_eq!(&b"rest"[..], input);
    }

    #[test]
    fn skipping_past_the_end_is_an_error() {
        let mut input: &[u8] = b"abc";
        assert!(skip_bytes(&mut input, 5).is_err());
    }

    #[test]
    fn atomic_writes_replace_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        write_atomically(&target, b"first").unwrap();
        write_atomically(&target, b"second").unwrap();
        assert_eq!(b"second".to_vec(), fs::read(&target).unwrap());
        assert_eq!(1, fs::read_dir(dir.path()).unwrap().count());
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}

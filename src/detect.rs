//! Input format detection.
//!
//! The pipeline accepts PDF input and consumes DOCX produced by the
//! converter; both are checked by magic bytes before any expensive work.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Formats the pipeline knows how to tell apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormat {
    /// PDF with its header version (e.g. "1.7")
    Pdf { version: String },
    /// Office Open XML package (DOCX is a zip container)
    Docx,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Pdf { version } => write!(f, "PDF {}", version),
            InputFormat::Docx => write!(f, "DOCX"),
        }
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const VERSION_LEN: usize = 3;

/// Detect the format of a file from its first bytes.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 16];
    let read = file.read(&mut header)?;
    detect_format_from_bytes(&header[..read])
}

/// Detect the format of a byte buffer.
///
/// # Returns
/// * `Ok(InputFormat)` for a PDF header or a zip local-file header
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    if data.starts_with(ZIP_MAGIC) {
        return Ok(InputFormat::Docx);
    }

    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat("PDF or DOCX"));
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnknownFormat("PDF with a 'major.minor' version header"));
    }

    Ok(InputFormat::Pdf { version })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Fail unless the file at `path` is a PDF.
pub fn ensure_pdf<P: AsRef<Path>>(path: P) -> Result<()> {
    match detect_format_from_path(path)? {
        InputFormat::Pdf { .. } => Ok(()),
        InputFormat::Docx => Err(Error::UnknownFormat("PDF")),
    }
}

/// Check if a file is a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(InputFormat::Pdf { .. }))
}

/// Check if a file looks like a DOCX (zip) package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(InputFormat::Docx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        let format = detect_format_from_bytes(data).unwrap();
        assert_eq!(
            format,
            InputFormat::Pdf {
                version: "1.7".into()
            }
        );
        assert_eq!(format.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_zip_container() {
        let data = b"PK\x03\x04\x14\x00\x06\x00";
        assert_eq!(detect_format_from_bytes(data).unwrap(), InputFormat::Docx);
    }

    #[test]
    fn test_detect_unknown() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat(_))
        ));
        assert!(matches!(
            detect_format_from_bytes(b"%PDF"),
            Err(Error::UnknownFormat(_))
        ));
        assert!(detect_format_from_bytes(b"%PDF-x.y").is_err());
    }

    #[test]
    fn test_version_validation() {
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("2.0"));
        assert!(!is_valid_version("10.0"));
        assert!(!is_valid_version("abc"));
    }
}

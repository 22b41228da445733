//! `pdf2docx` command-line backend.

use super::{ConvertOptions, DocxConverter};
use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

const DEFAULT_PROGRAM: &str = "pdf2docx";

/// Converts PDFs by running the `pdf2docx` command line tool.
#[derive(Debug, Clone)]
pub struct Pdf2DocxCommand {
    program: OsString,
}

impl Pdf2DocxCommand {
    /// Use `pdf2docx` from `PATH`.
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Use a specific executable.
    pub fn with_program(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
        }
    }

    /// The executable this backend runs.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    fn arguments(pdf: &Path, docx: &Path, options: &ConvertOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "convert".into(),
            pdf.as_os_str().to_os_string(),
            docx.as_os_str().to_os_string(),
            format!("--start={}", options.start_page).into(),
        ];
        if let Some(end) = options.end_page {
            args.push(format!("--end={}", end).into());
        }
        args
    }
}

impl Default for Pdf2DocxCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxConverter for Pdf2DocxCommand {
    fn name(&self) -> &str {
        "pdf2docx"
    }

    fn convert(&self, pdf: &Path, docx: &Path, options: &ConvertOptions) -> Result<PathBuf> {
        log::debug!(
            "Running {} on {}",
            self.program.to_string_lossy(),
            pdf.display()
        );

        let output = Command::new(&self.program)
            .args(Self::arguments(pdf, docx, options))
            .output()
            .map_err(|e| {
                Error::Conversion(format!(
                    "failed to start {}: {}",
                    self.program.to_string_lossy(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Conversion(format!(
                "{} exited with {}: {}",
                self.program.to_string_lossy(),
                output.status,
                stderr.trim()
            )));
        }

        if !docx.is_file() {
            return Err(Error::Conversion(format!(
                "{} reported success but wrote no file at {}",
                self.program.to_string_lossy(),
                docx.display()
            )));
        }

        Ok(docx.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments() {
        let args = Pdf2DocxCommand::arguments(
            Path::new("in.pdf"),
            Path::new("out.docx"),
            &ConvertOptions::new().with_start_page(2).with_end_page(5),
        );
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["convert", "in.pdf", "out.docx", "--start=2", "--end=5"]);
    }

    #[test]
    fn test_missing_program_is_conversion_error() {
        let converter = Pdf2DocxCommand::with_program("pdfrag-no-such-binary");
        let result = converter.convert(
            Path::new("in.pdf"),
            Path::new("out.docx"),
            &ConvertOptions::default(),
        );
        assert!(matches!(result, Err(Error::Conversion(_))));
    }
}

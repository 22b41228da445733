//! Error types for the pdfrag library.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pdfrag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while running the ingestion pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file is not in the expected format.
    #[error("Unknown file format: expected {0}")]
    UnknownFormat(&'static str),

    /// The DOCX package is missing a required part or is structurally invalid.
    #[error("Invalid DOCX: {0}")]
    InvalidDocx(String),

    /// XML inside the DOCX package could not be parsed.
    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The DOCX zip container could not be read.
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// PDF to DOCX conversion failed. Fatal for a pipeline run.
    #[error("PDF to DOCX conversion failed: {0}")]
    Conversion(String),

    /// The external document parser failed or returned nothing usable.
    #[error("External parser error: {0}")]
    ExternalParse(String),

    /// HTTP transport error talking to an external service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An external call did not finish in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// A table could not be turned into key-value records.
    #[error("Malformed table #{index}: {reason}")]
    MalformedTable {
        /// Zero-based table index in document order
        index: usize,
        /// What was wrong with it
        reason: String,
    },

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A worker task panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Task(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Task(err.to_string())
    }
}

impl Error {
    /// Whether this error must abort a pipeline run.
    ///
    /// External-parser failures, timeouts and malformed tables are degraded
    /// in place and never abort a run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::ExternalParse(_)
                | Error::Http(_)
                | Error::Timeout(_)
                | Error::MalformedTable { .. }
        )
    }
}

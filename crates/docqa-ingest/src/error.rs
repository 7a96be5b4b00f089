use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("Partition request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Partition API error ({status}): {message}")]
    Partition { status: u16, message: String },

    #[error("Failed to parse partition response: {0}")]
    Deserialization(String),
}

impl From<zip::result::ZipError> for IngestError {
    fn from(e: zip::result::ZipError) -> Self {
        IngestError::Docx(e.to_string())
    }
}

impl From<quick_xml::Error> for IngestError {
    fn from(e: quick_xml::Error) -> Self {
        IngestError::Docx(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

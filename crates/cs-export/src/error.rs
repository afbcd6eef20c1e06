//! Error types for cs-export

use std::path::PathBuf;
use thiserror::Error;

/// JSON projection errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// X001: Output directory could not be created
    #[error("[X001] Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// X002: Document could not be written
    #[error("[X002] Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// X003: Document could not be serialized
    #[error("[X003] Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type alias for ExportError
pub type ExportResult<T> = Result<T, ExportError>;

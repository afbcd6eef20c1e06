//! Error types for cs-core

use thiserror::Error;

/// Core error type for the Clery pipeline
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: No usable source records arrived
    #[error("[E003] No usable source records: {context}")]
    NoSourceData { context: String },

    /// E004: The same institution-year was supplied by both enrollment sources
    #[error("[E004] Enrollment overlap for unitid {unitid} in {year}: {sources}")]
    EnrollmentOverlap {
        unitid: i32,
        year: i16,
        sources: String,
    },

    /// E005: A raw file name did not follow the geography/category/years layout
    #[error("[E005] Unrecognized raw file name: {name}")]
    UnrecognizedFile { name: String },

    /// E006: A required column was missing from a decoded source
    #[error("[E006] Source '{source_name}' is missing required column(s): {columns}")]
    MissingColumn {
        source_name: String,
        columns: String,
    },

    /// E007: A value fell outside its domain
    #[error("[E007] Invalid {field} value: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// E008: IO error with file path context
    #[error("[E008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E009: IO error
    #[error("[E009] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E010: YAML parse error
    #[error("[E010] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

//! Error types for cs-audit

use std::path::PathBuf;
use thiserror::Error;

/// Audit errors. Check failures are reported in the audit report, not here.
#[derive(Error, Debug)]
pub enum AuditError {
    /// A001: Report could not be written
    #[error("[A001] Failed to write audit report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A002: Report could not be serialized
    #[error("[A002] Failed to serialize audit report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for AuditError
pub type AuditResult<T> = Result<T, AuditError>;

//! Error types for cs-engine

use cs_core::CoreError;
use thiserror::Error;

/// Aggregation errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// G001: Nothing to aggregate
    #[error("[G001] Fact table is empty; nothing to aggregate")]
    NoFacts,

    /// G002: Domain error
    #[error("[G002] {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;

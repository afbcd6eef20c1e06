//! CLI command implementations

pub(crate) mod aggregate;
pub(crate) mod audit;
pub(crate) mod build;
pub(crate) mod clean;
pub(crate) mod common;
pub(crate) mod dimensions;
pub(crate) mod enrollment;
pub(crate) mod generate;
pub(crate) mod transform;

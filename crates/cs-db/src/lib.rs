//! cs-db - Staging store for the Clery pipeline
//!
//! This crate provides the `Database` trait, its DuckDB implementation
//! (which also decodes CSV exports into generic records), and typed
//! read/write functions for every staged table.

pub mod duckdb;
pub mod error;
pub mod tables;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Column, Database, TableSpec};

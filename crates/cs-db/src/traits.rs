//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use cs_core::{Cell, TabularRecord};
use std::path::Path;

/// Column of a staged table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
}

/// Shape of a staged table and the command that produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// `ORDER BY` clause used when reading the table back.
    pub order_by: &'static str,
    /// Subcommand that writes this table.
    pub produced_by: &'static str,
}

/// Staging store abstraction.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Run a query and return every row as a generic record
    async fn query_records(&self, sql: &str) -> DbResult<Vec<TabularRecord>>;

    /// Decode a CSV file into generic records without staging it
    async fn read_csv(&self, path: &Path) -> DbResult<Vec<TabularRecord>>;

    /// Replace `spec.name` with `rows`, each ordered like `spec.columns`.
    /// Returns the number of rows written.
    async fn replace_table(&self, spec: &TableSpec, rows: Vec<Vec<Cell>>) -> DbResult<usize>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

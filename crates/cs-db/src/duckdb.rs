//! DuckDB staging backend

use crate::error::{DbError, DbResult};
use crate::traits::{Database, TableSpec};
use async_trait::async_trait;
use cs_core::{Cell, TabularRecord};
use duckdb::types::{Value, ValueRef};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path, creating parent directories
    pub fn from_path(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::ConnectionError(format!("{}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;

        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
                [schema, table],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        Ok(count > 0)
    }

    fn query_records_sync(&self, sql: &str) -> DbResult<Vec<TabularRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;

        // column_count() is only valid after execution, so collect cells first.
        let raw_rows: Vec<Vec<Cell>> = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count).map(|i| read_cell(row, i)).collect())
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let names: Vec<String> = (0..stmt.column_count())
            .map(|i| stmt.column_name(i).map_or("?".to_string(), |v| v.to_string()))
            .collect();

        Ok(raw_rows
            .into_iter()
            .map(|cells| {
                let mut record = TabularRecord::new();
                for (name, cell) in names.iter().zip(cells) {
                    record.insert(name, cell);
                }
                record
            })
            .collect())
    }

    fn replace_table_sync(&self, spec: &TableSpec, rows: Vec<Vec<Cell>>) -> DbResult<usize> {
        let conn = self.lock()?;
        let load = format!("{}__load", spec.name);

        let load_columns: Vec<String> = spec
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, load_type(c.sql_type)))
            .collect();
        conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} ({})",
            load,
            load_columns.join(", ")
        ))?;

        let written = rows.len();
        {
            let mut appender = conn.appender(&load)?;
            for row in &rows {
                if row.len() != spec.columns.len() {
                    return Err(DbError::InvalidRow {
                        table: spec.name.to_string(),
                        message: format!(
                            "expected {} values, got {}",
                            spec.columns.len(),
                            row.len()
                        ),
                    });
                }
                appender.append_row(duckdb::appender_params_from_iter(row.iter().map(to_value)))?;
            }
            appender.flush()?;
        }

        let casts: Vec<String> = spec
            .columns
            .iter()
            .map(|c| format!("CAST({0} AS {1}) AS {0}", c.name, c.sql_type))
            .collect();
        conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} AS SELECT {} FROM {}; DROP TABLE {};",
            spec.name,
            casts.join(", "),
            load,
            load
        ))?;
        Ok(written)
    }
}

/// Widest type of the same kind, so appended values never need narrowing.
fn load_type(sql_type: &str) -> &'static str {
    match sql_type {
        "SMALLINT" | "INTEGER" | "BIGINT" => "BIGINT",
        "DOUBLE" => "DOUBLE",
        "BOOLEAN" => "BOOLEAN",
        _ => "VARCHAR",
    }
}

fn to_value(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Bool(b) => Value::Boolean(*b),
        Cell::Int(i) => Value::BigInt(*i),
        Cell::Float(f) => Value::Double(*f),
        Cell::Text(s) => Value::Text(s.clone()),
    }
}

fn read_cell(row: &duckdb::Row<'_>, idx: usize) -> Cell {
    match row.get_ref(idx) {
        Ok(ValueRef::Null) => Cell::Null,
        Ok(ValueRef::Boolean(b)) => Cell::Bool(b),
        Ok(ValueRef::TinyInt(v)) => Cell::Int(i64::from(v)),
        Ok(ValueRef::SmallInt(v)) => Cell::Int(i64::from(v)),
        Ok(ValueRef::Int(v)) => Cell::Int(i64::from(v)),
        Ok(ValueRef::BigInt(v)) => Cell::Int(v),
        Ok(ValueRef::UTinyInt(v)) => Cell::Int(i64::from(v)),
        Ok(ValueRef::USmallInt(v)) => Cell::Int(i64::from(v)),
        Ok(ValueRef::UInt(v)) => Cell::Int(i64::from(v)),
        Ok(ValueRef::UBigInt(v)) => i64::try_from(v)
            .map(Cell::Int)
            .unwrap_or(Cell::Float(v as f64)),
        Ok(ValueRef::HugeInt(v)) => i64::try_from(v)
            .map(Cell::Int)
            .unwrap_or(Cell::Float(v as f64)),
        Ok(ValueRef::Float(v)) => Cell::Float(f64::from(v)),
        Ok(ValueRef::Double(v)) => Cell::Float(v),
        Ok(ValueRef::Text(bytes)) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
        // Decimals, dates and nested types: let DuckDB render them.
        _ => {
            if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
                return Cell::Float(f);
            }
            match row.get::<_, Option<String>>(idx) {
                Ok(Some(s)) => Cell::Text(s),
                _ => Cell::Null,
            }
        }
    }
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn query_records(&self, sql: &str) -> DbResult<Vec<TabularRecord>> {
        self.query_records_sync(sql)
    }

    async fn read_csv(&self, path: &Path) -> DbResult<Vec<TabularRecord>> {
        let sql = format!(
            "SELECT * FROM read_csv_auto({}, header = true)",
            quote_literal(&path.display().to_string())
        );
        self.query_records_sync(&sql)
            .map_err(|e| DbError::CsvError(format!("{}: {}", path.display(), e)))
    }

    async fn replace_table(&self, spec: &TableSpec, rows: Vec<Vec<Cell>>) -> DbResult<usize> {
        self.replace_table_sync(spec, rows)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;

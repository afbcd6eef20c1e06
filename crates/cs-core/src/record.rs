//! Generic tabular records as produced by file decoding.
//!
//! Decoders hand over one [`TabularRecord`] per source row. Column names are
//! normalized to uppercase so lookups are case-insensitive, which matches the
//! mixed `City`/`CITY` spellings seen across Clery exports.

use std::collections::BTreeMap;

/// Candidate columns holding an extended institution id, highest priority first.
pub const UNITID_COLUMNS: &[&str] = &["UNITID_P", "UNITID"];
pub const NAME_COLUMNS: &[&str] = &["INSTNM"];
pub const CITY_COLUMNS: &[&str] = &["CITY"];
pub const STATE_COLUMNS: &[&str] = &["STATE", "STABBR"];
pub const ZIP_COLUMNS: &[&str] = &["ZIP"];
pub const SECTOR_COLUMNS: &[&str] = &["SECTOR_DESC"];

/// A single decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(f) => f.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Int(_) | Cell::Bool(_) => false,
        }
    }

    /// Exact integer value. Floats and numeric text qualify only when integral
    /// (`4.0` does, `3.9` does not).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(i64::from(*b)),
            Cell::Int(i) => Some(*i),
            Cell::Float(f) => integral(*f),
            Cell::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(f64::from(u8::from(*b))),
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) if f.is_nan() => None,
            Cell::Float(f) => Some(*f),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
        }
    }

    /// Trimmed text, `None` for nulls and blanks. Numbers render without a fraction when integral.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) if f.is_nan() => None,
            Cell::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(format!("{}", *f as i64)),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
        }
    }

    /// Text exactly as stored, `None` for nulls and blanks. Unlike
    /// [`Cell::as_text`] this keeps surrounding whitespace.
    pub fn as_stored_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.clone()),
            Cell::Text(_) => None,
            other => other.as_text(),
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| f as i64)
}

impl Cell {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Int(i) => Some(*i != 0),
            Cell::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Some(true),
                "false" | "f" | "0" => Some(false),
                _ => None,
            },
            Cell::Null | Cell::Float(_) => None,
        }
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Int(i64::from(v))
    }
}

impl From<i16> for Cell {
    fn from(v: i16) -> Self {
        Cell::Int(i64::from(v))
    }
}

impl From<u16> for Cell {
    fn from(v: u16) -> Self {
        Cell::Int(i64::from(v))
    }
}

impl From<u32> for Cell {
    fn from(v: u32) -> Self {
        Cell::Int(i64::from(v))
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// One row of a decoded source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularRecord {
    cells: BTreeMap<String, Cell>,
}

impl TabularRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used heavily by fixtures.
    pub fn with(mut self, column: &str, value: impl Into<Cell>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Cell>) {
        self.cells.insert(column.to_ascii_uppercase(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(&column.to_ascii_uppercase())
    }

    /// First candidate column whose value is present and non-null.
    pub fn first_present(&self, candidates: &[&str]) -> Option<&Cell> {
        candidates
            .iter()
            .filter_map(|c| self.get(c))
            .find(|cell| !cell.is_null())
    }

    pub fn first_text(&self, candidates: &[&str]) -> Option<String> {
        self.first_present(candidates).and_then(Cell::as_text)
    }

    pub fn first_i64(&self, candidates: &[&str]) -> Option<i64> {
        self.first_present(candidates).and_then(Cell::as_i64)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

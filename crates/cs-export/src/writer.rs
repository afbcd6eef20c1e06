//! Writes the projected documents under the JSON output directory.

use crate::error::{ExportError, ExportResult};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const RANKINGS_DIR: &str = "rankings";
pub const SCHOOLS_DIR: &str = "schools";
pub const METADATA_FILE: &str = "metadata.json";
pub const PRESETS_FILE: &str = "presets.json";
pub const SCHOOL_INDEX_FILE: &str = "school-index.json";

/// Serialize `value` as pretty JSON into `path`. Returns bytes written.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ExportResult<u64> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| ExportError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, &bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes.len() as u64)
}

/// Create `dir` (and parents).
pub fn ensure_dir(dir: &Path) -> ExportResult<()> {
    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Recreate `dir` empty so documents from a previous run with other
/// years or institutions do not linger.
pub fn reset_dir(dir: &Path) -> ExportResult<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|source| ExportError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    ensure_dir(dir)
}

/// Write every document into `dir` in parallel, naming each with `name`.
/// Returns total bytes written.
pub fn write_all<T, F>(dir: &Path, documents: &[T], name: F) -> ExportResult<u64>
where
    T: Serialize + Sync,
    F: Fn(&T) -> String + Sync,
{
    documents
        .par_iter()
        .map(|doc| {
            let path: PathBuf = dir.join(name(doc));
            write_json(&path, doc)
        })
        .collect::<ExportResult<Vec<u64>>>()
        .map(|sizes| sizes.into_iter().sum())
}

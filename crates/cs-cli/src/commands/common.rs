//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use cs_core::{Config, ReferenceData, ScopeKind};
use cs_db::{tables, Database, DbError, DbResult, DuckDbBackend};
use cs_engine::RankingTables;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Exit code for audit failures.
pub(crate) const EXIT_AUDIT_FAILED: i32 = 1;

/// Exit code when a stage runs before its inputs exist.
pub(crate) const EXIT_MISSING_STAGE: i32 = 2;

/// Load the project configuration from `--config` or the project directory.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Config::load_from_dir(&global.project_dir).with_context(|| {
            format!(
                "failed to load project config from {}",
                global.project_dir.display()
            )
        }),
    }
}

/// One open project: configuration, staging store and reference tables.
pub(crate) struct Session {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
    pub(crate) db: DuckDbBackend,
    pub(crate) reference: ReferenceData,
}

impl Session {
    pub(crate) fn open(global: &GlobalArgs) -> Result<Self> {
        let config = load_config(global)?;
        let root = global.project_dir.clone();
        let staging = config.staging_path_resolved(&root);
        let db = DuckDbBackend::new(&staging)
            .with_context(|| format!("failed to open staging database {}", staging))?;
        log::debug!("Opened staging database {}", staging);
        Ok(Self {
            root,
            config,
            db,
            reference: ReferenceData::standard(),
        })
    }

    pub(crate) fn db(&self) -> &dyn Database {
        &self.db
    }
}

/// Turn a missing upstream table into exit code 2, anything else into an error.
pub(crate) fn staged<T>(result: DbResult<T>) -> Result<T> {
    match result {
        Err(err @ DbError::MissingStage { .. }) => {
            eprintln!("{}", err);
            Err(ExitCode(EXIT_MISSING_STAGE).into())
        }
        other => Ok(other?),
    }
}

/// Read all three staged ranking tables.
pub(crate) async fn read_ranking_tables(db: &dyn Database) -> Result<RankingTables> {
    let mut rankings = RankingTables::default();
    for kind in ScopeKind::ALL {
        let entries = staged(tables::read_rankings(db, kind).await)?;
        match kind {
            ScopeKind::Ivy => rankings.ivy = entries,
            ScopeKind::State => rankings.state = entries,
            ScopeKind::National => rankings.national = entries,
        }
    }
    Ok(rankings)
}

/// Progress bar for file loops; hidden when there is nothing to show.
pub(crate) fn progress_bar(len: usize) -> ProgressBar {
    if len == 0 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// `1` -> `""`, anything else -> `"s"`
pub(crate) fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

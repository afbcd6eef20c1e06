//! Transform command: raw Clery exports -> `facts`, `raw_institutions`

use anyhow::{bail, Context, Result};
use cs_core::{
    extract_file, parse_file_name, ExtractOptions, FactTableBuilder, RawFileSpec,
    RawInstitutionTable,
};
use cs_db::tables;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, ScopeArgs};
use crate::commands::common::{plural, progress_bar, Session};

/// Execute the transform command
pub async fn execute(args: &ScopeArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    run(&session, args).await
}

pub(crate) async fn run(session: &Session, args: &ScopeArgs) -> Result<()> {
    let raw_dir = session.config.raw_dir_absolute(&session.root);
    let files = discover_raw_files(&raw_dir)?;
    if files.is_empty() {
        bail!(
            "no Clery export files found in {} (expected names like oncampuscrime212223.csv)",
            raw_dir.display()
        );
    }

    let options = ExtractOptions {
        years: session.config.fact_years,
        ivy_only: !args.process_all_schools(session.config.process_all_schools),
    };
    println!(
        "Transforming {} raw file{} ({}, years {})",
        files.len(),
        plural(files.len()),
        if options.ivy_only { "Ivy League only" } else { "all schools" },
        options.years
    );

    let mut builder = FactTableBuilder::new();
    let mut institutions = RawInstitutionTable::new();
    let mut rejected_counts = 0usize;
    let pb = progress_bar(files.len());

    for (path, spec) in &files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(file_name);

        let rows = session
            .db()
            .read_csv(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let extraction = extract_file(spec, &rows, &options, &session.reference);
        log::debug!(
            "{}: {} rows -> {} records",
            path.display(),
            rows.len(),
            extraction.records.len()
        );
        rejected_counts += extraction.rejected_counts;
        builder.extend(extraction.records);
        institutions.extend(extraction.institutions);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let stats = builder.stats();
    let facts = builder
        .build()
        .context("fact table build produced no rows")?;

    let fact_rows = tables::write_facts(session.db(), &facts).await?;
    let institution_rows = tables::write_raw_institutions(session.db(), &institutions).await?;

    println!(
        "  {} facts from {} records ({} excluded), {} raw institutions",
        fact_rows, stats.received, stats.excluded, institution_rows
    );
    if rejected_counts > 0 {
        println!(
            "  {} count cell{} with a non-integer value treated as missing",
            rejected_counts,
            plural(rejected_counts)
        );
    }
    Ok(())
}

/// Raw export files under `dir` in sorted name order, skipping anything
/// whose name does not decode.
pub(crate) fn discover_raw_files(dir: &Path) -> Result<Vec<(PathBuf, RawFileSpec)>> {
    if !dir.is_dir() {
        bail!("raw data directory {} does not exist", dir.display());
    }

    let pattern = dir.join("*.csv");
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .with_context(|| format!("invalid glob pattern {}", pattern.display()))?
        .filter_map(|entry| entry.ok())
        .collect();
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let spec = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_file_name);
        match spec {
            Some(spec) => files.push((path, spec)),
            None => log::info!("Skipping unrecognized file {}", path.display()),
        }
    }
    Ok(files)
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;

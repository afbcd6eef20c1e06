//! Generate command: staged tables -> dashboard JSON

use anyhow::{Context, Result};
use chrono::Utc;
use cs_db::tables;
use cs_export::ExportInput;

use crate::cli::GlobalArgs;
use crate::commands::common::{read_ranking_tables, staged, Session};

/// Execute the generate command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    run(&session).await
}

pub(crate) async fn run(session: &Session) -> Result<()> {
    let summary = staged(tables::read_school_year_offense(session.db()).await)?;
    let rankings = read_ranking_tables(session.db()).await?;
    let institutions = staged(tables::read_institution_dim(session.db()).await)?;
    let offenses = staged(tables::read_offense_dim(session.db()).await)?;

    let metadata = staged(tables::read_run_metadata(session.db()).await)?;
    let process_all_schools = metadata.process_all_schools;
    if process_all_schools != session.config.process_all_schools {
        log::info!(
            "Staged rankings were built with process_all_schools = {}; exporting to match",
            process_all_schools
        );
    }

    let entries: Vec<_> = rankings
        .ivy
        .iter()
        .chain(&rankings.state)
        .chain(&rankings.national)
        .cloned()
        .collect();

    let out_dir = session.config.json_dir_absolute(&session.root);
    println!("Generating JSON into {}", out_dir.display());

    let input = ExportInput {
        summary: &summary,
        rankings: &entries,
        institutions: &institutions,
        offenses: &offenses,
        reference: &session.reference,
        data_years: session.config.data_years,
        process_all_schools,
    };
    let written = cs_export::export(&input, &out_dir, Utc::now())
        .with_context(|| format!("failed to generate JSON into {}", out_dir.display()))?;

    println!(
        "  {} files ({} rankings, {} school profiles), {} bytes",
        written.total_files(),
        written.ranking_files,
        written.profile_files,
        written.bytes_written
    );
    Ok(())
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;

//! cs-export - JSON projection layer for the Clery pipeline
//!
//! Turns the staged summary, ranking and dimension tables into the static
//! documents the dashboard reads: `metadata.json`, `presets.json`,
//! `rankings/{preset}-{year}-all.json`, `schools/{unitid}.json` and
//! `school-index.json`.

pub mod documents;
pub mod error;
pub mod metadata;
pub mod profiles;
pub mod rankings;
pub mod writer;

pub use documents::{
    MetadataDocument, PresetDocument, ProfileDocument, RankingDocument, RankingRow,
    SchoolIndexDocument,
};
pub use error::{ExportError, ExportResult};

use chrono::{DateTime, Utc};
use cs_core::{
    InstitutionDim, OffenseDim, RankingEntry, ReferenceData, SchoolYearOffense, YearRange,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Everything the projection reads.
#[derive(Debug, Clone, Copy)]
pub struct ExportInput<'a> {
    pub summary: &'a [SchoolYearOffense],
    /// Entries of every ranking table, in any order.
    pub rankings: &'a [RankingEntry],
    pub institutions: &'a [InstitutionDim],
    pub offenses: &'a [OffenseDim],
    pub reference: &'a ReferenceData,
    /// Years projected; rows outside are ignored.
    pub data_years: YearRange,
    pub process_all_schools: bool,
}

/// All documents of one export, before they touch disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub metadata: MetadataDocument,
    pub presets: BTreeMap<String, PresetDocument>,
    pub rankings: Vec<RankingDocument>,
    pub profiles: Vec<ProfileDocument>,
    /// Only built when every school is processed.
    pub school_index: Option<SchoolIndexDocument>,
}

/// What [`export`] wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub root_files: usize,
    pub ranking_files: usize,
    pub profile_files: usize,
    pub bytes_written: u64,
}

impl ExportSummary {
    pub fn total_files(&self) -> usize {
        self.root_files + self.ranking_files + self.profile_files
    }
}

/// Build every document in memory.
///
/// A summary with no rows inside the exported years still yields metadata
/// and presets, with no rankings or profiles.
pub fn project(input: &ExportInput<'_>, generated_at: DateTime<Utc>) -> Projection {
    let by_institution = profiles::rows_by_institution(input.summary, input.data_years);
    if by_institution.is_empty() {
        log::warn!(
            "School-year-offense summary has no rows in {}; exporting an empty document set",
            input.data_years
        );
    }

    let exported: Vec<&InstitutionDim> = input
        .institutions
        .iter()
        .filter(|dim| by_institution.contains_key(&dim.unitid))
        .filter(|dim| input.process_all_schools || dim.is_ivy)
        .collect();

    let missing_dims = by_institution.len().saturating_sub(
        input
            .institutions
            .iter()
            .filter(|dim| by_institution.contains_key(&dim.unitid))
            .count(),
    );
    if missing_dims > 0 {
        log::warn!(
            "{} institutions have summary rows but no dimension row; no profile written",
            missing_dims
        );
    }

    let profiles: Vec<ProfileDocument> = exported
        .iter()
        .filter_map(|dim| {
            let rows = by_institution.get(&dim.unitid)?;
            profiles::build_profile(dim, rows)
        })
        .collect();

    Projection {
        metadata: metadata::build_metadata(input, &exported, generated_at),
        presets: metadata::build_presets(input, &exported),
        rankings: rankings::build_ranking_documents(
            input.rankings,
            input.institutions,
            input.data_years,
        ),
        profiles,
        school_index: input
            .process_all_schools
            .then(|| profiles::build_school_index(&exported)),
    }
}

/// Project and write every document under `out_dir`.
///
/// The `rankings/` and `schools/` subdirectories are recreated so the
/// output always reflects exactly one run.
pub fn export(
    input: &ExportInput<'_>,
    out_dir: &Path,
    generated_at: DateTime<Utc>,
) -> ExportResult<ExportSummary> {
    let projection = project(input, generated_at);
    write_projection(&projection, out_dir)
}

pub fn write_projection(projection: &Projection, out_dir: &Path) -> ExportResult<ExportSummary> {
    writer::ensure_dir(out_dir)?;
    let rankings_dir = out_dir.join(writer::RANKINGS_DIR);
    let schools_dir = out_dir.join(writer::SCHOOLS_DIR);
    writer::reset_dir(&rankings_dir)?;
    writer::reset_dir(&schools_dir)?;

    let mut summary = ExportSummary::default();

    summary.bytes_written +=
        writer::write_json(&out_dir.join(writer::METADATA_FILE), &projection.metadata)?;
    summary.bytes_written +=
        writer::write_json(&out_dir.join(writer::PRESETS_FILE), &projection.presets)?;
    summary.root_files += 2;

    let index_path = out_dir.join(writer::SCHOOL_INDEX_FILE);
    match &projection.school_index {
        Some(index) => {
            summary.bytes_written += writer::write_json(&index_path, index)?;
            summary.root_files += 1;
        }
        None if index_path.exists() => {
            std::fs::remove_file(&index_path).map_err(|source| ExportError::Write {
                path: index_path.clone(),
                source,
            })?;
        }
        None => {}
    }

    summary.bytes_written +=
        writer::write_all(&rankings_dir, &projection.rankings, RankingDocument::file_name)?;
    summary.ranking_files = projection.rankings.len();
    log::info!("Wrote {} ranking documents", summary.ranking_files);

    summary.bytes_written +=
        writer::write_all(&schools_dir, &projection.profiles, ProfileDocument::file_name)?;
    summary.profile_files = projection.profiles.len();
    log::info!("Wrote {} school profiles", summary.profile_files);

    Ok(summary)
}

//! Enrollment command: IPEDS files -> `dim_enrollment`

use anyhow::{Context, Result};
use cs_core::enrollment::{decode_derived_fte, decode_headcounts};
use cs_core::{EnrollmentRecord, EnrollmentResolver, EnrollmentSource, TabularRecord, YearRange};
use cs_db::tables;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;
use crate::commands::common::{plural, Session};

/// Execute the enrollment command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    run(&session).await
}

pub(crate) async fn run(session: &Session) -> Result<()> {
    let ipeds_dir = session.config.ipeds_dir_absolute(&session.root);
    let windows = &session.config.enrollment;
    println!(
        "Resolving enrollment (derived FTE {}, headcounts {})",
        windows.derived_fte_years, windows.headcount_years
    );

    let mut resolver = EnrollmentResolver::new();
    let mut missing = 0usize;

    for (source, years) in [
        (EnrollmentSource::DerivedFte, windows.derived_fte_years),
        (EnrollmentSource::Headcount, windows.headcount_years),
    ] {
        for year in years.years() {
            let path = source_path(&ipeds_dir, source, year);
            let Some(rows) = read_optional(session, &path).await? else {
                log::warn!("No {} file for {} at {}", source, year, path.display());
                missing += 1;
                continue;
            };
            let records = decode(source, year, &rows);
            log::debug!("{}: {} enrollment rows", path.display(), records.len());
            resolver
                .add(source, records)
                .with_context(|| format!("failed to merge {}", path.display()))?;
        }
    }

    let table = resolver.resolve();
    let written = tables::write_enrollment(session.db(), &table).await?;
    println!("  {} institution-years staged", written);
    if missing > 0 {
        println!(
            "  {} enrollment file{} missing; rates for those years stay null",
            missing,
            plural(missing)
        );
    }
    warn_uncovered(session.config.data_years, windows.derived_fte_years, windows.headcount_years);
    Ok(())
}

/// `{ipeds}/{year}/drvef{year}.csv` or `{ipeds}/{year}/ef{year}a.csv`
pub(crate) fn source_path(ipeds_dir: &Path, source: EnrollmentSource, year: i16) -> PathBuf {
    let file = match source {
        EnrollmentSource::DerivedFte => format!("drvef{}.csv", year),
        EnrollmentSource::Headcount => format!("ef{}a.csv", year),
    };
    ipeds_dir.join(year.to_string()).join(file)
}

fn decode(source: EnrollmentSource, year: i16, rows: &[TabularRecord]) -> Vec<EnrollmentRecord> {
    match source {
        EnrollmentSource::DerivedFte => decode_derived_fte(year, rows),
        EnrollmentSource::Headcount => decode_headcounts(year, rows),
    }
}

async fn read_optional(session: &Session, path: &Path) -> Result<Option<Vec<TabularRecord>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let rows = session
        .db()
        .read_csv(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Some(rows))
}

fn warn_uncovered(data_years: YearRange, derived: YearRange, headcount: YearRange) {
    let uncovered: Vec<String> = data_years
        .years()
        .filter(|y| !derived.contains(*y) && !headcount.contains(*y))
        .map(|y| y.to_string())
        .collect();
    if !uncovered.is_empty() {
        log::warn!(
            "Exported years without an enrollment source: {}",
            uncovered.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_path() {
        let dir = Path::new("data/raw/ipeds");
        assert_eq!(
            source_path(dir, EnrollmentSource::DerivedFte, 2022),
            PathBuf::from("data/raw/ipeds/2022/drvef2022.csv")
        );
        assert_eq!(
            source_path(dir, EnrollmentSource::Headcount, 2017),
            PathBuf::from("data/raw/ipeds/2017/ef2017a.csv")
        );
    }
}

//! Stage 1: the school-year-offense summary.

use crate::error::{EngineError, EngineResult};
use cs_core::{
    rate_per_10k, sum_by_key, EnrollmentTable, Fact, Geography, InstitutionDim, InstitutionId,
    OffenseFamily, OffenseName, SchoolYearOffense,
};
use std::collections::BTreeMap;

/// Build the summary table: granular rows plus a synthetic "All" row per
/// institution-year-offense, joined with FTE and institution names.
///
/// "All" sums On-campus, Non-campus and Public property only; Residence
/// halls is a subset of On-campus. An "All" row exists only when at least
/// one of those three geographies reported.
pub fn build_school_year_offense(
    facts: &[Fact],
    enrollment: &EnrollmentTable,
    institutions: &[InstitutionDim],
) -> EngineResult<Vec<SchoolYearOffense>> {
    if facts.is_empty() {
        return Err(EngineError::NoFacts);
    }

    let synthetic = facts.iter().filter(|f| f.geography.is_synthetic()).count();
    if synthetic > 0 {
        log::warn!(
            "Ignoring {} staged fact{} already labelled {}",
            synthetic,
            if synthetic == 1 { "" } else { "s" },
            Geography::All
        );
    }
    let granular = sum_by_key(
        facts
            .iter()
            .filter(|f| !f.geography.is_synthetic())
            .cloned(),
    );

    let mut rollup: BTreeMap<(i16, InstitutionId, OffenseName, OffenseFamily), i64> =
        BTreeMap::new();
    for fact in granular.iter().filter(|f| f.geography.rolls_up()) {
        *rollup
            .entry((fact.year, fact.unitid, fact.offense.clone(), fact.offense_family))
            .or_insert(0) += fact.count;
    }
    let all_rows = rollup
        .into_iter()
        .map(|((year, unitid, offense, offense_family), count)| Fact {
            year,
            unitid,
            offense,
            offense_family,
            geography: Geography::All,
            count,
        });

    let names: BTreeMap<InstitutionId, Option<&str>> = institutions
        .iter()
        .map(|d| (d.unitid, d.name.as_deref()))
        .collect();

    let mut unmatched_fte = 0usize;
    let mut rows: Vec<SchoolYearOffense> = granular
        .iter()
        .cloned()
        .chain(all_rows)
        .map(|fact| {
            let fte = enrollment.fte_for(fact.unitid.base(), fact.year);
            if fte.is_none() {
                unmatched_fte += 1;
            }
            SchoolYearOffense {
                institution_name: names
                    .get(&fact.unitid)
                    .copied()
                    .flatten()
                    .map(String::from),
                rate_per_10k: rate_per_10k(fact.count, fte),
                fte,
                year: fact.year,
                unitid: fact.unitid,
                offense: fact.offense,
                offense_family: fact.offense_family,
                geography: fact.geography,
                count: fact.count,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        (a.year, a.unitid, &a.offense, a.geography.as_str()).cmp(&(
            b.year,
            b.unitid,
            &b.offense,
            b.geography.as_str(),
        ))
    });

    if unmatched_fte > 0 {
        log::warn!(
            "{} of {} summary rows have no enrollment match; their rates are null",
            unmatched_fte,
            rows.len()
        );
    }
    log::info!(
        "Built school-year-offense summary: {} rows ({} granular)",
        rows.len(),
        granular.len()
    );
    Ok(rows)
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;

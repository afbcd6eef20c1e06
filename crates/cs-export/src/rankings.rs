//! Per-scope, per-year ranking documents.

use crate::documents::{RankingDocument, RankingRow};
use cs_core::{Geography, InstitutionDim, InstitutionId, RankingEntry, ScopeKey, YearRange};
use std::collections::BTreeMap;

/// Build one document per (scope, year) present in `entries`.
///
/// Only "All" geography partitions are projected. Rows inside each offense
/// list are ordered by rank.
pub fn build_ranking_documents(
    entries: &[RankingEntry],
    institutions: &[InstitutionDim],
    years: YearRange,
) -> Vec<RankingDocument> {
    let dims: BTreeMap<InstitutionId, &InstitutionDim> =
        institutions.iter().map(|d| (d.unitid, d)).collect();

    let mut grouped: BTreeMap<(ScopeKey, i16), Vec<&RankingEntry>> = BTreeMap::new();
    for entry in entries {
        if entry.geography != Geography::All || !years.contains(entry.year) {
            continue;
        }
        grouped
            .entry((entry.scope.clone(), entry.year))
            .or_default()
            .push(entry);
    }

    grouped
        .into_iter()
        .map(|((scope, year), entries)| {
            let mut rankings: BTreeMap<String, Vec<RankingRow>> = BTreeMap::new();
            let mut totals: BTreeMap<String, i64> = BTreeMap::new();

            for entry in entries {
                let code = entry.offense.code();
                *totals.entry(code.clone()).or_insert(0) += entry.count;
                rankings
                    .entry(code)
                    .or_default()
                    .push(ranking_row(entry, dims.get(&entry.unitid).copied()));
            }
            for rows in rankings.values_mut() {
                rows.sort_by_key(|row| row.rank);
            }

            RankingDocument {
                preset: scope.preset_id(),
                year,
                rankings,
                totals,
            }
        })
        .collect()
}

fn ranking_row(entry: &RankingEntry, dim: Option<&InstitutionDim>) -> RankingRow {
    RankingRow {
        rank: entry.rank,
        rank_by_rate: entry.rank_by_rate,
        unitid: entry.unitid.get(),
        name: entry.institution_name.clone(),
        short: dim.and_then(|d| d.short_name.clone()),
        state: dim.and_then(|d| d.state.as_ref()).map(|s| s.to_string()),
        count: entry.count,
        pct: entry.pct_of_total,
        fte: entry.fte,
        rate: entry.rate_per_10k,
        is_main_campus: entry.unitid.is_main_campus(),
    }
}

#[cfg(test)]
#[path = "rankings_test.rs"]
mod tests;

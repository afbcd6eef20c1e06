//! Per-institution profiles and the search index.

use crate::documents::{
    GeoCount, OffenseCount, ProfileDocument, ProfileSummary, SchoolIndexDocument,
    SchoolIndexEntry, TrendPoint, YearTotal,
};
use crate::metadata::display_name;
use cs_core::{Geography, InstitutionDim, InstitutionId, SchoolYearOffense, YearRange};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Entries kept in `breakdownByOffense`.
pub const TOP_OFFENSES: usize = 15;

/// Summary rows inside `years`, grouped by institution.
pub fn rows_by_institution(
    summary: &[SchoolYearOffense],
    years: YearRange,
) -> BTreeMap<InstitutionId, Vec<&SchoolYearOffense>> {
    let mut grouped: BTreeMap<InstitutionId, Vec<&SchoolYearOffense>> = BTreeMap::new();
    for row in summary.iter().filter(|r| years.contains(r.year)) {
        grouped.entry(row.unitid).or_default().push(row);
    }
    grouped
}

/// Build the profile of one institution. Returns `None` when it has no rows.
pub fn build_profile(dim: &InstitutionDim, rows: &[&SchoolYearOffense]) -> Option<ProfileDocument> {
    let latest_year = rows.iter().map(|r| r.year).max()?;

    let mut latest_all: Vec<&SchoolYearOffense> = rows
        .iter()
        .copied()
        .filter(|r| r.year == latest_year && r.geography == Geography::All)
        .collect();
    latest_all.sort_by(|a, b| a.offense.cmp(&b.offense));

    let total_incidents: i64 = latest_all.iter().map(|r| r.count).sum();
    // First maximum in offense order wins ties.
    let top = latest_all
        .iter()
        .copied()
        .fold(None::<&SchoolYearOffense>, |best, row| match best {
            Some(b) if b.count >= row.count => Some(b),
            _ => Some(row),
        });

    let mut by_offense = latest_all.clone();
    by_offense.sort_by_key(|r| Reverse(r.count));
    let breakdown_by_offense = by_offense
        .into_iter()
        .take(TOP_OFFENSES)
        .map(|r| OffenseCount {
            offense: r.offense.to_string(),
            count: r.count,
        })
        .collect();

    let mut geo_totals: BTreeMap<&'static str, i64> = BTreeMap::new();
    for row in rows
        .iter()
        .filter(|r| r.year == latest_year && r.geography != Geography::All)
    {
        *geo_totals.entry(row.geography.as_str()).or_insert(0) += row.count;
    }
    let mut breakdown_by_geo: Vec<GeoCount> = geo_totals
        .into_iter()
        .map(|(geo, count)| GeoCount {
            geo: geo.to_string(),
            count,
        })
        .collect();
    breakdown_by_geo.sort_by_key(|g| Reverse(g.count));

    let fte_by_year: BTreeMap<i16, i32> = rows
        .iter()
        .filter_map(|r| r.fte.map(|fte| (r.year, fte)))
        .collect();
    let fte = fte_by_year.values().next_back().copied();

    let mut yearly: BTreeMap<i16, i64> = BTreeMap::new();
    let mut trends: Vec<TrendPoint> = Vec::new();
    for row in rows.iter().filter(|r| r.geography == Geography::All) {
        *yearly.entry(row.year).or_insert(0) += row.count;
        trends.push(TrendPoint {
            year: row.year,
            offense: row.offense.to_string(),
            offense_family: row.offense_family.as_str().to_string(),
            count: row.count,
        });
    }
    trends.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.offense.cmp(&b.offense)));

    Some(ProfileDocument {
        unitid: dim.unitid.get(),
        name: display_name(dim),
        short_name: dim.short_name.clone(),
        city: dim.city.clone(),
        state: dim.state.as_ref().map(|s| s.to_string()),
        ivy_league: dim.is_ivy,
        is_main_campus: dim.is_main_campus,
        campus_type: if dim.is_main_campus {
            "Main Campus".to_string()
        } else {
            "Branch Campus".to_string()
        },
        fte,
        fte_by_year: (!fte_by_year.is_empty()).then_some(fte_by_year),
        summary: ProfileSummary {
            latest_year,
            total_incidents,
            top_offense: top.map(|r| r.offense.to_string()),
            top_offense_count: top.map_or(0, |r| r.count),
        },
        yearly_totals: yearly
            .into_iter()
            .map(|(year, total)| YearTotal { year, total })
            .collect(),
        trends,
        breakdown_by_offense,
        breakdown_by_geo,
    })
}

/// Search index over the exported institutions, ordered by state then name.
/// Institutions without a state sort last.
pub fn build_school_index(exported: &[&InstitutionDim]) -> SchoolIndexDocument {
    let mut schools: Vec<SchoolIndexEntry> = exported
        .iter()
        .map(|dim| SchoolIndexEntry {
            unitid: dim.unitid.get(),
            name: display_name(dim),
            short: dim.short_name.clone(),
            city: dim.city.clone(),
            state: dim.state.as_ref().map(|s| s.to_string()),
            is_main_campus: dim.is_main_campus,
            base_unitid: dim.base_unitid.get(),
        })
        .collect();
    schools.sort_by(|a, b| {
        (a.state.is_none(), &a.state, &a.name, a.unitid).cmp(&(
            b.state.is_none(),
            &b.state,
            &b.name,
            b.unitid,
        ))
    });
    SchoolIndexDocument { schools }
}

#[cfg(test)]
#[path = "profiles_test.rs"]
mod tests;

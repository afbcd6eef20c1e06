//! Stages 2 and 3: scoped leaderboards.
//!
//! Every summary row is assigned to zero or more scopes (Ivy, its state,
//! national), then partitioned by (scope, year, offense, geography) and
//! ranked independently. Stage 3 adds a cross-offense "all" partition per
//! scope-year built from the "All" geography rows.

use crate::rank::{rank_partition, Candidate};
use cs_core::{
    rate_per_10k, Geography, InstitutionDim, InstitutionId, OffenseKey, PartitionKey,
    RankingEntry, ReferenceData, SchoolYearOffense, ScopeKey, ScopeKind,
};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Which scopes to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingOptions {
    /// State and national scopes; Ivy is always computed.
    pub include_state_and_national: bool,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            include_state_and_national: true,
        }
    }
}

/// The three ranking tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingTables {
    pub ivy: Vec<RankingEntry>,
    pub state: Vec<RankingEntry>,
    pub national: Vec<RankingEntry>,
}

impl RankingTables {
    pub fn get(&self, kind: ScopeKind) -> &[RankingEntry] {
        match kind {
            ScopeKind::Ivy => &self.ivy,
            ScopeKind::State => &self.state,
            ScopeKind::National => &self.national,
        }
    }

    pub fn len(&self) -> usize {
        self.ivy.len() + self.state.len() + self.national.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scopes an institution belongs to.
///
/// Ivy membership is by exact main-campus id; state and national require a
/// recognized state code.
pub fn scopes_for(
    unitid: InstitutionId,
    dim: Option<&InstitutionDim>,
    reference: &ReferenceData,
    options: RankingOptions,
) -> Vec<ScopeKey> {
    let mut scopes = Vec::with_capacity(3);
    if reference.ivy_by_unitid(unitid).is_some() {
        scopes.push(ScopeKey::Ivy);
    }
    if options.include_state_and_national {
        if let Some(state) = dim
            .and_then(|d| d.state.as_ref())
            .filter(|s| reference.is_valid_state(s.as_str()))
        {
            scopes.push(ScopeKey::State(state.clone()));
            scopes.push(ScopeKey::National);
        }
    }
    scopes
}

/// Compute all three ranking tables from the summary.
pub fn build_rankings(
    summary: &[SchoolYearOffense],
    institutions: &[InstitutionDim],
    reference: &ReferenceData,
    options: RankingOptions,
) -> RankingTables {
    let dims: BTreeMap<InstitutionId, &InstitutionDim> =
        institutions.iter().map(|d| (d.unitid, d)).collect();

    let mut memberships: BTreeMap<InstitutionId, Vec<ScopeKey>> = BTreeMap::new();
    let mut partitions: BTreeMap<PartitionKey, Vec<Candidate>> = BTreeMap::new();
    // (scope, year, unitid) -> summed "All" geography candidate
    let mut totals: BTreeMap<(ScopeKey, i16, InstitutionId), Candidate> = BTreeMap::new();

    for row in summary {
        let scopes = memberships.entry(row.unitid).or_insert_with(|| {
            scopes_for(row.unitid, dims.get(&row.unitid).copied(), reference, options)
        });
        for scope in scopes.iter() {
            partitions
                .entry(PartitionKey {
                    scope: scope.clone(),
                    year: row.year,
                    offense: OffenseKey::Offense(row.offense.clone()),
                    geography: row.geography,
                })
                .or_default()
                .push(Candidate {
                    unitid: row.unitid,
                    name: row.institution_name.clone(),
                    count: row.count,
                    fte: row.fte,
                    rate_per_10k: row.rate_per_10k,
                });

            if row.geography == Geography::All {
                totals
                    .entry((scope.clone(), row.year, row.unitid))
                    .and_modify(|c| {
                        c.count += row.count;
                        c.fte = c.fte.or(row.fte);
                    })
                    .or_insert_with(|| Candidate {
                        unitid: row.unitid,
                        name: row.institution_name.clone(),
                        count: row.count,
                        fte: row.fte,
                        rate_per_10k: None,
                    });
            }
        }
    }

    for ((scope, year, _), mut candidate) in totals {
        candidate.rate_per_10k = rate_per_10k(candidate.count, candidate.fte);
        partitions
            .entry(PartitionKey {
                scope,
                year,
                offense: OffenseKey::All,
                geography: Geography::All,
            })
            .or_default()
            .push(candidate);
    }

    let partition_count = partitions.len();
    let ranked: Vec<Vec<RankingEntry>> = partitions
        .into_par_iter()
        .map(|(key, candidates)| {
            rank_partition(candidates)
                .into_iter()
                .map(|r| RankingEntry {
                    scope: key.scope.clone(),
                    year: key.year,
                    offense: key.offense.clone(),
                    geography: key.geography,
                    unitid: r.candidate.unitid,
                    institution_name: r.candidate.name,
                    count: r.candidate.count,
                    fte: r.candidate.fte,
                    rate_per_10k: r.candidate.rate_per_10k,
                    rank: r.rank,
                    rank_by_rate: r.rank_by_rate,
                    pct_of_total: r.pct_of_total,
                })
                .collect()
        })
        .collect();

    let mut tables = RankingTables::default();
    for entry in ranked.into_iter().flatten() {
        match entry.scope.kind() {
            ScopeKind::Ivy => tables.ivy.push(entry),
            ScopeKind::State => tables.state.push(entry),
            ScopeKind::National => tables.national.push(entry),
        }
    }
    log::info!(
        "Ranked {} partitions: {} ivy, {} state, {} national entries",
        partition_count,
        tables.ivy.len(),
        tables.state.len(),
        tables.national.len()
    );
    tables
}

#[cfg(test)]
#[path = "scopes_test.rs"]
mod tests;

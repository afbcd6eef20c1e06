//! Ranking within one partition.

use cs_core::{round_to, InstitutionId};
use std::cmp::Ordering;

/// One institution competing in a partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub unitid: InstitutionId,
    pub name: Option<String>,
    pub count: i64,
    pub fte: Option<i32>,
    pub rate_per_10k: Option<f64>,
}

/// A candidate with its positions and share of the partition total.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub candidate: Candidate,
    pub rank: u32,
    pub rank_by_rate: Option<u32>,
    pub pct_of_total: f64,
}

/// Name ascending (byte order, so case-sensitive); unnamed institutions last.
fn by_name(a: &Candidate, b: &Candidate) -> Ordering {
    match (&a.name, &b.name) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.unitid.cmp(&b.unitid))
}

/// Rank a partition by count (desc) and, separately, by rate (desc).
///
/// Ties break on institution name then id, so the output is fully
/// determined by the input set. Only candidates with a rate take part in
/// the rate ranking. Percentages are of the partition's count total,
/// rounded to 2 decimals, and 0 when the total is 0.
///
/// Returned in count-rank order.
pub fn rank_partition(mut rows: Vec<Candidate>) -> Vec<Ranked> {
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| by_name(a, b)));

    let mut by_rate: Vec<(usize, f64)> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.rate_per_10k.map(|r| (i, r)))
        .collect();
    by_rate.sort_by(|(ia, ra), (ib, rb)| rb.total_cmp(ra).then_with(|| by_name(&rows[*ia], &rows[*ib])));

    let mut rate_ranks = vec![None; rows.len()];
    for (pos, (idx, _)) in by_rate.into_iter().enumerate() {
        rate_ranks[idx] = Some(pos as u32 + 1);
    }

    let total: i64 = rows.iter().map(|c| c.count).sum();

    rows.into_iter()
        .zip(rate_ranks)
        .enumerate()
        .map(|(i, (candidate, rank_by_rate))| {
            let pct_of_total = if total > 0 {
                round_to(candidate.count as f64 / total as f64 * 100.0, 2)
            } else {
                0.0
            };
            Ranked {
                candidate,
                rank: i as u32 + 1,
                rank_by_rate,
                pct_of_total,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "rank_test.rs"]
mod tests;

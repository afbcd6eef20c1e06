//! Fact table builder.
//!
//! Per-file extraction produces [`ExtractedRecord`]s; the builder folds them
//! into one row per [`FactKey`], summing counts that collide.

use crate::domain::{Geography, OffenseFamily, OffenseName};
use crate::error::{CoreError, CoreResult};
use crate::ids::InstitutionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One offense count pulled from a wide source row, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    pub year: i16,
    pub unitid: InstitutionId,
    pub offense: OffenseName,
    pub offense_family: OffenseFamily,
    pub geography: Geography,
    /// `None` when the source cell was blank or non-numeric.
    pub count: Option<i64>,
}

/// Unique key of the fact table. Field order defines the table's sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactKey {
    pub year: i16,
    pub unitid: InstitutionId,
    pub offense: OffenseName,
    pub offense_family: OffenseFamily,
    pub geography: Geography,
}

/// A row of the canonical incident fact table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub year: i16,
    pub unitid: InstitutionId,
    pub offense: OffenseName,
    pub offense_family: OffenseFamily,
    #[serde(rename = "geo")]
    pub geography: Geography,
    pub count: i64,
}

impl Fact {
    pub fn key(&self) -> FactKey {
        FactKey {
            year: self.year,
            unitid: self.unitid,
            offense: self.offense.clone(),
            offense_family: self.offense_family,
            geography: self.geography,
        }
    }

    fn from_entry(key: FactKey, count: i64) -> Self {
        Self {
            year: key.year,
            unitid: key.unitid,
            offense: key.offense,
            offense_family: key.offense_family,
            geography: key.geography,
            count,
        }
    }
}

/// Group rows by [`FactKey`] and sum their counts, returning rows in key order.
///
/// Running this over its own output returns the same rows.
pub fn sum_by_key(facts: impl IntoIterator<Item = Fact>) -> Vec<Fact> {
    let mut grouped: BTreeMap<FactKey, i64> = BTreeMap::new();
    for fact in facts {
        *grouped.entry(fact.key()).or_insert(0) += fact.count;
    }
    grouped
        .into_iter()
        .map(|(key, count)| Fact::from_entry(key, count))
        .collect()
}

/// Accumulates extracted records across source files.
#[derive(Debug, Default)]
pub struct FactTableBuilder {
    counts: BTreeMap<FactKey, i64>,
    received: usize,
    excluded: usize,
}

/// Counters reported after a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FactBuildStats {
    pub received: usize,
    pub excluded: usize,
    pub rows: usize,
}

impl FactTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record. Null or non-positive counts and records already
    /// carrying the synthetic rollup geography are counted as excluded.
    pub fn push(&mut self, record: ExtractedRecord) {
        self.received += 1;
        if record.geography.is_synthetic() {
            log::warn!(
                "{} {} {}: source record labelled {} excluded",
                record.unitid,
                record.year,
                record.offense,
                record.geography
            );
            self.excluded += 1;
            return;
        }
        let count = match record.count {
            Some(c) if c > 0 => c,
            _ => {
                self.excluded += 1;
                return;
            }
        };
        let key = FactKey {
            year: record.year,
            unitid: record.unitid,
            offense: record.offense,
            offense_family: record.offense_family,
            geography: record.geography,
        };
        *self.counts.entry(key).or_insert(0) += count;
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ExtractedRecord>) {
        for record in records {
            self.push(record);
        }
    }

    pub fn stats(&self) -> FactBuildStats {
        FactBuildStats {
            received: self.received,
            excluded: self.excluded,
            rows: self.counts.len(),
        }
    }

    /// Finish the table. Fails when nothing was received or nothing survived cleaning.
    pub fn build(self) -> CoreResult<Vec<Fact>> {
        if self.received == 0 {
            return Err(CoreError::NoSourceData {
                context: "no offense records were extracted from any raw file".to_string(),
            });
        }
        if self.counts.is_empty() {
            return Err(CoreError::NoSourceData {
                context: format!(
                    "all {} extracted records had null or non-positive counts",
                    self.received
                ),
            });
        }
        log::info!(
            "Built fact table: {} rows from {} records ({} excluded)",
            self.counts.len(),
            self.received,
            self.excluded
        );
        Ok(self
            .counts
            .into_iter()
            .map(|(key, count)| Fact::from_entry(key, count))
            .collect())
    }
}

#[cfg(test)]
#[path = "fact_test.rs"]
mod tests;

//! Enrollment resolver.
//!
//! Two IPEDS sources cover disjoint year windows:
//!
//! - **Derived FTE** (`drvef{year}.csv`): FTE already computed by NCES.
//! - **Headcounts** (`ef{year}a.csv`): one row per student level; FTE is
//!   computed with the NCES part-time conversion factors.
//!
//! Both are merged into one table keyed by (base id, year). A key supplied
//! twice is an error rather than a silent overwrite.

use crate::error::{CoreError, CoreResult};
use crate::ids::BaseInstitutionId;
use crate::record::TabularRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Part-time undergraduate FTE conversion factor.
pub const PT_UNDERGRAD_FACTOR: f64 = 0.403543;
/// Part-time graduate FTE conversion factor.
pub const PT_GRADUATE_FACTOR: f64 = 0.361702;

/// `EFALEVEL` codes for the four headcount buckets.
pub const EFALEVEL_FT_UNDERGRAD: i64 = 22;
pub const EFALEVEL_FT_GRADUATE: i64 = 32;
pub const EFALEVEL_PT_UNDERGRAD: i64 = 42;
pub const EFALEVEL_PT_GRADUATE: i64 = 52;

/// Which file an enrollment row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentSource {
    DerivedFte,
    Headcount,
}

impl fmt::Display for EnrollmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentSource::DerivedFte => write!(f, "derived FTE"),
            EnrollmentSource::Headcount => write!(f, "headcount"),
        }
    }
}

/// Enrollment for one base institution in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub unitid: BaseInstitutionId,
    pub year: i16,
    pub fte: i32,
    pub enrollment_total: i32,
    pub enrollment_ft: i32,
    pub enrollment_pt: i32,
}

/// Headcounts by level. Missing buckets stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadcountBuckets {
    pub ft_undergrad: i64,
    pub ft_graduate: i64,
    pub pt_undergrad: i64,
    pub pt_graduate: i64,
}

impl HeadcountBuckets {
    /// Sum the weighted buckets first, then round half to even.
    pub fn fte(&self) -> i32 {
        let raw = self.ft_undergrad as f64
            + self.ft_graduate as f64
            + self.pt_undergrad as f64 * PT_UNDERGRAD_FACTOR
            + self.pt_graduate as f64 * PT_GRADUATE_FACTOR;
        raw.round_ties_even() as i32
    }

    pub fn full_time(&self) -> i32 {
        (self.ft_undergrad + self.ft_graduate) as i32
    }

    pub fn part_time(&self) -> i32 {
        (self.pt_undergrad + self.pt_graduate) as i32
    }

    pub fn to_record(&self, unitid: BaseInstitutionId, year: i16) -> EnrollmentRecord {
        EnrollmentRecord {
            unitid,
            year,
            fte: self.fte(),
            enrollment_total: self.full_time() + self.part_time(),
            enrollment_ft: self.full_time(),
            enrollment_pt: self.part_time(),
        }
    }

    fn add(&mut self, level: i64, headcount: i64) -> bool {
        let slot = match level {
            EFALEVEL_FT_UNDERGRAD => &mut self.ft_undergrad,
            EFALEVEL_FT_GRADUATE => &mut self.ft_graduate,
            EFALEVEL_PT_UNDERGRAD => &mut self.pt_undergrad,
            EFALEVEL_PT_GRADUATE => &mut self.pt_graduate,
            _ => return false,
        };
        *slot += headcount;
        true
    }
}

fn base_unitid(row: &TabularRecord) -> Option<BaseInstitutionId> {
    row.first_i64(&["UNITID"])
        .and_then(|v| i32::try_from(v).ok())
        .map(BaseInstitutionId::new)
}

fn to_i32(v: Option<i64>) -> i32 {
    v.and_then(|v| i32::try_from(v).ok()).unwrap_or(0)
}

/// Decode a derived-FTE file. Rows without FTE are dropped; missing headcounts read as 0.
pub fn decode_derived_fte(year: i16, rows: &[TabularRecord]) -> Vec<EnrollmentRecord> {
    let mut dropped = 0usize;
    let records: Vec<EnrollmentRecord> = rows
        .iter()
        .filter_map(|row| {
            let unitid = base_unitid(row)?;
            let Some(fte) = row.first_i64(&["FTE"]) else {
                dropped += 1;
                return None;
            };
            Some(EnrollmentRecord {
                unitid,
                year,
                fte: to_i32(Some(fte)),
                enrollment_total: to_i32(row.first_i64(&["ENRTOT"])),
                enrollment_ft: to_i32(row.first_i64(&["ENRFT"])),
                enrollment_pt: to_i32(row.first_i64(&["ENRPT"])),
            })
        })
        .collect();
    if dropped > 0 {
        log::debug!("{}: dropped {} derived-FTE rows without FTE", year, dropped);
    }
    records
}

/// Decode a headcount file into per-institution FTE.
pub fn decode_headcounts(year: i16, rows: &[TabularRecord]) -> Vec<EnrollmentRecord> {
    let mut buckets: BTreeMap<BaseInstitutionId, HeadcountBuckets> = BTreeMap::new();
    for row in rows {
        let (Some(unitid), Some(level)) = (base_unitid(row), row.first_i64(&["EFALEVEL"])) else {
            continue;
        };
        let headcount = row.first_i64(&["EFTOTLT"]).unwrap_or(0);
        let mut scratch = buckets.get(&unitid).copied().unwrap_or_default();
        if scratch.add(level, headcount) {
            buckets.insert(unitid, scratch);
        }
    }
    buckets
        .into_iter()
        .map(|(unitid, b)| b.to_record(unitid, year))
        .collect()
}

/// Resolved enrollment keyed by (base id, year).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrollmentTable {
    rows: BTreeMap<(BaseInstitutionId, i16), EnrollmentRecord>,
}

impl EnrollmentTable {
    /// Rebuild from stored rows, rejecting duplicate keys.
    pub fn from_records(records: impl IntoIterator<Item = EnrollmentRecord>) -> CoreResult<Self> {
        let mut table = Self::default();
        for record in records {
            if table.rows.insert((record.unitid, record.year), record).is_some() {
                return Err(CoreError::EnrollmentOverlap {
                    unitid: record.unitid.get(),
                    year: record.year,
                    sources: "duplicate stored rows".to_string(),
                });
            }
        }
        Ok(table)
    }

    /// FTE for an institution-year, `None` when no source covered it.
    pub fn fte_for(&self, unitid: BaseInstitutionId, year: i16) -> Option<i32> {
        self.rows.get(&(unitid, year)).map(|r| r.fte)
    }

    pub fn get(&self, unitid: BaseInstitutionId, year: i16) -> Option<&EnrollmentRecord> {
        self.rows.get(&(unitid, year))
    }

    /// Rows ordered by (unitid, year).
    pub fn records(&self) -> impl Iterator<Item = &EnrollmentRecord> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Merges both enrollment sources, refusing overlaps.
#[derive(Debug, Default)]
pub struct EnrollmentResolver {
    rows: BTreeMap<(BaseInstitutionId, i16), (EnrollmentRecord, EnrollmentSource)>,
}

impl EnrollmentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        source: EnrollmentSource,
        records: impl IntoIterator<Item = EnrollmentRecord>,
    ) -> CoreResult<()> {
        for record in records {
            let key = (record.unitid, record.year);
            if let Some((_, existing)) = self.rows.get(&key) {
                return Err(CoreError::EnrollmentOverlap {
                    unitid: record.unitid.get(),
                    year: record.year,
                    sources: format!("{} and {}", existing, source),
                });
            }
            self.rows.insert(key, (record, source));
        }
        Ok(())
    }

    pub fn resolve(self) -> EnrollmentTable {
        EnrollmentTable {
            rows: self
                .rows
                .into_iter()
                .map(|(key, (record, _))| (key, record))
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "enrollment_test.rs"]
mod tests;

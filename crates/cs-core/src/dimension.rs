//! Institution and offense dimensions.

use crate::domain::{offense_code, OffenseFamily, OffenseName, StateCode};
use crate::fact::Fact;
use crate::ids::{BaseInstitutionId, InstitutionId};
use crate::reference::{ReferenceData, COMPARABLE_FROM_YEAR, DEFINITION_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Descriptive columns captured from a raw export row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInstitution {
    pub unitid: InstitutionId,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub sector: Option<String>,
}

impl RawInstitution {
    fn fill_missing_from(&mut self, other: RawInstitution) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            if slot.is_none() {
                *slot = value;
            }
        }
        fill(&mut self.name, other.name);
        fill(&mut self.city, other.city);
        fill(&mut self.state, other.state);
        fill(&mut self.zip, other.zip);
        fill(&mut self.sector, other.sector);
    }
}

/// Per-institution raw descriptors merged across files.
///
/// For each field the first non-null value seen wins, so callers feed files
/// in a stable (sorted) order.
#[derive(Debug, Clone, Default)]
pub struct RawInstitutionTable {
    rows: BTreeMap<InstitutionId, RawInstitution>,
}

impl RawInstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: RawInstitution) {
        match self.rows.get_mut(&row.unitid) {
            Some(existing) => existing.fill_missing_from(row),
            None => {
                self.rows.insert(row.unitid, row);
            }
        }
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = RawInstitution>) {
        for row in rows {
            self.insert(row);
        }
    }

    pub fn get(&self, unitid: InstitutionId) -> Option<&RawInstitution> {
        self.rows.get(&unitid)
    }

    pub fn rows(&self) -> impl Iterator<Item = &RawInstitution> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One row of `dim_institution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionDim {
    pub unitid: InstitutionId,
    pub base_unitid: BaseInstitutionId,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<StateCode>,
    pub state_name: Option<String>,
    pub sector: Option<String>,
    pub is_ivy: bool,
    pub is_main_campus: bool,
}

/// One row of `dim_offense`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenseDim {
    pub offense: OffenseName,
    pub offense_code: String,
    pub offense_family: OffenseFamily,
    pub family_display: String,
    pub description: String,
    pub display_order: u16,
    pub definition_version: String,
    pub comparable_from_year: i16,
}

/// Build the institution dimension for every id present in the facts.
///
/// Ivy branches take their names and location from the main-campus entry.
/// Everyone else is enriched from `raw`; absent fields stay `None`.
pub fn build_institution_dim(
    facts: &[Fact],
    raw: &RawInstitutionTable,
    reference: &ReferenceData,
) -> Vec<InstitutionDim> {
    let unitids: BTreeSet<InstitutionId> = facts.iter().map(|f| f.unitid).collect();
    let mut unnamed = 0usize;

    let dims: Vec<InstitutionDim> = unitids
        .into_iter()
        .map(|unitid| {
            let base = unitid.base();
            let raw_row = raw.get(unitid);
            let sector = raw_row.and_then(|r| r.sector.clone());

            let (name, short_name, city, state) = match reference.ivy_by_base(base) {
                Some(ivy) => (
                    Some(ivy.name.to_string()),
                    Some(ivy.short_name.to_string()),
                    Some(ivy.city.to_string()),
                    StateCode::try_new(ivy.state),
                ),
                None => (
                    raw_row.and_then(|r| r.name.clone()),
                    None,
                    raw_row.and_then(|r| r.city.clone()),
                    raw_row
                        .and_then(|r| r.state.as_deref())
                        .and_then(StateCode::try_new),
                ),
            };
            if name.is_none() {
                unnamed += 1;
            }
            let state_name = state
                .as_ref()
                .map(|s| reference.state_name(s.as_str()).to_string());

            InstitutionDim {
                unitid,
                base_unitid: base,
                name,
                short_name,
                city,
                state,
                state_name,
                sector,
                is_ivy: reference.is_ivy_base(base),
                is_main_campus: unitid.is_main_campus(),
            }
        })
        .collect();

    if unnamed > 0 {
        log::warn!(
            "{} of {} institutions have no name in any raw source",
            unnamed,
            dims.len()
        );
    }
    dims
}

/// Build the offense dimension from the distinct (offense, family) pairs in the facts.
///
/// Unknown offenses sort last with an empty description.
pub fn build_offense_dim(facts: &[Fact], reference: &ReferenceData) -> Vec<OffenseDim> {
    let pairs: BTreeSet<(OffenseName, OffenseFamily)> = facts
        .iter()
        .map(|f| (f.offense.clone(), f.offense_family))
        .collect();

    let mut dims: Vec<OffenseDim> = pairs
        .into_iter()
        .map(|(offense, family)| {
            let order = reference.offense_order(offense.as_str());
            if order == crate::reference::UNASSIGNED_ORDER {
                log::warn!("Offense '{}' has no display order; sorting last", offense);
            }
            OffenseDim {
                offense_code: offense_code(offense.as_str()),
                description: reference.offense_description(offense.as_str()).to_string(),
                family_display: reference.family_display(family).to_string(),
                display_order: order,
                offense_family: family,
                definition_version: DEFINITION_VERSION.to_string(),
                comparable_from_year: COMPARABLE_FROM_YEAR,
                offense,
            }
        })
        .collect();
    dims.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.offense.cmp(&b.offense))
    });
    dims
}

#[cfg(test)]
#[path = "dimension_test.rs"]
mod tests;

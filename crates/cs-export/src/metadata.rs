//! `metadata.json` and `presets.json`.

use crate::documents::{MetadataDocument, OffenseMeta, PresetDocument, PresetMeta, SchoolRef};
use crate::ExportInput;
use chrono::{DateTime, SecondsFormat, Utc};
use cs_core::{Geography, InstitutionDim, ALL_OFFENSES};
use std::collections::{BTreeMap, BTreeSet};

pub const DATA_SOURCE: &str = "U.S. Department of Education Campus Safety & Security";
pub const DATA_SOURCE_URL: &str = "https://ope.ed.gov/campussafety/";
const NOTE: &str = "Data reflects reported Clery Act incidents. Reporting practices may vary by \
institution. Residence hall incidents are a subset of on-campus incidents.";
const ALL_OFFENSES_DESCRIPTION: &str = "Total incidents across all categories including criminal \
offenses, VAWA offenses, AND arrests/disciplinary referrals for drugs, alcohol, and weapons. Note: \
High counts may reflect drug/alcohol enforcement, not violent crime.";

/// Geography filter order offered to consumers.
pub const GEOGRAPHY_ORDER: [Geography; 5] = [
    Geography::All,
    Geography::OnCampus,
    Geography::NonCampus,
    Geography::PublicProperty,
    Geography::ResidenceHalls,
];

/// Name shown for an institution no raw source named.
pub(crate) fn display_name(dim: &InstitutionDim) -> String {
    dim.name
        .clone()
        .unwrap_or_else(|| format!("School {}", dim.unitid))
}

/// `1234567` -> `1,234,567`
pub(crate) fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn build_metadata(
    input: &ExportInput<'_>,
    exported: &[&InstitutionDim],
    generated_at: DateTime<Utc>,
) -> MetadataDocument {
    let years: Vec<i16> = input
        .summary
        .iter()
        .map(|row| row.year)
        .filter(|year| input.data_years.contains(*year))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut offenses = vec![OffenseMeta {
        code: ALL_OFFENSES.to_string(),
        display: "All Offenses".to_string(),
        family: "Summary".to_string(),
        family_display: "Summary".to_string(),
        description: ALL_OFFENSES_DESCRIPTION.to_string(),
        display_order: 0,
    }];
    offenses.extend(input.offenses.iter().map(|dim| OffenseMeta {
        code: dim.offense_code.clone(),
        display: dim.offense.to_string(),
        family: dim.offense_family.as_str().to_string(),
        family_display: dim.family_display.clone(),
        description: dim.description.clone(),
        display_order: dim.display_order.saturating_add(1),
    }));
    offenses.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.code.cmp(&b.code))
    });

    let coverage = match (years.first(), years.last()) {
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => input.data_years.to_string(),
    };

    MetadataDocument {
        years,
        offenses,
        geographies: GEOGRAPHY_ORDER
            .iter()
            .map(|geo| geo.as_str().to_string())
            .collect(),
        presets: build_preset_meta(input, exported),
        last_updated: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        data_source: DATA_SOURCE.to_string(),
        data_source_url: DATA_SOURCE_URL.to_string(),
        coverage,
        note: NOTE.to_string(),
    }
}

fn build_preset_meta(input: &ExportInput<'_>, exported: &[&InstitutionDim]) -> Vec<PresetMeta> {
    let mut presets = Vec::new();

    if input.process_all_schools {
        presets.push(PresetMeta {
            id: "national".to_string(),
            name: "All Schools".to_string(),
            description: format!("All {} schools nationwide", thousands(exported.len())),
            school_count: exported.len(),
        });
    }

    let ivy_count = input.reference.ivy_institutions().count();
    presets.push(PresetMeta {
        id: "ivy".to_string(),
        name: "Ivy League".to_string(),
        description: format!("{} Ivy League schools", ivy_count),
        school_count: ivy_count,
    });

    if input.process_all_schools {
        for (code, schools) in schools_by_state(exported) {
            let name = input.reference.state_name(&code).to_string();
            presets.push(PresetMeta {
                id: code,
                description: format!("Schools in {}", name),
                name,
                school_count: schools.len(),
            });
        }
    }

    presets
}

/// Exported institutions grouped by state code, only states with schools.
fn schools_by_state<'a>(
    exported: &[&'a InstitutionDim],
) -> BTreeMap<String, Vec<&'a InstitutionDim>> {
    let mut by_state: BTreeMap<String, Vec<&InstitutionDim>> = BTreeMap::new();
    for dim in exported {
        if let Some(state) = &dim.state {
            by_state.entry(state.to_string()).or_default().push(*dim);
        }
    }
    by_state
}

fn school_ref(dim: &InstitutionDim) -> SchoolRef {
    SchoolRef {
        unitid: dim.unitid.get(),
        name: display_name(dim),
        short: dim.short_name.clone(),
        city: dim.city.clone(),
        state: dim.state.as_ref().map(|s| s.to_string()),
    }
}

/// Preset id to school list. Ivy is always present; states only when every
/// school is processed.
pub fn build_presets(
    input: &ExportInput<'_>,
    exported: &[&InstitutionDim],
) -> BTreeMap<String, PresetDocument> {
    let mut presets = BTreeMap::new();

    let mut ivy: Vec<SchoolRef> = input
        .reference
        .ivy_institutions()
        .map(|ivy| SchoolRef {
            unitid: ivy.unitid.get(),
            name: ivy.name.to_string(),
            short: Some(ivy.short_name.to_string()),
            city: Some(ivy.city.to_string()),
            state: Some(ivy.state.to_string()),
        })
        .collect();
    ivy.sort_by(|a, b| a.name.cmp(&b.name));
    presets.insert(
        "ivy".to_string(),
        PresetDocument {
            id: "ivy".to_string(),
            name: "Ivy League".to_string(),
            schools: ivy,
        },
    );

    if input.process_all_schools {
        for (code, dims) in schools_by_state(exported) {
            let mut schools: Vec<SchoolRef> = dims.into_iter().map(school_ref).collect();
            schools.sort_by(|a, b| a.name.cmp(&b.name).then(a.unitid.cmp(&b.unitid)));
            presets.insert(
                code.clone(),
                PresetDocument {
                    name: input.reference.state_name(&code).to_string(),
                    id: code,
                    schools,
                },
            );
        }
    }

    presets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(8), "8");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(6543), "6,543");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_geography_order_starts_with_rollup() {
        assert_eq!(GEOGRAPHY_ORDER[0], Geography::All);
        assert_eq!(GEOGRAPHY_ORDER.len(), 5);
    }
}

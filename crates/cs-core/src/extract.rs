//! Wide-column extraction from Clery exports.
//!
//! Each export covers one geography and one category over three consecutive
//! years, with one column per offense and year (`MURD21`, `RAPE22`, ...).

use crate::config::YearRange;
use crate::dimension::RawInstitution;
use crate::domain::{Geography, OffenseFamily, OffenseName};
use crate::fact::ExtractedRecord;
use crate::ids::InstitutionId;
use crate::record::{
    TabularRecord, CITY_COLUMNS, NAME_COLUMNS, SECTOR_COLUMNS, STATE_COLUMNS, UNITID_COLUMNS,
    ZIP_COLUMNS,
};
use crate::reference::ReferenceData;
use regex::Regex;
use std::sync::OnceLock;

const CRIMINAL_COLUMNS: &[(&str, &str)] = &[
    ("MURD", "Murder"),
    ("NEG_M", "Negligent Manslaughter"),
    ("RAPE", "Rape"),
    ("FONDL", "Fondling"),
    ("INCES", "Incest"),
    ("STATR", "Statutory Rape"),
    ("ROBBE", "Robbery"),
    ("AGG_A", "Aggravated Assault"),
    ("BURGLA", "Burglary"),
    ("VEHIC", "Motor Vehicle Theft"),
    ("ARSON", "Arson"),
];

const VAWA_COLUMNS: &[(&str, &str)] = &[
    ("DOMEST", "Domestic Violence"),
    ("DATING", "Dating Violence"),
    ("STALK", "Stalking"),
];

/// Arrest and discipline files share codes; the family suffix completes the name.
const VIOLATION_COLUMNS: &[(&str, &str)] = &[
    ("WEAPON", "Weapons"),
    ("DRUG", "Drug"),
    ("LIQUOR", "Liquor"),
];

static FILE_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn file_name_re() -> &'static Regex {
    FILE_NAME_RE.get_or_init(|| {
        Regex::new(
            r"^(oncampus|residencehall|noncampus|publicproperty)(crime|vawa|arrest|discipline)(\d{2})(\d{2})(\d{2})$",
        )
        .expect("valid regex")
    })
}

/// What a raw export file covers, decoded from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileSpec {
    pub geography: Geography,
    pub family: OffenseFamily,
    pub years: [i16; 3],
}

impl RawFileSpec {
    /// Offense columns carried by files of this family, with display names.
    pub fn offense_columns(&self) -> Vec<(&'static str, OffenseName)> {
        let (columns, suffix) = match self.family {
            OffenseFamily::Criminal => (CRIMINAL_COLUMNS, None),
            OffenseFamily::Vawa => (VAWA_COLUMNS, None),
            OffenseFamily::Arrest => (VIOLATION_COLUMNS, Some("Arrest")),
            OffenseFamily::Disciplinary => (VIOLATION_COLUMNS, Some("Discipline")),
        };
        columns
            .iter()
            .map(|&(code, name)| {
                let display = match suffix {
                    Some(s) => format!("{} {}", name, s),
                    None => name.to_string(),
                };
                (code, OffenseName::new(display))
            })
            .collect()
    }
}

/// Decode `oncampuscrime212223.csv` style names. Returns `None` for anything else.
pub fn parse_file_name(file_name: &str) -> Option<RawFileSpec> {
    let lower = file_name.to_ascii_lowercase();
    let stem = lower.split('.').next().unwrap_or(&lower);
    let caps = file_name_re().captures(stem)?;

    let geography = match &caps[1] {
        "oncampus" => Geography::OnCampus,
        "residencehall" => Geography::ResidenceHalls,
        "noncampus" => Geography::NonCampus,
        "publicproperty" => Geography::PublicProperty,
        _ => return None,
    };
    let family = match &caps[2] {
        "crime" => OffenseFamily::Criminal,
        "vawa" => OffenseFamily::Vawa,
        "arrest" => OffenseFamily::Arrest,
        "discipline" => OffenseFamily::Disciplinary,
        _ => return None,
    };

    let mut years = [0i16; 3];
    for (slot, idx) in years.iter_mut().zip(3..=5) {
        *slot = 2000 + caps[idx].parse::<i16>().ok()?;
    }
    if years[1] != years[0] + 1 || years[2] != years[1] + 1 {
        return None;
    }

    Some(RawFileSpec {
        geography,
        family,
        years,
    })
}

/// Extraction filters.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub years: YearRange,
    /// Keep only rows whose base id belongs to an Ivy institution.
    pub ivy_only: bool,
}

/// Everything pulled out of one decoded file.
#[derive(Debug, Default)]
pub struct FileExtraction {
    pub records: Vec<ExtractedRecord>,
    pub institutions: Vec<RawInstitution>,
    /// Rows without a usable institution id.
    pub skipped_rows: usize,
    /// Count cells holding a value that is not a whole number; staged as null.
    pub rejected_counts: usize,
}

/// Melt wide offense columns into long records and capture institution columns.
pub fn extract_file(
    spec: &RawFileSpec,
    rows: &[TabularRecord],
    options: &ExtractOptions,
    reference: &ReferenceData,
) -> FileExtraction {
    let years: Vec<i16> = spec
        .years
        .iter()
        .copied()
        .filter(|y| options.years.contains(*y))
        .collect();
    let columns = spec.offense_columns();
    let mut out = FileExtraction::default();

    for row in rows {
        let Some(unitid) = row
            .first_i64(UNITID_COLUMNS)
            .and_then(|v| i32::try_from(v).ok())
            .map(InstitutionId::new)
        else {
            out.skipped_rows += 1;
            continue;
        };
        if options.ivy_only && !reference.is_ivy_base(unitid.base()) {
            continue;
        }

        out.institutions.push(RawInstitution {
            unitid,
            name: row.first_text(NAME_COLUMNS),
            city: row.first_text(CITY_COLUMNS),
            state: row.first_text(STATE_COLUMNS),
            zip: row.first_text(ZIP_COLUMNS),
            sector: row.first_text(SECTOR_COLUMNS),
        });

        for &year in &years {
            let suffix = format!("{:02}", year.rem_euclid(100));
            for (code, offense) in &columns {
                let column = format!("{}{}", code, suffix);
                let Some(cell) = row.get(&column) else {
                    continue;
                };
                let count = cell.as_i64();
                if count.is_none() && !cell.is_null() {
                    log::warn!(
                        "{} {}: {} value {:?} is not a whole number; treated as missing",
                        unitid,
                        year,
                        column,
                        cell
                    );
                    out.rejected_counts += 1;
                }
                out.records.push(ExtractedRecord {
                    year,
                    unitid,
                    offense: offense.clone(),
                    offense_family: spec.family,
                    geography: spec.geography,
                    count,
                });
            }
        }
    }

    if out.skipped_rows > 0 {
        log::warn!(
            "{} {} rows had no institution id and were skipped",
            out.skipped_rows,
            spec.family
        );
    }
    out
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;

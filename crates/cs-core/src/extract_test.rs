use super::*;
use crate::record::Cell;

fn options() -> ExtractOptions {
    ExtractOptions {
        years: YearRange::new(2015, 2024),
        ivy_only: false,
    }
}

#[test]
fn test_parse_file_name() {
    let spec = parse_file_name("oncampuscrime212223.csv").unwrap();
    assert_eq!(spec.geography, Geography::OnCampus);
    assert_eq!(spec.family, OffenseFamily::Criminal);
    assert_eq!(spec.years, [2021, 2022, 2023]);

    let spec = parse_file_name("ResidenceHallDiscipline151617.CSV").unwrap();
    assert_eq!(spec.geography, Geography::ResidenceHalls);
    assert_eq!(spec.family, OffenseFamily::Disciplinary);
}

#[test]
fn test_parse_file_name_rejects_unknown_layouts() {
    assert!(parse_file_name("Crime2022.csv").is_none());
    assert!(parse_file_name("oncampushate212223.csv").is_none());
    assert!(parse_file_name("oncampuscrime212324.csv").is_none());
    assert!(parse_file_name("oncampuscrime2122.csv").is_none());
}

#[test]
fn test_violation_columns_get_family_suffix() {
    let spec = parse_file_name("noncampusarrest212223").unwrap();
    let names: Vec<String> = spec
        .offense_columns()
        .into_iter()
        .map(|(_, n)| n.into_inner())
        .collect();
    assert_eq!(names, ["Weapons Arrest", "Drug Arrest", "Liquor Arrest"]);
}

#[test]
fn test_extract_melts_year_columns() {
    let spec = parse_file_name("oncampuscrime212223.csv").unwrap();
    let rows = vec![TabularRecord::new()
        .with("UNITID_P", 166027001i64)
        .with("INSTNM", "Harvard University")
        .with("City", "Cambridge")
        .with("State", "MA")
        .with("MURD21", 1i64)
        .with("MURD22", Cell::Null)
        .with("BURGLA23", 12.0)];
    let out = extract_file(&spec, &rows, &options(), &ReferenceData::standard());

    assert_eq!(out.records.len(), 3);
    let burglary = out
        .records
        .iter()
        .find(|r| r.offense == "Burglary")
        .unwrap();
    assert_eq!(burglary.year, 2023);
    assert_eq!(burglary.count, Some(12));
    assert!(out
        .records
        .iter()
        .any(|r| r.year == 2022 && r.count.is_none()));

    assert_eq!(out.institutions.len(), 1);
    assert_eq!(out.institutions[0].city.as_deref(), Some("Cambridge"));
}

#[test]
fn test_extract_filters_years() {
    let spec = parse_file_name("oncampuscrime131415.csv").unwrap();
    let rows = vec![TabularRecord::new()
        .with("UNITID", 100001i64)
        .with("ROBBE13", 2i64)
        .with("ROBBE15", 3i64)];
    let out = extract_file(&spec, &rows, &options(), &ReferenceData::standard());
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].year, 2015);
}

#[test]
fn test_extract_ivy_only_keeps_branches() {
    let spec = parse_file_name("oncampuscrime212223.csv").unwrap();
    let rows = vec![
        TabularRecord::new()
            .with("UNITID_P", 190415002i64)
            .with("ARSON21", 1i64),
        TabularRecord::new()
            .with("UNITID_P", 164465001i64)
            .with("ARSON21", 1i64),
    ];
    let opts = ExtractOptions {
        ivy_only: true,
        ..options()
    };
    let out = extract_file(&spec, &rows, &opts, &ReferenceData::standard());
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].unitid, InstitutionId::new(190415002));
}

#[test]
fn test_rows_without_unitid_are_skipped() {
    let spec = parse_file_name("oncampusvawa212223.csv").unwrap();
    let rows = vec![TabularRecord::new().with("STALK21", 4i64)];
    let out = extract_file(&spec, &rows, &options(), &ReferenceData::standard());
    assert!(out.records.is_empty());
    assert_eq!(out.skipped_rows, 1);
}

#[test]
fn test_fractional_counts_are_staged_as_missing() {
    let spec = parse_file_name("oncampuscrime212223.csv").unwrap();
    let rows = vec![TabularRecord::new()
        .with("UNITID_P", 166027001i64)
        .with("BURGLA21", 3.9)
        .with("BURGLA22", "2.5")
        .with("BURGLA23", 4.0)];
    let out = extract_file(&spec, &rows, &options(), &ReferenceData::standard());

    let counts: Vec<(i16, Option<i64>)> = out.records.iter().map(|r| (r.year, r.count)).collect();
    assert_eq!(counts, [(2021, None), (2022, None), (2023, Some(4))]);
    assert_eq!(out.rejected_counts, 2);
}

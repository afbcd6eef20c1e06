use super::*;
use cs_core::{BaseInstitutionId, EnrollmentRecord};

fn fact(unitid: i32, offense: &str, geo: Geography, count: i64) -> Fact {
    Fact {
        year: 2022,
        unitid: InstitutionId::new(unitid),
        offense: OffenseName::new(offense),
        offense_family: OffenseFamily::Criminal,
        geography: geo,
        count,
    }
}

fn enrollment(base: i32, year: i16, fte: i32) -> EnrollmentRecord {
    EnrollmentRecord {
        unitid: BaseInstitutionId::new(base),
        year,
        fte,
        enrollment_total: fte,
        enrollment_ft: fte,
        enrollment_pt: 0,
    }
}

fn find<'a>(rows: &'a [SchoolYearOffense], offense: &str, geo: Geography) -> Option<&'a SchoolYearOffense> {
    rows.iter().find(|r| r.offense == offense && r.geography == geo)
}

#[test]
fn test_all_geography_excludes_residence_halls() {
    let facts = vec![
        fact(166027001, "Murder", Geography::OnCampus, 1),
        fact(166027001, "Murder", Geography::ResidenceHalls, 1),
        fact(166027001, "Murder", Geography::PublicProperty, 2),
    ];
    let rows =
        build_school_year_offense(&facts, &EnrollmentTable::default(), &[]).unwrap();
    assert_eq!(find(&rows, "Murder", Geography::All).unwrap().count, 3);
    assert_eq!(rows.len(), 4);
}

#[test]
fn test_no_all_row_from_residence_halls_alone() {
    let facts = vec![fact(1, "Arson", Geography::ResidenceHalls, 2)];
    let rows =
        build_school_year_offense(&facts, &EnrollmentTable::default(), &[]).unwrap();
    assert!(find(&rows, "Arson", Geography::All).is_none());
}

#[test]
fn test_rates_join_on_base_id() {
    let facts = vec![
        fact(166027001, "Burglary", Geography::OnCampus, 3),
        fact(166027002, "Burglary", Geography::OnCampus, 6),
    ];
    let table = EnrollmentTable::from_records([enrollment(166027, 2022, 7000)]).unwrap();
    let rows = build_school_year_offense(&facts, &table, &[]).unwrap();
    for row in &rows {
        assert_eq!(row.fte, Some(7000));
    }
    let main = rows
        .iter()
        .find(|r| r.unitid.get() == 166027001 && r.geography == Geography::OnCampus)
        .unwrap();
    assert_eq!(main.rate_per_10k, Some(4.29));
}

#[test]
fn test_zero_fte_gives_null_rate() {
    let facts = vec![
        fact(1001, "Robbery", Geography::OnCampus, 3),
        fact(1001, "Rape", Geography::NonCampus, 1),
    ];
    let table = EnrollmentTable::from_records([enrollment(1, 2022, 0)]).unwrap();
    let rows = build_school_year_offense(&facts, &table, &[]).unwrap();
    assert!(rows.iter().all(|r| r.rate_per_10k.is_none()));
    assert!(rows.iter().all(|r| r.fte == Some(0)));
}

#[test]
fn test_missing_enrollment_is_null_not_zero() {
    let facts = vec![fact(1001, "Robbery", Geography::OnCampus, 3)];
    let rows =
        build_school_year_offense(&facts, &EnrollmentTable::default(), &[]).unwrap();
    assert!(rows.iter().all(|r| r.fte.is_none() && r.rate_per_10k.is_none()));
}

#[test]
fn test_rows_sorted_with_all_first_within_offense() {
    let facts = vec![
        fact(2, "Robbery", Geography::OnCampus, 1),
        fact(1, "Robbery", Geography::NonCampus, 1),
        fact(1, "Arson", Geography::OnCampus, 1),
    ];
    let rows =
        build_school_year_offense(&facts, &EnrollmentTable::default(), &[]).unwrap();
    let keys: Vec<(i32, &str, &str)> = rows
        .iter()
        .map(|r| (r.unitid.get(), r.offense.as_str(), r.geography.as_str()))
        .collect();
    assert_eq!(
        keys,
        [
            (1, "Arson", "All"),
            (1, "Arson", "On-campus"),
            (1, "Robbery", "All"),
            (1, "Robbery", "Non-campus"),
            (2, "Robbery", "All"),
            (2, "Robbery", "On-campus"),
        ]
    );
}

#[test]
fn test_empty_facts_is_an_error() {
    assert!(matches!(
        build_school_year_offense(&[], &EnrollmentTable::default(), &[]),
        Err(EngineError::NoFacts)
    ));
}

#[test]
fn test_staged_all_rows_are_not_double_counted() {
    let facts = vec![
        fact(166027001, "Burglary", Geography::All, 40),
        fact(166027001, "Burglary", Geography::OnCampus, 3),
        fact(166027001, "Burglary", Geography::NonCampus, 2),
    ];
    let rows =
        build_school_year_offense(&facts, &EnrollmentTable::default(), &[]).unwrap();
    let all: Vec<_> = rows
        .iter()
        .filter(|r| r.geography == Geography::All)
        .collect();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].count, 5);
    assert_eq!(rows.len(), 3);
}

use super::*;
use cs_core::{BaseInstitutionId, OffenseFamily, OffenseName, StateCode};

fn dim(unitid: i32, name: Option<&str>, state: Option<&str>) -> InstitutionDim {
    let id = InstitutionId::new(unitid);
    InstitutionDim {
        unitid: id,
        base_unitid: id.base(),
        name: name.map(str::to_string),
        short_name: None,
        city: None,
        state: state.and_then(StateCode::try_new),
        state_name: None,
        sector: None,
        is_ivy: false,
        is_main_campus: id.is_main_campus(),
    }
}

fn row(year: i16, offense: &str, geo: Geography, count: i64, fte: Option<i32>) -> SchoolYearOffense {
    SchoolYearOffense {
        year,
        unitid: InstitutionId::new(100654001),
        offense: OffenseName::new(offense),
        offense_family: OffenseFamily::Criminal,
        geography: geo,
        count,
        institution_name: Some("Alabama A & M University".to_string()),
        fte,
        rate_per_10k: cs_core::rate_per_10k(count, fte),
    }
}

fn sample() -> Vec<SchoolYearOffense> {
    vec![
        row(2022, "Burglary", Geography::OnCampus, 2, Some(5000)),
        row(2022, "Burglary", Geography::All, 2, Some(5000)),
        row(2023, "Burglary", Geography::OnCampus, 3, None),
        row(2023, "Burglary", Geography::PublicProperty, 1, None),
        row(2023, "Burglary", Geography::ResidenceHalls, 2, None),
        row(2023, "Burglary", Geography::All, 4, None),
        row(2023, "Robbery", Geography::NonCampus, 4, None),
        row(2023, "Robbery", Geography::All, 4, None),
        row(2023, "Arson", Geography::OnCampus, 1, None),
        row(2023, "Arson", Geography::All, 1, None),
    ]
}

#[test]
fn test_profile_summary_uses_latest_year() {
    let rows = sample();
    let refs: Vec<&SchoolYearOffense> = rows.iter().collect();
    let profile = build_profile(&dim(100654001, Some("Alabama A & M University"), Some("AL")), &refs)
        .unwrap();

    assert_eq!(profile.summary.latest_year, 2023);
    assert_eq!(profile.summary.total_incidents, 9);
    // Burglary and Robbery tie at 4; offense order picks Burglary.
    assert_eq!(profile.summary.top_offense.as_deref(), Some("Burglary"));
    assert_eq!(profile.summary.top_offense_count, 4);
    assert_eq!(profile.campus_type, "Main Campus");
}

#[test]
fn test_profile_breakdowns() {
    let rows = sample();
    let refs: Vec<&SchoolYearOffense> = rows.iter().collect();
    let profile = build_profile(&dim(100654001, None, None), &refs).unwrap();

    let offenses: Vec<(&str, i64)> = profile
        .breakdown_by_offense
        .iter()
        .map(|b| (b.offense.as_str(), b.count))
        .collect();
    assert_eq!(offenses, [("Burglary", 4), ("Robbery", 4), ("Arson", 1)]);

    let geos: Vec<(&str, i64)> = profile
        .breakdown_by_geo
        .iter()
        .map(|b| (b.geo.as_str(), b.count))
        .collect();
    assert_eq!(
        geos,
        [
            ("Non-campus", 4),
            ("On-campus", 4),
            ("Residence halls", 2),
            ("Public property", 1)
        ]
    );
}

#[test]
fn test_profile_trends_and_fte() {
    let rows = sample();
    let refs: Vec<&SchoolYearOffense> = rows.iter().collect();
    let profile = build_profile(&dim(100654001, None, None), &refs).unwrap();

    assert_eq!(profile.name, "School 100654001");
    assert_eq!(
        profile
            .yearly_totals
            .iter()
            .map(|t| (t.year, t.total))
            .collect::<Vec<_>>(),
        [(2022, 2), (2023, 9)]
    );
    assert_eq!(profile.trends.len(), 4);
    assert_eq!(profile.trends[0].year, 2022);
    assert_eq!(profile.trends[1].offense, "Arson");
    assert_eq!(profile.fte, Some(5000));
    assert_eq!(profile.fte_by_year.unwrap().get(&2022), Some(&5000));
}

#[test]
fn test_profile_without_fte_keeps_null() {
    let rows = vec![row(2023, "Arson", Geography::All, 1, None)];
    let refs: Vec<&SchoolYearOffense> = rows.iter().collect();
    let profile = build_profile(&dim(100654002, None, None), &refs).unwrap();
    assert_eq!(profile.campus_type, "Branch Campus");

    let json = serde_json::to_value(&profile).unwrap();
    assert!(json.get("fte").unwrap().is_null());
    assert!(json.get("fteByYear").unwrap().is_null());
    assert!(json.get("shortName").unwrap().is_null());
}

#[test]
fn test_profile_none_without_rows() {
    assert!(build_profile(&dim(1, None, None), &[]).is_none());
}

#[test]
fn test_rows_by_institution_filters_years() {
    let rows = sample();
    let grouped = rows_by_institution(&rows, cs_core::YearRange::new(2023, 2023));
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped.values().next().unwrap().len(), 8);
}

#[test]
fn test_school_index_orders_by_state_then_name() {
    let dims = vec![
        dim(3001, Some("Zeta College"), Some("AL")),
        dim(2001, Some("Alpha College"), None),
        dim(1001, Some("Beta College"), Some("AK")),
        dim(4001, Some("Able College"), Some("AL")),
    ];
    let refs: Vec<&InstitutionDim> = dims.iter().collect();
    let index = build_school_index(&refs);
    let ids: Vec<i32> = index.schools.iter().map(|s| s.unitid).collect();
    assert_eq!(ids, [1001, 4001, 3001, 2001]);
    assert_eq!(index.schools[0].base_unitid, 1);
}

use super::*;
use crate::domain::Geography;

fn fact(unitid: i32, offense: &str, family: OffenseFamily) -> Fact {
    Fact {
        year: 2022,
        unitid: InstitutionId::new(unitid),
        offense: OffenseName::new(offense),
        offense_family: family,
        geography: Geography::OnCampus,
        count: 1,
    }
}

fn raw(unitid: i32, name: Option<&str>, city: Option<&str>, state: Option<&str>) -> RawInstitution {
    RawInstitution {
        unitid: InstitutionId::new(unitid),
        name: name.map(String::from),
        city: city.map(String::from),
        state: state.map(String::from),
        zip: None,
        sector: None,
    }
}

#[test]
fn test_raw_table_first_seen_wins_per_field() {
    let mut table = RawInstitutionTable::new();
    table.insert(raw(100001, Some("Alpha College"), None, Some("OH")));
    table.insert(raw(100001, Some("Alpha Coll."), Some("Akron"), Some("PA")));
    let row = table.get(InstitutionId::new(100001)).unwrap();
    assert_eq!(row.name.as_deref(), Some("Alpha College"));
    assert_eq!(row.city.as_deref(), Some("Akron"));
    assert_eq!(row.state.as_deref(), Some("OH"));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_ivy_branches_inherit_main_campus_metadata() {
    let facts = vec![
        fact(166027001, "Burglary", OffenseFamily::Criminal),
        fact(166027003, "Burglary", OffenseFamily::Criminal),
    ];
    let dims = build_institution_dim(&facts, &RawInstitutionTable::new(), &ReferenceData::standard());
    assert_eq!(dims.len(), 2);
    for dim in &dims {
        assert_eq!(dim.name.as_deref(), Some("Harvard University"));
        assert_eq!(dim.short_name.as_deref(), Some("Harvard"));
        assert_eq!(dim.state_name.as_deref(), Some("Massachusetts"));
        assert!(dim.is_ivy);
    }
    assert!(dims[0].is_main_campus);
    assert!(!dims[1].is_main_campus);
}

#[test]
fn test_non_ivy_enriched_from_raw_and_never_invented() {
    let facts = vec![
        fact(164465001, "Robbery", OffenseFamily::Criminal),
        fact(999999002, "Robbery", OffenseFamily::Criminal),
    ];
    let mut table = RawInstitutionTable::new();
    table.insert(raw(164465001, Some("Amherst College"), Some("Amherst"), Some("ma")));
    let dims = build_institution_dim(&facts, &table, &ReferenceData::standard());

    let amherst = &dims[0];
    assert_eq!(amherst.name.as_deref(), Some("Amherst College"));
    assert_eq!(amherst.state.as_ref().map(|s| s.as_str()), Some("MA"));
    assert!(!amherst.is_ivy);
    assert_eq!(amherst.short_name, None);

    let unknown = &dims[1];
    assert_eq!(unknown.name, None);
    assert_eq!(unknown.city, None);
    assert_eq!(unknown.state, None);
    assert_eq!(unknown.state_name, None);
    assert_eq!(unknown.base_unitid.get(), 999999);
}

#[test]
fn test_offense_dim_orders_and_degrades() {
    let facts = vec![
        fact(1, "Stalking", OffenseFamily::Vawa),
        fact(1, "Hate Crime", OffenseFamily::Criminal),
        fact(2, "Murder", OffenseFamily::Criminal),
        fact(3, "Murder", OffenseFamily::Criminal),
    ];
    let dims = build_offense_dim(&facts, &ReferenceData::standard());
    let names: Vec<&str> = dims.iter().map(|d| d.offense.as_str()).collect();
    assert_eq!(names, ["Murder", "Stalking", "Hate Crime"]);

    assert_eq!(dims[1].family_display, "VAWA Offenses");
    assert_eq!(dims[1].offense_code, "stalking");
    assert_eq!(dims[2].display_order, crate::reference::UNASSIGNED_ORDER);
    assert_eq!(dims[2].description, "");
    assert_eq!(dims[0].definition_version, "post_2015");
}

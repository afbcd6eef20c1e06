use super::*;
use cs_core::{BaseInstitutionId, OffenseFamily, OffenseName, StateCode};

fn dim(unitid: i32, name: &str, state: Option<&str>) -> InstitutionDim {
    let id = InstitutionId::new(unitid);
    InstitutionDim {
        unitid: id,
        base_unitid: BaseInstitutionId::new(id.base().get()),
        name: Some(name.to_string()),
        short_name: None,
        city: None,
        state: state.and_then(StateCode::try_new),
        state_name: None,
        sector: None,
        is_ivy: false,
        is_main_campus: id.is_main_campus(),
    }
}

fn row(
    unitid: i32,
    name: &str,
    offense: &str,
    geo: Geography,
    count: i64,
    fte: Option<i32>,
) -> SchoolYearOffense {
    SchoolYearOffense {
        year: 2022,
        unitid: InstitutionId::new(unitid),
        offense: OffenseName::new(offense),
        offense_family: OffenseFamily::Criminal,
        geography: geo,
        count,
        institution_name: Some(name.to_string()),
        fte,
        rate_per_10k: rate_per_10k(count, fte),
    }
}

fn fixture() -> (Vec<SchoolYearOffense>, Vec<InstitutionDim>) {
    let summary = vec![
        row(166027001, "Harvard University", "Burglary", Geography::All, 50, Some(20000)),
        row(166027001, "Harvard University", "Robbery", Geography::All, 10, Some(20000)),
        row(164465001, "Amherst College", "Burglary", Geography::All, 50, Some(0)),
        row(166027002, "Harvard University", "Burglary", Geography::All, 4, Some(20000)),
        row(130794001, "Yale University", "Burglary", Geography::All, 7, None),
        row(999999001, "Guam College", "Burglary", Geography::All, 3, None),
    ];
    let dims = vec![
        dim(166027001, "Harvard University", Some("MA")),
        dim(166027002, "Harvard University", Some("MA")),
        dim(164465001, "Amherst College", Some("MA")),
        dim(130794001, "Yale University", Some("CT")),
        dim(999999001, "Guam College", Some("GU")),
    ];
    (summary, dims)
}

fn entries_for<'a>(
    entries: &'a [RankingEntry],
    scope: &ScopeKey,
    offense: &OffenseKey,
) -> Vec<&'a RankingEntry> {
    entries
        .iter()
        .filter(|e| &e.scope == scope && &e.offense == offense)
        .collect()
}

#[test]
fn test_ivy_scope_is_main_campus_only() {
    let (summary, dims) = fixture();
    let tables = build_rankings(&summary, &dims, &ReferenceData::standard(), RankingOptions::default());
    let burglary = OffenseKey::Offense(OffenseName::new("Burglary"));
    let ivy = entries_for(&tables.ivy, &ScopeKey::Ivy, &burglary);
    let ids: Vec<i32> = ivy.iter().map(|e| e.unitid.get()).collect();
    assert_eq!(ids, [166027001, 130794001]);
}

#[test]
fn test_state_scope_ties_and_rate_ranks() {
    let (summary, dims) = fixture();
    let tables = build_rankings(&summary, &dims, &ReferenceData::standard(), RankingOptions::default());
    let ma = ScopeKey::State(StateCode::new("MA"));
    let burglary = OffenseKey::Offense(OffenseName::new("Burglary"));
    let entries = entries_for(&tables.state, &ma, &burglary);

    let order: Vec<(i32, u32)> = entries.iter().map(|e| (e.unitid.get(), e.rank)).collect();
    assert_eq!(order, [(164465001, 1), (166027001, 2), (166027002, 3)]);

    // Amherst has zero FTE, so it never receives a rate rank.
    assert_eq!(entries[0].rank_by_rate, None);
    assert_eq!(entries[1].rank_by_rate, Some(1));
    assert_eq!(entries[2].rank_by_rate, Some(2));
    assert_eq!(entries[0].pct_of_total, 48.08);
}

#[test]
fn test_invalid_states_are_excluded() {
    let (summary, dims) = fixture();
    let tables = build_rankings(&summary, &dims, &ReferenceData::standard(), RankingOptions::default());
    assert!(tables.state.iter().all(|e| e.unitid.get() != 999999001));
    assert!(tables.national.iter().all(|e| e.unitid.get() != 999999001));
    assert!(tables.national.iter().any(|e| e.unitid.get() == 130794001));
}

#[test]
fn test_all_offense_sums_across_offenses() {
    let (summary, dims) = fixture();
    let tables = build_rankings(&summary, &dims, &ReferenceData::standard(), RankingOptions::default());
    let all = entries_for(&tables.ivy, &ScopeKey::Ivy, &OffenseKey::All);
    let harvard = all.iter().find(|e| e.unitid.get() == 166027001).unwrap();
    assert_eq!(harvard.count, 60);
    assert_eq!(harvard.geography, Geography::All);
    assert_eq!(harvard.rate_per_10k, Some(30.0));
    assert_eq!(harvard.rank, 1);
}

#[test]
fn test_ivy_only_mode_skips_wide_scopes() {
    let (summary, dims) = fixture();
    let options = RankingOptions {
        include_state_and_national: false,
    };
    let tables = build_rankings(&summary, &dims, &ReferenceData::standard(), options);
    assert!(tables.state.is_empty());
    assert!(tables.national.is_empty());
    assert!(!tables.ivy.is_empty());
}

#[test]
fn test_rankings_are_deterministic() {
    let (summary, dims) = fixture();
    let reference = ReferenceData::standard();
    let a = build_rankings(&summary, &dims, &reference, RankingOptions::default());
    let b = build_rankings(&summary, &dims, &reference, RankingOptions::default());
    assert_eq!(a, b);
}

#[test]
fn test_granular_geographies_ranked_separately() {
    let summary = vec![
        row(166027001, "Harvard University", "Rape", Geography::ResidenceHalls, 2, None),
        row(166027001, "Harvard University", "Rape", Geography::OnCampus, 3, None),
        row(166027001, "Harvard University", "Rape", Geography::All, 3, None),
    ];
    let dims = vec![dim(166027001, "Harvard University", Some("MA"))];
    let tables = build_rankings(&summary, &dims, &ReferenceData::standard(), RankingOptions::default());
    let geos: Vec<Geography> = tables
        .ivy
        .iter()
        .filter(|e| e.offense != OffenseKey::All)
        .map(|e| e.geography)
        .collect();
    assert_eq!(geos.len(), 3);
    assert!(tables.ivy.iter().all(|e| e.pct_of_total == 100.0));
}

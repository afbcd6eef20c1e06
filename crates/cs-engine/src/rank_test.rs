use super::*;

fn candidate(unitid: i32, name: Option<&str>, count: i64, rate: Option<f64>) -> Candidate {
    Candidate {
        unitid: InstitutionId::new(unitid),
        name: name.map(String::from),
        count,
        fte: rate.map(|_| 1000),
        rate_per_10k: rate,
    }
}

fn names(ranked: &[Ranked]) -> Vec<Option<&str>> {
    ranked
        .iter()
        .map(|r| r.candidate.name.as_deref())
        .collect()
}

#[test]
fn test_ties_break_on_name() {
    let ranked = rank_partition(vec![
        candidate(217156001, Some("Brown University"), 50, None),
        candidate(164465001, Some("Amherst College"), 50, None),
    ]);
    assert_eq!(
        names(&ranked),
        [Some("Amherst College"), Some("Brown University")]
    );
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[1].rank, 2);
}

#[test]
fn test_name_order_is_case_sensitive() {
    let ranked = rank_partition(vec![
        candidate(1, Some("alpha"), 3, None),
        candidate(2, Some("Beta"), 3, None),
    ]);
    assert_eq!(names(&ranked), [Some("Beta"), Some("alpha")]);
}

#[test]
fn test_unnamed_sort_last_then_by_id() {
    let ranked = rank_partition(vec![
        candidate(9, None, 3, None),
        candidate(8, None, 3, None),
        candidate(7, Some("Zeta"), 3, None),
    ]);
    let ids: Vec<i32> = ranked.iter().map(|r| r.candidate.unitid.get()).collect();
    assert_eq!(ids, [7, 8, 9]);
}

#[test]
fn test_counts_non_increasing_by_rank() {
    let ranked = rank_partition(vec![
        candidate(1, Some("A"), 2, None),
        candidate(2, Some("B"), 9, None),
        candidate(3, Some("C"), 5, None),
    ]);
    let counts: Vec<i64> = ranked.iter().map(|r| r.candidate.count).collect();
    assert_eq!(counts, [9, 5, 2]);
    assert!(ranked.windows(2).all(|w| w[0].rank < w[1].rank));
}

#[test]
fn test_rate_rank_only_over_known_rates() {
    let ranked = rank_partition(vec![
        candidate(1, Some("A"), 10, Some(1.5)),
        candidate(2, Some("B"), 8, None),
        candidate(3, Some("C"), 6, Some(9.25)),
    ]);
    let by_id = |id: i32| ranked.iter().find(|r| r.candidate.unitid.get() == id).unwrap();
    assert_eq!(by_id(3).rank_by_rate, Some(1));
    assert_eq!(by_id(1).rank_by_rate, Some(2));
    assert_eq!(by_id(2).rank_by_rate, None);
}

#[test]
fn test_rate_ties_break_on_name() {
    let ranked = rank_partition(vec![
        candidate(1, Some("Yale University"), 1, Some(4.0)),
        candidate(2, Some("Brown University"), 2, Some(4.0)),
    ]);
    let brown = ranked.iter().find(|r| r.candidate.unitid.get() == 2).unwrap();
    assert_eq!(brown.rank_by_rate, Some(1));
}

#[test]
fn test_percentages() {
    let ranked = rank_partition(vec![
        candidate(1, Some("A"), 1, None),
        candidate(2, Some("B"), 1, None),
        candidate(3, Some("C"), 1, None),
    ]);
    for r in &ranked {
        assert_eq!(r.pct_of_total, 33.33);
    }
    let sum: f64 = ranked.iter().map(|r| r.pct_of_total).sum();
    assert!((sum - 100.0).abs() < 0.5);
}

#[test]
fn test_zero_total_gives_zero_percent() {
    let ranked = rank_partition(vec![
        candidate(1, Some("A"), 0, None),
        candidate(2, Some("B"), 0, None),
    ]);
    assert!(ranked.iter().all(|r| r.pct_of_total == 0.0));
}

#[test]
fn test_empty_partition() {
    assert!(rank_partition(Vec::new()).is_empty());
}

use super::*;

fn level_row(unitid: i64, level: i64, total: Option<i64>) -> TabularRecord {
    TabularRecord::new()
        .with("UNITID", unitid)
        .with("EFALEVEL", level)
        .with("EFTOTLT", total)
}

#[test]
fn test_fte_formula_sums_then_rounds() {
    let buckets = HeadcountBuckets {
        ft_undergrad: 1000,
        ft_graduate: 200,
        pt_undergrad: 500,
        pt_graduate: 100,
    };
    // 1000 + 200 + 201.7715 + 36.1702 = 1437.9417
    assert_eq!(buckets.fte(), 1438);
    assert_eq!(buckets.full_time(), 1200);
    assert_eq!(buckets.part_time(), 600);
}

#[test]
fn test_decode_headcounts_fills_missing_buckets_with_zero() {
    let rows = vec![
        level_row(166027, EFALEVEL_FT_UNDERGRAD, Some(1000)),
        level_row(166027, EFALEVEL_FT_GRADUATE, Some(200)),
        level_row(166027, EFALEVEL_PT_UNDERGRAD, Some(500)),
        level_row(166027, EFALEVEL_PT_GRADUATE, Some(100)),
        level_row(166027, 1, Some(99999)),
        level_row(190415, EFALEVEL_FT_UNDERGRAD, Some(10)),
        level_row(190415, EFALEVEL_PT_GRADUATE, None),
    ];
    let records = decode_headcounts(2019, &rows);
    assert_eq!(records.len(), 2);

    let harvard = records.iter().find(|r| r.unitid.get() == 166027).unwrap();
    assert_eq!(harvard.fte, 1438);
    assert_eq!(harvard.enrollment_total, 1800);
    assert_eq!(harvard.year, 2019);

    let cornell = records.iter().find(|r| r.unitid.get() == 190415).unwrap();
    assert_eq!(cornell.fte, 10);
    assert_eq!(cornell.enrollment_pt, 0);
}

#[test]
fn test_decode_derived_fte_drops_rows_without_fte() {
    let rows = vec![
        TabularRecord::new()
            .with("UNITID", 166027i64)
            .with("FTE", 25000i64)
            .with("ENRTOT", 31000i64)
            .with("ENRFT", 22000i64),
        TabularRecord::new().with("UNITID", 999999i64).with("ENRTOT", 5i64),
    ];
    let records = decode_derived_fte(2022, &rows);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fte, 25000);
    assert_eq!(records[0].enrollment_pt, 0);
}

#[test]
fn test_resolver_merges_disjoint_sources() {
    let mut resolver = EnrollmentResolver::new();
    resolver
        .add(
            EnrollmentSource::Headcount,
            decode_headcounts(2020, &[level_row(166027, EFALEVEL_FT_UNDERGRAD, Some(7000))]),
        )
        .unwrap();
    resolver
        .add(
            EnrollmentSource::DerivedFte,
            decode_derived_fte(
                2021,
                &[TabularRecord::new()
                    .with("UNITID", 166027i64)
                    .with("FTE", 7100i64)],
            ),
        )
        .unwrap();
    let table = resolver.resolve();
    let harvard = BaseInstitutionId::new(166027);
    assert_eq!(table.fte_for(harvard, 2020), Some(7000));
    assert_eq!(table.fte_for(harvard, 2021), Some(7100));
    assert_eq!(table.fte_for(harvard, 2015), None);
    assert_eq!(table.len(), 2);
}

#[test]
fn test_resolver_flags_overlap() {
    let record = EnrollmentRecord {
        unitid: BaseInstitutionId::new(1),
        year: 2021,
        fte: 10,
        enrollment_total: 10,
        enrollment_ft: 10,
        enrollment_pt: 0,
    };
    let mut resolver = EnrollmentResolver::new();
    resolver.add(EnrollmentSource::DerivedFte, [record]).unwrap();
    let err = resolver
        .add(EnrollmentSource::Headcount, [record])
        .unwrap_err();
    assert!(matches!(err, CoreError::EnrollmentOverlap { year: 2021, .. }));
}

#[test]
fn test_table_from_records_rejects_duplicates() {
    let record = EnrollmentRecord {
        unitid: BaseInstitutionId::new(1),
        year: 2021,
        fte: 10,
        enrollment_total: 10,
        enrollment_ft: 10,
        enrollment_pt: 0,
    };
    assert!(EnrollmentTable::from_records([record, record]).is_err());
}

use super::*;
use crate::fixtures::{fact, Fixture};
use cs_core::Geography;

#[test]
fn test_run_all_reports_every_check() {
    let fixture = Fixture::new();
    let report = Auditor::new(fixture.input()).run_all(false);

    assert_eq!(report.checks.len(), CHECKS.len());
    assert_eq!(report.summary.failed, 0);
    // FTE coverage is 2 of 3 and JSON output was not audited.
    assert_eq!(report.overall_status, CheckStatus::Warning);
    assert!(!report.is_failure(false));
    assert!(report.is_failure(true));
    assert!(report
        .checks
        .iter()
        .all(|c| c.status != CheckStatus::Pending));
}

#[test]
fn test_stop_on_fail_skips_remaining_checks() {
    let mut fixture = Fixture::new();
    fixture
        .facts
        .push(fact(166027001, "Burglary", Geography::OnCampus, 3));
    let report = Auditor::new(fixture.input()).run_all(true);

    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.checks[0].name, checks::FACT_INTEGRITY);
    assert_eq!(report.overall_status, CheckStatus::Fail);
    assert!(report.is_failure(false));
}

#[test]
fn test_report_round_trips_through_qa_dir() {
    let fixture = Fixture::new();
    let report = Auditor::new(fixture.input()).run_all(false);
    let dir = tempfile::tempdir().unwrap();
    let qa_dir = dir.path().join("data").join("qa");

    let path = report.write(&qa_dir).unwrap();
    assert_eq!(path, qa_dir.join(REPORT_FILE));

    let text = std::fs::read_to_string(&path).unwrap();
    let loaded: AuditReport = serde_json::from_str(&text).unwrap();
    assert_eq!(loaded.run_id, report.run_id);
    assert_eq!(loaded.summary, report.summary);
    assert_eq!(loaded.checks.len(), report.checks.len());
    assert!(text.contains("\"overall_status\": \"WARNING\""));
    assert_eq!(uuid::Uuid::parse_str(&loaded.run_id).unwrap().get_version_num(), 4);
}

//! cs-audit - Audit layer for the Clery pipeline
//!
//! Runs independent checks over the staged tables and generated JSON,
//! recomputing every expected value from the source tables, and writes a
//! QA report. Audit never blocks the engine: a failing check is reported,
//! not raised.

pub mod checks;
pub mod error;
pub mod result;

pub use error::{AuditError, AuditResult};
pub use result::{AuditSummary, CheckResult, CheckStatus};

use chrono::{SecondsFormat, Utc};
use cs_core::config::AuditConfig;
use cs_core::{
    EnrollmentTable, Fact, InstitutionDim, ReferenceData, SchoolYearOffense, YearRange,
};
use cs_engine::{RankingOptions, RankingTables};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File name of the report under the QA directory.
pub const REPORT_FILE: &str = "audit_report.json";

/// Everything the audit reads.
#[derive(Debug, Clone, Copy)]
pub struct AuditInput<'a> {
    pub facts: &'a [Fact],
    pub enrollment: &'a EnrollmentTable,
    pub institutions: &'a [InstitutionDim],
    pub summary: &'a [SchoolYearOffense],
    pub rankings: &'a RankingTables,
    pub reference: &'a ReferenceData,
    pub options: RankingOptions,
    pub config: &'a AuditConfig,
    pub data_years: YearRange,
    pub process_all_schools: bool,
    /// Generated JSON directory; JSON checks only warn when `None`.
    pub json_dir: Option<&'a Path>,
}

pub type Check = fn(&AuditInput<'_>) -> CheckResult;

/// Checks in report order.
pub const CHECKS: [Check; 11] = [
    checks::fact_integrity,
    checks::no_double_count,
    checks::rate_accuracy,
    checks::rank_order,
    checks::rank_by_rate_scope,
    checks::percent_sums,
    checks::school_completeness,
    checks::incident_totals,
    checks::source_traceability,
    checks::fte_coverage,
    checks::engine_idempotence,
];

/// Persisted result of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub run_id: String,
    pub generated_at: String,
    pub overall_status: CheckStatus,
    pub summary: AuditSummary,
    pub checks: Vec<CheckResult>,
}

impl AuditReport {
    pub fn from_results(checks: Vec<CheckResult>) -> Self {
        let summary = AuditSummary::from_results(&checks);
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            overall_status: summary.overall_status(),
            summary,
            checks,
        }
    }

    /// Whether the run should fail a build.
    pub fn is_failure(&self, fail_on_warning: bool) -> bool {
        match self.overall_status {
            CheckStatus::Fail => true,
            CheckStatus::Warning => fail_on_warning,
            CheckStatus::Pass | CheckStatus::Pending => false,
        }
    }

    /// Write the report as `audit_report.json` under `qa_dir`.
    pub fn write(&self, qa_dir: &Path) -> AuditResult<PathBuf> {
        fs::create_dir_all(qa_dir).map_err(|source| AuditError::ReportWrite {
            path: qa_dir.to_path_buf(),
            source,
        })?;
        let path = qa_dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(|source| AuditError::ReportWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Runs the audit checks over one input
pub struct Auditor<'a> {
    input: AuditInput<'a>,
}

impl<'a> Auditor<'a> {
    pub fn new(input: AuditInput<'a>) -> Self {
        Self { input }
    }

    /// Run a single check and settle its status
    pub fn run_check(&self, check: Check) -> CheckResult {
        let start = Instant::now();
        let result = check(&self.input).finish(start.elapsed());
        match result.status {
            CheckStatus::Fail => log::warn!("{}: FAIL ({})", result.name, result.errors.join("; ")),
            CheckStatus::Warning => {
                log::info!("{}: WARNING ({})", result.name, result.warnings.join("; "))
            }
            _ => log::info!("{}: {}", result.name, result.status),
        }
        result
    }

    /// Run every check in order. With `stop_on_fail`, checks after the
    /// first failure are skipped.
    pub fn run_all(&self, stop_on_fail: bool) -> AuditReport {
        let mut results = Vec::with_capacity(CHECKS.len());
        for check in CHECKS {
            let result = self.run_check(check);
            let failed = result.status == CheckStatus::Fail;
            results.push(result);
            if failed && stop_on_fail {
                break;
            }
        }
        AuditReport::from_results(results)
    }
}

#[cfg(test)]
mod fixtures;

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

//! Audit command: independent checks -> QA report

use anyhow::{Context, Result};
use cs_audit::{AuditInput, AuditReport, Auditor, CheckStatus};
use cs_db::tables;
use cs_engine::RankingOptions;

use crate::cli::{AuditArgs, GlobalArgs};
use crate::commands::common::{read_ranking_tables, staged, ExitCode, Session, EXIT_AUDIT_FAILED};

const CHECKMARK: &str = "\u{2713}";
const CROSS: &str = "\u{2717}";
const WARN: &str = "!";

/// Execute the audit command
pub async fn execute(args: &AuditArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    run(&session, args, false).await
}

/// Run every check against the staged tables and write the report.
/// With `stop_on_fail`, checks after the first failure are skipped.
pub(crate) async fn run(session: &Session, args: &AuditArgs, stop_on_fail: bool) -> Result<()> {
    let facts = staged(tables::read_facts(session.db()).await)?;
    let enrollment = staged(tables::read_enrollment(session.db()).await)?;
    let institutions = staged(tables::read_institution_dim(session.db()).await)?;
    let summary = staged(tables::read_school_year_offense(session.db()).await)?;
    let rankings = read_ranking_tables(session.db()).await?;

    let process_all_schools = staged(tables::read_run_metadata(session.db()).await)?
        .process_all_schools;
    let json_dir = session.config.json_dir_absolute(&session.root);
    let json_dir = json_dir.is_dir().then_some(json_dir);
    if json_dir.is_none() {
        log::warn!("No generated JSON found; JSON checks will only warn");
    }

    let input = AuditInput {
        facts: &facts,
        enrollment: &enrollment,
        institutions: &institutions,
        summary: &summary,
        rankings: &rankings,
        reference: &session.reference,
        options: RankingOptions {
            include_state_and_national: process_all_schools,
        },
        config: &session.config.audit,
        data_years: session.config.data_years,
        process_all_schools,
        json_dir: json_dir.as_deref(),
    };

    println!("Running audit checks...\n");
    let report = Auditor::new(input).run_all(stop_on_fail);
    print_report(&report);

    let qa_dir = session.config.qa_dir_absolute(&session.root);
    let path = report
        .write(&qa_dir)
        .with_context(|| format!("failed to write audit report under {}", qa_dir.display()))?;
    println!("\nReport written to {}", path.display());

    if report.is_failure(args.fail_on_warning) {
        return Err(ExitCode(EXIT_AUDIT_FAILED).into());
    }
    Ok(())
}

fn print_report(report: &AuditReport) {
    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => CHECKMARK,
            CheckStatus::Fail => CROSS,
            CheckStatus::Warning | CheckStatus::Pending => WARN,
        };
        println!("  {} {} ({}ms)", marker, check.name, check.duration_ms);
        for error in &check.errors {
            println!("      error: {}", error);
        }
        for warning in &check.warnings {
            println!("      warning: {}", warning);
        }
    }

    let summary = &report.summary;
    println!(
        "\n{}: {} checks, {} passed, {} failed, {} warnings",
        report.overall_status,
        summary.total_checks,
        summary.passed,
        summary.failed,
        summary.warnings
    );
}

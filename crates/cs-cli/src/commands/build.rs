//! Build command implementation
//!
//! Runs transform, enrollment, dimensions, aggregate and generate against one
//! staging session, then audits the result. A failing stage aborts the build;
//! audit failures set the exit code after the report is written.

use anyhow::Result;
use std::time::Instant;

use crate::cli::{AuditArgs, BuildArgs, GlobalArgs};
use crate::commands::common::Session;
use crate::commands::{aggregate, audit, dimensions, enrollment, generate, transform};

const STAGES: usize = 6;

fn phase(n: usize, name: &str) {
    println!("\n=== Phase {}/{}: {} ===\n", n, STAGES, name);
}

/// Execute the build command
pub async fn execute(args: &BuildArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let start = Instant::now();
    println!("Starting build for {}...", session.config.name);

    phase(1, "Transform");
    transform::run(&session, &args.scope).await?;

    phase(2, "Enrollment");
    enrollment::run(&session).await?;

    phase(3, "Dimensions");
    dimensions::run(&session).await?;

    phase(4, "Aggregate");
    aggregate::run(&session, &args.scope).await?;

    phase(5, "Generate");
    generate::run(&session).await?;

    phase(6, "Audit");
    let audit_args = AuditArgs {
        fail_on_warning: args.fail_on_warning,
    };
    let audited = audit::run(&session, &audit_args, args.fail_fast).await;

    match &audited {
        Ok(()) => println!(
            "\nBuild completed successfully in {:.1}s.",
            start.elapsed().as_secs_f64()
        ),
        Err(_) => println!("\nBuild completed with audit failures."),
    }
    audited
}

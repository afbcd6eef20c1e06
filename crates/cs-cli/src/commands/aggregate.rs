//! Aggregate command: -> summary and ranking tables

use anyhow::{Context, Result};
use cs_core::ScopeKind;
use cs_db::tables::{self, RunMetadata};
use cs_engine::{EngineInput, RankingOptions};

use crate::cli::{GlobalArgs, ScopeArgs};
use crate::commands::common::{staged, Session};

/// Execute the aggregate command
pub async fn execute(args: &ScopeArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    run(&session, args).await
}

pub(crate) async fn run(session: &Session, args: &ScopeArgs) -> Result<()> {
    let facts = staged(tables::read_facts(session.db()).await)?;
    let enrollment = staged(tables::read_enrollment(session.db()).await)?;
    let institutions = staged(tables::read_institution_dim(session.db()).await)?;

    let options = RankingOptions {
        include_state_and_national: args.process_all_schools(session.config.process_all_schools),
    };
    println!(
        "Aggregating {} facts over {} institutions ({})",
        facts.len(),
        institutions.len(),
        if options.include_state_and_national {
            "ivy, state and national scopes"
        } else {
            "ivy scope only"
        }
    );

    let output = cs_engine::run(EngineInput {
        facts: &facts,
        enrollment: &enrollment,
        institutions: &institutions,
        reference: &session.reference,
        options,
    })
    .context("aggregation failed")?;

    let summary_rows = tables::write_school_year_offense(session.db(), &output.summary).await?;
    println!("  {} school-year-offense rows", summary_rows);

    for kind in ScopeKind::ALL {
        let rows = tables::write_rankings(session.db(), kind, output.rankings.get(kind)).await?;
        println!("  {} {} ranking rows", rows, tables::ranking_table(kind).name);
    }

    let metadata = RunMetadata {
        process_all_schools: options.include_state_and_national,
        institution_count: institutions.len(),
        fact_count: facts.len(),
    };
    tables::write_run_metadata(session.db(), &metadata).await?;
    Ok(())
}

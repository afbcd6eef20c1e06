//! Dimensions command: -> `dim_institution`, `dim_offense`

use anyhow::Result;
use cs_core::{build_institution_dim, build_offense_dim};
use cs_db::tables;

use crate::cli::GlobalArgs;
use crate::commands::common::{staged, Session};

/// Execute the dimensions command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    run(&session).await
}

pub(crate) async fn run(session: &Session) -> Result<()> {
    let facts = staged(tables::read_facts(session.db()).await)?;
    let raw = staged(tables::read_raw_institutions(session.db()).await)?;
    println!("Building dimensions from {} facts", facts.len());

    let institutions = build_institution_dim(&facts, &raw, &session.reference);
    let offenses = build_offense_dim(&facts, &session.reference);

    let ivy = institutions.iter().filter(|d| d.is_ivy).count();
    let unnamed = institutions.iter().filter(|d| d.name.is_none()).count();

    tables::write_institution_dim(session.db(), &institutions).await?;
    tables::write_offense_dim(session.db(), &offenses).await?;

    println!(
        "  {} institutions ({} Ivy League, {} without a name), {} offenses",
        institutions.len(),
        ivy,
        unnamed,
        offenses.len()
    );
    Ok(())
}

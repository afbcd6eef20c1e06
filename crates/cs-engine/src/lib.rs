//! cs-engine - Aggregation and ranking engine
//!
//! A pure batch transform from facts, enrollment and the institution
//! dimension to the school-year-offense summary and the Ivy, state and
//! national ranking tables. Nothing here touches the staging store.

pub mod error;
pub mod rank;
pub mod scopes;
pub mod summary;

pub use error::{EngineError, EngineResult};
pub use rank::{rank_partition, Candidate, Ranked};
pub use scopes::{build_rankings, scopes_for, RankingOptions, RankingTables};
pub use summary::build_school_year_offense;

use cs_core::{EnrollmentTable, Fact, InstitutionDim, ReferenceData, SchoolYearOffense};

/// Everything the engine reads.
#[derive(Debug, Clone, Copy)]
pub struct EngineInput<'a> {
    pub facts: &'a [Fact],
    pub enrollment: &'a EnrollmentTable,
    pub institutions: &'a [InstitutionDim],
    pub reference: &'a ReferenceData,
    pub options: RankingOptions,
}

/// Everything the engine writes.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub summary: Vec<SchoolYearOffense>,
    pub rankings: RankingTables,
}

/// Run stages 1 to 3.
pub fn run(input: EngineInput<'_>) -> EngineResult<EngineOutput> {
    let summary =
        build_school_year_offense(input.facts, input.enrollment, input.institutions)?;
    let rankings = build_rankings(
        &summary,
        input.institutions,
        input.reference,
        input.options,
    );
    Ok(EngineOutput { summary, rankings })
}

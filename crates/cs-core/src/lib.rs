//! cs-core - Core library for the Clery pipeline
//!
//! This crate provides the domain types, immutable reference data,
//! configuration parsing, and the pure table builders (facts, enrollment,
//! dimensions) shared by every other crate in the workspace.

pub mod aggregate;
pub mod checksum;
pub mod config;
pub mod dimension;
pub mod domain;
pub mod enrollment;
pub mod error;
pub mod extract;
pub mod fact;
pub mod ids;
mod newtype_string;
pub mod record;
pub mod reference;

pub use aggregate::{
    OffenseKey, PartitionKey, RankingEntry, SchoolYearOffense, ScopeKey, ScopeKind, ALL_OFFENSES,
};
pub use checksum::{checksum_of, compute_checksum};
pub use config::{Config, PercentTolerance, YearRange};
pub use dimension::{
    build_institution_dim, build_offense_dim, InstitutionDim, OffenseDim, RawInstitution,
    RawInstitutionTable,
};
pub use domain::{offense_code, rate_per_10k, round_to, Geography, OffenseFamily, OffenseName, StateCode};
pub use enrollment::{EnrollmentRecord, EnrollmentResolver, EnrollmentSource, EnrollmentTable};
pub use error::{CoreError, CoreResult};
pub use extract::{extract_file, parse_file_name, ExtractOptions, FileExtraction, RawFileSpec};
pub use fact::{sum_by_key, ExtractedRecord, Fact, FactKey, FactTableBuilder};
pub use ids::{base_id, BaseInstitutionId, InstitutionId};
pub use record::{Cell, TabularRecord};
pub use reference::ReferenceData;

//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Clery - campus safety data pipeline
#[derive(Parser, Debug)]
#[command(name = "clery")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Path to clery.yml, overriding discovery in the project directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Melt raw Clery exports into the fact table
    Transform(ScopeArgs),

    /// Resolve IPEDS enrollment into the enrollment dimension
    Enrollment,

    /// Build the institution and offense dimensions
    Dimensions,

    /// Build the summary table and every ranking table
    Aggregate(ScopeArgs),

    /// Write the dashboard JSON documents
    Generate,

    /// Validate staged tables and generated JSON
    Audit(AuditArgs),

    /// Run every stage in order, then audit
    Build(BuildArgs),

    /// Remove the staging database and generated output
    Clean(CleanArgs),
}

/// Overrides for `process_all_schools`
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ScopeArgs {
    /// Process Ivy League institutions only
    #[arg(long, conflicts_with = "all_schools")]
    pub ivy_only: bool,

    /// Process every institution
    #[arg(long)]
    pub all_schools: bool,
}

impl ScopeArgs {
    /// Resolve against the configured default.
    pub fn process_all_schools(&self, configured: bool) -> bool {
        if self.ivy_only {
            false
        } else if self.all_schools {
            true
        } else {
            configured
        }
    }
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct AuditArgs {
    /// Exit non-zero when any check warns
    #[arg(long)]
    pub fail_on_warning: bool,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct BuildArgs {
    /// Skip remaining audit checks after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Exit non-zero when any audit check warns
    #[arg(long)]
    pub fail_on_warning: bool,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct CleanArgs {
    /// Show what would be removed without removing it
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

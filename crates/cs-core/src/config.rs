//! Configuration types and parsing for clery.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project file names searched by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["clery.yml", "clery.yaml"];

/// Main project configuration from clery.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directory holding Clery CSV exports (`oncampuscrime212223.csv`, ...)
    #[serde(default = "default_raw_dir")]
    pub raw_dir: String,

    /// Directory holding IPEDS enrollment files, one subdirectory per year
    #[serde(default = "default_ipeds_dir")]
    pub ipeds_dir: String,

    /// Staging database path (`:memory:` keeps everything in-process)
    #[serde(default = "default_staging_path")]
    pub staging_path: String,

    /// Output directory for generated JSON documents
    #[serde(default = "default_json_dir")]
    pub json_dir: String,

    /// Output directory for the audit report
    #[serde(default = "default_qa_dir")]
    pub qa_dir: String,

    /// Years kept when building the fact table
    #[serde(default = "default_fact_years")]
    pub fact_years: YearRange,

    /// Years exported to JSON (enrollment coverage bounds this)
    #[serde(default = "default_data_years")]
    pub data_years: YearRange,

    /// Enrollment source windows
    #[serde(default)]
    pub enrollment: EnrollmentConfig,

    /// Rank every institution in every state; `false` keeps only the Ivy scope
    #[serde(default = "default_true")]
    pub process_all_schools: bool,

    /// Audit tolerances
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Inclusive range of reporting years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YearRange {
    pub start: i16,
    pub end: i16,
}

impl YearRange {
    pub const fn new(start: i16, end: i16) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i16) -> bool {
        (self.start..=self.end).contains(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i16> {
        self.start..=self.end
    }

    pub fn overlaps(&self, other: &YearRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Which years each enrollment source covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrollmentConfig {
    /// Years read from derived-FTE files (`drvef{year}.csv`)
    #[serde(default = "default_derived_fte_years")]
    pub derived_fte_years: YearRange,

    /// Years computed from headcount files (`ef{year}a.csv`)
    #[serde(default = "default_headcount_years")]
    pub headcount_years: YearRange,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            derived_fte_years: default_derived_fte_years(),
            headcount_years: default_headcount_years(),
        }
    }
}

/// Audit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Tolerance bands for percent-of-total sums
    #[serde(default)]
    pub percent_tolerance: PercentTolerance,

    /// Allowed difference between a stored rate and its recomputation
    #[serde(default = "default_rate_tolerance")]
    pub rate_tolerance: f64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            percent_tolerance: PercentTolerance::default(),
            rate_tolerance: default_rate_tolerance(),
        }
    }
}

/// Allowed deviation of a partition's percentage sum from 100.
///
/// Each entry is rounded to 2 decimals, so drift grows with partition size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PercentTolerance {
    /// Partitions with fewer entries than this use `small`
    #[serde(default = "default_small_max_entries")]
    pub small_max_entries: usize,
    /// Partitions with fewer entries than this (and not small) use `medium`
    #[serde(default = "default_medium_max_entries")]
    pub medium_max_entries: usize,
    #[serde(default = "default_small_tolerance")]
    pub small: f64,
    #[serde(default = "default_medium_tolerance")]
    pub medium: f64,
    #[serde(default = "default_large_tolerance")]
    pub large: f64,
    /// Deviation beyond this is a failure regardless of size
    #[serde(default = "default_severe_tolerance")]
    pub severe: f64,
}

impl PercentTolerance {
    /// Tolerance band for a partition with `entries` rows.
    pub fn for_entries(&self, entries: usize) -> f64 {
        if entries < self.small_max_entries {
            self.small
        } else if entries < self.medium_max_entries {
            self.medium
        } else {
            self.large
        }
    }
}

impl Default for PercentTolerance {
    fn default() -> Self {
        Self {
            small_max_entries: default_small_max_entries(),
            medium_max_entries: default_medium_max_entries(),
            small: default_small_tolerance(),
            medium: default_medium_tolerance(),
            large: default_large_tolerance(),
            severe: default_severe_tolerance(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_raw_dir() -> String {
    "data/raw".to_string()
}

fn default_ipeds_dir() -> String {
    "data/raw/ipeds".to_string()
}

fn default_staging_path() -> String {
    "target/clery.duckdb".to_string()
}

fn default_json_dir() -> String {
    "public/data".to_string()
}

fn default_qa_dir() -> String {
    "data/qa".to_string()
}

fn default_fact_years() -> YearRange {
    YearRange::new(2015, 2024)
}

fn default_data_years() -> YearRange {
    YearRange::new(2015, 2023)
}

fn default_derived_fte_years() -> YearRange {
    YearRange::new(2021, 2023)
}

fn default_headcount_years() -> YearRange {
    YearRange::new(2015, 2020)
}

fn default_rate_tolerance() -> f64 {
    0.01
}

fn default_small_max_entries() -> usize {
    100
}

fn default_medium_max_entries() -> usize {
    1000
}

fn default_small_tolerance() -> f64 {
    0.5
}

fn default_medium_tolerance() -> f64 {
    2.0
}

fn default_large_tolerance() -> f64 {
    5.0
}

fn default_severe_tolerance() -> f64 {
    10.0
}

impl Config {
    /// Configuration with every default and the given project name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_dir: default_raw_dir(),
            ipeds_dir: default_ipeds_dir(),
            staging_path: default_staging_path(),
            json_dir: default_json_dir(),
            qa_dir: default_qa_dir(),
            fact_years: default_fact_years(),
            data_years: default_data_years(),
            enrollment: EnrollmentConfig::default(),
            process_all_schools: true,
            audit: AuditConfig::default(),
        }
    }

    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for clery.yml or clery.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .map(|path| Self::load(&path))
            .unwrap_or_else(|| {
                Err(CoreError::ConfigNotFound {
                    path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
                })
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        let ranges = [
            ("fact_years", self.fact_years),
            ("data_years", self.data_years),
            ("enrollment.derived_fte_years", self.enrollment.derived_fte_years),
            ("enrollment.headcount_years", self.enrollment.headcount_years),
        ];
        for (field, range) in ranges {
            if range.is_inverted() {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "{} starts after it ends ({} > {})",
                        field, range.start, range.end
                    ),
                });
            }
        }

        if self
            .enrollment
            .derived_fte_years
            .overlaps(&self.enrollment.headcount_years)
        {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "enrollment windows overlap: derived_fte_years {} and headcount_years {}",
                    self.enrollment.derived_fte_years, self.enrollment.headcount_years
                ),
            });
        }

        let tol = &self.audit.percent_tolerance;
        if tol.small_max_entries > tol.medium_max_entries {
            return Err(CoreError::ConfigInvalid {
                message: "audit.percent_tolerance.small_max_entries exceeds medium_max_entries"
                    .to_string(),
            });
        }
        if [tol.small, tol.medium, tol.large, tol.severe, self.audit.rate_tolerance]
            .iter()
            .any(|t| !t.is_finite() || *t < 0.0)
        {
            return Err(CoreError::ConfigInvalid {
                message: "audit tolerances must be non-negative numbers".to_string(),
            });
        }

        Ok(())
    }

    pub fn raw_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.raw_dir)
    }

    pub fn ipeds_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.ipeds_dir)
    }

    pub fn json_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.json_dir)
    }

    pub fn qa_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.qa_dir)
    }

    /// Staging database location; `:memory:` is passed through untouched.
    pub fn staging_path_resolved(&self, root: &Path) -> String {
        if self.staging_path == ":memory:" {
            self.staging_path.clone()
        } else {
            root.join(&self.staging_path).display().to_string()
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

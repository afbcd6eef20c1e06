//! Check results and run summaries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Failing samples kept per check.
pub const MAX_SAMPLES: usize = 5;

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pending,
    Pass,
    Fail,
    Warning,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStatus::Pending => "PENDING",
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warning => "WARNING",
        };
        f.write_str(s)
    }
}

/// Result of a single audit check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check name
    pub name: String,

    pub status: CheckStatus,

    /// Counters and figures the check computed
    pub details: BTreeMap<String, Value>,

    /// Failure messages; any entry fails the check
    pub errors: Vec<String>,

    /// Expected-variance messages
    pub warnings: Vec<String>,

    /// Up to [`MAX_SAMPLES`] offending rows
    pub samples: Vec<String>,

    /// Execution time in milliseconds
    pub duration_ms: u64,
}

impl CheckResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Pending,
            details: BTreeMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            samples: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn detail(&mut self, key: &str, value: impl Into<Value>) {
        self.details.insert(key.to_string(), value.into());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn sample(&mut self, sample: impl Into<String>) {
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(sample.into());
        }
    }

    /// Settle the status: any error fails, any warning warns, else pass.
    pub fn finish(mut self, duration: Duration) -> Self {
        self.status = if !self.errors.is_empty() {
            CheckStatus::Fail
        } else if !self.warnings.is_empty() {
            CheckStatus::Warning
        } else {
            CheckStatus::Pass
        };
        self.duration_ms = duration.as_millis() as u64;
        self
    }
}

/// Summary of an audit run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl AuditSummary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        Self {
            total_checks: results.len(),
            passed: count(CheckStatus::Pass),
            failed: count(CheckStatus::Fail),
            warnings: count(CheckStatus::Warning),
        }
    }

    /// PASS when every check passed, FAIL when any failed, WARNING otherwise.
    pub fn overall_status(&self) -> CheckStatus {
        if self.failed > 0 {
            CheckStatus::Fail
        } else if self.passed == self.total_checks {
            CheckStatus::Pass
        } else {
            CheckStatus::Warning
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_precedence() {
        let mut result = CheckResult::new("x");
        result.warn("drift");
        assert_eq!(result.clone().finish(Duration::ZERO).status, CheckStatus::Warning);
        result.fail("broken");
        assert_eq!(result.finish(Duration::ZERO).status, CheckStatus::Fail);
        assert_eq!(
            CheckResult::new("y").finish(Duration::ZERO).status,
            CheckStatus::Pass
        );
    }

    #[test]
    fn test_samples_are_capped() {
        let mut result = CheckResult::new("x");
        for i in 0..20 {
            result.sample(i.to_string());
        }
        assert_eq!(result.samples.len(), MAX_SAMPLES);
    }

    #[test]
    fn test_overall_status() {
        let pass = CheckResult::new("a").finish(Duration::ZERO);
        let mut warn = CheckResult::new("b");
        warn.warn("w");
        let warn = warn.finish(Duration::ZERO);
        let mut fail = CheckResult::new("c");
        fail.fail("f");
        let fail = fail.finish(Duration::ZERO);

        let summary = AuditSummary::from_results(&[pass.clone()]);
        assert_eq!(summary.overall_status(), CheckStatus::Pass);
        let summary = AuditSummary::from_results(&[pass.clone(), warn.clone()]);
        assert_eq!(summary.overall_status(), CheckStatus::Warning);
        let summary = AuditSummary::from_results(&[pass, warn, fail]);
        assert_eq!(summary.overall_status(), CheckStatus::Fail);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&CheckStatus::Warning).unwrap(), "\"WARNING\"");
    }
}

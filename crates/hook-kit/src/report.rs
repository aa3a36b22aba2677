//! Validation report types
//!
//! A report is an ordered list of named check results for one target plus an
//! aggregate status derived from them.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Check succeeded
    Pass,
    /// Likely problem, not fatal
    Warning,
    /// Definite problem
    Fail,
}

impl CheckStatus {
    /// Lowercase label used in both output formats.
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warning => "warning",
            CheckStatus::Fail => "fail",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named check with its status and a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Stable check name, e.g. `syntax` or `event:PreToolUs`
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
    /// Explanation shown to the user
    pub message: String,
}

impl CheckResult {
    /// Build a result with any status.
    pub fn new(name: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
        }
    }

    /// Passing result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Pass, message)
    }

    /// Warning result.
    pub fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Warning, message)
    }

    /// Failing result.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Fail, message)
    }
}

/// What a report was produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// A hook script
    Script,
    /// A settings JSON file
    Settings,
}

/// Which settings levels register a script. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Installation {
    /// Registered in `.claude/settings.json`
    pub project: bool,
    /// Registered in `.claude/settings.local.json`
    pub local: bool,
    /// Registered in `~/.claude/settings.json`
    pub user: bool,
    /// Events the script is registered under
    pub events: Vec<String>,
    /// Matchers of those registrations
    pub matchers: Vec<String>,
}

impl Installation {
    /// True if any level registers the script.
    pub fn is_installed(&self) -> bool {
        self.project || self.local || self.user
    }
}

/// All check results for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Path of the validated file
    pub target: PathBuf,
    /// Script or settings
    pub kind: ReportKind,
    /// Results in evaluation order
    pub checks: Vec<CheckResult>,
    /// Settings registrations (script reports only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation: Option<Installation>,
}

impl ValidationReport {
    /// Empty report for a target.
    pub fn new(target: impl Into<PathBuf>, kind: ReportKind) -> Self {
        Self {
            target: target.into(),
            kind,
            checks: Vec::new(),
            installation: None,
        }
    }

    /// Append a check result.
    pub fn push(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// `fail` if any check failed, else `warning` if any warned, else `pass`.
    pub fn aggregate(&self) -> CheckStatus {
        self.checks
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(CheckStatus::Pass)
    }

    /// Look up a check by name.
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Number of checks with the given status.
    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(statuses: &[CheckStatus]) -> ValidationReport {
        let mut report = ValidationReport::new("hook.py", ReportKind::Script);
        for (i, status) in statuses.iter().enumerate() {
            report.push(CheckResult::new(format!("c{}", i), *status, ""));
        }
        report
    }

    #[test]
    fn test_aggregate_rule() {
        use CheckStatus::*;
        assert_eq!(report_with(&[]).aggregate(), Pass);
        assert_eq!(report_with(&[Pass, Pass]).aggregate(), Pass);
        assert_eq!(report_with(&[Pass, Warning, Pass]).aggregate(), Warning);
        assert_eq!(report_with(&[Warning, Fail, Pass]).aggregate(), Fail);
        assert_eq!(report_with(&[Fail]).aggregate(), Fail);
    }

    #[test]
    fn test_installation_does_not_affect_aggregate() {
        let mut report = report_with(&[CheckStatus::Pass]);
        report.installation = Some(Installation::default());
        assert_eq!(report.aggregate(), CheckStatus::Pass);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&CheckStatus::Warning).expect("serialize");
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = ValidationReport::new("/p/.claude/settings.json", ReportKind::Settings);
        report.push(CheckResult::fail("event:PreToolUs", "Unknown event"));
        let value = serde_json::to_value(&report).expect("serialize");
        assert_eq!(value["kind"], "settings");
        assert_eq!(value["checks"][0]["status"], "fail");
        assert!(value.get("installation").is_none());
    }

    #[test]
    fn test_lookup_and_count() {
        let mut report = ValidationReport::new("x.sh", ReportKind::Script);
        report.push(CheckResult::pass("exists", "ok"));
        report.push(CheckResult::warning("stdin", "no read"));
        assert_eq!(report.check("stdin").map(|c| c.status), Some(CheckStatus::Warning));
        assert_eq!(report.count(CheckStatus::Pass), 1);
        assert!(report.check("missing").is_none());
    }
}

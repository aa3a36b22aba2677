//! Report rendering for the terminal and for `--json`.

use std::fmt::Write as _;

use hook_kit::{CheckStatus, Installation, ReportKind, ValidationReport};
use serde::Serialize;

/// Totals across every report of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of reports
    pub targets: usize,
    /// Reports whose aggregate is pass
    pub pass: usize,
    /// Reports whose aggregate is warning
    pub warning: usize,
    /// Reports whose aggregate is fail
    pub fail: usize,
}

impl Summary {
    /// Count aggregates.
    pub fn of(reports: &[ValidationReport]) -> Self {
        reports.iter().fold(
            Summary {
                targets: reports.len(),
                ..Summary::default()
            },
            |mut acc, report| {
                match report.aggregate() {
                    CheckStatus::Pass => acc.pass += 1,
                    CheckStatus::Warning => acc.warning += 1,
                    CheckStatus::Fail => acc.fail += 1,
                }
                acc
            },
        )
    }

    /// Whether the run should exit 0.
    pub fn is_success(&self, allow_warnings: bool) -> bool {
        self.fail == 0 && (allow_warnings || self.warning == 0)
    }
}

#[derive(Serialize)]
struct JsonRun<'a> {
    ok: bool,
    summary: Summary,
    reports: &'a [ValidationReport],
}

fn marker(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "[pass]",
        CheckStatus::Warning => "[warn]",
        CheckStatus::Fail => "[FAIL]",
    }
}

fn describe_installation(installation: &Installation) -> String {
    if !installation.is_installed() {
        return "not registered in any settings file".to_string();
    }
    let levels: Vec<&str> = [
        (installation.project, "project"),
        (installation.local, "local"),
        (installation.user, "user"),
    ]
    .iter()
    .filter(|(present, _)| *present)
    .map(|(_, name)| *name)
    .collect();

    let mut text = format!(
        "registered in {} settings for {}",
        levels.join(", "),
        installation.events.join(", ")
    );
    if !installation.matchers.is_empty() {
        let _ = write!(text, " (matcher {})", installation.matchers.join(", "));
    }
    text
}

/// One report as indented lines, ending in its aggregate.
pub fn render_report(report: &ValidationReport) -> String {
    let kind = match report.kind {
        ReportKind::Script => "script",
        ReportKind::Settings => "settings",
    };
    let mut out = format!("{} ({kind})\n", report.target.display());
    for check in &report.checks {
        let _ = writeln!(
            out,
            "  {} {}: {}",
            marker(check.status),
            check.name,
            check.message
        );
    }
    if let Some(installation) = &report.installation {
        let _ = writeln!(out, "  {}", describe_installation(installation));
    }
    let _ = writeln!(
        out,
        "  => {} ({} pass, {} warning, {} fail)",
        report.aggregate().as_str().to_uppercase(),
        report.count(CheckStatus::Pass),
        report.count(CheckStatus::Warning),
        report.count(CheckStatus::Fail)
    );
    out
}

/// Every report followed by a one-line summary.
pub fn render_human(reports: &[ValidationReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&render_report(report));
        out.push('\n');
    }
    let summary = Summary::of(reports);
    let _ = writeln!(
        out,
        "{} target(s): {} pass, {} warning, {} fail",
        summary.targets, summary.pass, summary.warning, summary.fail
    );
    out
}

/// `{ "ok", "summary", "reports" }` as pretty JSON.
pub fn render_json(
    reports: &[ValidationReport],
    allow_warnings: bool,
) -> Result<String, serde_json::Error> {
    let summary = Summary::of(reports);
    serde_json::to_string_pretty(&JsonRun {
        ok: summary.is_success(allow_warnings),
        summary,
        reports,
    })
}

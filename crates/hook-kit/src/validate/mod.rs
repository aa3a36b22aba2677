//! Hook validation: the script battery and the settings battery
//!
//! Every target produces one independent [`ValidationReport`]. Checks never
//! abort the battery; a check that cannot run reports a warning instead.

mod script;
mod settings;

pub use script::{detect_event, validate_script, SCRIPT_CHECKS};
pub use settings::validate_settings;

use crate::events::HookEvent;
use crate::report::ValidationReport;
use crate::runner::ProcessRunner;
use crate::settings::SettingsPaths;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock bound for the smoke test
pub const DEFAULT_SMOKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default wall-clock bound for the syntax check
pub const DEFAULT_SYNTAX_TIMEOUT: Duration = Duration::from_secs(5);

/// Inputs shared by every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    /// Project root; `CLAUDE_PROJECT_DIR` for smoke tests and command expansion
    pub project_dir: PathBuf,
    /// Home directory for the user-level settings file
    pub home_dir: Option<PathBuf>,
    /// Event forced by the caller, overriding detection
    pub event_hint: Option<HookEvent>,
    /// Smoke test bound
    pub smoke_timeout: Duration,
    /// Syntax check bound
    pub syntax_timeout: Duration,
}

impl ValidationContext {
    /// Context with default timeouts and the home directory from the environment.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            home_dir: dirs::home_dir(),
            event_hint: None,
            smoke_timeout: DEFAULT_SMOKE_TIMEOUT,
            syntax_timeout: DEFAULT_SYNTAX_TIMEOUT,
        }
    }

    /// Settings locations for this project.
    pub fn settings_paths(&self) -> SettingsPaths {
        SettingsPaths::new(&self.project_dir, self.home_dir.clone())
    }

    /// `<project>/.claude/hooks`
    pub fn default_hooks_dir(&self) -> PathBuf {
        self.project_dir.join(".claude").join("hooks")
    }
}

/// Hook scripts directly inside `dir`: regular files ending in `.py` or `.sh`,
/// or whose name starts with `hook`. Sorted; empty when `dir` is missing.
pub fn find_all_hooks(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("No hooks directory at {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut hooks: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let by_ext = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("py") | Some("sh")
            );
            let by_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("hook"));
            by_ext || by_name
        })
        .collect();
    hooks.sort();
    hooks
}

/// Closest ancestor of `start` (inclusive) that contains a `.claude` directory.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".claude").is_dir())
        .map(Path::to_path_buf)
}

/// Validate every script in `hooks_dir`.
pub fn validate_scripts(
    hooks_dir: &Path,
    ctx: &ValidationContext,
    runner: &dyn ProcessRunner,
) -> Vec<ValidationReport> {
    find_all_hooks(hooks_dir)
        .iter()
        .map(|path| validate_script(path, ctx, runner))
        .collect()
}

/// Validate every settings level for the project.
pub fn validate_all_settings(ctx: &ValidationContext) -> Vec<ValidationReport> {
    ctx.settings_paths()
        .all()
        .into_iter()
        .map(|(level, path)| {
            log::debug!("Validating {} settings at {}", level, path.display());
            validate_settings(&path, ctx)
        })
        .collect()
}

/// Whole-project validation: all settings levels, then every script in `hooks_dir`.
pub fn validate_project(
    hooks_dir: &Path,
    ctx: &ValidationContext,
    runner: &dyn ProcessRunner,
) -> Vec<ValidationReport> {
    let mut reports = validate_all_settings(ctx);
    reports.extend(validate_scripts(hooks_dir, ctx, runner));
    reports
}

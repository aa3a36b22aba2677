//! Validate command implementation.
//!
//! Target selection:
//! - `PATH` - one script, a directory of scripts, or a settings `.json` file
//! - `--settings` - the project, local and user settings files
//! - `--project` - all settings files, then every script in the hooks directory
//! - `--all` or nothing - every script in the hooks directory

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use hook_kit::{
    find_project_root, lookup_event, validate_all_settings, validate_project, validate_script,
    validate_scripts, validate_settings, SystemRunner, ValidationContext, ValidationReport,
};
use hookctl::config::schema::Config;
use hookctl::output::{render_human, render_json, Summary};

use super::{project_root, report_error, usage_error};

/// Arguments for `hookctl validate`
#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    /// Script, directory of scripts, or settings JSON file
    #[arg(conflicts_with_all = ["project", "settings", "all"])]
    pub(crate) path: Option<PathBuf>,

    /// Validate every settings level and every script in the hooks directory
    #[arg(long, conflicts_with_all = ["settings", "all"])]
    pub(crate) project: bool,

    /// Validate only the settings files
    #[arg(long, conflicts_with = "all")]
    pub(crate) settings: bool,

    /// Validate every script in the hooks directory
    #[arg(long)]
    pub(crate) all: bool,

    /// Treat scripts as hooks for this event instead of detecting it
    #[arg(long, value_name = "EVENT")]
    pub(crate) event: Option<String>,

    /// Project root [default: nearest ancestor containing .claude/]
    #[arg(long, value_name = "PROJECT")]
    pub(crate) dir: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long)]
    pub(crate) json: bool,

    /// Exit 0 when the worst result is a warning
    #[arg(long)]
    pub(crate) allow_warnings: bool,

    /// Smoke test bound, e.g. 2s or 500ms [default: validate.smoke_timeout]
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub(crate) timeout: Option<Duration>,
}

/// What a run validates, after flag resolution
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    File(PathBuf),
    Directory(PathBuf),
    Settings,
    Project,
    HooksDir,
}

/// Run the selected batteries and exit 0 iff every report passes.
pub(crate) fn run_validate_command(args: ValidateArgs, config: &Config) -> ExitCode {
    let event_hint = match args.event.as_deref().map(lookup_event).transpose() {
        Ok(event) => event,
        Err(e) => return usage_error(e),
    };

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => return report_error(format!("cannot determine working directory: {e}")),
    };
    let target = select_target(&args, &cwd);
    let project_dir = match resolve_project(&args, &target) {
        Ok(dir) => dir,
        Err(e) => return report_error(format!("cannot determine project directory: {e}")),
    };

    let (smoke_timeout, syntax_timeout) = match (
        config.validate.smoke_timeout(),
        config.validate.syntax_timeout(),
    ) {
        (Ok(smoke), Ok(syntax)) => (args.timeout.unwrap_or(smoke), syntax),
        (Err(e), _) | (_, Err(e)) => return report_error(e),
    };

    let ctx = ValidationContext {
        event_hint,
        smoke_timeout,
        syntax_timeout,
        ..ValidationContext::new(&project_dir)
    };
    let hooks_dir = config.scaffold.hooks_dir_in(&project_dir);
    tracing::debug!(?target, project = %project_dir.display(), "validating");

    let reports = collect_reports(&target, &ctx, &hooks_dir);
    if reports.is_empty() && !args.json {
        let searched = match &target {
            Target::Directory(dir) => dir.as_path(),
            _ => hooks_dir.as_path(),
        };
        eprintln!("No hook scripts found in {}", searched.display());
    }

    let allow_warnings = args.allow_warnings || config.validate.allow_warnings;
    if args.json {
        match render_json(&reports, allow_warnings) {
            Ok(text) => println!("{text}"),
            Err(e) => return report_error(e),
        }
    } else if !reports.is_empty() {
        print!("{}", render_human(&reports));
    }

    if Summary::of(&reports).is_success(allow_warnings) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn select_target(args: &ValidateArgs, cwd: &Path) -> Target {
    if let Some(path) = &args.path {
        let base = args
            .dir
            .as_ref()
            .map(|dir| cwd.join(dir))
            .unwrap_or_else(|| cwd.to_path_buf());
        let path = base.join(path);
        return if path.is_dir() {
            Target::Directory(path)
        } else {
            Target::File(path)
        };
    }
    if args.project {
        Target::Project
    } else if args.settings {
        Target::Settings
    } else {
        Target::HooksDir
    }
}

/// `--dir` wins; a path target looks for a project around itself first.
fn resolve_project(args: &ValidateArgs, target: &Target) -> std::io::Result<PathBuf> {
    if args.dir.is_none() {
        if let Target::File(path) | Target::Directory(path) = target {
            if let Some(root) = find_project_root(path) {
                return Ok(root);
            }
        }
    }
    project_root(args.dir.as_deref())
}

fn collect_reports(
    target: &Target,
    ctx: &ValidationContext,
    hooks_dir: &Path,
) -> Vec<ValidationReport> {
    let runner = SystemRunner;
    match target {
        Target::File(path) if is_settings_file(path) => vec![validate_settings(path, ctx)],
        Target::File(path) => vec![validate_script(path, ctx, &runner)],
        Target::Directory(dir) => validate_scripts(dir, ctx, &runner),
        Target::Settings => validate_all_settings(ctx),
        Target::Project => validate_project(hooks_dir, ctx, &runner),
        Target::HooksDir => validate_scripts(hooks_dir, ctx, &runner),
    }
}

fn is_settings_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

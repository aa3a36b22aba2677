//! Command implementations for the hookctl CLI.
//!
//! - `scaffold` - Generate a hook script and its settings snippet
//! - `validate` - Run the check batteries and print reports
//! - `merge` - Merge a settings fragment into a settings file
//! - `config` - Manage the configuration file

pub(crate) mod config;
pub(crate) mod merge;
pub(crate) mod scaffold;
pub(crate) mod validate;

pub(crate) use config::*;
pub(crate) use merge::*;
pub(crate) use scaffold::*;
pub(crate) use validate::*;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit status for invalid invocations, matching clap's own usage errors.
pub(crate) const USAGE_ERROR: u8 = 2;

/// Print a one-line diagnostic and return the failure status.
pub(crate) fn report_error(err: impl std::fmt::Display) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}

/// Print a one-line diagnostic and return the usage-error status.
pub(crate) fn usage_error(err: impl std::fmt::Display) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(USAGE_ERROR)
}

/// `--dir` made absolute, or the nearest ancestor of the working directory
/// containing `.claude/` (the working directory itself when none does).
pub(crate) fn project_root(dir: Option<&Path>) -> std::io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match dir {
        Some(dir) => cwd.join(dir),
        None => hook_kit::find_project_root(&cwd).unwrap_or(cwd),
    })
}

//! Merge command implementation.
//!
//! The only command that modifies a settings file. Merging the same fragment
//! twice leaves the file unchanged, and an unchanged file is not rewritten.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Args;
use hook_kit::{
    merge_fragment, read_settings_or_default, write_settings_atomic, SettingsLevel, SettingsPaths,
};
use serde_json::Value;

use super::{project_root, report_error};

/// Arguments for `hookctl merge`
#[derive(Debug, Args)]
pub(crate) struct MergeArgs {
    /// Fragment file (`{"hooks": {...}}` or a bare event map), or `-` for stdin
    pub(crate) fragment: PathBuf,

    /// Settings file to update: project, local or user
    #[arg(long, value_name = "LEVEL", default_value = "project")]
    pub(crate) level: SettingsLevel,

    /// Project root [default: nearest ancestor containing .claude/]
    #[arg(long, value_name = "PROJECT")]
    pub(crate) dir: Option<PathBuf>,

    /// Print the merged settings instead of writing them
    #[arg(long)]
    pub(crate) dry_run: bool,
}

/// Merge the fragment into the chosen settings file.
pub(crate) fn run_merge_command(args: MergeArgs) -> ExitCode {
    let fragment = match read_fragment(&args.fragment) {
        Ok(fragment) => fragment,
        Err(e) => return report_error(e),
    };

    let project_dir = match project_root(args.dir.as_deref()) {
        Ok(dir) => dir,
        Err(e) => return report_error(format!("cannot determine project directory: {e}")),
    };
    let Some(path) = SettingsPaths::for_project(&project_dir).path(args.level) else {
        return report_error(format!(
            "no home directory, cannot locate {} settings",
            args.level
        ));
    };

    let current = match read_settings_or_default(&path) {
        Ok(value) => value,
        Err(e) => return report_error(e),
    };
    let merged = match merge_fragment(current.clone(), &fragment) {
        Ok(value) => value,
        Err(e) => return report_error(e),
    };

    if args.dry_run {
        return match serde_json::to_string_pretty(&merged) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => report_error(e),
        };
    }

    if merged == current {
        println!("{} already contains these hooks", path.display());
        return ExitCode::SUCCESS;
    }
    if let Err(e) = write_settings_atomic(&path, &merged) {
        return report_error(e);
    }
    tracing::info!(level = %args.level, "merged hooks into {}", path.display());
    println!("Updated {}", path.display());
    ExitCode::SUCCESS
}

fn read_fragment(source: &Path) -> Result<Value, String> {
    let (label, text) = if source.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("failed to read fragment from stdin: {e}"))?;
        ("stdin".to_string(), text)
    } else {
        let text = std::fs::read_to_string(source)
            .map_err(|e| format!("failed to read fragment {}: {e}", source.display()))?;
        (source.display().to_string(), text)
    };
    serde_json::from_str(&text).map_err(|e| format!("invalid fragment JSON in {label}: {e}"))
}

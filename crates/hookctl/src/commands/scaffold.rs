//! Scaffold command implementation.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Args;
use hook_kit::{scaffold, Language, ScaffoldRequest, ScaffoldResult, SettingsLevel, TemplateKind};
use hookctl::config::schema::Config;

use super::{project_root, report_error};

/// Arguments for `hookctl scaffold`
#[derive(Debug, Args)]
pub(crate) struct ScaffoldArgs {
    /// Hook event, e.g. PreToolUse or Stop
    pub(crate) event: String,

    /// Script base name (letters, digits, '-' and '_')
    pub(crate) name: String,

    /// Script language: shell or python [default: per event]
    #[arg(long = "lang", value_name = "LANG")]
    pub(crate) lang: Option<Language>,

    /// One-line description written into the header comment
    #[arg(long, value_name = "TEXT")]
    pub(crate) purpose: Option<String>,

    /// Template family: generic, auto-approve, validator, context-injection,
    /// permission-handler or stop-gate
    #[arg(long, value_name = "KIND", default_value = "generic")]
    pub(crate) template: TemplateKind,

    /// Output directory, relative to the project root [default: scaffold.hooks_dir]
    #[arg(long, value_name = "DIR")]
    pub(crate) out: Option<PathBuf>,

    /// Project root [default: nearest ancestor containing .claude/]
    #[arg(long, value_name = "PROJECT")]
    pub(crate) dir: Option<PathBuf>,

    /// Overwrite an existing script
    #[arg(long)]
    pub(crate) force: bool,

    /// Print only the settings snippet as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

/// Write the script and print where it went plus the snippet to register it.
pub(crate) fn run_scaffold_command(args: ScaffoldArgs, config: &Config) -> ExitCode {
    let project_dir = match project_root(args.dir.as_deref()) {
        Ok(dir) => dir,
        Err(e) => return report_error(format!("cannot determine project directory: {e}")),
    };
    let language = match args.lang {
        Some(language) => Some(language),
        None => match config.scaffold.language() {
            Ok(language) => language,
            Err(e) => return report_error(e),
        },
    };

    let mut request = ScaffoldRequest::new(
        args.event,
        args.name,
        &project_dir,
        Local::now().date_naive(),
    );
    request.language = language;
    request.template = args.template;
    request.purpose = args.purpose;
    request.force = args.force;
    request.out_dir = match args.out {
        Some(out) => project_dir.join(out),
        None => config.scaffold.hooks_dir_in(&project_dir),
    };
    tracing::debug!(?request, "scaffolding hook");

    let result = match scaffold(&request) {
        Ok(result) => result,
        Err(e) => return report_error(e),
    };

    let snippet = match serde_json::to_string_pretty(&result.settings_snippet()) {
        Ok(text) => text,
        Err(e) => return report_error(e),
    };
    if args.json {
        println!("{snippet}");
    } else {
        print_summary(&result, &project_dir, &snippet);
    }
    ExitCode::SUCCESS
}

fn print_summary(result: &ScaffoldResult, project_dir: &std::path::Path, snippet: &str) {
    println!(
        "Created {} ({} {} hook, {} template)",
        result.script_path.display(),
        result.language,
        result.event,
        result.template
    );
    let settings = hook_kit::SettingsPaths::new(project_dir, None)
        .path(SettingsLevel::Project)
        .unwrap_or_else(|| project_dir.join(".claude").join("settings.json"));
    println!();
    println!("Register it by merging this into {}:", settings.display());
    println!("{snippet}");
    println!();
    println!("`hookctl merge <FILE|->` performs the merge for you; `scaffold --json` prints only the snippet.");
}

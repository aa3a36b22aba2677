//! hookctl - CLI entry point
//!
//! Scaffolds Claude Code hook scripts with their settings snippet, validates
//! scripts and settings files, and merges snippets into settings files.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    report_error, run_config_command, run_merge_command, run_scaffold_command,
    run_validate_command, ConfigAction, MergeArgs, ScaffoldArgs, ValidateArgs,
};
use hookctl::config::error::ConfigError;
use hookctl::config::loader::ConfigLoader;
use hookctl::config::schema::{Config, LogLevel};
use hookctl::logging;
use std::process::ExitCode;

/// Claude Code hook scaffolder and validator
#[derive(Parser)]
#[command(name = "hookctl")]
#[command(version, about = "Scaffold and validate Claude Code hooks")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Available subcommands for the hookctl CLI
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Generate a hook script and print the settings snippet that registers it
    Scaffold(ScaffoldArgs),

    /// Check hook scripts and settings files
    Validate(ValidateArgs),

    /// Merge a settings snippet into a settings file
    Merge(MergeArgs),

    /// Manage configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = ConfigLoader::load_default();
    logging::init(loaded.as_ref().map_or(LogLevel::Warn, |config| config.log.level));

    match cli.command {
        Commands::Scaffold(args) => with_config(loaded, |config| run_scaffold_command(args, config)),
        Commands::Validate(args) => with_config(loaded, |config| run_validate_command(args, config)),
        Commands::Merge(args) => run_merge_command(args),
        Commands::Config { action } => run_config_command(action, loaded),
    }
}

/// Run `f` with the loaded config, or report why it could not be loaded.
fn with_config(
    loaded: Result<Config, ConfigError>,
    f: impl FnOnce(&Config) -> ExitCode,
) -> ExitCode {
    match loaded {
        Ok(config) => f(&config),
        Err(e) => report_error(e),
    }
}

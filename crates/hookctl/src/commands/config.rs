//! Config command implementations.

use std::process::ExitCode;

use clap::Subcommand;
use hookctl::config::default::create_default_config;
use hookctl::config::error::ConfigError;
use hookctl::config::schema::Config;
use hookctl::config::xdg;

use super::report_error;

/// Actions for the `config` subcommand.
#[derive(Debug, Subcommand)]
pub(crate) enum ConfigAction {
    /// Create the default configuration file
    Init {
        /// Overwrite existing configuration (creates backup)
        #[arg(long)]
        force: bool,
    },
    /// Show the configuration file path
    Path,
    /// Print the effective configuration as TOML
    Show,
}

/// `loaded` is the result of loading at startup; `init` and `path` work
/// even when it failed.
pub(crate) fn run_config_command(
    action: ConfigAction,
    loaded: Result<Config, ConfigError>,
) -> ExitCode {
    match action {
        ConfigAction::Init { force } => match create_default_config(force) {
            Ok(path) => {
                println!("Created configuration at {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => report_error(e),
        },
        ConfigAction::Path => match xdg::config_path() {
            Ok(path) => {
                println!("{}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => report_error(e),
        },
        ConfigAction::Show => {
            let config = match loaded {
                Ok(config) => config,
                Err(e) => return report_error(e),
            };
            match toml::to_string_pretty(&config) {
                Ok(text) => {
                    print!("{text}");
                    ExitCode::SUCCESS
                }
                Err(e) => report_error(e),
            }
        }
    }
}

//! Default configuration template and file creation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;
use crate::config::xdg;

/// A commented TOML template with all default values.
///
/// Every value here must match `Config::default()` from `schema.rs`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# hookctl configuration
#
# All values shown below are the built-in defaults.
# Command-line flags override anything set here.
#
# Location: $XDG_CONFIG_HOME/hookctl/config.toml (or $HOOKCTL_CONFIG)

# ==============================================================================
# Scaffolding
# ==============================================================================

[scaffold]

# Directory new hook scripts are written into, relative to the project root.
hooks_dir = ".claude/hooks"

# Script language when --lang is not given.
# Options: "", "shell", "python"
#   ""     - per-event default (shell for PreToolUse, python otherwise)
language = ""

# ==============================================================================
# Validation
# ==============================================================================

[validate]

# Wall-clock bound for the smoke test run of each script.
# Examples: "5s", "1500ms", "1m"
smoke_timeout = "5s"

# Wall-clock bound for `bash -n` / the Python parse check.
syntax_timeout = "5s"

# Exit 0 when the worst result is a warning.
allow_warnings = false

# ==============================================================================
# Logging
# ==============================================================================

[log]

# Verbosity when HOOKCTL_LOG is not set. Logs go to stderr.
# Options: "error", "warn", "info", "debug", "trace"
level = "warn"
"#;

/// Creates (or force-overwrites) the default config file.
///
/// - If the file exists and `force` is `false`, returns `ConfigError::AlreadyExists`.
/// - If the file exists and `force` is `true`, backs it up to `.toml.backup` first.
/// - Returns the path where the config was written.
pub fn create_default_config(force: bool) -> Result<PathBuf, ConfigError> {
    let path = xdg::config_path()?;

    if path.exists() {
        if !force {
            return Err(ConfigError::AlreadyExists { path });
        }
        let backup_path = path.with_extension("toml.backup");
        fs::rename(&path, &backup_path).map_err(|e| ConfigError::WriteError {
            path: backup_path.clone(),
            source: e,
        })?;
        tracing::info!("Backed up existing config to {}", backup_path.display());
    }

    write_default_config(&path)?;
    tracing::info!("Created default configuration at {}", path.display());
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let write_err = |source: std::io::Error| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(write_err)
}

//! Platform-aware path resolution for hookctl.
//!
//! - `$HOOKCTL_CONFIG` names the config file directly when set.
//! - Otherwise `$XDG_CONFIG_HOME/hookctl/config.toml`, falling back to
//!   `~/.config/hookctl/config.toml` on every platform.

use std::path::PathBuf;

use crate::config::error::ConfigError;

const APP_NAME: &str = "hookctl";

/// Environment variable that overrides the config file path.
pub const CONFIG_ENV: &str = "HOOKCTL_CONFIG";

/// Returns the configuration directory for hookctl.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/hookctl` (if set and non-empty)
/// 2. `~/.config/hookctl`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join(APP_NAME));
    }
    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Returns the path to the configuration file.
///
/// `$HOOKCTL_CONFIG` wins; otherwise `config_dir()/config.toml`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(explicit));
    }
    Ok(config_dir()?.join("config.toml"))
}

/// True when the path came from `$HOOKCTL_CONFIG` rather than the default.
pub fn is_explicit() -> bool {
    std::env::var_os(CONFIG_ENV).is_some_and(|v| !v.is_empty())
}

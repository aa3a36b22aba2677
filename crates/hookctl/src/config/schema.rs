//! TOML configuration schema for hookctl.
//!
//! Every section and field carries `#[serde(default)]`, so a partial file (or
//! an empty one) deserializes to the built-in defaults. Durations stay strings
//! here and are parsed with `humantime` by the accessors below.

use std::path::PathBuf;
use std::time::Duration;

use hook_kit::Language;
use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// `[scaffold]` section.
    pub scaffold: ScaffoldConfig,
    /// `[validate]` section.
    pub validate: ValidateConfig,
    /// `[log]` section.
    pub log: LogConfig,
}

/// Defaults for `hookctl scaffold`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// Output directory for new scripts, relative to the project root.
    pub hooks_dir: String,
    /// `"shell"`, `"python"`, or empty for the per-event default.
    pub language: String,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            hooks_dir: ".claude/hooks".to_string(),
            language: String::new(),
        }
    }
}

impl ScaffoldConfig {
    /// The configured language, `None` when left empty.
    pub fn language(&self) -> Result<Option<Language>, ConfigError> {
        let trimmed = self.language.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<Language>()
            .map(Some)
            .map_err(|message| ConfigError::InvalidValue {
                key: "scaffold.language".to_string(),
                message,
            })
    }

    /// `hooks_dir` resolved against `project_dir` (absolute values win).
    pub fn hooks_dir_in(&self, project_dir: &std::path::Path) -> PathBuf {
        project_dir.join(&self.hooks_dir)
    }
}

/// Defaults for `hookctl validate`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ValidateConfig {
    /// Smoke test wall-clock bound (humantime, e.g. `"5s"`).
    pub smoke_timeout: String,
    /// Syntax check wall-clock bound.
    pub syntax_timeout: String,
    /// Treat warning-only reports as success.
    pub allow_warnings: bool,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            smoke_timeout: "5s".to_string(),
            syntax_timeout: "5s".to_string(),
            allow_warnings: false,
        }
    }
}

impl ValidateConfig {
    /// Parsed `smoke_timeout`.
    pub fn smoke_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration("validate.smoke_timeout", &self.smoke_timeout)
    }

    /// Parsed `syntax_timeout`.
    pub fn syntax_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration("validate.syntax_timeout", &self.syntax_timeout)
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Verbosity used when `HOOKCTL_LOG` is not set.
    pub level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
        }
    }
}

/// Log verbosity levels (kebab-case in TOML).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings (default).
    Warn,
    /// Informational messages.
    Info,
    /// Debug-level detail.
    Debug,
    /// Full trace output.
    Trace,
}

impl LogLevel {
    /// `EnvFilter` directive for this level.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(value.trim()).map_err(|e| {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{e} (got {value:?})"),
        }
    })?;
    if duration.is_zero() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(duration)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Error types for hook-kit
//!
//! This module defines the error hierarchy using thiserror for structured
//! error handling across the registry, scaffolder, settings and process
//! runner.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Closed-set lookup error
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Scaffolding error
    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),

    /// Settings file error
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Child process error
    #[error(transparent)]
    Run(#[from] RunError),
}

/// Lookups against the static event and template tables
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Event name is not one of the ten recognized names
    #[error("Unknown event '{name}' (valid events: {valid})")]
    UnknownEvent {
        /// The name that was looked up
        name: String,
        /// Comma-separated list of valid names
        valid: String,
    },

    /// No template exists for the language/kind pair
    #[error("No {kind} template for {language}")]
    UnknownTemplate {
        /// Requested language
        language: String,
        /// Requested template kind
        kind: String,
    },
}

/// Scaffolding errors
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// Hook name contains characters outside `[A-Za-z0-9_-]`
    #[error("Invalid hook name '{0}': use letters, digits, '-' and '_' only")]
    InvalidName(String),

    /// Target script already exists and overwrite was not requested
    #[error("File already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    /// Failed to create the output directory or write the script
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Path being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Settings file errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O error reading or writing settings
    #[error("Failed to access settings {path}: {source}")]
    Io {
        /// Settings file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse settings or fragment JSON
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File (or `-` for stdin) that failed to parse
        path: PathBuf,
        /// Parser message with line/column
        message: String,
    },

    /// Settings root or `hooks` value has the wrong JSON type
    #[error("Expected a JSON object for {0}")]
    NotAnObject(String),

    /// An event entry or matcher group has the wrong shape
    #[error("Malformed hook entry: {0}")]
    Malformed(String),

    /// Failed to write settings atomically
    #[error("Failed to write settings atomically: {path} - Safety copy at: {temp_path}")]
    WriteAtomic {
        /// Path to the settings file
        path: PathBuf,
        /// Path to the temporary safety copy
        temp_path: PathBuf,
    },
}

/// Child process errors raised by a [`ProcessRunner`](crate::ProcessRunner)
#[derive(Debug, Error)]
pub enum RunError {
    /// The program could not be started (missing interpreter, no permission)
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while talking to the child
    #[error("I/O error while running child process: {0}")]
    Io(#[source] std::io::Error),

    /// The child exceeded its wall-clock bound and was killed
    #[error("Timed out after {}s", .after.as_secs_f32())]
    Timeout {
        /// The bound that was exceeded
        after: Duration,
    },

    /// The child was terminated by a signal
    #[error("Crashed (terminated by signal {})", .signal.map(|s| s.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    Crashed {
        /// Signal number, if the platform reports one
        signal: Option<i32>,
        /// Captured stderr
        stderr: String,
    },
}

impl RunError {
    /// True when the program itself could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RunError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type alias for hook-kit operations
pub type Result<T> = std::result::Result<T, Error>;

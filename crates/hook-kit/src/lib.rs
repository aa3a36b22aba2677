//! Scaffolding and validation of Claude Code hook scripts
//!
//! This crate generates hook scripts (bash or Python) together with the
//! settings.json fragment that registers them, and validates existing scripts
//! and settings files with a fixed battery of static checks plus one
//! bounded-time smoke test.
//!
//! # Platform Support
//!
//! - macOS: Supported
//! - Linux: Supported
//! - Windows: Scaffolding only (no execute bit, signals or `bash -n`)
//!
//! # Examples
//!
//! ```ignore
//! use chrono::Local;
//! use hook_kit::{scaffold, validate_script, ScaffoldRequest, SystemRunner, ValidationContext};
//!
//! let request = ScaffoldRequest::new("PreToolUse", "validate-bash", ".", Local::now().date_naive());
//! let result = scaffold(&request)?;
//! println!("{}", serde_json::to_string_pretty(&result.settings_snippet())?);
//!
//! let report = validate_script(&result.script_path, &ValidationContext::new("."), &SystemRunner);
//! println!("{}", report.aggregate());
//! ```

#![warn(missing_docs)]

mod error;
mod events;
mod report;
mod runner;
mod scaffold;
mod settings;
mod templates;
mod validate;

// Re-export all public types
pub use error::{Error, RegistryError, Result, RunError, ScaffoldError, SettingsError};
pub use events::{
    lookup_event, unknown_event_payload, valid_event_names, BlockBehavior, EventMetadata,
    HookEvent,
};
pub use report::{CheckResult, CheckStatus, Installation, ReportKind, ValidationReport};
pub use runner::{CommandSpec, ExitOutcome, ProcessRunner, SystemRunner};
pub use scaffold::{render_scaffold, scaffold, validate_hook_name, ScaffoldRequest, ScaffoldResult};
pub use settings::{
    expand_project_dir, find_registrations, list_hooks, merge_fragment, parse_settings,
    quote_word, read_settings, read_settings_or_default, script_in_command, split_words,
    write_settings_atomic, HookEntry, HookHandler, MatcherGroup, ScriptRef, SettingsLevel,
    SettingsPaths, PROJECT_DIR_VAR,
};
pub use templates::{
    comment_text, event_code, lookup_template, render, templates, HookTemplate, Language,
    Placeholders, TemplateKind,
};
pub use validate::{
    detect_event, find_all_hooks, find_project_root, validate_all_settings,
    validate_project, validate_script, validate_scripts, validate_settings, ValidationContext,
    DEFAULT_SMOKE_TIMEOUT, DEFAULT_SYNTAX_TIMEOUT, SCRIPT_CHECKS,
};

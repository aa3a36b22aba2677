//! Settings file I/O and hook fragment merging
//!
//! Reads and writes the assistant's settings JSON files with atomic safety and
//! preserves every non-hook field. Hook entries use this shape:
//! ```json
//! {
//!   "hooks": {
//!     "EventName": [
//!       { "matcher": "optional", "hooks": [{ "type": "command", "command": "..." }] }
//!     ]
//!   }
//! }
//! ```
//!
//! Nothing in this module writes a settings file except
//! [`write_settings_atomic`], and only the `merge` command calls it.

use crate::error::{Result, SettingsError};
use crate::events::{lookup_event, HookEvent};
use crate::report::Installation;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable the dispatcher sets to the project root
pub const PROJECT_DIR_VAR: &str = "CLAUDE_PROJECT_DIR";

/// Where a settings file lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsLevel {
    /// `<project>/.claude/settings.json`, checked in
    Project,
    /// `<project>/.claude/settings.local.json`, not checked in
    Local,
    /// `~/.claude/settings.json`
    User,
}

impl SettingsLevel {
    /// All levels, most specific last.
    pub const ALL: [SettingsLevel; 3] =
        [SettingsLevel::Project, SettingsLevel::Local, SettingsLevel::User];

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingsLevel::Project => "project",
            SettingsLevel::Local => "local",
            SettingsLevel::User => "user",
        }
    }
}

impl fmt::Display for SettingsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "project" => Ok(SettingsLevel::Project),
            "local" => Ok(SettingsLevel::Local),
            "user" => Ok(SettingsLevel::User),
            other => Err(format!(
                "unknown settings level '{}' (expected project, local or user)",
                other
            )),
        }
    }
}

/// Resolves settings file locations for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPaths {
    /// Project root (the directory containing `.claude/`)
    pub project_dir: PathBuf,
    /// Home directory, `None` when it cannot be determined
    pub home_dir: Option<PathBuf>,
}

impl SettingsPaths {
    /// Paths for an explicit project and home directory.
    pub fn new(project_dir: impl Into<PathBuf>, home_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            home_dir,
        }
    }

    /// Paths for a project, with the home directory taken from the environment.
    pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
        Self::new(project_dir, dirs::home_dir())
    }

    /// Settings file for a level. `None` for `User` without a home directory.
    pub fn path(&self, level: SettingsLevel) -> Option<PathBuf> {
        match level {
            SettingsLevel::Project => Some(self.project_dir.join(".claude").join("settings.json")),
            SettingsLevel::Local => Some(
                self.project_dir
                    .join(".claude")
                    .join("settings.local.json"),
            ),
            SettingsLevel::User => self
                .home_dir
                .as_ref()
                .map(|home| home.join(".claude").join("settings.json")),
        }
    }

    /// Every resolvable level with its path.
    pub fn all(&self) -> Vec<(SettingsLevel, PathBuf)> {
        SettingsLevel::ALL
            .into_iter()
            .filter_map(|level| self.path(level).map(|p| (level, p)))
            .collect()
    }
}

/// One matcher group inside an event array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherGroup {
    /// Tool or source pattern; absent for events without matchers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
    /// Handlers run when the group matches
    pub hooks: Vec<HookHandler>,
}

/// Hook handler configuration (matches the settings.json structure)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookHandler {
    /// `command` or `prompt`
    #[serde(rename = "type")]
    pub r#type: String,
    /// Shell command for `command` handlers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Prompt text for `prompt` handlers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Optional timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Optional async flag
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "async")]
    pub r#async: Option<bool>,
    /// Optional spinner text
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "statusMessage"
    )]
    pub status_message: Option<String>,
}

impl HookHandler {
    /// A plain `command` handler.
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            r#type: "command".to_string(),
            command: Some(command.into()),
            prompt: None,
            timeout: None,
            r#async: None,
            status_message: None,
        }
    }
}

/// A flattened registration: event, matcher and handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEntry {
    /// Event the handler is registered under
    pub event: HookEvent,
    /// Matcher of the enclosing group
    pub matcher: Option<String>,
    /// The handler itself
    pub handler: HookHandler,
}

/// Script referenced by a hook command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    /// Resolved script path (relative paths joined onto the project dir)
    pub path: PathBuf,
    /// True when the script is the program itself rather than an interpreter argument
    pub direct: bool,
}

/// Read a settings file and parse it as a JSON object (preserves all fields).
///
/// # Errors
///
/// Returns `SettingsError::Io` if the file cannot be read,
/// `SettingsError::Parse` if the JSON is malformed and
/// `SettingsError::NotAnObject` if the root is not an object.
pub fn read_settings(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(path, &content)
}

/// Like [`read_settings`] but a missing file yields an empty object.
pub fn read_settings_or_default(path: &Path) -> Result<Value> {
    match fs::read_to_string(path) {
        Ok(content) => parse_settings(path, &content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Value::Object(Map::new())),
        Err(source) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}

/// Parse settings text. `path` is only used in error messages.
pub fn parse_settings(path: &Path, content: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(content).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(SettingsError::NotAnObject(path.display().to_string()).into());
    }
    Ok(value)
}

/// Write a settings file atomically with temp-file-then-rename.
///
/// 1. Write to `<name>.tmp.<timestamp>` next to the target
/// 2. Fsync to disk
/// 3. Rename over the target
///
/// On failure before the rename the temp file is kept as a safety copy.
///
/// # Errors
///
/// Returns `SettingsError::Io` if the directory, temp file or fsync fails and
/// `SettingsError::WriteAtomic` if the rename fails.
pub fn write_settings_atomic(path: &Path, value: &Value) -> Result<()> {
    let io_err = |source: std::io::Error| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings.json".to_string());
    let timestamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let temp_path = path.with_file_name(format!("{}.tmp.{}", file_name, timestamp));

    let mut json = serde_json::to_string_pretty(value).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    json.push('\n');

    let mut file = fs::File::create(&temp_path).map_err(io_err)?;
    file.write_all(json.as_bytes()).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|_| SettingsError::WriteAtomic {
        path: path.to_path_buf(),
        temp_path: temp_path.clone(),
    })?;

    log::debug!("Wrote settings to {}", path.display());
    Ok(())
}

/// Merge a hooks fragment into settings (pure function, no I/O).
///
/// `fragment` is either `{"hooks": {...}}` or the bare event map. A handler
/// already registered under the same event and matcher is skipped, so merging
/// the same fragment twice changes nothing. Non-hook keys are preserved.
///
/// # Errors
///
/// `SettingsError::NotAnObject` when settings, `hooks` or the fragment are not
/// objects, `SettingsError::Malformed` for non-array event entries and
/// `RegistryError::UnknownEvent` for event keys outside the closed set.
pub fn merge_fragment(mut settings: Value, fragment: &Value) -> Result<Value> {
    let events = fragment_events(fragment)?;

    let root = settings
        .as_object_mut()
        .ok_or_else(|| SettingsError::NotAnObject("settings".to_string()))?;
    let hooks = root
        .entry("hooks")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| SettingsError::NotAnObject("hooks".to_string()))?;

    for (event_name, groups) in events {
        lookup_event(event_name)?;
        let incoming = groups.as_array().ok_or_else(|| {
            SettingsError::Malformed(format!("'{}' must be an array of matcher groups", event_name))
        })?;

        let existing = hooks
            .entry(event_name.clone())
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| {
                SettingsError::Malformed(format!("existing '{}' entry is not an array", event_name))
            })?;

        for group in incoming {
            merge_group(existing, event_name, group)?;
        }
    }

    Ok(settings)
}

fn fragment_events(fragment: &Value) -> Result<&Map<String, Value>> {
    let obj = fragment
        .as_object()
        .ok_or_else(|| SettingsError::NotAnObject("fragment".to_string()))?;
    match obj.get("hooks") {
        Some(Value::Object(inner)) => Ok(inner),
        Some(_) => Err(SettingsError::NotAnObject("fragment hooks".to_string()).into()),
        None => Ok(obj),
    }
}

fn merge_group(existing: &mut Vec<Value>, event_name: &str, group: &Value) -> Result<()> {
    let matcher = group.get("matcher").cloned();
    let handlers = group
        .get("hooks")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            SettingsError::Malformed(format!("matcher group under '{}' has no hooks array", event_name))
        })?;

    let position = existing
        .iter()
        .position(|g| g.get("matcher").cloned() == matcher && g.get("hooks").is_some_and(Value::is_array));

    let target = match position {
        Some(i) => &mut existing[i],
        None => {
            let mut fresh = Map::new();
            if let Some(m) = &matcher {
                fresh.insert("matcher".to_string(), m.clone());
            }
            fresh.insert("hooks".to_string(), Value::Array(Vec::new()));
            existing.push(Value::Object(fresh));
            let last = existing.len() - 1;
            &mut existing[last]
        }
    };

    let Some(target_hooks) = target.get_mut("hooks").and_then(Value::as_array_mut) else {
        return Err(SettingsError::Malformed(format!("matcher group under '{}'", event_name)).into());
    };

    for handler in handlers {
        if target_hooks.iter().any(|h| same_handler(h, handler)) {
            log::debug!("{} handler already registered, skipping", event_name);
            continue;
        }
        target_hooks.push(handler.clone());
    }
    Ok(())
}

fn same_handler(a: &Value, b: &Value) -> bool {
    ["type", "command", "prompt"]
        .iter()
        .all(|key| a.get(key) == b.get(key))
}

/// List all hooks from settings (pure function, no I/O).
///
/// Unknown event keys and malformed entries are skipped; the validator reports
/// those separately.
pub fn list_hooks(value: &Value) -> Vec<HookEntry> {
    let mut result = Vec::new();

    let hooks_obj = match value.get("hooks").and_then(|h| h.as_object()) {
        Some(obj) => obj,
        None => return result,
    };

    for (event_name, event_array) in hooks_obj {
        let event: HookEvent = match event_name.parse() {
            Ok(e) => e,
            Err(_) => continue,
        };

        let groups = match event_array.as_array() {
            Some(arr) => arr,
            None => continue,
        };

        for group in groups {
            let matcher = group
                .get("matcher")
                .and_then(|m| m.as_str())
                .map(String::from);

            let hooks = match group.get("hooks").and_then(|h| h.as_array()) {
                Some(arr) => arr,
                None => continue,
            };

            for hook in hooks {
                let handler: HookHandler = match serde_json::from_value(hook.clone()) {
                    Ok(h) => h,
                    Err(_) => continue,
                };
                result.push(HookEntry {
                    event,
                    matcher: matcher.clone(),
                    handler,
                });
            }
        }
    }

    result
}

/// Which settings levels register `script`, and under which events and matchers.
///
/// Unreadable or malformed settings files count as "not registered".
pub fn find_registrations(paths: &SettingsPaths, script: &Path) -> Installation {
    let wanted = normalize(script);
    let mut installation = Installation::default();

    for (level, path) in paths.all() {
        let value = match read_settings(&path) {
            Ok(v) => v,
            Err(e) => {
                log::trace!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        for entry in list_hooks(&value) {
            let Some(command) = entry.handler.command.as_deref() else {
                continue;
            };
            let Some(found) = script_in_command(command, &paths.project_dir) else {
                continue;
            };
            if normalize(&found.path) != wanted {
                continue;
            }

            match level {
                SettingsLevel::Project => installation.project = true,
                SettingsLevel::Local => installation.local = true,
                SettingsLevel::User => installation.user = true,
            }
            let event = entry.event.to_string();
            if !installation.events.contains(&event) {
                installation.events.push(event);
            }
            if let Some(matcher) = entry.matcher {
                if !installation.matchers.contains(&matcher) {
                    installation.matchers.push(matcher);
                }
            }
        }
    }

    installation
}

fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Replace `$CLAUDE_PROJECT_DIR` / `${CLAUDE_PROJECT_DIR}` with the project path.
///
/// Surrounding quotes are left in place so the result still tokenizes as one word.
pub fn expand_project_dir(command: &str, project_dir: &Path) -> String {
    let dir = project_dir.to_string_lossy();
    command
        .replace(&format!("${{{}}}", PROJECT_DIR_VAR), &dir)
        .replace(&format!("${}", PROJECT_DIR_VAR), &dir)
}

/// Find the script a hook command runs.
///
/// The first word ending in `.py`, `.sh` or `.bash` after project-dir expansion
/// wins. Relative paths are resolved against `project_dir`.
pub fn script_in_command(command: &str, project_dir: &Path) -> Option<ScriptRef> {
    let expanded = expand_project_dir(command, project_dir);
    let words = split_words(&expanded);

    words.iter().enumerate().find_map(|(i, word)| {
        let is_script = [".py", ".sh", ".bash"].iter().any(|ext| word.ends_with(ext));
        if !is_script {
            return None;
        }
        let raw = PathBuf::from(word);
        let path = if raw.is_absolute() {
            raw
        } else {
            project_dir.join(raw)
        };
        Some(ScriptRef {
            path,
            direct: i == 0,
        })
    })
}

/// Quote `word` for a POSIX shell so it stays one word.
///
/// Words made only of path-safe characters come back unchanged; anything else
/// is single-quoted. [`split_words`] reads the result back as the same word.
pub fn quote_word(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+,:@%=".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Split a command line into words, honoring single quotes, double quotes and
/// backslash escapes. Not a full shell parser.
pub fn split_words(command: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    in_word = true;
                }
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

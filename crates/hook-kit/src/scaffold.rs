//! Hook script scaffolding
//!
//! [`render_scaffold`] turns a request into script text and a settings fragment
//! without touching the filesystem. [`scaffold`] renders and then writes the
//! script. Neither ever modifies a settings file.

use crate::error::{Error, RegistryError, Result, ScaffoldError};
use crate::events::{lookup_event, HookEvent};
use crate::settings::{quote_word, HookHandler, MatcherGroup, PROJECT_DIR_VAR};
use crate::templates::{
    comment_text, event_code, lookup_template, render, HookTemplate, Language, Placeholders,
    TemplateKind,
};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Everything needed to scaffold one hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldRequest {
    /// Event name, resolved against the closed set
    pub event: String,
    /// Script base name, `[A-Za-z0-9_-]+`
    pub hook_name: String,
    /// Language override; the event default applies when `None`
    pub language: Option<Language>,
    /// Template family
    pub template: TemplateKind,
    /// One-line description for the header comment
    pub purpose: Option<String>,
    /// Directory the script is written into, relative to `project_dir` unless
    /// absolute
    pub out_dir: PathBuf,
    /// Project root, used to make the settings command portable
    pub project_dir: PathBuf,
    /// Date written into the header
    pub created: NaiveDate,
    /// Overwrite an existing script
    pub force: bool,
}

impl ScaffoldRequest {
    /// Request with default template, no overrides, writing into
    /// `<project_dir>/.claude/hooks`.
    pub fn new(
        event: impl Into<String>,
        hook_name: impl Into<String>,
        project_dir: impl Into<PathBuf>,
        created: NaiveDate,
    ) -> Self {
        let project_dir = project_dir.into();
        Self {
            event: event.into(),
            hook_name: hook_name.into(),
            language: None,
            template: TemplateKind::Generic,
            purpose: None,
            out_dir: PathBuf::from(".claude").join("hooks"),
            project_dir,
            created,
            force: false,
        }
    }
}

/// A rendered (and possibly written) hook
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldResult {
    /// Where the script goes
    pub script_path: PathBuf,
    /// Full script text
    pub contents: String,
    /// Resolved language
    pub language: Language,
    /// Resolved event
    pub event: HookEvent,
    /// Template actually used (after fallback)
    pub template: TemplateKind,
    /// Command string placed in the fragment
    pub command: String,
    /// `{ "<Event>": [ matcher group ] }`
    pub fragment: Value,
}

impl ScaffoldResult {
    /// The fragment wrapped in a top-level `hooks` object, ready to merge.
    pub fn settings_snippet(&self) -> Value {
        json!({ "hooks": self.fragment })
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static pattern compiles"))
}

/// Check a hook name against `^[A-Za-z0-9_-]+$`.
pub fn validate_hook_name(name: &str) -> Result<()> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidName(name.to_string()).into())
    }
}

/// Render a scaffold without writing anything.
///
/// # Errors
///
/// `ScaffoldError::InvalidName` for a bad name and
/// `RegistryError::UnknownEvent` for an unknown event. An unknown template
/// falls back to the generic one for the language.
pub fn render_scaffold(request: &ScaffoldRequest) -> Result<ScaffoldResult> {
    validate_hook_name(&request.hook_name)?;
    let event = lookup_event(&request.event)?;
    let meta = event.metadata();
    let language = request.language.unwrap_or(meta.default_language);
    let template = resolve_template(language, request.template)?;

    if !template.kind.intended_events().contains(&event) {
        log::warn!(
            "Template '{}' is meant for {:?}, not {}",
            template.kind,
            template.kind.intended_events(),
            event
        );
    }

    let purpose = request
        .purpose
        .as_deref()
        .map(comment_text)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| template.default_purpose.to_string());

    let matcher_line = if meta.accepts_matcher {
        format!(
            "# Matcher: {} (e.g. Write|Edit, Bash, *)\n",
            meta.default_matcher.unwrap_or("*")
        )
    } else {
        String::new()
    };

    let placeholders = Placeholders {
        hook_name: request.hook_name.clone(),
        purpose,
        event: event.to_string(),
        matcher_line,
        created: request.created.format("%Y-%m-%d").to_string(),
        event_code: event_code(event, language).to_string(),
    };
    let contents = render(template.body, &placeholders);

    let file_name = format!("{}.{}", request.hook_name, language.extension());
    let script_path = request.project_dir.join(&request.out_dir).join(file_name);
    let command = settings_command(language, &script_path, &request.project_dir);
    let fragment = build_fragment(event, &command)?;

    Ok(ScaffoldResult {
        script_path,
        contents,
        language,
        event,
        template: template.kind,
        command,
        fragment,
    })
}

/// Render a scaffold and write the script with mode `0o755`.
///
/// # Errors
///
/// Everything [`render_scaffold`] returns, plus `ScaffoldError::AlreadyExists`
/// when the script exists and `force` is false (the file is left untouched)
/// and `ScaffoldError::Io` for filesystem failures.
pub fn scaffold(request: &ScaffoldRequest) -> Result<ScaffoldResult> {
    let result = render_scaffold(request)?;
    write_script(&result.script_path, &result.contents, request.force)?;
    log::info!("Created {}", result.script_path.display());
    Ok(result)
}

fn resolve_template(language: Language, kind: TemplateKind) -> Result<&'static HookTemplate> {
    match lookup_template(language, kind) {
        Ok(t) => Ok(t),
        Err(Error::Registry(RegistryError::UnknownTemplate { .. })) => {
            log::warn!(
                "No {} template for {}, using the generic template",
                kind,
                language
            );
            lookup_template(language, TemplateKind::Generic)
        }
        Err(e) => Err(e),
    }
}

/// Settings command for a script: project-relative when possible.
///
/// Both paths are compared as given; `script_path` has already been joined
/// onto `project_dir`, so no working directory is consulted.
fn settings_command(language: Language, script_path: &Path, project_dir: &Path) -> String {
    match script_path.strip_prefix(project_dir) {
        Ok(rel) => format!(
            "{} \"${}\"/{}",
            language.interpreter(),
            PROJECT_DIR_VAR,
            quote_word(&rel.to_string_lossy())
        ),
        Err(_) => format!(
            "{} {}",
            language.interpreter(),
            quote_word(&script_path.to_string_lossy())
        ),
    }
}

fn build_fragment(event: HookEvent, command: &str) -> Result<Value> {
    let meta = event.metadata();
    let group = MatcherGroup {
        matcher: meta
            .default_matcher
            .filter(|_| meta.accepts_matcher)
            .map(String::from),
        hooks: vec![HookHandler::command(command)],
    };
    let group = serde_json::to_value(group).map_err(|e| {
        crate::error::SettingsError::Malformed(format!("cannot serialize matcher group: {}", e))
    })?;

    let mut fragment = Map::new();
    fragment.insert(event.to_string(), Value::Array(vec![group]));
    Ok(Value::Object(fragment))
}

fn write_script(path: &Path, contents: &str, force: bool) -> Result<()> {
    let io_err = |source: std::io::Error| ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = match options.open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(ScaffoldError::AlreadyExists(path.to_path_buf()).into())
        }
        Err(e) => return Err(io_err(e).into()),
    };
    file.write_all(contents.as_bytes()).map_err(io_err)?;
    drop(file);

    set_executable(path).map_err(io_err)?;
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    fn request(dir: &Path, event: &str, name: &str) -> ScaffoldRequest {
        ScaffoldRequest::new(event, name, dir, date())
    }

    #[test]
    fn test_validate_hook_name() {
        assert!(validate_hook_name("validate-bash").is_ok());
        assert!(validate_hook_name("A_1").is_ok());
        for bad in ["", "has space", "../escape", "semi;colon", "dot.py", "ünï"] {
            let err = validate_hook_name(bad).expect_err("should be invalid");
            assert!(matches!(
                err,
                Error::Scaffold(ScaffoldError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn test_render_pretooluse_shell() {
        let temp = TempDir::new().expect("tempdir");
        let mut req = request(temp.path(), "PreToolUse", "validate-bash");
        req.language = Some(Language::Shell);

        let result = render_scaffold(&req).expect("render");

        assert!(result.contents.starts_with("#!/bin/bash\n"));
        assert!(result.contents.contains("# validate-bash - "));
        assert!(result.contents.contains("# Event: PreToolUse"));
        assert!(result.contents.contains("# Matcher: Write|Edit"));
        assert!(result.contents.contains("# Created: 2026-03-14"));
        assert!(!result.contents.contains("{{"));
        assert_eq!(
            result.script_path,
            temp.path().join(".claude/hooks/validate-bash.sh")
        );
        assert_eq!(
            result.command,
            "bash \"$CLAUDE_PROJECT_DIR\"/.claude/hooks/validate-bash.sh"
        );
        let group = &result.fragment["PreToolUse"][0];
        assert_eq!(group["matcher"], "Write|Edit");
        assert_eq!(group["hooks"][0]["type"], "command");
        assert_eq!(group["hooks"][0]["command"], result.command.as_str());
        assert!(!result.script_path.exists(), "render never writes");
    }

    #[test]
    fn test_stop_fragment_has_no_matcher_key() {
        let temp = TempDir::new().expect("tempdir");
        let result = render_scaffold(&request(temp.path(), "Stop", "gate")).expect("render");
        let group = result.fragment["Stop"][0].as_object().expect("object");
        assert!(!group.contains_key("matcher"));
        assert!(!result.contents.contains("# Matcher:"));
        assert!(result.contents.contains("stop_hook_active"));
    }

    #[test]
    fn test_default_language_per_event() {
        let temp = TempDir::new().expect("tempdir");
        let pre = render_scaffold(&request(temp.path(), "PreToolUse", "a")).expect("render");
        assert_eq!(pre.language, Language::Shell);
        let post = render_scaffold(&request(temp.path(), "PostToolUse", "b")).expect("render");
        assert_eq!(post.language, Language::Python);
        assert!(post.script_path.ends_with("b.py"));
        assert!(post.command.starts_with("python3 "));
    }

    #[test]
    fn test_unknown_event() {
        let temp = TempDir::new().expect("tempdir");
        let err = render_scaffold(&request(temp.path(), "OnFooBar", "x")).expect_err("unknown");
        assert!(matches!(
            err,
            Error::Registry(RegistryError::UnknownEvent { .. })
        ));
    }

    #[test]
    fn test_purpose_is_flattened_into_comment() {
        let temp = TempDir::new().expect("tempdir");
        let mut req = request(temp.path(), "Stop", "p");
        req.purpose = Some("first line\nimport os; os.system('x') {{EVENT}}".to_string());
        let result = render_scaffold(&req).expect("render");
        let header = result
            .contents
            .lines()
            .nth(1)
            .expect("header line");
        assert_eq!(
            header,
            "# p - first line import os; os.system('x') {{EVENT}}"
        );
        assert!(!result.contents.lines().any(|l| l.starts_with("import os;")));
    }

    #[test]
    fn test_unknown_template_falls_back_to_generic() {
        let temp = TempDir::new().expect("tempdir");
        let mut req = request(temp.path(), "Stop", "gate");
        req.language = Some(Language::Shell);
        req.template = TemplateKind::StopGate;
        let result = render_scaffold(&req).expect("fallback");
        assert_eq!(result.template, TemplateKind::Generic);
        assert_eq!(result.language, Language::Shell);
    }

    #[test]
    fn test_specialized_template_is_used() {
        let temp = TempDir::new().expect("tempdir");
        let mut req = request(temp.path(), "PermissionRequest", "perm");
        req.template = TemplateKind::PermissionHandler;
        let result = render_scaffold(&req).expect("render");
        assert_eq!(result.template, TemplateKind::PermissionHandler);
        assert!(result.contents.contains("\"PermissionRequest\""));
        assert_eq!(result.fragment["PermissionRequest"][0]["matcher"], "Bash");
    }

    #[test]
    fn test_script_outside_project_uses_absolute_path() {
        let project = TempDir::new().expect("project");
        let elsewhere = TempDir::new().expect("elsewhere");
        let mut req = request(project.path(), "Stop", "gate");
        req.out_dir = elsewhere.path().to_path_buf();
        let result = render_scaffold(&req).expect("render");
        assert_eq!(
            result.command,
            format!("python3 {}", elsewhere.path().join("gate.py").display())
        );
    }

    #[test]
    fn test_out_dir_with_space_is_quoted() {
        let temp = TempDir::new().expect("tempdir");
        let mut req = request(temp.path(), "Stop", "gate");
        req.out_dir = temp.path().join("my hooks");
        let result = render_scaffold(&req).expect("render");
        assert_eq!(
            result.command,
            "python3 \"$CLAUDE_PROJECT_DIR\"/'my hooks/gate.py'"
        );

        let mut outside = request(Path::new("/srv/app"), "Stop", "gate");
        outside.out_dir = PathBuf::from("/opt/shared hooks");
        let result = render_scaffold(&outside).expect("render");
        assert_eq!(result.command, "python3 '/opt/shared hooks/gate.py'");
    }

    #[test]
    fn test_relative_out_dir_resolves_against_project() {
        let mut req = request(Path::new("/srv/app"), "Stop", "gate");
        req.out_dir = PathBuf::from("tools/hooks");
        let result = render_scaffold(&req).expect("render");
        assert_eq!(result.script_path, PathBuf::from("/srv/app/tools/hooks/gate.py"));
        assert_eq!(
            result.command,
            "python3 \"$CLAUDE_PROJECT_DIR\"/tools/hooks/gate.py"
        );

        let mut relative = request(Path::new("."), "Stop", "gate");
        relative.out_dir = PathBuf::from("hooks");
        let result = render_scaffold(&relative).expect("render");
        assert_eq!(result.command, "python3 \"$CLAUDE_PROJECT_DIR\"/hooks/gate.py");
    }

    #[test]
    fn test_settings_snippet_wraps_fragment() {
        let temp = TempDir::new().expect("tempdir");
        let result = render_scaffold(&request(temp.path(), "SessionStart", "ctx")).expect("render");
        let snippet = result.settings_snippet();
        assert_eq!(snippet["hooks"]["SessionStart"][0]["matcher"], "startup");
    }

    #[test]
    fn test_scaffold_writes_executable_file() {
        let temp = TempDir::new().expect("tempdir");
        let result = scaffold(&request(temp.path(), "UserPromptSubmit", "ctx")).expect("scaffold");
        let written = fs::read_to_string(&result.script_path).expect("read");
        assert_eq!(written, result.contents);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&result.script_path)
                .expect("metadata")
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_second_scaffold_without_force_fails() {
        let temp = TempDir::new().expect("tempdir");
        let req = request(temp.path(), "Stop", "gate");
        let first = scaffold(&req).expect("first");
        fs::write(&first.script_path, "edited by hand").expect("edit");

        let err = scaffold(&req).expect_err("second should fail");
        assert!(matches!(
            err,
            Error::Scaffold(ScaffoldError::AlreadyExists(_))
        ));
        assert_eq!(
            fs::read_to_string(&first.script_path).expect("read"),
            "edited by hand"
        );

        let mut forced = req.clone();
        forced.force = true;
        scaffold(&forced).expect("force overwrites");
        assert_eq!(
            fs::read_to_string(&first.script_path).expect("read"),
            first.contents
        );
    }

    #[test]
    fn test_invalid_name_writes_nothing() {
        let temp = TempDir::new().expect("tempdir");
        let err = scaffold(&request(temp.path(), "Stop", "bad name")).expect_err("invalid");
        assert!(matches!(err, Error::Scaffold(ScaffoldError::InvalidName(_))));
        assert!(!temp.path().join(".claude").exists());
    }
}

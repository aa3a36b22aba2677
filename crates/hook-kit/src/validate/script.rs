use super::ValidationContext;
use crate::error::RunError;
use crate::events::{unknown_event_payload, HookEvent};
use crate::report::{CheckResult, CheckStatus, Installation, ReportKind, ValidationReport};
use crate::runner::{CommandSpec, ExitOutcome, ProcessRunner};
use crate::settings::{find_registrations, PROJECT_DIR_VAR};
use crate::templates::Language;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Script check names in evaluation order.
pub const SCRIPT_CHECKS: [&str; 8] = [
    "exists",
    "executable",
    "shebang",
    "syntax",
    "stdin",
    "exit-codes",
    "stop-guard",
    "smoke-test",
];

const PY_AST_CHECK: &str = "import ast,sys; ast.parse(open(sys.argv[1]).read(), sys.argv[1])";

struct Heuristics {
    py_stdin: Regex,
    sh_stdin: Regex,
    py_exit: Regex,
    sh_exit: Regex,
    event_header: Regex,
}

fn heuristics() -> &'static Heuristics {
    static PATTERNS: OnceLock<Heuristics> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("static pattern compiles");
        Heuristics {
            py_stdin: re(r"json\.load\(\s*sys\.stdin\s*\)|sys\.stdin|json\.loads\("),
            sh_stdin: re(r"\$\(\s*cat\s*\)|\bcat\b|\bread\b|\bjq\b"),
            py_exit: re(r"\bsys\.exit\(\s*[012]\s*\)|\bexit\(\s*[012]\s*\)"),
            sh_exit: re(r"\bexit\s+[012]\b"),
            event_header: re(r"Event:\s*(\w+)"),
        }
    })
}

/// Where the event used by `stop-guard` and `smoke-test` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventSource {
    Explicit,
    Settings,
    Header,
    Content,
}

impl EventSource {
    fn describe(self) -> &'static str {
        match self {
            EventSource::Explicit => "given with --event",
            EventSource::Settings => "from settings registration",
            EventSource::Header => "from Event: header",
            EventSource::Content => "guessed from content",
        }
    }
}

/// Guess the event a script handles from an `Event:` header or the payload
/// fields it reads.
pub fn detect_event(content: &str) -> Option<HookEvent> {
    header_event(content).or_else(|| content_event(content))
}

fn header_event(content: &str) -> Option<HookEvent> {
    heuristics()
        .event_header
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .find_map(|m| m.as_str().parse().ok())
}

fn content_event(content: &str) -> Option<HookEvent> {
    let has = |needle: &str| content.contains(needle);
    if has("stop_hook_active") {
        Some(HookEvent::Stop)
    } else if has("tool_response") {
        Some(HookEvent::PostToolUse)
    } else if has("prompt") && !has("tool_name") {
        Some(HookEvent::UserPromptSubmit)
    } else if has("notification_type") {
        Some(HookEvent::Notification)
    } else if has("\"source\"") && has("startup") {
        Some(HookEvent::SessionStart)
    } else if has("\"reason\"") && !has("tool_name") {
        Some(HookEvent::SessionEnd)
    } else if has("tool_name") {
        Some(HookEvent::PreToolUse)
    } else {
        None
    }
}

/// Run the full script battery on `path`.
///
/// All eight checks are always present, in [`SCRIPT_CHECKS`] order.
pub fn validate_script(
    path: &Path,
    ctx: &ValidationContext,
    runner: &dyn ProcessRunner,
) -> ValidationReport {
    let mut report = ValidationReport::new(path, ReportKind::Script);
    log::debug!("Validating script {}", path.display());

    if !path.exists() {
        report.push(CheckResult::fail(
            "exists",
            format!("Script not found: {}", path.display()),
        ));
        skip_rest(&mut report, "skipped: script not found");
        return report;
    }
    if !path.is_file() {
        report.push(CheckResult::fail(
            "exists",
            format!("Not a regular file: {}", path.display()),
        ));
        skip_rest(&mut report, "skipped: not a regular file");
        return report;
    }
    report.push(CheckResult::pass("exists", "Script exists"));
    report.push(check_executable(path));

    let content = match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            skip_rest(&mut report, &format!("skipped: cannot read script: {}", e));
            return report;
        }
    };

    let (shebang, language) = check_shebang(path, &content);
    report.push(shebang);

    // Child processes run in the project dir, so hand them an absolute path.
    let script = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let syntax = check_syntax(&script, language, ctx, runner);
    let syntax_failed = syntax.status == CheckStatus::Fail;
    report.push(syntax);
    report.push(check_stdin(language, &content));
    report.push(check_exit_codes(language, &content));

    let installation = find_registrations(&ctx.settings_paths(), path);
    let event = resolve_event(ctx, &installation, &content);
    report.push(check_stop_guard(event, &content));

    if syntax_failed {
        report.push(CheckResult::warning(
            "smoke-test",
            "skipped: syntax check failed",
        ));
    } else {
        report.push(check_smoke(&script, language, event.map(|(e, _)| e), ctx, runner));
    }

    report.installation = Some(installation);
    report
}

fn skip_rest(report: &mut ValidationReport, message: &str) {
    let done = report.checks.len();
    for name in SCRIPT_CHECKS.iter().skip(done) {
        report.push(CheckResult::warning(*name, message));
    }
}

#[cfg(unix)]
fn check_executable(path: &Path) -> CheckResult {
    use std::os::unix::fs::PermissionsExt;
    match fs::metadata(path) {
        Ok(meta) if meta.permissions().mode() & 0o111 != 0 => {
            CheckResult::pass("executable", "Script is executable")
        }
        Ok(_) => CheckResult::warning(
            "executable",
            format!("Not executable (run: chmod +x {})", path.display()),
        ),
        Err(e) => CheckResult::warning("executable", format!("Cannot read permissions: {}", e)),
    }
}

#[cfg(not(unix))]
fn check_executable(_path: &Path) -> CheckResult {
    CheckResult::pass("executable", "No execute bit on this platform")
}

fn check_shebang(path: &Path, content: &str) -> (CheckResult, Option<Language>) {
    let first = content.lines().next().unwrap_or("").trim_end();
    let by_extension = Language::from_path(path);

    if !first.starts_with("#!") {
        let msg = match by_extension {
            Some(lang) => format!("No shebang line (add {})", lang.shebang()),
            None => "No shebang line".to_string(),
        };
        return (CheckResult::warning("shebang", msg), by_extension);
    }

    match Language::from_shebang(first) {
        Some(lang) => (
            CheckResult::pass("shebang", format!("Interpreter: {} ({})", lang, first)),
            Some(lang),
        ),
        None => (
            CheckResult::warning("shebang", format!("Unrecognized interpreter: {}", first)),
            by_extension,
        ),
    }
}

fn check_syntax(
    path: &Path,
    language: Option<Language>,
    ctx: &ValidationContext,
    runner: &dyn ProcessRunner,
) -> CheckResult {
    let Some(language) = language else {
        return CheckResult::warning("syntax", "Unknown language, syntax not checked");
    };

    let script = path.to_string_lossy().into_owned();
    let cmd = match language {
        Language::Python => CommandSpec::new("python3")
            .arg("-c")
            .arg(PY_AST_CHECK)
            .arg(script),
        Language::Shell => CommandSpec::new("bash").arg("-n").arg(script),
    };

    match runner.run_with_timeout(&cmd, b"", ctx.syntax_timeout) {
        Ok(ExitOutcome { code: 0, .. }) => {
            CheckResult::pass("syntax", format!("Valid {} syntax", language))
        }
        Ok(outcome) => CheckResult::fail(
            "syntax",
            format!("Syntax error: {}", summarize(&outcome.stderr, language)),
        ),
        Err(e) if e.is_not_found() => CheckResult::warning(
            "syntax",
            format!("{} not available, syntax not checked", cmd.program),
        ),
        Err(e @ RunError::Timeout { .. }) => {
            CheckResult::warning("syntax", format!("Syntax check {}", e.to_string().to_lowercase()))
        }
        Err(e) => CheckResult::warning("syntax", format!("Syntax check could not run: {}", e)),
    }
}

/// Condense parser stderr to one line. Python puts the error last, bash first.
fn summarize(stderr: &str, language: Language) -> String {
    let mut lines = stderr.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = match language {
        Language::Python => lines.last(),
        Language::Shell => lines.next(),
    };
    line.unwrap_or("parser exited with an error").to_string()
}

fn check_stdin(language: Option<Language>, content: &str) -> CheckResult {
    let h = heuristics();
    let found = match language {
        Some(Language::Python) => h.py_stdin.is_match(content),
        Some(Language::Shell) => h.sh_stdin.is_match(content),
        None => h.py_stdin.is_match(content) || h.sh_stdin.is_match(content),
    };
    if found {
        CheckResult::pass("stdin", "Reads hook input from stdin")
    } else {
        CheckResult::warning(
            "stdin",
            "No stdin read found; hooks receive their payload as JSON on stdin",
        )
    }
}

fn check_exit_codes(language: Option<Language>, content: &str) -> CheckResult {
    let h = heuristics();
    let found = match language {
        Some(Language::Python) => h.py_exit.is_match(content),
        Some(Language::Shell) => h.sh_exit.is_match(content),
        None => h.py_exit.is_match(content) || h.sh_exit.is_match(content),
    };
    if found {
        CheckResult::pass("exit-codes", "Uses explicit exit codes")
    } else {
        CheckResult::warning(
            "exit-codes",
            "No explicit exit 0/1/2 found (0 = success, 2 = block)",
        )
    }
}

fn resolve_event(
    ctx: &ValidationContext,
    installation: &Installation,
    content: &str,
) -> Option<(HookEvent, EventSource)> {
    if let Some(event) = ctx.event_hint {
        return Some((event, EventSource::Explicit));
    }

    let registered: Vec<HookEvent> = installation
        .events
        .iter()
        .filter_map(|e| e.parse().ok())
        .collect();
    let from_settings = registered
        .iter()
        .copied()
        .find(|e| e.is_stop())
        .or_else(|| registered.first().copied());
    if let Some(event) = from_settings {
        return Some((event, EventSource::Settings));
    }

    if let Some(event) = header_event(content) {
        return Some((event, EventSource::Header));
    }
    content_event(content).map(|e| (e, EventSource::Content))
}

fn check_stop_guard(event: Option<(HookEvent, EventSource)>, content: &str) -> CheckResult {
    match event {
        Some((event, source)) if event.is_stop() => {
            if content.contains("stop_hook_active") {
                CheckResult::pass(
                    "stop-guard",
                    format!("{} hook checks stop_hook_active ({})", event, source.describe()),
                )
            } else {
                CheckResult::warning(
                    "stop-guard",
                    format!(
                        "{} hook never reads stop_hook_active; it can keep the agent running forever ({})",
                        event,
                        source.describe()
                    ),
                )
            }
        }
        Some((event, source)) => CheckResult::pass(
            "stop-guard",
            format!("Not required for {} ({})", event, source.describe()),
        ),
        None => CheckResult::warning(
            "stop-guard",
            "Could not determine the event (use --event)",
        ),
    }
}

fn check_smoke(
    path: &Path,
    language: Option<Language>,
    event: Option<HookEvent>,
    ctx: &ValidationContext,
    runner: &dyn ProcessRunner,
) -> CheckResult {
    let Some(language) = language else {
        return CheckResult::warning("smoke-test", "Unknown language, smoke test skipped");
    };

    let payload = event
        .map(HookEvent::sample_payload)
        .unwrap_or_else(unknown_event_payload);
    let mut cmd = CommandSpec::new(language.interpreter())
        .arg(path.to_string_lossy().into_owned())
        .env(PROJECT_DIR_VAR, ctx.project_dir.to_string_lossy().into_owned());
    if ctx.project_dir.is_dir() {
        cmd = cmd.cwd(&ctx.project_dir);
    }

    let outcome = match runner.run_with_timeout(&cmd, payload.to_string().as_bytes(), ctx.smoke_timeout) {
        Ok(outcome) => outcome,
        Err(e) if e.is_not_found() => {
            return CheckResult::warning(
                "smoke-test",
                format!("{} not available, smoke test skipped", cmd.program),
            )
        }
        Err(e) => return CheckResult::fail("smoke-test", e.to_string()),
    };

    let stderr = outcome.stderr.trim();
    let meaning = match outcome.code {
        0 => "success",
        1 => "non-blocking error, logged only",
        2 => "blocking",
        code => {
            let mut message = format!("Unexpected exit code {}", code);
            if !stderr.is_empty() {
                message.push_str(&format!(": {}", truncate(stderr, 120)));
            }
            return CheckResult::fail("smoke-test", message);
        }
    };

    let stdout = outcome.stdout.trim();
    let output = if stdout.is_empty() {
        String::new()
    } else if serde_json::from_str::<serde_json::Value>(stdout).is_ok() {
        ", valid JSON output".to_string()
    } else {
        ", text output".to_string()
    };
    let summary = format!("Exit {} ({}){}", outcome.code, meaning, output);

    // Exit 2 feeds stderr back to the agent; anywhere else it is stray output.
    if outcome.code != 2 && !stderr.is_empty() {
        return CheckResult::warning(
            "smoke-test",
            format!("{}, unexpected stderr: {}", summary, truncate(stderr, 100)),
        );
    }
    CheckResult::pass("smoke-test", summary)
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((i, _)) => format!("{}...", &text[..i]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn ctx(dir: &Path) -> ValidationContext {
        ValidationContext {
            home_dir: None,
            ..ValidationContext::new(dir)
        }
    }

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).expect("write script");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        }
        path
    }

    fn exit_with(code: i32) -> impl Fn(&CommandSpec, &[u8], Duration) -> Result<ExitOutcome, RunError> {
        move |_cmd, _input, _t| {
            Ok(ExitOutcome {
                code,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    const GOOD_PY: &str = "#!/usr/bin/env python3\n# Event: PreToolUse\nimport json, sys\ndata = json.load(sys.stdin)\nsys.exit(0)\n";

    fn status(report: &ValidationReport, name: &str) -> CheckStatus {
        report.check(name).map(|c| c.status).expect("check present")
    }

    #[test]
    fn test_missing_script_reports_all_checks() {
        let temp = TempDir::new().expect("tempdir");
        let report = validate_script(&temp.path().join("nope.py"), &ctx(temp.path()), &exit_with(0));
        let names: Vec<&str> = report.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, SCRIPT_CHECKS);
        assert_eq!(status(&report, "exists"), CheckStatus::Fail);
        assert_eq!(status(&report, "smoke-test"), CheckStatus::Warning);
        assert_eq!(report.aggregate(), CheckStatus::Fail);
    }

    #[test]
    fn test_good_script_passes_with_stub_runner() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "guard.py", GOOD_PY);
        let report = validate_script(&path, &ctx(temp.path()), &exit_with(0));
        for check in &report.checks {
            assert_eq!(check.status, CheckStatus::Pass, "{}: {}", check.name, check.message);
        }
        assert!(report.installation.is_some());
    }

    #[test]
    fn test_syntax_failure_skips_smoke_test() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "broken.py", GOOD_PY);
        let runner = |cmd: &CommandSpec, _i: &[u8], _t: Duration| -> Result<ExitOutcome, RunError> {
            assert_eq!(cmd.program, "python3");
            Ok(ExitOutcome {
                code: 1,
                stdout: String::new(),
                stderr: "  File \"broken.py\", line 3\nSyntaxError: invalid syntax\n".to_string(),
            })
        };
        let report = validate_script(&path, &ctx(temp.path()), &runner);
        let syntax = report.check("syntax").expect("syntax check");
        assert_eq!(syntax.status, CheckStatus::Fail);
        assert!(syntax.message.contains("SyntaxError: invalid syntax"));
        assert_eq!(status(&report, "smoke-test"), CheckStatus::Warning);
        assert_eq!(report.checks.len(), 8);
        assert_eq!(report.aggregate(), CheckStatus::Fail);
    }

    #[test]
    fn test_missing_interpreter_is_warning() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "guard.py", GOOD_PY);
        let runner = |cmd: &CommandSpec, _i: &[u8], _t: Duration| -> Result<ExitOutcome, RunError> {
            Err(RunError::Spawn {
                program: cmd.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        };
        let report = validate_script(&path, &ctx(temp.path()), &runner);
        assert_eq!(status(&report, "syntax"), CheckStatus::Warning);
        assert_eq!(status(&report, "smoke-test"), CheckStatus::Warning);
        assert_eq!(report.aggregate(), CheckStatus::Warning);
    }

    #[test]
    fn test_smoke_timeout_and_crash_fail() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "slow.sh", "#!/bin/bash\nINPUT=$(cat)\nexit 0\n");

        let timeout = |cmd: &CommandSpec, _i: &[u8], t: Duration| -> Result<ExitOutcome, RunError> {
            if cmd.args.first().map(String::as_str) == Some("-n") {
                return Ok(ExitOutcome { code: 0, stdout: String::new(), stderr: String::new() });
            }
            Err(RunError::Timeout { after: t })
        };
        let report = validate_script(&path, &ctx(temp.path()), &timeout);
        let smoke = report.check("smoke-test").expect("smoke");
        assert_eq!(smoke.status, CheckStatus::Fail);
        assert!(smoke.message.contains("Timed out after 5s"));

        let crash = |cmd: &CommandSpec, _i: &[u8], _t: Duration| -> Result<ExitOutcome, RunError> {
            if cmd.args.first().map(String::as_str) == Some("-n") {
                return Ok(ExitOutcome { code: 0, stdout: String::new(), stderr: String::new() });
            }
            Err(RunError::Crashed { signal: Some(11), stderr: String::new() })
        };
        let report = validate_script(&path, &ctx(temp.path()), &crash);
        assert_eq!(status(&report, "smoke-test"), CheckStatus::Fail);
    }

    #[test]
    fn test_syntax_timeout_warns_and_smoke_still_runs() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "guard.py", GOOD_PY);
        let smoke_runs = RefCell::new(0);
        let runner = |cmd: &CommandSpec, _i: &[u8], t: Duration| -> Result<ExitOutcome, RunError> {
            if cmd.args.first().map(String::as_str) == Some("-c") {
                return Err(RunError::Timeout { after: t });
            }
            *smoke_runs.borrow_mut() += 1;
            Ok(ExitOutcome { code: 0, stdout: String::new(), stderr: String::new() })
        };
        let report = validate_script(&path, &ctx(temp.path()), &runner);

        let syntax = report.check("syntax").expect("syntax");
        assert_eq!(syntax.status, CheckStatus::Warning);
        assert!(syntax.message.contains("timed out"), "{}", syntax.message);
        assert_eq!(*smoke_runs.borrow(), 1);
        assert_eq!(status(&report, "smoke-test"), CheckStatus::Pass);
        assert_eq!(report.aggregate(), CheckStatus::Warning);
    }

    #[test]
    fn test_smoke_stderr_warns_unless_blocking() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "guard.py", GOOD_PY);
        let smoke_exit = |code: i32| {
            move |cmd: &CommandSpec, _i: &[u8], _t: Duration| -> Result<ExitOutcome, RunError> {
                if cmd.args.first().map(String::as_str) == Some("-c") {
                    return Ok(ExitOutcome { code: 0, stdout: String::new(), stderr: String::new() });
                }
                Ok(ExitOutcome { code, stdout: String::new(), stderr: "careful\n".to_string() })
            }
        };

        let report = validate_script(&path, &ctx(temp.path()), &smoke_exit(1));
        let smoke = report.check("smoke-test").expect("smoke");
        assert_eq!(smoke.status, CheckStatus::Warning);
        assert!(smoke.message.contains("logged only"), "{}", smoke.message);
        assert!(smoke.message.contains("unexpected stderr: careful"), "{}", smoke.message);

        let report = validate_script(&path, &ctx(temp.path()), &smoke_exit(2));
        assert_eq!(status(&report, "smoke-test"), CheckStatus::Pass);
    }

    #[test]
    fn test_unexpected_exit_code_fails() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "guard.py", GOOD_PY);
        let runner = |cmd: &CommandSpec, _i: &[u8], _t: Duration| -> Result<ExitOutcome, RunError> {
            let code = if cmd.args.first().map(String::as_str) == Some("-c") { 0 } else { 3 };
            Ok(ExitOutcome { code, stdout: String::new(), stderr: "boom".to_string() })
        };
        let report = validate_script(&path, &ctx(temp.path()), &runner);
        let smoke = report.check("smoke-test").expect("smoke");
        assert_eq!(smoke.status, CheckStatus::Fail);
        assert!(smoke.message.contains("exit code 3"));
        assert!(smoke.message.contains("boom"));
    }

    #[test]
    fn test_smoke_payload_and_env() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(
            temp.path(),
            "gate.py",
            "#!/usr/bin/env python3\nimport json, sys\nd = json.load(sys.stdin)\nif d.get('stop_hook_active'):\n    sys.exit(0)\nsys.exit(0)\n",
        );
        let seen = RefCell::new(Vec::new());
        let runner = |cmd: &CommandSpec, input: &[u8], _t: Duration| -> Result<ExitOutcome, RunError> {
            seen.borrow_mut().push((cmd.clone(), input.to_vec()));
            Ok(ExitOutcome { code: 0, stdout: "{\"ok\": true}".to_string(), stderr: String::new() })
        };
        let report = validate_script(&path, &ctx(temp.path()), &runner);

        let calls = seen.borrow();
        let (cmd, input) = calls.last().expect("smoke call");
        assert_eq!(cmd.program, "python3");
        assert_eq!(
            cmd.env.get("CLAUDE_PROJECT_DIR").map(String::as_str),
            Some(temp.path().to_string_lossy().as_ref())
        );
        let payload: serde_json::Value = serde_json::from_slice(input).expect("json payload");
        assert_eq!(payload["hook_event_name"], "Stop");
        assert_eq!(payload["stop_hook_active"], false);
        assert!(report.check("smoke-test").expect("smoke").message.contains("valid JSON"));
        assert_eq!(status(&report, "stop-guard"), CheckStatus::Pass);
    }

    #[test]
    fn test_stop_hook_without_guard_warns() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(
            temp.path(),
            "stop.py",
            "#!/usr/bin/env python3\n# Event: Stop\nimport json, sys\njson.load(sys.stdin)\nsys.exit(0)\n",
        );
        let report = validate_script(&path, &ctx(temp.path()), &exit_with(0));
        let guard = report.check("stop-guard").expect("stop-guard");
        assert_eq!(guard.status, CheckStatus::Warning);
        assert!(guard.message.contains("stop_hook_active"));
    }

    #[test]
    fn test_event_hint_overrides_header() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "guard.py", GOOD_PY);
        let mut context = ctx(temp.path());
        context.event_hint = Some(HookEvent::SubagentStop);
        let report = validate_script(&path, &context, &exit_with(0));
        assert_eq!(status(&report, "stop-guard"), CheckStatus::Warning);
    }

    #[test]
    fn test_unknown_event_warns_and_uses_fallback_payload() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "plain.sh", "#!/bin/bash\nINPUT=$(cat)\nexit 0\n");
        let payloads = RefCell::new(Vec::new());
        let runner = |_c: &CommandSpec, input: &[u8], _t: Duration| -> Result<ExitOutcome, RunError> {
            payloads.borrow_mut().push(input.to_vec());
            Ok(ExitOutcome { code: 0, stdout: String::new(), stderr: String::new() })
        };
        let report = validate_script(&path, &ctx(temp.path()), &runner);
        assert_eq!(status(&report, "stop-guard"), CheckStatus::Warning);
        let last = payloads.borrow().last().cloned().expect("smoke input");
        let payload: serde_json::Value = serde_json::from_slice(&last).expect("json");
        assert_eq!(payload["hook_event_name"], "Unknown");
    }

    #[test]
    fn test_heuristic_warnings() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "bare.py", "print('hi')\n");
        let report = validate_script(&path, &ctx(temp.path()), &exit_with(0));
        assert_eq!(status(&report, "shebang"), CheckStatus::Warning);
        assert_eq!(status(&report, "stdin"), CheckStatus::Warning);
        assert_eq!(status(&report, "exit-codes"), CheckStatus::Warning);
        assert_eq!(report.aggregate(), CheckStatus::Warning);
    }

    #[cfg(unix)]
    #[test]
    fn test_not_executable_warns() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().expect("tempdir");
        let path = write_script(temp.path(), "guard.py", GOOD_PY);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");
        let report = validate_script(&path, &ctx(temp.path()), &exit_with(0));
        let check = report.check("executable").expect("executable");
        assert_eq!(check.status, CheckStatus::Warning);
        assert!(check.message.contains("chmod +x"));
    }

    #[test]
    fn test_detect_event() {
        assert_eq!(detect_event("# Event: SessionEnd\n"), Some(HookEvent::SessionEnd));
        assert_eq!(detect_event("# Event: Bogus\nx = d['tool_response']"), Some(HookEvent::PostToolUse));
        assert_eq!(detect_event("d.get('prompt')"), Some(HookEvent::UserPromptSubmit));
        assert_eq!(detect_event("d['tool_name']"), Some(HookEvent::PreToolUse));
        assert_eq!(detect_event("echo hi"), None);
    }

    #[test]
    fn test_summarize_and_truncate() {
        assert_eq!(
            summarize("Traceback\n  x\nSyntaxError: bad\n", Language::Python),
            "SyntaxError: bad"
        );
        assert_eq!(
            summarize("x.sh: line 3: syntax error\nmore\n", Language::Shell),
            "x.sh: line 3: syntax error"
        );
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ab", 3), "ab");
    }
}

use super::ValidationContext;
use crate::events::{valid_event_names, HookEvent};
use crate::report::{CheckResult, ReportKind, ValidationReport};
use crate::settings::script_in_command;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Run the settings battery on one settings file.
///
/// A missing file passes: it just means no hooks at that level.
pub fn validate_settings(path: &Path, ctx: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new(path, ReportKind::Settings);
    log::debug!("Validating settings {}", path.display());

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            report.push(CheckResult::pass(
                "json",
                "File not found (no hooks at this level)",
            ));
            return report;
        }
        Err(e) => {
            report.push(CheckResult::fail("json", format!("Cannot read file: {}", e)));
            return report;
        }
    };

    let settings: Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            report.push(CheckResult::fail("json", format!("Invalid JSON: {}", e)));
            return report;
        }
    };
    report.push(CheckResult::pass("json", "Valid JSON"));

    let Some(root) = settings.as_object() else {
        report.push(CheckResult::fail("hooks", "Top level is not a JSON object"));
        return report;
    };

    let hooks = match root.get("hooks") {
        None => {
            report.push(CheckResult::pass("hooks", "No hooks configured"));
            return report;
        }
        Some(Value::Object(hooks)) => hooks,
        Some(_) => {
            report.push(CheckResult::fail("hooks", "\"hooks\" must be an object keyed by event"));
            return report;
        }
    };
    report.push(CheckResult::pass(
        "hooks",
        format!("{} event type(s) configured", hooks.len()),
    ));

    for (key, groups) in hooks {
        let event: HookEvent = match key.parse() {
            Ok(event) => event,
            Err(_) => {
                report.push(CheckResult::fail(
                    format!("event:{}", key),
                    format!("Unknown event '{}' (valid events: {})", key, valid_event_names()),
                ));
                continue;
            }
        };

        let Some(groups) = groups.as_array() else {
            report.push(CheckResult::fail(
                format!("event:{}", key),
                "Expected an array of matcher groups",
            ));
            continue;
        };
        report.push(CheckResult::pass(
            format!("event:{}", key),
            format!("{} matcher group(s)", groups.len()),
        ));

        for (i, group) in groups.iter().enumerate() {
            check_group(&mut report, event, i, group, ctx);
        }
    }

    report
}

fn check_group(
    report: &mut ValidationReport,
    event: HookEvent,
    i: usize,
    group: &Value,
    ctx: &ValidationContext,
) {
    let name = format!("matcher:{}[{}]", event, i);
    let meta = event.metadata();

    if !group.is_object() {
        report.push(CheckResult::fail(name, "Matcher group is not an object"));
        return;
    }

    match group.get("matcher") {
        Some(_) if !meta.accepts_matcher => report.push(CheckResult::warning(
            name,
            format!("Matcher is ignored: {} does not support matchers", event),
        )),
        Some(Value::String(m)) => {
            report.push(CheckResult::pass(name, format!("Matcher '{}'", m)))
        }
        Some(other) => report.push(CheckResult::warning(
            name,
            format!("Matcher should be a string, found {}", other),
        )),
        None => report.push(CheckResult::pass(name, "No matcher (matches everything)")),
    }

    let Some(handlers) = group.get("hooks").and_then(Value::as_array) else {
        report.push(CheckResult::fail(
            format!("hooks:{}[{}]", event, i),
            "Matcher group has no \"hooks\" array",
        ));
        return;
    };

    for (j, handler) in handlers.iter().enumerate() {
        report.push(check_handler(event, i, j, handler, ctx));
    }
}

fn check_handler(
    event: HookEvent,
    i: usize,
    j: usize,
    handler: &Value,
    ctx: &ValidationContext,
) -> CheckResult {
    let name = format!("command:{}[{}][{}]", event, i, j);
    let kind = handler
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("command");
    let text = |key: &str| {
        handler
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("")
    };

    match kind {
        "command" => {
            let command = text("command");
            if command.is_empty() {
                return CheckResult::fail(name, "Empty command");
            }
            let Some(script) = script_in_command(command, &ctx.project_dir) else {
                return CheckResult::warning(
                    name,
                    format!("Could not identify a script in: {}", command),
                );
            };
            if !script.path.exists() {
                return CheckResult::fail(
                    name,
                    format!("Script not found: {}", script.path.display()),
                );
            }
            if script.direct && !is_executable(&script.path) {
                return CheckResult::warning(
                    name,
                    format!(
                        "Script is run directly but is not executable: {}",
                        script.path.display()
                    ),
                );
            }
            CheckResult::pass(name, format!("Script exists: {}", script.path.display()))
        }
        "prompt" => {
            if text("prompt").is_empty() {
                CheckResult::fail(name, "Empty prompt")
            } else if !event.metadata().can_block() {
                CheckResult::warning(
                    name,
                    format!("Prompt hooks on {} cannot block operations", event),
                )
            } else {
                CheckResult::pass(name, "Prompt hook configured")
            }
        }
        other => CheckResult::warning(name, format!("Unknown handler type '{}'", other)),
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

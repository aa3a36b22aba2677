//! Scaffold → validate round trips with real interpreters
//!
//! Every scaffolded script must come out of the validator with no failures in
//! the structural checks. Tests that need `bash` or `python3` return early when
//! the interpreter is missing.

use chrono::NaiveDate;
use hook_kit::{
    merge_fragment, read_settings_or_default, scaffold, templates, validate_script,
    validate_settings, write_settings_atomic, CheckStatus, HookEvent, Language, ScaffoldRequest,
    SystemRunner, TemplateKind, ValidationContext,
};
use serial_test::serial;
use std::process::{Command, Stdio};
use tempfile::tempdir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn has_interpreter(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date")
}

fn context(project: &std::path::Path) -> ValidationContext {
    ValidationContext {
        home_dir: None,
        ..ValidationContext::new(project)
    }
}

#[test]
#[serial(interpreters)]
fn test_every_event_and_language_scaffolds_cleanly() {
    init_logging();
    if !has_interpreter("bash") || !has_interpreter("python3") {
        eprintln!("skipping: bash and python3 required");
        return;
    }

    let project = tempdir().expect("Failed to create temp directory");
    std::fs::create_dir_all(project.path().join(".claude")).expect("mkdir");

    for event in HookEvent::ALL {
        for language in [Language::Shell, Language::Python] {
            let name = format!("{}-{}", event.as_str().to_lowercase(), language);
            let mut request = ScaffoldRequest::new(event.as_str(), &name, project.path(), date());
            request.language = Some(language);

            let result = scaffold(&request).expect("Scaffold should succeed");
            let report = validate_script(&result.script_path, &context(project.path()), &SystemRunner);

            for check in &report.checks {
                assert_ne!(
                    check.status,
                    CheckStatus::Fail,
                    "{} {}: {} failed: {}",
                    event,
                    language,
                    check.name,
                    check.message
                );
            }
            for name in ["exists", "executable", "shebang", "exit-codes", "stop-guard"] {
                assert_eq!(
                    report.check(name).map(|c| c.status),
                    Some(CheckStatus::Pass),
                    "{} {}: {} should pass",
                    event,
                    language,
                    name
                );
            }
        }
    }
}

#[test]
#[serial(interpreters)]
fn test_specialized_templates_validate_for_intended_events() {
    init_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 required");
        return;
    }

    let project = tempdir().expect("Failed to create temp directory");
    for template in templates().iter().filter(|t| t.kind != TemplateKind::Generic) {
        let event = template.kind.intended_events()[0];
        let name = template.kind.as_str().to_string();
        let mut request = ScaffoldRequest::new(event.as_str(), &name, project.path(), date());
        request.template = template.kind;

        let result = scaffold(&request).expect("Scaffold should succeed");
        assert_eq!(result.template, template.kind);

        let report = validate_script(&result.script_path, &context(project.path()), &SystemRunner);
        assert_ne!(
            report.aggregate(),
            CheckStatus::Fail,
            "{} template: {:?}",
            name,
            report.checks
        );
    }
}

#[test]
#[serial(interpreters)]
fn test_broken_python_reports_syntax_failure() {
    init_logging();
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 required");
        return;
    }

    let project = tempdir().expect("Failed to create temp directory");
    let request = ScaffoldRequest::new("PostToolUse", "broken", project.path(), date());
    let result = scaffold(&request).expect("Scaffold should succeed");

    let mut text = std::fs::read_to_string(&result.script_path).expect("read");
    text.push_str("\ndef oops(:\n    pass\n");
    std::fs::write(&result.script_path, text).expect("write");

    let report = validate_script(&result.script_path, &context(project.path()), &SystemRunner);

    assert_eq!(report.aggregate(), CheckStatus::Fail);
    assert_eq!(
        report.check("syntax").map(|c| c.status),
        Some(CheckStatus::Fail)
    );
    assert_eq!(report.checks.len(), 8, "every check is still reported");
}

#[test]
#[serial(interpreters)]
fn test_validate_bash_example_from_docs() {
    init_logging();
    let project = tempdir().expect("Failed to create temp directory");
    let mut request = ScaffoldRequest::new("PreToolUse", "validate-bash", project.path(), date());
    request.language = Some(Language::Shell);

    let result = scaffold(&request).expect("Scaffold should succeed");

    let header: Vec<&str> = result.contents.lines().take(3).collect();
    assert!(header[1].contains("validate-bash"));
    let command = result.fragment["PreToolUse"][0]["hooks"][0]["command"]
        .as_str()
        .expect("command string");
    assert!(command.contains(".claude/hooks/validate-bash.sh"));
}

#[test]
fn test_scaffold_into_spaced_dir_merges_into_valid_settings() {
    init_logging();
    let temp = tempdir().expect("Failed to create temp directory");
    let project = temp.path().join("my project");
    std::fs::create_dir_all(project.join(".claude")).expect("mkdir");

    let mut request = ScaffoldRequest::new("Stop", "gate", &project, date());
    request.out_dir = project.join("my hooks");
    let result = scaffold(&request).expect("Scaffold should succeed");

    let settings_path = project.join(".claude").join("settings.json");
    let current = read_settings_or_default(&settings_path).expect("read settings");
    let merged = merge_fragment(current, &result.settings_snippet()).expect("merge");
    write_settings_atomic(&settings_path, &merged).expect("write settings");

    let report = validate_settings(&settings_path, &context(&project));
    assert_eq!(
        report.aggregate(),
        CheckStatus::Pass,
        "command {}: {:?}",
        result.command,
        report.checks
    );
    assert_eq!(
        report.check("command:Stop[0][0]").map(|c| c.status),
        Some(CheckStatus::Pass)
    );
}

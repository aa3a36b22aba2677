//! Template registry and placeholder rendering.
//!
//! Templates are read-only constants keyed by `(Language, TemplateKind)`.
//! Rendering is a single left-to-right pass over `{{TOKEN}}` markers: values are
//! copied in verbatim and never rescanned, so user text cannot inject tokens.

use crate::error::{RegistryError, Result};
use crate::events::HookEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Hook script language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Bash script
    Shell,
    /// Python 3 script
    Python,
}

impl Language {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Language::Shell => "sh",
            Language::Python => "py",
        }
    }

    /// Interpreter used for settings commands and the smoke test.
    pub fn interpreter(self) -> &'static str {
        match self {
            Language::Shell => "bash",
            Language::Python => "python3",
        }
    }

    /// Interpreter directive written on line one.
    pub fn shebang(self) -> &'static str {
        match self {
            Language::Shell => "#!/bin/bash",
            Language::Python => "#!/usr/bin/env python3",
        }
    }

    /// Guess from a `.py` / `.sh` extension.
    pub fn from_path(path: &Path) -> Option<Language> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("py") => Some(Language::Python),
            Some("sh") | Some("bash") => Some(Language::Shell),
            _ => None,
        }
    }

    /// Guess from an interpreter directive line.
    pub fn from_shebang(line: &str) -> Option<Language> {
        let directive = line.strip_prefix("#!")?;
        let program = directive
            .split_whitespace()
            .filter(|part| !part.ends_with("/env") && *part != "env")
            .find(|part| !part.starts_with('-'))?;
        let name = program.rsplit('/').next().unwrap_or(program);
        if name.starts_with("python") {
            Some(Language::Python)
        } else if matches!(name, "bash" | "sh" | "zsh" | "dash") {
            Some(Language::Shell)
        } else {
            None
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Shell => f.write_str("shell"),
            Language::Python => f.write_str("python"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shell" | "bash" | "sh" => Ok(Language::Shell),
            "python" | "python3" | "py" => Ok(Language::Python),
            other => Err(format!(
                "unknown language '{}' (expected shell or python)",
                other
            )),
        }
    }
}

/// Purpose-specific template family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    /// Skeleton with an event-specific snippet
    #[default]
    Generic,
    /// Approve known-safe tool calls without a permission dialog
    AutoApprove,
    /// Reject tool inputs that match dangerous patterns
    Validator,
    /// Add context at session start or on each prompt
    ContextInjection,
    /// Answer permission dialogs programmatically
    PermissionHandler,
    /// Keep the agent working until completion checks pass
    StopGate,
}

impl TemplateKind {
    /// Every kind, generic first.
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::Generic,
        TemplateKind::AutoApprove,
        TemplateKind::Validator,
        TemplateKind::ContextInjection,
        TemplateKind::PermissionHandler,
        TemplateKind::StopGate,
    ];

    /// Command-line spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Generic => "generic",
            TemplateKind::AutoApprove => "auto-approve",
            TemplateKind::Validator => "validator",
            TemplateKind::ContextInjection => "context-injection",
            TemplateKind::PermissionHandler => "permission-handler",
            TemplateKind::StopGate => "stop-gate",
        }
    }

    /// Events this kind is written for. Generic fits all of them.
    pub fn intended_events(self) -> &'static [HookEvent] {
        match self {
            TemplateKind::Generic => &HookEvent::ALL,
            TemplateKind::AutoApprove | TemplateKind::Validator => &[HookEvent::PreToolUse],
            TemplateKind::ContextInjection => {
                &[HookEvent::SessionStart, HookEvent::UserPromptSubmit]
            }
            TemplateKind::PermissionHandler => &[HookEvent::PermissionRequest],
            TemplateKind::StopGate => &[HookEvent::Stop, HookEvent::SubagentStop],
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TemplateKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = TemplateKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown template '{}' (expected one of: {})", s, valid.join(", "))
            })
    }
}

/// One parametrized script blueprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookTemplate {
    /// Target language
    pub language: Language,
    /// Template family
    pub kind: TemplateKind,
    /// Body with `{{TOKEN}}` placeholders
    pub body: &'static str,
    /// Purpose text used when the caller supplies none
    pub default_purpose: &'static str,
}

/// Values substituted into a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    /// `{{HOOK_NAME}}`
    pub hook_name: String,
    /// `{{PURPOSE}}`, already flattened to one line
    pub purpose: String,
    /// `{{EVENT}}`
    pub event: String,
    /// `{{MATCHER_LINE}}`, a whole comment line or empty
    pub matcher_line: String,
    /// `{{CREATED}}`
    pub created: String,
    /// `{{EVENT_CODE}}`
    pub event_code: String,
}

impl Placeholders {
    fn get(&self, token: &str) -> Option<&str> {
        match token {
            "HOOK_NAME" => Some(&self.hook_name),
            "PURPOSE" => Some(&self.purpose),
            "EVENT" => Some(&self.event),
            "MATCHER_LINE" => Some(&self.matcher_line),
            "CREATED" => Some(&self.created),
            "EVENT_CODE" => Some(&self.event_code),
            _ => None,
        }
    }
}

/// Substitute placeholders in one pass. Unknown tokens are left as written.
pub fn render(body: &str, values: &Placeholders) -> String {
    let mut out = String::with_capacity(body.len() + 256);
    let mut rest = body;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => match values.get(&after[..end]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Flatten free text so it fits on a single `#` comment line.
pub fn comment_text(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    flat.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find the template for a language/kind pair.
pub fn lookup_template(language: Language, kind: TemplateKind) -> Result<&'static HookTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.language == language && t.kind == kind)
        .ok_or_else(|| {
            RegistryError::UnknownTemplate {
                language: language.to_string(),
                kind: kind.to_string(),
            }
            .into()
        })
}

/// Every registered template.
pub fn templates() -> &'static [HookTemplate] {
    TEMPLATES
}

/// Event-specific body inserted at `{{EVENT_CODE}}` in generic templates.
pub fn event_code(event: HookEvent, language: Language) -> &'static str {
    match language {
        Language::Python => python_event_code(event),
        Language::Shell => shell_event_code(event),
    }
}

static TEMPLATES: &[HookTemplate] = &[
    HookTemplate {
        language: Language::Python,
        kind: TemplateKind::Generic,
        body: PYTHON_GENERIC,
        default_purpose: "Describe what this hook does",
    },
    HookTemplate {
        language: Language::Shell,
        kind: TemplateKind::Generic,
        body: SHELL_GENERIC,
        default_purpose: "Describe what this hook does",
    },
    HookTemplate {
        language: Language::Python,
        kind: TemplateKind::AutoApprove,
        body: PYTHON_AUTO_APPROVE,
        default_purpose: "Approve known-safe tool calls without a dialog",
    },
    HookTemplate {
        language: Language::Python,
        kind: TemplateKind::Validator,
        body: PYTHON_VALIDATOR,
        default_purpose: "Block tool calls that match dangerous patterns",
    },
    HookTemplate {
        language: Language::Python,
        kind: TemplateKind::ContextInjection,
        body: PYTHON_CONTEXT_INJECTION,
        default_purpose: "Add project context to the conversation",
    },
    HookTemplate {
        language: Language::Python,
        kind: TemplateKind::PermissionHandler,
        body: PYTHON_PERMISSION_HANDLER,
        default_purpose: "Answer permission dialogs automatically",
    },
    HookTemplate {
        language: Language::Python,
        kind: TemplateKind::StopGate,
        body: PYTHON_STOP_GATE,
        default_purpose: "Keep working until completion checks pass",
    },
];

const PYTHON_GENERIC: &str = r#"#!/usr/bin/env python3
# {{HOOK_NAME}} - {{PURPOSE}}
#
# Event: {{EVENT}}
{{MATCHER_LINE}}# Created: {{CREATED}}

import json
import sys


def main():
    try:
        input_data = json.load(sys.stdin)
    except json.JSONDecodeError as e:
        print(f"Error: Invalid JSON input: {e}", file=sys.stderr)
        sys.exit(0)

    event = input_data.get("hook_event_name", "")
{{EVENT_CODE}}
    # Add your logic here

    sys.exit(0)


if __name__ == "__main__":
    main()
"#;

const SHELL_GENERIC: &str = r#"#!/bin/bash
# {{HOOK_NAME}} - {{PURPOSE}}
#
# Event: {{EVENT}}
{{MATCHER_LINE}}# Created: {{CREATED}}

set -e

# Read JSON input from stdin
INPUT=$(cat)

# Extract a top-level field from the payload (needs python3)
parse_json() {
    echo "$INPUT" | python3 -c "import sys,json; print(json.load(sys.stdin).get('$1',''))" 2>/dev/null || echo ""
}

EVENT=$(parse_json "hook_event_name")
{{EVENT_CODE}}
# Add your logic here

exit 0
"#;

const PYTHON_AUTO_APPROVE: &str = r#"#!/usr/bin/env python3
# {{HOOK_NAME}} - {{PURPOSE}}
#
# Event: {{EVENT}}
{{MATCHER_LINE}}# Created: {{CREATED}}
#
# Edit SAFE_RULES to match your project.

import json
import re
import sys

SAFE_RULES = {
    "Read": {
        "suffixes": [".md", ".txt", ".json", ".yaml", ".yml", ".toml"],
        "paths": ["docs/", "README", ".claude/"],
    },
    "Write": {
        "suffixes": [".test.ts", ".test.js", ".spec.ts", ".spec.js"],
        "paths": ["test/", "tests/", "tmp/"],
    },
    "Edit": {
        "suffixes": [".test.ts", ".test.js", ".spec.ts", ".spec.js"],
    },
    "Bash": {
        "commands": [
            r"^(npm|yarn|pnpm)\s+(run|test|build|lint)",
            r"^git\s+(status|log|diff|branch)",
            r"^ls\b",
            r"^pwd$",
        ],
    },
}


def approval_reason(tool_name, tool_input):
    rules = SAFE_RULES.get(tool_name, {})
    file_path = tool_input.get("file_path", "")
    for suffix in rules.get("suffixes", []):
        if file_path.endswith(suffix):
            return f"safe file type {suffix}"
    for fragment in rules.get("paths", []):
        if fragment in file_path:
            return f"safe path {fragment}"
    command = tool_input.get("command", "")
    for pattern in rules.get("commands", []):
        if re.match(pattern, command):
            return "safe command"
    return None


def main():
    try:
        input_data = json.load(sys.stdin)
    except json.JSONDecodeError:
        sys.exit(0)

    reason = approval_reason(
        input_data.get("tool_name", ""), input_data.get("tool_input", {}) or {}
    )
    if reason:
        print(json.dumps({
            "hookSpecificOutput": {
                "hookEventName": "PreToolUse",
                "permissionDecision": "allow",
                "permissionDecisionReason": reason,
            },
            "suppressOutput": True,
        }))

    sys.exit(0)


if __name__ == "__main__":
    main()
"#;

const PYTHON_VALIDATOR: &str = r#"#!/usr/bin/env python3
# {{HOOK_NAME}} - {{PURPOSE}}
#
# Event: {{EVENT}}
{{MATCHER_LINE}}# Created: {{CREATED}}
#
# Exit 2 blocks the tool call and shows stderr to the agent.

import json
import re
import sys

DANGEROUS_COMMANDS = [
    r"\brm\s+-rf\s+/",
    r"\bsudo\b",
    r">\s*/dev/",
    r"\bdd\s+.*of=/dev/",
]

SENSITIVE_PATHS = [".env", "credentials", "secrets", ".git/"]


def rejection(tool_name, tool_input):
    if tool_name == "Bash":
        command = tool_input.get("command", "")
        for pattern in DANGEROUS_COMMANDS:
            if re.search(pattern, command):
                return "Command blocked: matches a dangerous pattern"
    if tool_name in ("Write", "Edit"):
        file_path = tool_input.get("file_path", "")
        for fragment in SENSITIVE_PATHS:
            if fragment in file_path:
                return f"Refusing to modify sensitive path: {fragment}"
    return None


def main():
    try:
        input_data = json.load(sys.stdin)
    except json.JSONDecodeError as e:
        print(f"Error: Invalid JSON input: {e}", file=sys.stderr)
        sys.exit(1)

    message = rejection(
        input_data.get("tool_name", ""), input_data.get("tool_input", {}) or {}
    )
    if message:
        print(message, file=sys.stderr)
        sys.exit(2)

    sys.exit(0)


if __name__ == "__main__":
    main()
"#;

const PYTHON_CONTEXT_INJECTION: &str = r#"#!/usr/bin/env python3
# {{HOOK_NAME}} - {{PURPOSE}}
#
# Event: {{EVENT}}
{{MATCHER_LINE}}# Created: {{CREATED}}
#
# Anything printed to stdout is added to the conversation.

import json
import os
import subprocess
import sys
from datetime import datetime


def git(*args):
    try:
        return subprocess.check_output(
            ["git", *args], stderr=subprocess.DEVNULL, text=True
        ).strip()
    except (subprocess.CalledProcessError, FileNotFoundError):
        return ""


def session_context():
    lines = [f"Session started: {datetime.now():%Y-%m-%d %H:%M}"]
    branch = git("branch", "--show-current")
    if branch:
        lines.append(f"Git branch: {branch}")
    commits = git("log", "--oneline", "-3")
    if commits:
        lines.append(f"Recent commits:\n{commits}")
    project_dir = os.environ.get("CLAUDE_PROJECT_DIR", os.getcwd())
    for marker, kind in [
        ("Cargo.toml", "Rust"),
        ("package.json", "Node.js"),
        ("pyproject.toml", "Python"),
        ("go.mod", "Go"),
    ]:
        if os.path.exists(os.path.join(project_dir, marker)):
            lines.append(f"Project type: {kind}")
            break
    return "\n".join(lines)


def prompt_context(prompt):
    return f"[{datetime.now():%H:%M}]"


def main():
    try:
        input_data = json.load(sys.stdin)
    except json.JSONDecodeError:
        sys.exit(0)

    event = input_data.get("hook_event_name", "")
    if event == "SessionStart":
        print(session_context())
    elif event == "UserPromptSubmit":
        print(prompt_context(input_data.get("prompt", "")))

    sys.exit(0)


if __name__ == "__main__":
    main()
"#;

const PYTHON_PERMISSION_HANDLER: &str = r#"#!/usr/bin/env python3
# {{HOOK_NAME}} - {{PURPOSE}}
#
# Event: {{EVENT}}
{{MATCHER_LINE}}# Created: {{CREATED}}
#
# Return None from decide() to fall through to the normal dialog.

import json
import os
import sys

DOC_SUFFIXES = (".md", ".txt", ".rst", ".mdx")
PROTECTED_FILES = [".env", ".env.local", "credentials.json", "secrets.yaml"]
DANGEROUS_FRAGMENTS = ["rm -rf /", "sudo rm", "> /dev/sd", "mkfs"]


def decide(tool_name, tool_input):
    if tool_name == "Read" and tool_input.get("file_path", "").endswith(DOC_SUFFIXES):
        return {"behavior": "allow"}

    if tool_name in ("Glob", "Grep"):
        path = tool_input.get("path", "")
        project_dir = os.environ.get("CLAUDE_PROJECT_DIR", "")
        if not path or (project_dir and path.startswith(project_dir)):
            return {"behavior": "allow"}

    if tool_name == "Bash":
        command = tool_input.get("command", "")
        for fragment in DANGEROUS_FRAGMENTS:
            if fragment in command:
                return {
                    "behavior": "deny",
                    "message": f"Dangerous command blocked: contains '{fragment}'",
                    "interrupt": True,
                }

    if tool_name == "Write":
        file_path = tool_input.get("file_path", "")
        for name in PROTECTED_FILES:
            if file_path.endswith(name):
                return {
                    "behavior": "deny",
                    "message": f"Cannot write to protected file: {name}",
                    "interrupt": False,
                }

    return None


def main():
    try:
        input_data = json.load(sys.stdin)
    except json.JSONDecodeError:
        sys.exit(0)

    decision = decide(
        input_data.get("tool_name", ""), input_data.get("tool_input", {}) or {}
    )
    if decision is not None:
        print(json.dumps({
            "hookSpecificOutput": {
                "hookEventName": "PermissionRequest",
                "decision": decision,
            }
        }))

    sys.exit(0)


if __name__ == "__main__":
    main()
"#;

const PYTHON_STOP_GATE: &str = r#"#!/usr/bin/env python3
# {{HOOK_NAME}} - {{PURPOSE}}
#
# Event: {{EVENT}}
{{MATCHER_LINE}}# Created: {{CREATED}}
#
# Printing {"decision": "block", "reason": ...} keeps the agent working.

import json
import subprocess
import sys


def unfinished_work():
    try:
        status = subprocess.check_output(
            ["git", "status", "--porcelain"], stderr=subprocess.DEVNULL, text=True
        ).strip()
    except (subprocess.CalledProcessError, FileNotFoundError):
        return None
    if status:
        changed = len(status.splitlines())
        return f"{changed} uncommitted file(s). Commit or stash them before finishing."
    return None


def main():
    try:
        input_data = json.load(sys.stdin)
    except json.JSONDecodeError:
        sys.exit(0)

    # Already continuing because of this hook: let the agent stop.
    if input_data.get("stop_hook_active", False):
        sys.exit(0)

    reason = unfinished_work()
    if reason:
        print(json.dumps({"decision": "block", "reason": reason}))

    sys.exit(0)


if __name__ == "__main__":
    main()
"#;

fn python_event_code(event: HookEvent) -> &'static str {
    match event {
        HookEvent::PreToolUse => {
            r#"    tool_name = input_data.get("tool_name", "")
    tool_input = input_data.get("tool_input", {})

    # Exit 2 blocks the call and shows stderr to the agent, e.g.:
    # if tool_name == "Bash" and "rm -rf" in tool_input.get("command", ""):
    #     print("Blocked: dangerous command", file=sys.stderr)
    #     sys.exit(2)
"#
        }
        HookEvent::PostToolUse => {
            r#"    tool_name = input_data.get("tool_name", "")
    tool_input = input_data.get("tool_input", {})
    tool_response = input_data.get("tool_response", {})

    # The call already ran; exit 2 feeds stderr back to the agent.
"#
        }
        HookEvent::PermissionRequest => {
            r#"    tool_name = input_data.get("tool_name", "")
    tool_input = input_data.get("tool_input", {})

    # To answer the dialog yourself, print:
    # {"hookSpecificOutput": {"hookEventName": "PermissionRequest",
    #                         "decision": {"behavior": "allow"}}}
"#
        }
        HookEvent::UserPromptSubmit => {
            r#"    prompt = input_data.get("prompt", "")

    # Anything printed to stdout is added as context.
"#
        }
        HookEvent::Stop | HookEvent::SubagentStop => {
            r#"    stop_hook_active = input_data.get("stop_hook_active", False)
    transcript_path = input_data.get("transcript_path", "")

    # Already continuing because of a stop hook: let the agent stop.
    if stop_hook_active:
        sys.exit(0)

    # To keep the agent working, print:
    # print(json.dumps({"decision": "block", "reason": "Run the tests first"}))
"#
        }
        HookEvent::SessionStart => {
            r#"    source = input_data.get("source", "")  # startup, resume, clear, compact

    # Anything printed to stdout is added as context.
"#
        }
        HookEvent::SessionEnd => {
            r#"    reason = input_data.get("reason", "")  # clear, logout, prompt_input_exit, other
"#
        }
        HookEvent::PreCompact => {
            r#"    trigger = input_data.get("trigger", "")  # manual, auto
"#
        }
        HookEvent::Notification => {
            r#"    message = input_data.get("message", "")
    notification_type = input_data.get("notification_type", "")
"#
        }
    }
}

fn shell_event_code(event: HookEvent) -> &'static str {
    match event {
        HookEvent::PreToolUse => {
            r#"TOOL_NAME=$(parse_json "tool_name")

# Exit 2 blocks the call and shows stderr to the agent, e.g.:
# if [ "$TOOL_NAME" = "Bash" ] && echo "$INPUT" | grep -q "rm -rf"; then
#     echo "Blocked: dangerous command" >&2
#     exit 2
# fi
"#
        }
        HookEvent::PostToolUse => {
            r#"TOOL_NAME=$(parse_json "tool_name")

# The call already ran; exit 2 feeds stderr back to the agent.
"#
        }
        HookEvent::PermissionRequest => {
            r#"TOOL_NAME=$(parse_json "tool_name")

# To answer the dialog yourself, print a hookSpecificOutput decision as JSON.
"#
        }
        HookEvent::UserPromptSubmit => {
            r#"PROMPT=$(parse_json "prompt")

# Anything printed to stdout is added as context.
"#
        }
        HookEvent::Stop | HookEvent::SubagentStop => {
            r#"STOP_ACTIVE=$(parse_json "stop_hook_active")

# Already continuing because of a stop hook: let the agent stop.
if [ "$STOP_ACTIVE" = "True" ] || [ "$STOP_ACTIVE" = "true" ]; then
    exit 0
fi
"#
        }
        HookEvent::SessionStart => {
            r#"SOURCE=$(parse_json "source")  # startup, resume, clear, compact
"#
        }
        HookEvent::SessionEnd => {
            r#"REASON=$(parse_json "reason")  # clear, logout, prompt_input_exit, other
"#
        }
        HookEvent::PreCompact => {
            r#"TRIGGER=$(parse_json "trigger")  # manual, auto
"#
        }
        HookEvent::Notification => {
            r#"MESSAGE=$(parse_json "message")
TYPE=$(parse_json "notification_type")
"#
        }
    }
}

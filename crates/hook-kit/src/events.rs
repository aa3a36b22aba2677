//! The closed set of hook events and their static metadata.
//!
//! Every place that needs to know whether an event takes a matcher, whether it
//! can block, or what its stdin payload looks like consults [`HookEvent::metadata`].

use crate::error::{RegistryError, Result};
use crate::templates::Language;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Claude Code hook events
///
/// Matches the dispatcher's event names exactly when serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HookEvent {
    /// Before a tool call runs
    PreToolUse,
    /// After a tool call completes
    PostToolUse,
    /// A permission dialog is about to be shown
    PermissionRequest,
    /// The user submitted a prompt
    UserPromptSubmit,
    /// The main agent is about to stop
    Stop,
    /// A subagent is about to stop
    SubagentStop,
    /// Session begins (startup, resume, clear, compact)
    SessionStart,
    /// Session ends
    SessionEnd,
    /// Before context compaction
    PreCompact,
    /// The assistant emits a notification
    Notification,
}

/// Whether an event's hook can stop the action it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockBehavior {
    /// Exit code 2 (or a block decision) prevents the action
    Blocks,
    /// The action already happened; exit code 2 only feeds stderr back
    FeedbackOnly,
    /// Exit codes never affect the action
    Never,
}

/// Static description of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMetadata {
    /// The event this row describes
    pub event: HookEvent,
    /// Whether settings entries for this event may carry a `matcher`
    pub accepts_matcher: bool,
    /// Blocking semantics
    pub block: BlockBehavior,
    /// Matcher written into scaffolded fragments (only when `accepts_matcher`)
    pub default_matcher: Option<&'static str>,
    /// Language used when the caller gives no override
    pub default_language: Language,
    /// Payload fields the dispatcher always sends
    pub required_fields: &'static [&'static str],
    /// Payload fields the dispatcher may send
    pub optional_fields: &'static [&'static str],
}

impl EventMetadata {
    /// True for `Blocks` only.
    pub fn can_block(&self) -> bool {
        self.block == BlockBehavior::Blocks
    }
}

impl HookEvent {
    /// All ten events in dispatch-table order.
    pub const ALL: [HookEvent; 10] = [
        HookEvent::PreToolUse,
        HookEvent::PostToolUse,
        HookEvent::PermissionRequest,
        HookEvent::UserPromptSubmit,
        HookEvent::Stop,
        HookEvent::SubagentStop,
        HookEvent::SessionStart,
        HookEvent::SessionEnd,
        HookEvent::PreCompact,
        HookEvent::Notification,
    ];

    /// Exact dispatcher spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PostToolUse => "PostToolUse",
            HookEvent::PermissionRequest => "PermissionRequest",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::Stop => "Stop",
            HookEvent::SubagentStop => "SubagentStop",
            HookEvent::SessionStart => "SessionStart",
            HookEvent::SessionEnd => "SessionEnd",
            HookEvent::PreCompact => "PreCompact",
            HookEvent::Notification => "Notification",
        }
    }

    /// Static metadata row for this event.
    pub fn metadata(self) -> EventMetadata {
        use BlockBehavior::*;
        const SESSION: &[&str] = &["session_id"];
        const TOOL_OPTIONAL: &[&str] = &["tool_use_id", "session_id"];
        const STOP_OPTIONAL: &[&str] = &["transcript_path", "session_id"];
        const TOOL: &[&str] = &["tool_name", "tool_input"];
        const TOOL_RESPONSE: &[&str] = &["tool_name", "tool_input", "tool_response"];
        const PROMPT: &[&str] = &["prompt"];
        const STOP: &[&str] = &["stop_hook_active"];
        const SOURCE: &[&str] = &["source"];
        const REASON: &[&str] = &["reason"];
        const NONE: &[&str] = &[];
        const NOTIFICATION: &[&str] = &["message", "notification_type"];

        let (accepts_matcher, block, default_matcher, default_language, required, optional) =
            match self {
                HookEvent::PreToolUse => (
                    true,
                    Blocks,
                    Some("Write|Edit"),
                    Language::Shell,
                    TOOL,
                    TOOL_OPTIONAL,
                ),
                HookEvent::PostToolUse => (
                    true,
                    FeedbackOnly,
                    Some("Write|Edit"),
                    Language::Python,
                    TOOL_RESPONSE,
                    TOOL_OPTIONAL,
                ),
                HookEvent::PermissionRequest => (
                    true,
                    Blocks,
                    Some("Bash"),
                    Language::Python,
                    TOOL,
                    TOOL_OPTIONAL,
                ),
                HookEvent::UserPromptSubmit => {
                    (false, Blocks, None, Language::Python, PROMPT, SESSION)
                }
                HookEvent::Stop | HookEvent::SubagentStop => (
                    false,
                    Blocks,
                    None,
                    Language::Python,
                    STOP,
                    STOP_OPTIONAL,
                ),
                HookEvent::SessionStart => (
                    true,
                    Never,
                    Some("startup"),
                    Language::Python,
                    SOURCE,
                    SESSION,
                ),
                HookEvent::SessionEnd => {
                    (false, Never, None, Language::Python, REASON, SESSION)
                }
                HookEvent::PreCompact => (
                    true,
                    Never,
                    Some("manual|auto"),
                    Language::Python,
                    NONE,
                    SESSION,
                ),
                HookEvent::Notification => (
                    true,
                    Never,
                    Some("idle_prompt"),
                    Language::Python,
                    NOTIFICATION,
                    SESSION,
                ),
            };

        EventMetadata {
            event: self,
            accepts_matcher,
            block,
            default_matcher,
            default_language,
            required_fields: required,
            optional_fields: optional,
        }
    }

    /// Minimal synthetic stdin payload used by the smoke test.
    ///
    /// Carries `hook_event_name` plus every required and optional field of the
    /// event.
    pub fn sample_payload(self) -> Value {
        let meta = self.metadata();
        let mut payload = Map::new();
        payload.insert("hook_event_name".to_string(), json!(self.as_str()));
        for field in meta.required_fields.iter().chain(meta.optional_fields) {
            payload.insert(field.to_string(), self.sample_value(field));
        }
        Value::Object(payload)
    }

    fn sample_value(self, field: &str) -> Value {
        match (self, field) {
            (HookEvent::PermissionRequest, "tool_name") => json!("Bash"),
            (HookEvent::PermissionRequest, "tool_input") => json!({"command": "ls -la"}),
            (_, "tool_name") => json!("Write"),
            (_, "tool_input") => json!({"file_path": "/tmp/test.txt", "content": "test"}),
            (_, "tool_response") => json!({"success": true}),
            (_, "tool_use_id") => json!("test-123"),
            (_, "session_id") => json!("session-abc"),
            (_, "prompt") => json!("Hello, world!"),
            (_, "stop_hook_active") => json!(false),
            (_, "transcript_path") => json!("/tmp/transcript.json"),
            (_, "source") => json!("startup"),
            (_, "reason") => json!("logout"),
            (_, "message") => json!("Test notification"),
            (_, "notification_type") => json!("idle_prompt"),
            _ => Value::Null,
        }
    }

    /// True for the two events whose hooks can force the agent to continue.
    pub fn is_stop(self) -> bool {
        matches!(self, HookEvent::Stop | HookEvent::SubagentStop)
    }
}

/// Payload used when a script's event cannot be determined.
pub fn unknown_event_payload() -> Value {
    json!({"hook_event_name": "Unknown", "session_id": "session-abc"})
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = RegistryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        HookEvent::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownEvent {
                name: s.to_string(),
                valid: valid_event_names(),
            })
    }
}

/// Resolve an event name against the closed set (exact, case-sensitive).
pub fn lookup_event(name: &str) -> Result<HookEvent> {
    Ok(name.parse::<HookEvent>()?)
}

/// Comma-separated list of every valid event name.
pub fn valid_event_names() -> String {
    HookEvent::ALL
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_lookup_all_ten_events() {
        for event in HookEvent::ALL {
            let found = lookup_event(event.as_str()).expect("known event should resolve");
            assert_eq!(found, event);
        }
    }

    #[test]
    fn test_lookup_unknown_event_fails() {
        let err = lookup_event("OnFooBar").expect_err("unknown event should fail");
        assert!(matches!(
            err,
            Error::Registry(RegistryError::UnknownEvent { ref name, .. }) if name == "OnFooBar"
        ));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(lookup_event("pretooluse").is_err());
        assert!(lookup_event("PRETOOLUSE").is_err());
        assert!(lookup_event(" PreToolUse").is_err());
    }

    #[test]
    fn test_serialization_matches_as_str() {
        for event in HookEvent::ALL {
            let json = serde_json::to_string(&event).expect("serialization failed");
            assert_eq!(json, format!("\"{}\"", event.as_str()));
        }
    }

    #[test]
    fn test_stop_events_take_no_matcher() {
        assert!(!HookEvent::Stop.metadata().accepts_matcher);
        assert!(!HookEvent::SubagentStop.metadata().accepts_matcher);
        assert!(HookEvent::Stop.metadata().default_matcher.is_none());
    }

    #[test]
    fn test_default_matcher_only_on_matcher_events() {
        for event in HookEvent::ALL {
            let meta = event.metadata();
            assert_eq!(
                meta.accepts_matcher,
                meta.default_matcher.is_some(),
                "{} default matcher disagrees with accepts_matcher",
                event
            );
        }
    }

    #[test]
    fn test_sample_payload_carries_required_fields() {
        for event in HookEvent::ALL {
            let payload = event.sample_payload();
            assert_eq!(payload["hook_event_name"], event.as_str());
            let meta = event.metadata();
            for field in meta.required_fields {
                assert!(
                    payload.get(*field).is_some(),
                    "{} sample payload missing {}",
                    event,
                    field
                );
            }
            for (key, value) in payload.as_object().expect("object") {
                assert!(!value.is_null(), "{} has no sample value for {}", event, key);
                assert!(
                    key == "hook_event_name"
                        || meta.required_fields.contains(&key.as_str())
                        || meta.optional_fields.contains(&key.as_str()),
                    "{} payload field {} is not in its metadata",
                    event,
                    key
                );
            }
        }
    }

    #[test]
    fn test_block_behavior() {
        assert!(HookEvent::PreToolUse.metadata().can_block());
        assert!(!HookEvent::PostToolUse.metadata().can_block());
        assert_eq!(
            HookEvent::PostToolUse.metadata().block,
            BlockBehavior::FeedbackOnly
        );
        assert!(!HookEvent::SessionEnd.metadata().can_block());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    /// 1. Build scope
    BuildStarted,
    BuildFinished(BuildFinishedPayload),

    /// 2. Project scope (id: context.project_id)
    ProjectStarted(ProjectStartedPayload),
    ProjectFinished(ProjectFinishedPayload),

    /// 3. Target scope (id: context.target_id, unique per project)
    TargetStarted(TargetStartedPayload),
    TargetFinished(TargetFinishedPayload),

    /// Target was referenced but did not run
    TargetSkipped(TargetSkippedPayload),

    /// 4. Task scope (id: context.task_id, unique per project)
    TaskStarted(TaskStartedPayload),
    TaskCommandLine(TaskCommandLinePayload),
    TaskFinished(TaskFinishedPayload),

    /// 5. Diagnostics (leaf nodes)
    Message(DiagnosticPayload),
    Warning(DiagnosticPayload),
    Error(DiagnosticPayload),

    /// 6. Opaque producer-specific events
    Custom(OpaquePayload),
    Status(OpaquePayload),

    /// Any event type this reader does not know yet
    #[serde(other)]
    Unknown,
}

impl EventPayload {
    /// Stable name of the variant, used when reporting unexpected records
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::BuildStarted => "build_started",
            EventPayload::BuildFinished(_) => "build_finished",
            EventPayload::ProjectStarted(_) => "project_started",
            EventPayload::ProjectFinished(_) => "project_finished",
            EventPayload::TargetStarted(_) => "target_started",
            EventPayload::TargetFinished(_) => "target_finished",
            EventPayload::TargetSkipped(_) => "target_skipped",
            EventPayload::TaskStarted(_) => "task_started",
            EventPayload::TaskCommandLine(_) => "task_command_line",
            EventPayload::TaskFinished(_) => "task_finished",
            EventPayload::Message(_) => "message",
            EventPayload::Warning(_) => "warning",
            EventPayload::Error(_) => "error",
            EventPayload::Custom(_) => "custom",
            EventPayload::Status(_) => "status",
            EventPayload::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildFinishedPayload {
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStartedPayload {
    /// Display name (usually the project file name)
    pub name: String,

    /// Full path of the project file
    pub project_file: String,

    /// Project that requested this one via the MSBuild task, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_project_id: Option<i32>,

    /// Semicolon separated entry targets requested for this project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_names: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFinishedPayload {
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetStartedPayload {
    pub name: String,

    /// Target whose dependency list caused this one to run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetFinishedPayload {
    pub name: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSkippedPayload {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStartedPayload {
    pub name: String,

    /// Assembly the task type was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_assembly: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCommandLinePayload {
    pub command_line: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFinishedPayload {
    pub name: String,

    #[serde(default = "default_true")]
    pub succeeded: bool,
}

fn default_true() -> bool {
    true
}

/// Message importance as reported by the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageImportance {
    High,
    #[default]
    Normal,
    Low,
}

/// Shared shape of message, warning and error events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticPayload {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,

    /// Only meaningful for messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<MessageImportance>,
}

impl DiagnosticPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Producer-specific payload carried through without interpretation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpaquePayload {
    #[serde(default)]
    pub data: Value,
}

impl OpaquePayload {
    /// Human readable message carried in the payload, if the producer set one
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_kind_names_match_tags() {
        let payload = EventPayload::TargetSkipped(TargetSkippedPayload {
            name: "CoreCompile".to_string(),
            reason: None,
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], payload.kind());
    }

    #[test]
    fn test_task_finished_defaults_to_success() {
        let payload: EventPayload =
            serde_json::from_str(r#"{"type":"task_finished","name":"Csc"}"#).unwrap();
        match payload {
            EventPayload::TaskFinished(p) => assert!(p.succeeded),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_opaque_message() {
        let payload = OpaquePayload {
            data: serde_json::json!({"message": "restore done", "count": 3}),
        };
        assert_eq!(payload.message(), Some("restore done"));
        assert_eq!(OpaquePayload::default().message(), None);
    }
}

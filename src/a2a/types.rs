use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A2A protocol types for the content creation agent.
///
/// Covers the task lifecycle surface: send / sendSubscribe / resubscribe
/// requests, task records with status and artifacts, and the streaming
/// update events.

// ============================================================================
// JSON-RPC 2.0 Base Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Integer(i64),
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

pub const ERROR_CODE_INVALID_PARAMS: i32 = -32602;
pub const ERROR_CODE_INTERNAL: i32 = -32603;
pub const ERROR_CODE_INCOMPATIBLE_TYPES: i32 = -32005;

impl JsonRpcError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: ERROR_CODE_INVALID_PARAMS,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: ERROR_CODE_INTERNAL,
            message: message.into(),
            data: None,
        }
    }

    pub fn incompatible_types() -> Self {
        Self {
            code: ERROR_CODE_INCOMPATIBLE_TYPES,
            message: "Incompatible content types".to_string(),
            data: None,
        }
    }
}

// ============================================================================
// Core Task Types
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Submitted,
    Working,
    Completed,
    Failed,
    Error,
}

impl TaskState {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TaskStatus {
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            message: None,
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }

    pub fn with_message(state: TaskState, message: Message) -> Self {
        Self {
            state,
            message: Some(message),
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Message>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub parts: Vec<Part>,
}

impl Message {
    /// Single-text-part agent message, the shape used for status updates.
    pub fn agent_text(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Agent,
            parts: vec![Part::Text {
                text: text.into(),
                metadata: None,
            }],
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            parts: vec![Part::Text {
                text: text.into(),
                metadata: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Part {
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
    File {
        file: FileContent,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "mimeType")]
    pub mime_type: Option<String>,
    /// Base64-encoded file bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    pub parts: Vec<Part>,
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushNotificationConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// ============================================================================
// Method Parameter Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSendParams {
    pub id: String,
    pub message: Message,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        default,
        rename = "acceptedOutputModes"
    )]
    pub accepted_output_modes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "historyLength")]
    pub history_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "pushNotification")]
    pub push_notification: Option<PushNotificationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIdParams {
    pub id: String,
}

// ============================================================================
// Request / Response Envelopes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTaskRequest {
    pub id: RequestId,
    pub params: TaskSendParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTaskStreamingRequest {
    pub id: RequestId,
    pub params: TaskSendParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResubscriptionRequest {
    pub id: RequestId,
    pub params: TaskIdParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTaskResponse {
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl SendTaskResponse {
    pub fn ok(id: RequestId, task: Task) -> Self {
        Self {
            id,
            result: Some(task),
            error: None,
        }
    }

    pub fn error(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTaskStreamingResponse {
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskUpdateEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

// ============================================================================
// Streaming Event Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatusUpdateEvent {
    pub id: String,
    pub status: TaskStatus,
    #[serde(rename = "final")]
    pub is_final: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskArtifactUpdateEvent {
    pub id: String,
    pub artifact: Artifact,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TaskUpdateEvent {
    Status(TaskStatusUpdateEvent),
    Artifact(TaskArtifactUpdateEvent),
}

impl TaskUpdateEvent {
    /// True only for the status event that terminates a stream.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Status(event) if event.is_final)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_state_terminality() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(TaskState::Error.is_terminal());
        assert!(!TaskState::Submitted.is_terminal());
        assert!(!TaskState::Working.is_terminal());
    }

    #[test]
    fn part_serializes_with_type_tag() {
        let part = Part::Text {
            text: "hello".to_string(),
            metadata: None,
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hello");
    }

    #[test]
    fn status_event_serializes_final_keyword() {
        let event = TaskUpdateEvent::Status(TaskStatusUpdateEvent {
            id: "t1".to_string(),
            status: TaskStatus::new(TaskState::Completed),
            is_final: true,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["final"], true);
        assert_eq!(json["status"]["state"], "completed");
    }

    #[test]
    fn task_snapshot_omits_null_fields() {
        let task = Task {
            id: "t1".to_string(),
            status: TaskStatus::new(TaskState::Working),
            artifacts: Vec::new(),
            history: None,
        };
        let json = serde_json::to_value(&task).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("artifacts"));
        assert!(!object.contains_key("history"));
        assert!(!object["status"].as_object().unwrap().contains_key("message"));
    }

    #[test]
    fn send_params_accepts_camel_case_envelope() {
        let params: TaskSendParams = serde_json::from_value(serde_json::json!({
            "id": "task-1",
            "message": {
                "role": "user",
                "parts": [{"type": "text", "text": "Create social media content"}]
            },
            "acceptedOutputModes": ["application/json", "image/png"],
            "historyLength": 3,
            "pushNotification": {"url": "http://localhost:9000/hook"}
        }))
        .unwrap();

        assert_eq!(params.id, "task-1");
        assert_eq!(params.accepted_output_modes.len(), 2);
        assert_eq!(params.history_length, Some(3));
        assert_eq!(
            params.push_notification.unwrap().url,
            "http://localhost:9000/hook"
        );
    }
}

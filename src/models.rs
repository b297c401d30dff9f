use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SYSTEM_ROLE: &str = "system";

/// One conversation turn. The role is passed through to the inference
/// backend untouched, so it stays a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(SYSTEM_ROLE, content)
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Body of `POST {base}/api/chat` on the inference backend.
#[derive(Debug, Serialize)]
pub struct BackendChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct BackendMessage {
    pub content: Option<String>,
}

/// One NDJSON line of the backend's streamed reply. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct BackendRecord {
    pub message: Option<BackendMessage>,
    pub done: Option<bool>,
    pub error: Option<Value>,
}

/// Unit of output re-published to the caller as `data: <json>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Content { content: String, done: bool },
    Error { error: String },
}

impl StreamEvent {
    /// Maps a backend record to the event it produces, if any.
    /// Content wins over error when a record carries both.
    pub fn from_record(record: BackendRecord) -> Option<Self> {
        if let Some(content) = record.message.and_then(|m| m.content) {
            return Some(StreamEvent::Content {
                content,
                done: record.done.unwrap_or(false),
            });
        }
        record.error.map(|err| StreamEvent::Error {
            error: match err {
                Value::String(s) => s,
                other => other.to_string(),
            },
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error { error: message.into() }
    }

    /// No further events follow a terminal one.
    pub fn is_terminal(&self) -> bool {
        match self {
            StreamEvent::Content { done, .. } => *done,
            StreamEvent::Error { .. } => true,
        }
    }
}

// ABOUTME: Typed wire models for the hosted assistant API
// Responses are validated once at this boundary instead of inspected ad hoc at display time

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::error::{Result, ThreadChatError};

/// Lifecycle status of a run. Anything the server reports that we do not
/// know about maps to `Unknown` and is treated as non-terminal; the
/// coordinator's overall timeout bounds the wait either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Expired,
    Completed,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Terminal statuses admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Cancelled | RunStatus::Failed | RunStatus::Expired | RunStatus::Completed
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Expired => "expired",
            RunStatus::Completed => "completed",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token usage reported on a terminal run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<RunUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assistant {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// One content part of a thread message. The API interleaves text with
/// other part kinds (images, file references); only text carries an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextValue {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

impl ThreadMessage {
    /// Concatenated text of all text parts, if any.
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.value.as_str()),
                ContentPart::Other => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

/// Message listing, ordered latest first by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageList {
    pub data: Vec<ThreadMessage>,
}

impl MessageList {
    /// Extract the newest message's text. A listing without a usable text
    /// answer is an `UnexpectedResultShape`, not a crash at the display site.
    pub fn latest_text(&self) -> Result<String> {
        let newest = self.data.first().ok_or_else(|| {
            ThreadChatError::UnexpectedResultShape("message listing is empty".to_string())
        })?;
        newest.text().ok_or_else(|| {
            ThreadChatError::UnexpectedResultShape(format!(
                "message {} contains no text content",
                newest.id
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAssistantRequest {
    pub name: String,
    pub model: String,
    pub instructions: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<AssistantTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantTool {
    pub r#type: &'static str,
}

impl CreateAssistantRequest {
    /// Assistant definition, optionally wired to a vector store for
    /// retrieval augmentation via the file_search tool.
    pub fn new(name: &str, model: &str, instructions: &str, vectorstore_id: Option<&str>) -> Self {
        let (tools, tool_resources) = match vectorstore_id {
            Some(id) => (
                vec![AssistantTool {
                    r#type: "file_search",
                }],
                Some(serde_json::json!({
                    "file_search": { "vector_store_ids": [id] }
                })),
            ),
            None => (Vec::new(), None),
        };
        Self {
            name: name.to_string(),
            model: model.to_string(),
            instructions: instructions.to_string(),
            tools,
            tool_resources,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
    pub model: String,
    pub temperature: f64,
    /// Instruction override for this run; falls back to the assistant's
    /// instructions when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub stream: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_deserializes_with_usage() {
        let json = r#"{
            "id": "run_1",
            "status": "completed",
            "model": "gpt-x",
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let run: Run = serde_json::from_str(json).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn run_deserializes_without_usage() {
        let json = r#"{"id": "run_1", "status": "in_progress"}"#;
        let run: Run = serde_json::from_str(json).unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(run.usage.is_none());
    }

    #[test]
    fn unrecognized_status_maps_to_unknown_and_is_not_terminal() {
        let json = r#"{"id": "run_1", "status": "incomplete"}"#;
        let run: Run = serde_json::from_str(json).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(RunStatus::Expired.is_terminal());
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(!RunStatus::RequiresAction.is_terminal());
    }

    #[test]
    fn latest_text_takes_newest_message() {
        let json = r#"{
            "data": [
                {"id": "msg_2", "role": "assistant",
                 "content": [{"type": "text", "text": {"value": "4"}}]},
                {"id": "msg_1", "role": "user",
                 "content": [{"type": "text", "text": {"value": "What is 2+2?"}}]}
            ]
        }"#;
        let list: MessageList = serde_json::from_str(json).unwrap();
        assert_eq!(list.latest_text().unwrap(), "4");
    }

    #[test]
    fn empty_listing_is_unexpected_shape() {
        let list: MessageList = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(matches!(
            list.latest_text(),
            Err(ThreadChatError::UnexpectedResultShape(_))
        ));
    }

    #[test]
    fn non_text_content_is_unexpected_shape() {
        let json = r#"{
            "data": [
                {"id": "msg_1", "role": "assistant",
                 "content": [{"type": "image_file"}]}
            ]
        }"#;
        let list: MessageList = serde_json::from_str(json).unwrap();
        assert!(matches!(
            list.latest_text(),
            Err(ThreadChatError::UnexpectedResultShape(_))
        ));
    }

    #[test]
    fn multiple_text_parts_are_joined() {
        let json = r#"{
            "id": "msg_1", "role": "assistant",
            "content": [
                {"type": "text", "text": {"value": "first"}},
                {"type": "image_file"},
                {"type": "text", "text": {"value": "second"}}
            ]
        }"#;
        let msg: ThreadMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.text().unwrap(), "first\nsecond");
    }

    #[test]
    fn assistant_request_includes_file_search_when_vectorstore_set() {
        let req = CreateAssistantRequest::new("Helper", "gpt-x", "Be helpful", Some("vs_1"));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["tools"][0]["type"], "file_search");
        assert_eq!(
            json["tool_resources"]["file_search"]["vector_store_ids"][0],
            "vs_1"
        );
    }

    #[test]
    fn assistant_request_omits_tools_without_vectorstore() {
        let req = CreateAssistantRequest::new("Helper", "gpt-x", "Be helpful", None);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("tool_resources").is_none());
    }

    #[test]
    fn run_request_serializes_temperature_and_stream() {
        let req = CreateRunRequest {
            assistant_id: "asst_1".to_string(),
            model: "gpt-x".to_string(),
            temperature: 0.7,
            instructions: None,
            stream: false,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"temperature\":0.7"));
        assert!(json.contains("\"stream\":false"));
        assert!(!json.contains("instructions"));
    }

    #[test]
    fn run_request_includes_instruction_override_when_set() {
        let req = CreateRunRequest {
            assistant_id: "asst_1".to_string(),
            model: "gpt-x".to_string(),
            temperature: 0.7,
            instructions: Some("Answer briefly.".to_string()),
            stream: false,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"instructions\":\"Answer briefly.\""));
    }
}

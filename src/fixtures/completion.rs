//! Chat-completion payloads
//!
//! Types mirror the OpenAI chat-completion response format closely enough for
//! callers that validate usage accounting and tool-call results.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    /// Build a usage block whose total is the sum of its parts.
    ///
    /// Returns `None` when the total does not fit in a `u64`.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Option<Self> {
        Some(Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.checked_add(completion_tokens)?,
        })
    }

    /// `total_tokens == prompt_tokens + completion_tokens`
    pub fn is_consistent(&self) -> bool {
        self.prompt_tokens.checked_add(self.completion_tokens) == Some(self.total_tokens)
    }
}

/// Function invoked by a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object
    pub arguments: String,
}

/// Tool call in an assistant message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

/// Assistant message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

/// Chat completion choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: AssistantMessage,
    pub logprobs: Option<serde_json::Value>,
    pub finish_reason: Option<String>,
}

/// Chat completion response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
    pub system_fingerprint: Option<String>,
}

impl ChatCompletion {
    /// Completion with a single assistant tool call and a `stop` finish reason
    pub fn tool_call(name: &str, arguments: &serde_json::Value, usage: Usage) -> Self {
        Self {
            id: "chatcmpl-9MhZ73aGSmhfAtjU9DwoL4om73hJ7".to_string(),
            object: "chat.completion".to_string(),
            created: 1715197709,
            model: "gpt-3.5-turbo-0125".to_string(),
            choices: vec![Choice {
                index: 0,
                message: AssistantMessage {
                    role: "assistant".to_string(),
                    content: None,
                    tool_calls: vec![ToolCall {
                        id: "call_cJ6HLI1gZSIRJVOrFsChO1SI".to_string(),
                        call_type: "function".to_string(),
                        function: FunctionCall {
                            name: name.to_string(),
                            arguments: arguments.to_string(),
                        },
                    }],
                },
                logprobs: None,
                finish_reason: Some("stop".to_string()),
            }],
            usage,
            system_fingerprint: None,
        }
    }
}

/// Canonical default fixture: one `extract` tool call scoring the input as
/// harmless, with 72 prompt and 42 completion tokens.
pub fn default_completion() -> ChatCompletion {
    ChatCompletion::tool_call(
        "extract",
        &json!({
            "score": 0,
            "reasoning": "The provided text is a harmless play on words that poses no risk of harm or offense. It is a lighthearted joke that uses wordplay to create humor without targeting or derogating any group of people.",
        }),
        Usage {
            prompt_tokens: 72,
            completion_tokens: 42,
            total_tokens: 114,
        },
    )
}

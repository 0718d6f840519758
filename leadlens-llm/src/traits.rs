use async_trait::async_trait;
use leadlens_common::{LeadlensError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id; Ollama does not send one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Decoded JSON arguments.
    pub arguments: Value,
}

/// One conversation turn, in a provider-neutral shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool name, on `tool` messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            name: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::plain(Role::Assistant, content)
        }
    }

    /// Result of a tool call, answering `call`.
    pub fn tool(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            name: Some(call.name.clone()),
            tool_call_id: call.id.clone(),
            ..Self::plain(Role::Tool, content)
        }
    }
}

/// A function the model may call, with its JSON-schema parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSpec {
    /// The `{"type": "function", ...}` wrapper both chat APIs accept.
    pub fn to_function_json(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Tool arguments arrive either as a JSON object or as a JSON-encoded string.
pub(crate) fn decode_arguments(raw: Value) -> Result<Value> {
    match raw {
        Value::String(s) if s.trim().is_empty() => Ok(Value::Object(Default::default())),
        Value::String(s) => serde_json::from_str(&s).map_err(|e| {
            LeadlensError::ToolArguments(format!("arguments are not valid JSON: {e}"))
        }),
        Value::Null => Ok(Value::Object(Default::default())),
        other => Ok(other),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// Always an assistant message.
    pub message: ChatMessage,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One chat-completion round. An empty `tools` slice sends no tool list.
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_message_answers_the_call() {
        let call = ToolCall {
            id: Some("call_1".into()),
            name: "query_web_scraper".into(),
            arguments: json!({"url": "https://maguey.com"}),
        };
        let msg = ChatMessage::tool(&call, "{}");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.name.as_deref(), Some("query_web_scraper"));
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn string_arguments_are_decoded() {
        let v = decode_arguments(json!(r#"{"url":"https://maguey.com"}"#)).unwrap();
        assert_eq!(v["url"], "https://maguey.com");
        assert_eq!(decode_arguments(json!({"a": 1})).unwrap(), json!({"a": 1}));
        assert_eq!(decode_arguments(json!("")).unwrap(), json!({}));
        assert!(matches!(
            decode_arguments(json!("{not json")),
            Err(LeadlensError::ToolArguments(_))
        ));
    }

    #[test]
    fn tool_spec_wraps_as_function() {
        let spec = ToolSpec {
            name: "lookup".into(),
            description: "Look something up".into(),
            parameters: json!({"type": "object"}),
        };
        let v = spec.to_function_json();
        assert_eq!(v["type"], "function");
        assert_eq!(v["function"]["name"], "lookup");
        assert_eq!(v["function"]["parameters"]["type"], "object");
    }
}

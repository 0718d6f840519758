use crate::traits::{decode_arguments, ChatMessage, ChatResponse, LlmClient, ToolCall, ToolSpec};
use async_trait::async_trait;
use leadlens_common::{LeadlensError, Result};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with: `ollama serve` (after installing). Install instructions: https://github.com/ollama/ollama";

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<LocalModel>,
}

#[derive(Debug, Deserialize)]
struct LocalModel {
    name: String,
}

impl LocalModel {
    /// `llama3.1` is listed as `llama3.1:latest`.
    fn names(&self, model: &str) -> bool {
        self.name == model
            || self
                .name
                .strip_suffix(":latest")
                .is_some_and(|base| base == model)
    }
}

/// Ollama client for local model inference over `/api/chat`.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OllamaClient {
    /// Create a new client and verify server/model availability, pulling the
    /// model when the server does not have it yet.
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LeadlensError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        let ollama_client = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature: None,
            max_tokens: None,
        };

        let local = ollama_client.local_models().await?;
        if !local.iter().any(|tag| tag.names(&ollama_client.model)) {
            tracing::info!(target: "llm.ollama", model = %ollama_client.model, "model not found locally, pulling");
            ollama_client.pull_model().await?;
        }

        Ok(ollama_client)
    }

    /// Sampling options forwarded as `options.temperature` / `options.num_predict`.
    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// `/api/tags`; any transport or HTTP failure means no usable server.
    async fn local_models(&self) -> Result<Vec<LocalModel>> {
        let not_running = |_| LeadlensError::Llm(OLLAMA_CONNECTION_ERROR.to_string());
        let tags: TagsResponse = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(not_running)?
            .json()
            .await
            .map_err(|e| LeadlensError::Llm(format!("unreadable model list: {e}")))?;
        Ok(tags.models)
    }

    async fn pull_model(&self) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&json!({ "model": self.model, "stream": false }))
            .send()
            .await
            .map_err(|e| LeadlensError::Llm(format!("Failed to pull model: {}", e)))?;

        if !resp.status().is_success() {
            return Err(LeadlensError::Llm(format!(
                "Failed to pull model {}: HTTP {}",
                self.model,
                resp.status()
            )));
        }
        tracing::info!(target: "llm.ollama", model = %self.model, "pulled model");
        Ok(())
    }

    fn request_body(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> JsonValue {
        let mut body = json!({
            "model": self.model,
            "messages": messages.iter().map(wire_message).collect::<Vec<_>>(),
            "stream": false,
        });
        if !tools.is_empty() {
            body["tools"] = tools.iter().map(ToolSpec::to_function_json).collect();
        }

        let mut options = serde_json::Map::new();
        if let Some(temp) = self.temperature {
            options.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tok) = self.max_tokens {
            options.insert("num_predict".to_string(), json!(max_tok));
        }
        if !options.is_empty() {
            body["options"] = JsonValue::Object(options);
        }
        body
    }
}

fn wire_message(msg: &ChatMessage) -> JsonValue {
    let mut v = json!({ "role": msg.role.as_str(), "content": msg.content });
    if !msg.tool_calls.is_empty() {
        v["tool_calls"] = msg
            .tool_calls
            .iter()
            .map(|call| json!({ "function": { "name": call.name, "arguments": call.arguments } }))
            .collect();
    }
    if let Some(name) = &msg.name {
        v["name"] = json!(name);
    }
    v
}

fn parse_reply(val: &JsonValue) -> Result<ChatMessage> {
    let message = val
        .get("message")
        .ok_or_else(|| LeadlensError::Llm("chat response carried no message".to_string()))?;
    let content = message
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string();

    let mut tool_calls = Vec::new();
    for call in message
        .get("tool_calls")
        .and_then(|c| c.as_array())
        .into_iter()
        .flatten()
    {
        let function = call.get("function").unwrap_or(&JsonValue::Null);
        let name = function
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| LeadlensError::Llm("tool call without a function name".to_string()))?;
        tool_calls.push(ToolCall {
            id: call.get("id").and_then(|i| i.as_str()).map(str::to_string),
            name: name.to_string(),
            arguments: decode_arguments(function.get("arguments").cloned().unwrap_or_default())?,
        });
    }

    Ok(ChatMessage::assistant(content, tool_calls))
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(
            target: "llm.ollama",
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "chat request"
        );

        let resp = self
            .client
            .post(&url)
            .json(&self.request_body(messages, tools))
            .send()
            .await
            .map_err(|e| LeadlensError::Llm(format!("Chat request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(LeadlensError::Llm(format!(
                "Chat failed: HTTP {}",
                resp.status()
            )));
        }

        let val: JsonValue = resp
            .json()
            .await
            .map_err(|e| LeadlensError::Llm(format!("Failed to parse response: {}", e)))?;

        let tokens_used = val
            .get("eval_count")
            .and_then(|c| c.as_u64())
            .map(|c| c as u32);

        Ok(ChatResponse {
            message: parse_reply(&val)?,
            model: val.get("model").and_then(|m| m.as_str()).map(str::to_string),
            tokens_used,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.local_models().await.is_ok())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Role;

    #[test]
    fn latest_tag_counts_as_the_bare_model() {
        let listed = LocalModel {
            name: "llama3.1:latest".into(),
        };
        assert!(listed.names("llama3.1"));
        assert!(listed.names("llama3.1:latest"));
        assert!(!listed.names("llama3"));
        assert!(!LocalModel { name: "llama3.1:8b".into() }.names("llama3.1"));
    }

    #[test]
    fn assistant_tool_calls_are_sent_as_functions() {
        let msg = ChatMessage::assistant(
            "",
            vec![ToolCall {
                id: None,
                name: "query_web_scraper".into(),
                arguments: json!({"url": "https://maguey.com"}),
            }],
        );
        let v = wire_message(&msg);
        assert_eq!(v["role"], "assistant");
        assert_eq!(v["tool_calls"][0]["function"]["name"], "query_web_scraper");
        assert_eq!(
            v["tool_calls"][0]["function"]["arguments"]["url"],
            "https://maguey.com"
        );
    }

    #[test]
    fn reply_without_tool_calls_is_plain_text() {
        let val = json!({
            "model": "llama3.1",
            "message": { "role": "assistant", "content": "I cannot browse." },
            "done": true
        });
        let msg = parse_reply(&val).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "I cannot browse.");
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn missing_message_is_an_llm_error() {
        assert!(matches!(
            parse_reply(&json!({ "error": "model not found" })),
            Err(LeadlensError::Llm(_))
        ));
    }
}

use crate::traits::{decode_arguments, ChatMessage, ChatResponse, LlmClient, Role, ToolCall, ToolSpec};
use async_trait::async_trait;
use leadlens_common::{LeadlensError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible `/chat/completions` endpoints
/// (OpenAI itself, vLLM, LM Studio, llama.cpp server, ...).
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    /// JSON-encoded arguments string.
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    total_tokens: u32,
}

fn function_type() -> String {
    "function".to_string()
}

impl OpenAiClient {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    /// `api_key` is optional so local OpenAI-compatible servers work unauthenticated.
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LeadlensError::Llm(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            temperature: None,
            max_tokens: None,
        })
    }

    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

fn to_api_message(msg: &ChatMessage) -> ApiMessage {
    let tool_calls = (!msg.tool_calls.is_empty()).then(|| {
        msg.tool_calls
            .iter()
            .enumerate()
            .map(|(i, call)| ApiToolCall {
                id: call.id.clone().unwrap_or_else(|| format!("call_{i}")),
                call_type: function_type(),
                function: ApiFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect()
    });

    ApiMessage {
        role: msg.role.as_str().to_string(),
        content: Some(msg.content.clone()),
        tool_calls,
        tool_call_id: (msg.role == Role::Tool)
            .then(|| msg.tool_call_id.clone())
            .flatten(),
    }
}

fn from_api_message(msg: ApiMessage) -> Result<ChatMessage> {
    let tool_calls = msg
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, call)| {
            // Servers that omit ids still need one echoed back on the tool reply.
            let id = if call.id.is_empty() {
                format!("call_{i}")
            } else {
                call.id
            };
            Ok(ToolCall {
                id: Some(id),
                name: call.function.name,
                arguments: decode_arguments(Value::String(call.function.arguments))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ChatMessage::assistant(
        msg.content.unwrap_or_default(),
        tool_calls,
    ))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ApiRequest {
            model: &self.model,
            messages: messages.iter().map(to_api_message).collect(),
            tools: tools.iter().map(ToolSpec::to_function_json).collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        tracing::debug!(
            target: "llm.openai",
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "chat request"
        );

        let resp = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| LeadlensError::Llm(format!("Chat request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(LeadlensError::Llm(format!(
                "Chat failed: HTTP {status}: {detail}"
            )));
        }

        let parsed: ApiResponse = resp
            .json()
            .await
            .map_err(|e| LeadlensError::Llm(format!("Failed to parse response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LeadlensError::Llm("chat response had no choices".to_string()))?;

        Ok(ChatResponse {
            message: from_api_message(choice.message)?,
            model: parsed.model,
            tokens_used: parsed.usage.map(|u| u.total_tokens),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.base_url);
        match self.authorized(self.client.get(&url)).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                tracing::warn!(target: "llm.openai", error = %e, "health check failed");
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

use serde::{Deserialize, Serialize};

/// Which chat backend to talk to, tagged by `provider`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    Ollama {
        #[serde(default = "default_ollama_model")]
        model: String,
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
    Openai {
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        auth_token: Option<String>,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::Ollama {
            model: default_ollama_model(),
            endpoint: default_ollama_endpoint(),
            temperature: None,
            max_tokens: None,
        }
    }
}

fn default_ollama_model() -> String {
    crate::DEFAULT_OLLAMA_MODEL.into()
}
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".into()
}
fn default_openai_model() -> String {
    crate::DEFAULT_OPENAI_MODEL.into()
}
fn default_openai_endpoint() -> String {
    crate::openai::OPENAI_API_BASE.into()
}

//! Provider-agnostic chat-completion integration for leadlens.
//!
//! This crate exposes a common [`traits::LlmClient`] interface with tool
//! calling, concrete clients for Ollama and OpenAI-compatible servers, and the
//! [`agent::run_single_tool_round`] loop that lets a model call one tool and
//! then summarise what it got back.
//!
//! # Examples
//! ```no_run
//! use leadlens_common::Result;
//! use leadlens_llm::{ensure_llm_ready, LlmConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let client = ensure_llm_ready(&LlmConfig::default()).await?;
//! assert_eq!(client.model_name(), "llama3.1");
//! # Ok(())
//! # }
//! ```
pub mod agent;
pub mod config;
pub mod ollama;
pub mod openai;
pub mod traits;

pub use agent::{run_single_tool_round, AgentOutcome, ToolHandler, ToolInvocation};
pub use config::LlmConfig;

use leadlens_common::Result;
use ollama::OllamaClient;
use openai::OpenAiClient;
use std::sync::Arc;
use traits::LlmClient;

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Build a client for `config`, making sure the backend is reachable.
///
/// For Ollama this probes the server and pulls the model if it is missing.
pub async fn ensure_llm_ready(config: &LlmConfig) -> Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        LlmConfig::Ollama {
            model,
            endpoint,
            temperature,
            max_tokens,
        } => {
            let client = OllamaClient::new(endpoint.clone(), model.clone())
                .await?
                .with_sampling(*temperature, *max_tokens);
            Ok(Arc::new(client))
        }
        LlmConfig::Openai {
            model,
            auth_token,
            endpoint,
            temperature,
            max_tokens,
        } => {
            let client = OpenAiClient::new(endpoint.clone(), auth_token.clone(), model.clone())?
                .with_sampling(*temperature, *max_tokens);
            Ok(Arc::new(client))
        }
    }
}

//! One round of tool use: ask, run the requested tools, ask once more.

use crate::traits::{ChatMessage, LlmClient, ToolCall, ToolSpec};
use async_trait::async_trait;
use leadlens_common::{LeadlensError, Result};
use serde_json::Value;

/// Executes the tools offered to the model.
#[async_trait]
pub trait ToolHandler: Send {
    /// Run one call. Returning `Value::Null` means the call produced no data.
    async fn call(&mut self, call: &ToolCall) -> Result<Value>;

    /// The user instruction sent after the tools ran, given the last result
    /// as pretty-printed JSON.
    fn follow_up(&self, pretty_data: &str) -> String;
}

/// A tool call that was executed during the round.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    /// The model answered without calling any tool.
    Declined { reply: String },
    /// Tools ran and the model produced a final answer. The text is returned
    /// as the model wrote it.
    Summary {
        text: String,
        invocations: Vec<ToolInvocation>,
    },
    /// Tools were called but none of them returned data.
    NoData,
}

/// Run the single tool round.
///
/// Any error from the client or the handler aborts the round; an unknown tool
/// name fails with [`LeadlensError::UnknownTool`] before the handler sees it.
pub async fn run_single_tool_round<H>(
    client: &dyn LlmClient,
    mut messages: Vec<ChatMessage>,
    tools: &[ToolSpec],
    handler: &mut H,
) -> Result<AgentOutcome>
where
    H: ToolHandler + ?Sized,
{
    let first = client.chat(&messages, tools).await?;
    let calls = first.message.tool_calls.clone();
    let reply = first.message.content.clone();
    messages.push(ChatMessage::assistant(reply.clone(), calls.clone()));

    if calls.is_empty() {
        tracing::info!(target: "agent.round", model = client.model_name(), "model declined the tool");
        return Ok(AgentOutcome::Declined { reply });
    }

    let mut invocations = Vec::with_capacity(calls.len());
    let mut last_data = Value::Null;
    for call in &calls {
        if !tools.iter().any(|t| t.name == call.name) {
            return Err(LeadlensError::UnknownTool(call.name.clone()));
        }
        tracing::info!(target: "agent.round", tool = %call.name, arguments = %call.arguments, "invoking tool");

        let data = handler.call(call).await?;
        messages.push(ChatMessage::tool(call, serde_json::to_string(&data)?));
        invocations.push(ToolInvocation {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        });
        if !data.is_null() {
            last_data = data;
        }
    }

    if last_data.is_null() {
        return Ok(AgentOutcome::NoData);
    }

    let pretty = serde_json::to_string_pretty(&last_data)?;
    messages.push(ChatMessage::user(handler.follow_up(&pretty)));

    let last = client.chat(&messages, &[]).await?;
    Ok(AgentOutcome::Summary {
        text: last.message.content,
        invocations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ChatResponse, Role};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records every request.
    struct Scripted {
        replies: Mutex<VecDeque<ChatMessage>>,
        seen: Mutex<Vec<(Vec<ChatMessage>, usize)>>,
    }

    impl Scripted {
        fn new(replies: Vec<ChatMessage>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for Scripted {
        async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatResponse> {
            self.seen
                .lock()
                .unwrap()
                .push((messages.to_vec(), tools.len()));
            let message = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LeadlensError::Llm("script exhausted".into()))?;
            Ok(ChatResponse {
                message,
                model: None,
                tokens_used: None,
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    struct Echo {
        calls: usize,
        result: Value,
    }

    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(&mut self, _call: &ToolCall) -> Result<Value> {
            self.calls += 1;
            Ok(self.result.clone())
        }

        fn follow_up(&self, pretty_data: &str) -> String {
            format!("DATA:\n{pretty_data}")
        }
    }

    fn spec() -> Vec<ToolSpec> {
        vec![ToolSpec {
            name: "query_web_scraper".into(),
            description: "scrape".into(),
            parameters: json!({"type": "object"}),
        }]
    }

    fn call(name: &str) -> ToolCall {
        ToolCall {
            id: None,
            name: name.into(),
            arguments: json!({"url": "https://maguey.com"}),
        }
    }

    fn start() -> Vec<ChatMessage> {
        vec![ChatMessage::system("sys"), ChatMessage::user("go")]
    }

    #[tokio::test]
    async fn declined_returns_raw_reply() {
        let client = Scripted::new(vec![ChatMessage::assistant("No thanks.", vec![])]);
        let mut handler = Echo { calls: 0, result: json!({}) };
        let outcome = run_single_tool_round(&client, start(), &spec(), &mut handler)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            AgentOutcome::Declined {
                reply: "No thanks.".into()
            }
        );
        assert_eq!(handler.calls, 0);
    }

    #[tokio::test]
    async fn tool_result_feeds_final_call_without_tools() {
        let client = Scripted::new(vec![
            ChatMessage::assistant("", vec![call("query_web_scraper")]),
            ChatMessage::assistant(r#"{"phone":"+1"}"#, vec![]),
        ]);
        let mut handler = Echo {
            calls: 0,
            result: json!({"url": "https://maguey.com"}),
        };
        let outcome = run_single_tool_round(&client, start(), &spec(), &mut handler)
            .await
            .unwrap();

        match outcome {
            AgentOutcome::Summary { text, invocations } => {
                assert_eq!(text, r#"{"phone":"+1"}"#);
                assert_eq!(invocations.len(), 1);
                assert_eq!(invocations[0].arguments["url"], "https://maguey.com");
            }
            other => panic!("unexpected {other:?}"),
        }

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1, 1);
        assert_eq!(seen[1].1, 0);
        let roles: Vec<Role> = seen[1].0.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::User]
        );
        assert!(seen[1].0[4].content.starts_with("DATA:\n{"));
    }

    #[tokio::test]
    async fn unknown_tool_is_fatal() {
        let client = Scripted::new(vec![ChatMessage::assistant(
            "",
            vec![call("delete_everything")],
        )]);
        let mut handler = Echo { calls: 0, result: json!({}) };
        let err = run_single_tool_round(&client, start(), &spec(), &mut handler)
            .await
            .unwrap_err();
        assert!(matches!(err, LeadlensError::UnknownTool(name) if name == "delete_everything"));
        assert_eq!(handler.calls, 0);
    }

    #[tokio::test]
    async fn null_results_mean_no_data() {
        let client = Scripted::new(vec![ChatMessage::assistant(
            "",
            vec![call("query_web_scraper")],
        )]);
        let mut handler = Echo {
            calls: 0,
            result: Value::Null,
        };
        let outcome = run_single_tool_round(&client, start(), &spec(), &mut handler)
            .await
            .unwrap();
        assert_eq!(outcome, AgentOutcome::NoData);
        assert_eq!(client.seen.lock().unwrap().len(), 1);
    }
}

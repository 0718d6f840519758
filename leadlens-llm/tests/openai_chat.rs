mod common;

use async_trait::async_trait;
use leadlens_common::Result;
use leadlens_llm::openai::OpenAiClient;
use leadlens_llm::traits::{ChatMessage, LlmClient, ToolCall, ToolSpec};
use leadlens_llm::{run_single_tool_round, AgentOutcome, ToolHandler};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(message: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{ "index": 0, "message": message, "finish_reason": "stop" }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    }))
}

fn scraper_tool() -> ToolSpec {
    ToolSpec {
        name: "query_web_scraper".into(),
        description: "Scrapes a page".into(),
        parameters: json!({
            "type": "object",
            "properties": { "url": { "type": "string" } },
            "required": ["url"]
        }),
    }
}

#[tokio::test]
async fn sends_bearer_token_and_reads_text() -> Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(completion(json!({ "role": "assistant", "content": "OK" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(
        format!("{}/v1/", server.uri()),
        Some("sk-test".into()),
        "gpt-4o-mini".into(),
    )?;
    let resp = client.chat(&[ChatMessage::user("Say OK")], &[]).await?;
    assert_eq!(resp.message.content, "OK");
    assert_eq!(resp.tokens_used, Some(15));
    assert_eq!(resp.model.as_deref(), Some("gpt-4o-mini"));
    Ok(())
}

struct FixedPage;

#[async_trait]
impl ToolHandler for FixedPage {
    async fn call(&mut self, call: &ToolCall) -> Result<Value> {
        Ok(json!({ "url": call.arguments["url"], "contact_info": { "phone": "+15551234" } }))
    }

    fn follow_up(&self, pretty_data: &str) -> String {
        format!("Here's the scraped data:\n{pretty_data}")
    }
}

#[tokio::test]
async fn tool_round_over_http() -> Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;

    // Second request: carries the tool result and no tool list.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {}, {},
                { "role": "assistant" },
                { "role": "tool", "tool_call_id": "call_abc" },
                { "role": "user" }
            ]
        })))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": "{\"phone\": \"+15551234\"}"
        })))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_abc",
                "type": "function",
                "function": {
                    "name": "query_web_scraper",
                    "arguments": "{\"url\": \"https://maguey.com\"}"
                }
            }]
        })))
        .expect(1)
        .with_priority(2)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(server.uri(), None, "gpt-4o-mini".into())?;
    let outcome = run_single_tool_round(
        &client,
        vec![ChatMessage::system("sys"), ChatMessage::user("scrape")],
        &[scraper_tool()],
        &mut FixedPage,
    )
    .await?;

    match outcome {
        AgentOutcome::Summary { text, invocations } => {
            assert_eq!(text, "{\"phone\": \"+15551234\"}");
            assert_eq!(invocations[0].name, "query_web_scraper");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    Ok(())
}

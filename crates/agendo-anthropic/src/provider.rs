// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `LlmProvider` implementation translating between the neutral core
//! message shapes and the Anthropic wire format.

use async_trait::async_trait;

use agendo_core::types::{ContentPart, LlmReply, LlmRequest, TokenUsage, ToolSpec};
use agendo_core::{AgendoError, ChatMessage, LlmProvider};

use crate::client::AnthropicClient;
use crate::types::{
    ApiContent, ApiContentBlock, ApiMessage, MessageRequest, ResponseContentBlock, ToolDefinition,
};

/// Anthropic-backed LLM provider.
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }

    /// Default model configured on the underlying client.
    pub fn default_model(&self) -> &str {
        self.client.default_model()
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmReply, AgendoError> {
        let api_request = to_api_request(&request);
        let response = self.client.complete_message(&api_request).await?;

        let content = response
            .content
            .into_iter()
            .map(|block| match block {
                ResponseContentBlock::Text { text } => ContentPart::Text { text },
                ResponseContentBlock::ToolUse { id, name, input } => {
                    ContentPart::ToolUse { id, name, input }
                }
            })
            .collect();

        Ok(LlmReply {
            content,
            stop_reason: response.stop_reason,
            usage: TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
        })
    }
}

fn to_api_request(request: &LlmRequest) -> MessageRequest {
    MessageRequest {
        model: request.model.clone(),
        messages: request.messages.iter().map(to_api_message).collect(),
        system: request.system.clone(),
        max_tokens: request.max_tokens,
        tools: if request.tools.is_empty() {
            None
        } else {
            Some(request.tools.iter().map(to_tool_definition).collect())
        },
    }
}

fn to_api_message(message: &ChatMessage) -> ApiMessage {
    // A single text part collapses to the plain-string content shape.
    let content = match message.content.as_slice() {
        [ContentPart::Text { text }] => ApiContent::Text(text.clone()),
        parts => ApiContent::Blocks(parts.iter().map(to_api_block).collect()),
    };
    ApiMessage {
        role: message.role.to_string(),
        content,
    }
}

fn to_api_block(part: &ContentPart) -> ApiContentBlock {
    match part {
        ContentPart::Text { text } => ApiContentBlock::Text { text: text.clone() },
        ContentPart::ToolUse { id, name, input } => ApiContentBlock::ToolUse {
            id: id.clone(),
            name: name.clone(),
            input: input.clone(),
        },
        ContentPart::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => ApiContentBlock::ToolResult {
            tool_use_id: tool_use_id.clone(),
            content: content.clone(),
            is_error: *is_error,
        },
    }
}

fn to_tool_definition(spec: &ToolSpec) -> ToolDefinition {
    ToolDefinition {
        name: spec.name.clone(),
        description: spec.description.clone(),
        input_schema: spec.input_schema.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendo_core::types::Role;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> AnthropicProvider {
        let client = AnthropicClient::new(
            "test-api-key".into(),
            "2023-06-01".into(),
            "claude-sonnet-4-20250514".into(),
        )
        .unwrap()
        .with_base_url(server.uri());
        AnthropicProvider::new(client)
    }

    fn base_request() -> LlmRequest {
        LlmRequest {
            model: "claude-sonnet-4-20250514".into(),
            system: Some("You schedule appointments.".into()),
            messages: vec![ChatMessage::user("quiero un corte mañana")],
            max_tokens: 1024,
            tools: vec![ToolSpec {
                name: "get_available_slots".into(),
                description: "Available times for a service on a date".into(),
                input_schema: serde_json::json!({"type": "object"}),
            }],
        }
    }

    #[tokio::test]
    async fn complete_maps_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "system": "You schedule appointments.",
                "messages": [{"role": "user", "content": "quiero un corte mañana"}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "Claro, ¿a qué hora?"}],
                "model": "claude-sonnet-4-20250514",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 30, "output_tokens": 12}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let reply = provider.complete(base_request()).await.unwrap();
        assert_eq!(reply.text(), "Claro, ¿a qué hora?");
        assert!(!reply.has_tool_calls());
        assert_eq!(reply.usage.output_tokens, 12);
    }

    #[tokio::test]
    async fn complete_maps_tool_use_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_2",
                "type": "message",
                "role": "assistant",
                "content": [
                    {"type": "tool_use", "id": "toolu_9", "name": "get_available_slots",
                     "input": {"service_name": "corte", "target_date": "2026-08-10"}}
                ],
                "model": "claude-sonnet-4-20250514",
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 40, "output_tokens": 22}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let reply = provider.complete(base_request()).await.unwrap();
        let calls = reply.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "toolu_9");
        assert_eq!(calls[0].name, "get_available_slots");
        assert_eq!(calls[0].input["service_name"], "corte");
        assert_eq!(reply.stop_reason.as_deref(), Some("tool_use"));
    }

    #[tokio::test]
    async fn tool_results_round_trip_as_blocks() {
        let server = MockServer::start().await;
        // The tool-result message must serialize as content blocks.
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    {"role": "user", "content": "quiero un corte"},
                    {"role": "assistant", "content": [
                        {"type": "tool_use", "id": "toolu_9", "name": "get_services", "input": {}}
                    ]},
                    {"role": "user", "content": [
                        {"type": "tool_result", "tool_use_id": "toolu_9",
                         "content": "[]"}
                    ]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_3",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "listo"}],
                "model": "claude-sonnet-4-20250514",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 5, "output_tokens": 2}
            })))
            .mount(&server)
            .await;

        let request = LlmRequest {
            model: "claude-sonnet-4-20250514".into(),
            system: None,
            messages: vec![
                ChatMessage::user("quiero un corte"),
                ChatMessage {
                    role: Role::Assistant,
                    content: vec![ContentPart::ToolUse {
                        id: "toolu_9".into(),
                        name: "get_services".into(),
                        input: serde_json::json!({}),
                    }],
                },
                ChatMessage {
                    role: Role::User,
                    content: vec![ContentPart::ToolResult {
                        tool_use_id: "toolu_9".into(),
                        content: "[]".into(),
                        is_error: None,
                    }],
                },
            ],
            max_tokens: 512,
            tools: vec![],
        };

        let provider = provider_for(&server);
        let reply = provider.complete(request).await.unwrap();
        assert_eq!(reply.text(), "listo");
    }
}

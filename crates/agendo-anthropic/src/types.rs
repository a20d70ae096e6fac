// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API request/response types.

use serde::{Deserialize, Serialize};

/// A tool definition for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema describing the tool's input parameters.
    pub input_schema: serde_json::Value,
}

/// A request to the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    /// Model identifier (e.g., "claude-sonnet-4-20250514").
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<ApiMessage>,

    /// System prompt (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Tool definitions available for the model to use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

/// A single message in the Anthropic conversation format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role: "user" or "assistant".
    pub role: String,

    /// Content -- either a plain string or an array of content blocks.
    pub content: ApiContent,
}

/// Content within an API message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiContent {
    /// Simple text content.
    Text(String),
    /// Array of typed content blocks.
    Blocks(Vec<ApiContentBlock>),
}

/// A typed content block within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text { text: String },
    /// Tool use content block (sent by assistant).
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Tool result content block (sent by user in response to tool_use).
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// A full response from the Anthropic Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    /// Response ID.
    pub id: String,
    /// Content blocks in the response.
    pub content: Vec<ResponseContentBlock>,
    /// Model that generated the response.
    pub model: String,
    /// Reason the generation stopped.
    pub stop_reason: Option<String>,
    /// Token usage statistics.
    pub usage: ApiUsage,
}

/// A content block in a response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ResponseContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text { text: String },
    /// Tool use content block -- the model is requesting a tool invocation.
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

/// Token usage statistics from the API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiUsage {
    /// Number of input tokens consumed.
    pub input_tokens: u32,
    /// Number of output tokens generated.
    pub output_tokens: u32,
}

/// API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error type identifier.
    #[serde(rename = "type")]
    pub type_: String,
    /// Human-readable error message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_request_with_system_and_tools() {
        let req = MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: ApiContent::Text("Hola".into()),
            }],
            system: Some("You are a scheduling assistant.".into()),
            max_tokens: 1024,
            tools: Some(vec![ToolDefinition {
                name: "get_services".into(),
                description: "List services for a branch".into(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "branch_id": {"type": "string"}
                    },
                    "required": ["branch_id"]
                }),
            }]),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["system"], "You are a scheduling assistant.");
        assert_eq!(json["messages"][0]["content"], "Hola");
        assert_eq!(json["tools"][0]["name"], "get_services");
        assert!(json["tools"][0]["input_schema"]["properties"]["branch_id"].is_object());
    }

    #[test]
    fn serialize_request_without_optional_fields_omits_them() {
        let req = MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![],
            system: None,
            max_tokens: 512,
            tools: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn serialize_tool_result_block() {
        let block = ApiContentBlock::ToolResult {
            tool_use_id: "toolu_abc".into(),
            content: r#"{"slots":["09:00"]}"#.into(),
            is_error: None,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["tool_use_id"], "toolu_abc");
        assert!(json.get("is_error").is_none());
    }

    #[test]
    fn deserialize_response_with_tool_use() {
        let json = r#"{
            "id": "msg_tool",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Checking availability."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_available_slots",
                 "input": {"service_name": "corte", "target_date": "2026-08-10"}}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 20, "output_tokens": 15}
        }"#;
        let resp: MessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.content.len(), 2);
        assert!(matches!(&resp.content[0], ResponseContentBlock::Text { .. }));
        match &resp.content[1] {
            ResponseContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "get_available_slots");
                assert_eq!(input["target_date"], "2026-08-10");
            }
            _ => panic!("expected ToolUse"),
        }
        assert_eq!(resp.stop_reason.as_deref(), Some("tool_use"));
    }

    #[test]
    fn deserialize_api_content_both_shapes() {
        let plain: ApiMessage = serde_json::from_str(r#"{"role":"user","content":"Hola"}"#).unwrap();
        assert!(matches!(plain.content, ApiContent::Text(_)));

        let blocks: ApiMessage =
            serde_json::from_str(r#"{"role":"assistant","content":[{"type":"text","text":"Hi"}]}"#)
                .unwrap();
        match blocks.content {
            ApiContent::Blocks(b) => assert_eq!(b.len(), 1),
            _ => panic!("expected Blocks"),
        }
    }

    #[test]
    fn deserialize_error_body() {
        let json = r#"{"error": {"type": "overloaded_error", "message": "Overloaded"}}"#;
        let err: ApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.type_, "overloaded_error");
        assert_eq!(err.error.message, "Overloaded");
    }
}

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider for deterministic testing.
//!
//! Replies are popped from a FIFO queue. When the queue is empty, a
//! default text reply is returned. Every received request is recorded
//! so tests can assert on prompts and message lists. Errors can be
//! scripted into the queue to exercise degraded paths mid-flow.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use agendo_core::types::{ContentPart, LlmReply, LlmRequest, TokenUsage};
use agendo_core::{AgendoError, LlmProvider};

enum Scripted {
    Reply(LlmReply),
    Error(String),
}

/// A mock LLM provider that returns pre-configured replies.
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<LlmRequest>>>,
    fail: bool,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<LlmReply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(
                replies.into_iter().map(Scripted::Reply).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A provider whose every call fails, for degraded-path tests.
    pub fn failing() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn push_reply(&self, reply: LlmReply) {
        self.script.lock().await.push_back(Scripted::Reply(reply));
    }

    /// Add a one-shot failure to the end of the queue.
    pub async fn push_error(&self, message: &str) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Error(message.to_string()));
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmReply, AgendoError> {
        if self.fail {
            return Err(AgendoError::Provider {
                message: "mock provider failure".into(),
                source: None,
            });
        }
        self.requests.lock().await.push(request);
        match self.script.lock().await.pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Error(message)) => Err(AgendoError::Provider {
                message,
                source: None,
            }),
            None => Ok(text_reply("mock reply")),
        }
    }
}

/// A plain-text reply.
pub fn text_reply(text: &str) -> LlmReply {
    LlmReply {
        content: vec![ContentPart::Text {
            text: text.to_string(),
        }],
        stop_reason: Some("end_turn".into()),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 20,
        },
    }
}

/// A reply requesting a single tool invocation.
pub fn tool_reply(name: &str, input: serde_json::Value) -> LlmReply {
    LlmReply {
        content: vec![ContentPart::ToolUse {
            id: format!("toolu-{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            input,
        }],
        stop_reason: Some("tool_use".into()),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 20,
        },
    }
}

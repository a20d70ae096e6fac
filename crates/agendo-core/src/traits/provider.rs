// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider trait for LLM integrations.

use async_trait::async_trait;

use crate::error::AgendoError;
use crate::types::{LlmReply, LlmRequest};

/// An LLM provider: ordered messages plus a system instruction and a
/// bound tool schema in, one message (free text and/or tool calls) out.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a completion request and returns the full reply.
    async fn complete(&self, request: LlmRequest) -> Result<LlmReply, AgendoError>;
}

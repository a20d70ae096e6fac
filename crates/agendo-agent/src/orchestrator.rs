// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-turn conversation orchestrator.
//!
//! States: load_context -> assistant <-> tool_execution ->
//! persist_reply -> maintain_memory -> done. The machine is re-entered
//! from scratch on every inbound message; the store is the only thing
//! that survives between turns, which is what lets the front-end scale
//! horizontally with no session affinity.

use agendo_core::AgendoError;
use agendo_core::types::{ChatMessage, ContentPart, LlmRequest, Role};
use agendo_memory::{
    ProfileSettings, SummarySettings, format_transcript, maintain_profile, maintain_summary,
    profile_checkpoint_due,
};
use tracing::{debug, info, warn};

use crate::container::AppContext;
use crate::context::{ContextOutcome, load_context};
use crate::prompts::build_system_prompt;
use crate::state::{InboundTurn, TurnState};
use crate::tools::{execute_tool, tool_specs};

/// Drives one inbound message through a full turn.
pub struct Orchestrator {
    ctx: AppContext,
}

impl Orchestrator {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Handles one inbound message and returns the assistant's reply.
    ///
    /// `None` means a reply-less turn: unresolved identity, or the
    /// assistant produced no final text.
    pub async fn handle_turn(&self, inbound: &InboundTurn) -> Result<Option<String>, AgendoError> {
        let (state, update) = match load_context(&self.ctx, inbound).await? {
            ContextOutcome::Ready { state, update } => (state, update),
            ContextOutcome::Unresolved { reason } => {
                warn!(reason, "identity unresolved, ending turn without reply");
                return Ok(None);
            }
        };

        let mut messages: Vec<ChatMessage> = Vec::new();
        update.apply(&mut messages);

        let reply = self.assistant_loop(&state, &mut messages).await?;

        if let Some(text) = &reply {
            self.ctx
                .storage
                .append_message(&state.conversation_id, Role::Assistant, text)
                .await?;
        }

        self.maintain_memory(&state).await;

        Ok(reply)
    }

    /// The assistant/tool loop: call the LLM, execute any requested
    /// tools, feed the results back, and repeat until a tool-free
    /// reply (or the round guard trips).
    async fn assistant_loop(
        &self,
        state: &TurnState,
        messages: &mut Vec<ChatMessage>,
    ) -> Result<Option<String>, AgendoError> {
        let branches = self.ctx.storage.list_branches(&state.business.id).await?;
        let system = build_system_prompt(state, &branches);
        let config = &self.ctx.config;

        for round in 0..config.conversation.max_tool_rounds {
            let window = prompt_window(messages, config.conversation.max_prompt_messages);
            let reply = self
                .ctx
                .provider
                .complete(LlmRequest {
                    model: config.anthropic.default_model.clone(),
                    system: Some(system.clone()),
                    messages: window,
                    max_tokens: config.anthropic.max_tokens,
                    tools: tool_specs(),
                })
                .await?;

            if !reply.has_tool_calls() {
                let text = reply.text();
                if text.trim().is_empty() {
                    debug!(round, "assistant returned empty reply");
                    return Ok(None);
                }
                return Ok(Some(text));
            }

            // Tool plumbing is ephemeral: it lives in the working list
            // for this turn only and is never persisted.
            messages.push(reply.as_assistant_message());
            let mut results = Vec::new();
            for call in reply.tool_calls() {
                let output = execute_tool(&self.ctx, state, &call).await;
                results.push(ContentPart::ToolResult {
                    tool_use_id: call.id,
                    content: output,
                    is_error: None,
                });
            }
            messages.push(ChatMessage {
                role: Role::User,
                content: results,
            });
        }

        warn!(
            conversation_id = %state.conversation_id,
            "tool round guard tripped, ending turn without reply"
        );
        Ok(None)
    }

    /// Tier-2 then tier-3 maintenance. Both are non-fatal: the reply is
    /// already persisted, so failures only log and keep prior memory.
    async fn maintain_memory(&self, state: &TurnState) {
        let config = &self.ctx.config;
        let summary_settings = SummarySettings {
            model: self.ctx.memory_model(),
            threshold: config.memory.summary_threshold,
            update_tail: config.memory.summary_update_tail,
        };

        let summary = match maintain_summary(
            self.ctx.provider.as_ref(),
            self.ctx.storage.as_ref(),
            &state.conversation_id,
            &summary_settings,
        )
        .await
        {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "summary maintenance failed, keeping prior summary");
                None
            }
        };

        let message_count = match self.ctx.storage.get_conversation(&state.conversation_id).await
        {
            Ok(Some(conversation)) => conversation.message_count,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "conversation reload failed, skipping profile checkpoint");
                return;
            }
        };

        let profile_settings = ProfileSettings {
            model: self.ctx.memory_model(),
            checkpoint_start: config.memory.profile_checkpoint_start,
            checkpoint_every: config.memory.profile_checkpoint_every,
            list_cap: config.memory.profile_list_cap,
        };
        if !profile_checkpoint_due(message_count, &profile_settings) {
            return;
        }

        // Tier 3 extracts from the freshest summary; without one, a
        // short recent transcript stands in.
        let context = match summary.or_else(|| state.summary.clone()) {
            Some(summary) => summary,
            None => {
                match self
                    .ctx
                    .storage
                    .conversation_messages(
                        &state.conversation_id,
                        Some(config.conversation.recent_window),
                    )
                    .await
                {
                    Ok(recent) => format_transcript(&recent),
                    Err(e) => {
                        warn!(error = %e, "transcript reload failed, skipping profile checkpoint");
                        return;
                    }
                }
            }
        };

        match maintain_profile(
            self.ctx.provider.as_ref(),
            self.ctx.storage.as_ref(),
            &state.session_id,
            &context,
            &profile_settings,
        )
        .await
        {
            Ok(Some(_)) => info!(session_id = %state.session_id, "profile checkpoint applied"),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "profile maintenance failed, keeping prior profile");
            }
        }
    }
}

/// The most recent `max` messages, never starting on a tool-result
/// message (its tool-use partner must stay in the window).
fn prompt_window(messages: &[ChatMessage], max: usize) -> Vec<ChatMessage> {
    if messages.len() <= max {
        return messages.to_vec();
    }
    let mut start = messages.len() - max;
    while start > 0 && starts_with_tool_result(&messages[start]) {
        start -= 1;
    }
    messages[start..].to_vec()
}

fn starts_with_tool_result(message: &ChatMessage) -> bool {
    matches!(
        message.content.first(),
        Some(ContentPart::ToolResult { .. })
    )
}

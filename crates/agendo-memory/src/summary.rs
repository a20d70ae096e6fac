// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier-2 memory: the per-conversation rolling summary.
//!
//! Once the persisted message count exceeds the threshold, the first
//! pass summarizes everything but the last two messages. Every later
//! pass feeds the existing summary plus a short recent tail into an
//! update prompt, replacing the stored summary. Context loading only
//! reloads a small raw tail once a summary exists, so prompt size stays
//! bounded no matter how long the conversation runs.

use agendo_core::domain::StoredMessage;
use agendo_core::types::{ChatMessage, LlmRequest, Role};
use agendo_core::{AgendoError, LlmProvider, Storage};
use tracing::info;

/// Prompt for the initial summary.
const SUMMARY_PROMPT: &str = "Eres un asistente que resume conversaciones de manera concisa.
Resume la siguiente conversación manteniendo los puntos clave:
- Información del usuario (nombre, cédula si se mencionó)
- Servicios o citas discutidos
- Cualquier preferencia expresada
- Estado actual de la conversación

Conversación:
{conversation}

Resumen conciso:";

/// Prompt for updating an existing summary with recent messages.
const UPDATE_SUMMARY_PROMPT: &str = "Eres un asistente que actualiza resúmenes de conversaciones.

Resumen anterior:
{existing_summary}

Nuevos mensajes:
{new_messages}

Actualiza el resumen incorporando la nueva información de manera concisa:";

/// Summarization policy settings.
#[derive(Debug, Clone)]
pub struct SummarySettings {
    /// Model used for summarization calls.
    pub model: String,
    /// Persisted message count above which summarization runs.
    pub threshold: u32,
    /// Most recent messages fed into a summary update.
    pub update_tail: u32,
}

/// What the summarizer should do for a conversation state.
#[derive(Debug, PartialEq)]
pub enum SummaryPlan<'a> {
    /// Not enough messages yet.
    Skip,
    /// First summary: everything but the last two messages.
    Initial(&'a [StoredMessage]),
    /// Update: fold the recent tail into the existing summary.
    Update {
        existing: &'a str,
        recent: &'a [StoredMessage],
    },
}

/// Decides the summarization step for the current message ledger.
pub fn summary_plan<'a>(
    messages: &'a [StoredMessage],
    existing: Option<&'a str>,
    settings: &SummarySettings,
) -> SummaryPlan<'a> {
    let count = messages.len();
    if count <= settings.threshold as usize {
        return SummaryPlan::Skip;
    }
    match existing {
        None => SummaryPlan::Initial(&messages[..count - 2]),
        Some(existing) => {
            let tail_start = count.saturating_sub(settings.update_tail as usize);
            SummaryPlan::Update {
                existing,
                recent: &messages[tail_start..],
            }
        }
    }
}

/// Formats stored messages for a summarization prompt.
pub fn format_transcript(messages: &[StoredMessage]) -> String {
    messages
        .iter()
        .map(|m| match m.role {
            Role::User => format!("Usuario: {}", m.content),
            Role::Assistant => format!("Asistente: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs the tier-2 maintenance step for a conversation.
///
/// Reads the full ledger, decides the plan, calls the LLM, and replaces
/// the stored summary. Returns the new summary when one was generated.
/// Callers treat errors as non-fatal: the turn already produced its
/// reply and the prior summary stays in place.
pub async fn maintain_summary(
    provider: &dyn LlmProvider,
    storage: &dyn Storage,
    conversation_id: &str,
    settings: &SummarySettings,
) -> Result<Option<String>, AgendoError> {
    let messages = storage.conversation_messages(conversation_id, None).await?;
    let conversation = storage.get_conversation(conversation_id).await?;
    let existing = conversation.as_ref().and_then(|c| c.summary.as_deref());

    let prompt = match summary_plan(&messages, existing, settings) {
        SummaryPlan::Skip => return Ok(None),
        SummaryPlan::Initial(to_summarize) => {
            SUMMARY_PROMPT.replace("{conversation}", &format_transcript(to_summarize))
        }
        SummaryPlan::Update { existing, recent } => UPDATE_SUMMARY_PROMPT
            .replace("{existing_summary}", existing)
            .replace("{new_messages}", &format_transcript(recent)),
    };

    let reply = provider
        .complete(LlmRequest {
            model: settings.model.clone(),
            system: None,
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: 1024,
            tools: Vec::new(),
        })
        .await?;

    let summary = reply.text();
    if summary.trim().is_empty() {
        return Ok(None);
    }

    storage.update_summary(conversation_id, &summary).await?;
    info!(
        conversation_id,
        messages = messages.len(),
        updated = existing.is_some(),
        "conversation summary replaced"
    );
    Ok(Some(summary))
}

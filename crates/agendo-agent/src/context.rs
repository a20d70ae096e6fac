// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `load_context` stage: rebuilds the whole turn from storage.
//!
//! No process memory carries across turns. Identity is resolved from
//! the message addresses, the session and active conversation are
//! loaded or created, history is reloaded (a short tail once a summary
//! exists), and the inbound message is appended with an idempotency
//! guard against transport retries. The rebuilt message list is
//! returned as `HistoryUpdate::Replace`.

use agendo_core::AgendoError;
use agendo_core::domain::StoredMessage;
use agendo_core::types::{ChatMessage, ContentPart, Role};
use agendo_memory::UserProfile;
use tracing::debug;

use crate::container::AppContext;
use crate::state::{HistoryUpdate, InboundTurn, TurnState};

/// Outcome of context loading.
#[derive(Debug)]
pub enum ContextOutcome {
    /// The turn can proceed.
    Ready {
        state: TurnState,
        update: HistoryUpdate,
    },
    /// Identity could not be resolved; the turn ends without a reply.
    Unresolved { reason: String },
}

/// Resolves identity and rebuilds the conversation for one turn.
pub async fn load_context(
    ctx: &AppContext,
    inbound: &InboundTurn,
) -> Result<ContextOutcome, AgendoError> {
    if inbound.from.trim().is_empty() || inbound.to.trim().is_empty() {
        return Ok(ContextOutcome::Unresolved {
            reason: "missing origin or destination address".into(),
        });
    }

    let Some(business) = ctx.storage.find_business_by_channel(&inbound.to).await? else {
        return Ok(ContextOutcome::Unresolved {
            reason: format!("no business registered for address {}", inbound.to),
        });
    };

    let session = ctx
        .storage
        .get_or_create_session(&business.id, &inbound.from)
        .await?;

    let user = ctx
        .storage
        .find_user_by_phone(&business.id, &inbound.from)
        .await?;
    if let Some(user) = &user
        && session.user_id.is_none()
    {
        ctx.storage.link_session_user(&session.id, &user.id).await?;
    }

    let branches = ctx.storage.list_branches(&business.id).await?;
    let branch_id = match branches.as_slice() {
        [only] => Some(only.id.clone()),
        _ => None,
    };

    let conversation = match ctx
        .storage
        .active_conversation(&session.id, ctx.config.conversation.timeout_hours)
        .await?
    {
        Some(conversation) => conversation,
        // The stale conversation, if any, stays untouched in storage;
        // it is simply never selected again.
        None => ctx.storage.create_conversation(&session.id).await?,
    };

    // Tier 1: with a summary only a short raw tail is reloaded.
    let summary = conversation.summary.clone();
    let history_cap = summary
        .is_some()
        .then_some(ctx.config.conversation.recent_window);
    let history = ctx
        .storage
        .conversation_messages(&conversation.id, history_cap)
        .await?;

    // Idempotency guard: a transport retry delivers the same user text
    // again; the immediately preceding stored message already holds it.
    let duplicate = history
        .last()
        .is_some_and(|m| m.role == Role::User && m.content == inbound.text);

    let mut rebuilt: Vec<ChatMessage> = history.iter().map(to_chat_message).collect();
    if duplicate {
        debug!(
            conversation_id = %conversation.id,
            "inbound message already stored, skipping insert"
        );
    } else {
        ctx.storage
            .append_message(&conversation.id, Role::User, &inbound.text)
            .await?;
        rebuilt.push(ChatMessage::user(inbound.text.clone()));
    }

    let profile_blob = ctx.storage.memory_profile(&session.id).await?;

    let state = TurnState {
        business,
        branch_id,
        session_id: session.id,
        conversation_id: conversation.id,
        user_phone: inbound.from.clone(),
        user,
        summary,
        profile: UserProfile::from_stored(profile_blob.as_deref()),
    };

    Ok(ContextOutcome::Ready {
        state,
        update: HistoryUpdate::Replace(rebuilt),
    })
}

fn to_chat_message(message: &StoredMessage) -> ChatMessage {
    ChatMessage {
        role: message.role,
        content: vec![ContentPart::Text {
            text: message.content.clone(),
        }],
    }
}

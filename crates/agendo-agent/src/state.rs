// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed per-turn state.
//!
//! One concrete struct flows through the whole turn. It is rebuilt from
//! storage on every inbound message; nothing in it survives the turn.

use agendo_core::domain::{Business, User};
use agendo_core::types::ChatMessage;
use agendo_memory::UserProfile;

/// One inbound message addressed to a business.
#[derive(Debug, Clone)]
pub struct InboundTurn {
    /// Origin address (the user's phone).
    pub from: String,
    /// Destination address (the business's channel phone).
    pub to: String,
    /// Message text.
    pub text: String,
}

/// Context resolved for one turn.
#[derive(Debug, Clone)]
pub struct TurnState {
    pub business: Business,
    /// Set when the business has exactly one branch.
    pub branch_id: Option<String>,
    pub session_id: String,
    pub conversation_id: String,
    pub user_phone: String,
    /// Known user for this phone, when already registered.
    pub user: Option<User>,
    /// Tier-2 rolling summary, when one exists.
    pub summary: Option<String>,
    /// Tier-3 cross-conversation profile.
    pub profile: UserProfile,
}

/// How a stage's message list applies to the accumulated history.
///
/// `Replace` is what makes each turn stateless: the context loader
/// rebuilds the working list from storage and discards any stale
/// carry-over instead of appending to it.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryUpdate {
    /// Discard everything accumulated and start from this list.
    Replace(Vec<ChatMessage>),
    /// Append to the accumulated list.
    Append(Vec<ChatMessage>),
}

impl HistoryUpdate {
    /// Applies this update to a working message list.
    pub fn apply(self, messages: &mut Vec<ChatMessage>) {
        match self {
            HistoryUpdate::Replace(list) => *messages = list,
            HistoryUpdate::Append(list) => messages.extend(list),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_discards_accumulated_messages() {
        let mut messages = vec![ChatMessage::user("viejo"), ChatMessage::assistant("stale")];
        HistoryUpdate::Replace(vec![ChatMessage::user("nuevo")]).apply(&mut messages);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text(), "nuevo");
    }

    #[test]
    fn append_extends_accumulated_messages() {
        let mut messages = vec![ChatMessage::user("hola")];
        HistoryUpdate::Append(vec![ChatMessage::assistant("buenas")]).apply(&mut messages);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text(), "buenas");
    }
}

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message ledger operations.
//!
//! Messages are append-only. Inserting a message bumps the owning
//! conversation's message_count and last_message_at in the same
//! transaction.

use agendo_core::AgendoError;
use agendo_core::types::Role;
use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::{Database, map_tr_err};
use crate::models::StoredMessage;
use crate::queries::parse_column;

/// Appends a message and atomically updates the conversation counters.
pub async fn append_message(
    db: &Database,
    conversation_id: &str,
    role: Role,
    content: &str,
) -> Result<StoredMessage, AgendoError> {
    let message = StoredMessage {
        id: Uuid::new_v4().to_string(),
        conversation_id: conversation_id.to_string(),
        role,
        content: content.to_string(),
        created_at: Utc::now().naive_utc(),
    };

    let inserted = message.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO messages (id, conversation_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    inserted.id,
                    inserted.conversation_id,
                    inserted.role.to_string(),
                    inserted.content,
                    inserted.created_at,
                ],
            )?;
            tx.execute(
                "UPDATE conversations
                 SET message_count = message_count + 1, last_message_at = ?1
                 WHERE id = ?2",
                params![inserted.created_at, inserted.conversation_id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

    Ok(message)
}

/// Messages for a conversation in chronological order.
///
/// With `last = Some(k)` only the most recent k are returned, still
/// oldest-first.
pub async fn messages_for_conversation(
    db: &Database,
    conversation_id: &str,
    last: Option<u32>,
) -> Result<Vec<StoredMessage>, AgendoError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match last {
                Some(k) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, role, content, created_at
                         FROM messages WHERE conversation_id = ?1
                         ORDER BY created_at DESC, rowid DESC LIMIT ?2",
                    )?;
                    let rows = stmt.query_map(params![conversation_id, k], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                    // DESC fetch of the tail; flip back to chronological.
                    messages.reverse();
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, role, content, created_at
                         FROM messages WHERE conversation_id = ?1
                         ORDER BY created_at ASC, rowid ASC",
                    )?;
                    let rows = stmt.query_map(params![conversation_id], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<StoredMessage, rusqlite::Error> {
    let role: String = row.get(2)?;
    Ok(StoredMessage {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role: parse_column::<Role>(2, &role)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

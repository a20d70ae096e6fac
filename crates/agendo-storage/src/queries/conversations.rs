// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lifecycle operations.
//!
//! A conversation is never expired in place by a background sweep: the
//! active-conversation query simply stops selecting it once its last
//! message falls outside the timeout window.

use agendo_core::AgendoError;
use agendo_core::domain::ConversationStatus;
use chrono::{Duration, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::{Database, map_tr_err};
use crate::models::Conversation;
use crate::queries::parse_column;

pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, AgendoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, status, summary, summary_updated_at,
                        message_count, created_at, last_message_at
                 FROM conversations WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// The active conversation for a session: status=active with a last
/// message inside the timeout window, most recently created first.
pub async fn active_conversation(
    db: &Database,
    session_id: &str,
    timeout_hours: i64,
) -> Result<Option<Conversation>, AgendoError> {
    let session_id = session_id.to_string();
    let cutoff = Utc::now().naive_utc() - Duration::hours(timeout_hours);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, status, summary, summary_updated_at,
                        message_count, created_at, last_message_at
                 FROM conversations
                 WHERE session_id = ?1 AND status = 'active' AND last_message_at > ?2
                 ORDER BY created_at DESC LIMIT 1",
            )?;
            let result = stmt.query_row(params![session_id, cutoff], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_conversation(
    db: &Database,
    session_id: &str,
) -> Result<Conversation, AgendoError> {
    let now = Utc::now().naive_utc();
    let conversation = Conversation {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        status: ConversationStatus::Active,
        summary: None,
        summary_updated_at: None,
        message_count: 0,
        created_at: now,
        last_message_at: now,
    };

    let inserted = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, session_id, status, summary, summary_updated_at,
                                            message_count, created_at, last_message_at)
                 VALUES (?1, ?2, ?3, NULL, NULL, 0, ?4, ?5)",
                params![
                    inserted.id,
                    inserted.session_id,
                    inserted.status.to_string(),
                    inserted.created_at,
                    inserted.last_message_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

    Ok(conversation)
}

/// Replaces the stored tier-2 summary.
pub async fn update_summary(
    db: &Database,
    conversation_id: &str,
    summary: &str,
) -> Result<(), AgendoError> {
    let conversation_id = conversation_id.to_string();
    let summary = summary.to_string();
    let now = Utc::now().naive_utc();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET summary = ?1, summary_updated_at = ?2 WHERE id = ?3",
                params![summary, now, conversation_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    let status: String = row.get(2)?;
    Ok(Conversation {
        id: row.get(0)?,
        session_id: row.get(1)?,
        status: parse_column::<ConversationStatus>(2, &status)?,
        summary: row.get(3)?,
        summary_updated_at: row.get(4)?,
        message_count: row.get(5)?,
        created_at: row.get(6)?,
        last_message_at: row.get(7)?,
    })
}

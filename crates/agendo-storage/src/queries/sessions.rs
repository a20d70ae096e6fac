// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session operations.
//!
//! A session binds a user phone number to a business and lives across
//! many conversations. The tier-3 memory profile is stored here as an
//! opaque JSON blob.

use agendo_core::AgendoError;
use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::{Database, map_tr_err};
use crate::models::Session;

/// Fetches the session for (business, phone), creating it on first
/// contact. Bumps `last_activity_at` either way.
pub async fn get_or_create_session(
    db: &Database,
    business_id: &str,
    user_phone: &str,
) -> Result<Session, AgendoError> {
    let business_id = business_id.to_string();
    let user_phone = user_phone.to_string();
    let now = Utc::now().naive_utc();
    let fresh_id = Uuid::new_v4().to_string();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing = {
                let mut stmt = tx.prepare(
                    "SELECT id, business_id, user_phone, user_id, memory_profile,
                            memory_profile_updated_at, created_at, last_activity_at
                     FROM sessions WHERE business_id = ?1 AND user_phone = ?2",
                )?;
                match stmt.query_row(params![business_id, user_phone], row_to_session) {
                    Ok(session) => Some(session),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };

            let session = match existing {
                Some(mut session) => {
                    tx.execute(
                        "UPDATE sessions SET last_activity_at = ?1 WHERE id = ?2",
                        params![now, session.id],
                    )?;
                    session.last_activity_at = now;
                    session
                }
                None => {
                    let session = Session {
                        id: fresh_id,
                        business_id,
                        user_phone,
                        user_id: None,
                        memory_profile: None,
                        memory_profile_updated_at: None,
                        created_at: now,
                        last_activity_at: now,
                    };
                    tx.execute(
                        "INSERT INTO sessions (id, business_id, user_phone, user_id,
                                               memory_profile, memory_profile_updated_at,
                                               created_at, last_activity_at)
                         VALUES (?1, ?2, ?3, NULL, NULL, NULL, ?4, ?5)",
                        params![
                            session.id,
                            session.business_id,
                            session.user_phone,
                            session.created_at,
                            session.last_activity_at,
                        ],
                    )?;
                    session
                }
            };

            tx.commit()?;
            Ok(session)
        })
        .await
        .map_err(map_tr_err)
}

/// Binds an identified user to a session.
pub async fn link_session_user(
    db: &Database,
    session_id: &str,
    user_id: &str,
) -> Result<(), AgendoError> {
    let session_id = session_id.to_string();
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sessions SET user_id = ?1 WHERE id = ?2",
                params![user_id, session_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The tier-3 memory profile JSON, if one has been written.
pub async fn memory_profile(
    db: &Database,
    session_id: &str,
) -> Result<Option<String>, AgendoError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT memory_profile FROM sessions WHERE id = ?1",
                params![session_id],
                |row| row.get::<_, Option<String>>(0),
            );
            match result {
                Ok(profile) => Ok(profile),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Replaces the tier-3 memory profile.
pub async fn update_memory_profile(
    db: &Database,
    session_id: &str,
    profile_json: &str,
) -> Result<(), AgendoError> {
    let session_id = session_id.to_string();
    let profile_json = profile_json.to_string();
    let now = Utc::now().naive_utc();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET memory_profile = ?1, memory_profile_updated_at = ?2
                 WHERE id = ?3",
                params![profile_json, now, session_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_session(row: &rusqlite::Row<'_>) -> Result<Session, rusqlite::Error> {
    Ok(Session {
        id: row.get(0)?,
        business_id: row.get(1)?,
        user_phone: row.get(2)?,
        user_id: row.get(3)?,
        memory_profile: row.get(4)?,
        memory_profile_updated_at: row.get(5)?,
        created_at: row.get(6)?,
        last_activity_at: row.get(7)?,
    })
}

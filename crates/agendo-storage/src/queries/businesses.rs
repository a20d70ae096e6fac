// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business and branch lookups.

use agendo_core::AgendoError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{Branch, Business};

pub async fn get_business(db: &Database, id: &str) -> Result<Option<Business>, AgendoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, bot_name, greeting, channel_address,
                        booking_window_days, is_active
                 FROM businesses WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_business);
            match result {
                Ok(business) => Ok(Some(business)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Resolves the business owning an inbound destination address.
pub async fn find_business_by_channel(
    db: &Database,
    channel_address: &str,
) -> Result<Option<Business>, AgendoError> {
    let channel_address = channel_address.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, bot_name, greeting, channel_address,
                        booking_window_days, is_active
                 FROM businesses WHERE channel_address = ?1 AND is_active = 1",
            )?;
            let result = stmt.query_row(params![channel_address], row_to_business);
            match result {
                Ok(business) => Ok(Some(business)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_branch(db: &Database, id: &str) -> Result<Option<Branch>, AgendoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, business_id, name, address, city, is_active
                 FROM branches WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_branch);
            match result {
                Ok(branch) => Ok(Some(branch)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_branches(db: &Database, business_id: &str) -> Result<Vec<Branch>, AgendoError> {
    let business_id = business_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, business_id, name, address, city, is_active
                 FROM branches WHERE business_id = ?1 AND is_active = 1
                 ORDER BY name ASC",
            )?;
            let rows = stmt.query_map(params![business_id], row_to_branch)?;
            let mut branches = Vec::new();
            for row in rows {
                branches.push(row?);
            }
            Ok(branches)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_business(db: &Database, business: &Business) -> Result<(), AgendoError> {
    let b = business.clone();
    let now = chrono::Utc::now().naive_utc();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO businesses (id, name, bot_name, greeting, channel_address,
                                         booking_window_days, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    b.id,
                    b.name,
                    b.bot_name,
                    b.greeting,
                    b.channel_address,
                    b.booking_window_days,
                    b.is_active,
                    now,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn create_branch(db: &Database, branch: &Branch) -> Result<(), AgendoError> {
    let b = branch.clone();
    let now = chrono::Utc::now().naive_utc();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO branches (id, business_id, name, address, city, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![b.id, b.business_id, b.name, b.address, b.city, b.is_active, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_business(row: &rusqlite::Row<'_>) -> Result<Business, rusqlite::Error> {
    Ok(Business {
        id: row.get(0)?,
        name: row.get(1)?,
        bot_name: row.get(2)?,
        greeting: row.get(3)?,
        channel_address: row.get(4)?,
        booking_window_days: row.get(5)?,
        is_active: row.get(6)?,
    })
}

fn row_to_branch(row: &rusqlite::Row<'_>) -> Result<Branch, rusqlite::Error> {
    Ok(Branch {
        id: row.get(0)?,
        business_id: row.get(1)?,
        name: row.get(2)?,
        address: row.get(3)?,
        city: row.get(4)?,
        is_active: row.get(5)?,
    })
}

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment operations.
//!
//! Appointments are never deleted. Cancelling and rescheduling are
//! in-place updates; snapshot columns are written once at creation and
//! never touched again.

use agendo_core::AgendoError;
use agendo_core::domain::AppointmentStatus;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Appointment;
use crate::queries::parse_column;

pub async fn create_appointment(
    db: &Database,
    appointment: &Appointment,
) -> Result<(), AgendoError> {
    let a = appointment.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO appointments (id, user_id, resource_id, service_id, branch_id,
                                           service_name_snapshot, service_price_snapshot,
                                           service_duration_snapshot, resource_name_snapshot,
                                           date, start_time, end_time, external_event_id,
                                           status, cancellation_reason, cancelled_at,
                                           cancelled_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                         ?15, ?16, ?17, ?18, ?19)",
                params![
                    a.id,
                    a.user_id,
                    a.resource_id,
                    a.service_id,
                    a.branch_id,
                    a.service_name_snapshot,
                    a.service_price_snapshot,
                    a.service_duration_snapshot,
                    a.resource_name_snapshot,
                    a.date,
                    a.start_time,
                    a.end_time,
                    a.external_event_id,
                    a.status.to_string(),
                    a.cancellation_reason,
                    a.cancelled_at,
                    a.cancelled_by,
                    a.created_at,
                    a.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_appointment(db: &Database, id: &str) -> Result<Option<Appointment>, AgendoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("{APPOINTMENT_SELECT} WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_appointment);
            match result {
                Ok(appointment) => Ok(Some(appointment)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_appointments_by_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<Appointment>, AgendoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{APPOINTMENT_SELECT} WHERE user_id = ?1 ORDER BY date DESC, start_time DESC"
            ))?;
            let rows = stmt.query_map(params![user_id], row_to_appointment)?;
            let mut appointments = Vec::new();
            for row in rows {
                appointments.push(row?);
            }
            Ok(appointments)
        })
        .await
        .map_err(map_tr_err)
}

/// Scheduled appointments for a user on or after `from`, soonest first.
pub async fn upcoming_appointments(
    db: &Database,
    user_id: &str,
    from: NaiveDate,
) -> Result<Vec<Appointment>, AgendoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{APPOINTMENT_SELECT}
                 WHERE user_id = ?1 AND status = 'scheduled' AND date >= ?2
                 ORDER BY date ASC, start_time ASC"
            ))?;
            let rows = stmt.query_map(params![user_id, from], row_to_appointment)?;
            let mut appointments = Vec::new();
            for row in rows {
                appointments.push(row?);
            }
            Ok(appointments)
        })
        .await
        .map_err(map_tr_err)
}

/// Scheduled appointments for a resource on a date, by start time.
///
/// This is the local booked-slot source for the availability fallback
/// and for the commit-time re-validation.
pub async fn scheduled_appointments_for_resource(
    db: &Database,
    resource_id: &str,
    date: NaiveDate,
) -> Result<Vec<Appointment>, AgendoError> {
    let resource_id = resource_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{APPOINTMENT_SELECT}
                 WHERE resource_id = ?1 AND date = ?2 AND status = 'scheduled'
                 ORDER BY start_time ASC"
            ))?;
            let rows = stmt.query_map(params![resource_id, date], row_to_appointment)?;
            let mut appointments = Vec::new();
            for row in rows {
                appointments.push(row?);
            }
            Ok(appointments)
        })
        .await
        .map_err(map_tr_err)
}

/// Marks an appointment cancelled with reason, actor, and timestamp.
pub async fn cancel_appointment(
    db: &Database,
    id: &str,
    reason: &str,
    actor: &str,
    at: NaiveDateTime,
) -> Result<(), AgendoError> {
    let id = id.to_string();
    let reason = reason.to_string();
    let actor = actor.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE appointments
                 SET status = 'cancelled', cancellation_reason = ?1, cancelled_by = ?2,
                     cancelled_at = ?3, updated_at = ?3
                 WHERE id = ?4",
                params![reason, actor, at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Moves an appointment in place. Status is untouched.
pub async fn reschedule_appointment(
    db: &Database,
    id: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    external_event_id: Option<&str>,
) -> Result<(), AgendoError> {
    let id = id.to_string();
    let external_event_id = external_event_id.map(|s| s.to_string());
    let now = Utc::now().naive_utc();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE appointments
                 SET date = ?1, start_time = ?2, end_time = ?3, external_event_id = ?4,
                     updated_at = ?5
                 WHERE id = ?6",
                params![date, start, end, external_event_id, now, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

const APPOINTMENT_SELECT: &str =
    "SELECT id, user_id, resource_id, service_id, branch_id, service_name_snapshot, \
     service_price_snapshot, service_duration_snapshot, resource_name_snapshot, date, \
     start_time, end_time, external_event_id, status, cancellation_reason, cancelled_at, \
     cancelled_by, created_at, updated_at FROM appointments";

fn row_to_appointment(row: &rusqlite::Row<'_>) -> Result<Appointment, rusqlite::Error> {
    let status: String = row.get(13)?;
    Ok(Appointment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        resource_id: row.get(2)?,
        service_id: row.get(3)?,
        branch_id: row.get(4)?,
        service_name_snapshot: row.get(5)?,
        service_price_snapshot: row.get(6)?,
        service_duration_snapshot: row.get(7)?,
        resource_name_snapshot: row.get(8)?,
        date: row.get(9)?,
        start_time: row.get(10)?,
        end_time: row.get(11)?,
        external_event_id: row.get(12)?,
        status: parse_column::<AppointmentStatus>(13, &status)?,
        cancellation_reason: row.get(14)?,
        cancelled_at: row.get(15)?,
        cancelled_by: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

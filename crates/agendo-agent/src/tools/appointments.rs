// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment tools: create, list, cancel, reschedule.
//!
//! These wrap the booking engine and translate its typed outcomes into
//! conversational results. Profile bookkeeping after a confirmed
//! booking or cancellation is best effort and never fails the tool.

use agendo_memory::{UserProfile, note_booking, note_cancellation};
use agendo_scheduling::{BookingOutcome, BookingRequest, CancelOutcome, RescheduleOutcome};
use chrono::{Local, NaiveTime};
use serde_json::{Value, json};
use tracing::warn;

use crate::container::AppContext;
use crate::state::TurnState;
use crate::tools::{infra_error, parse_date, parse_time, required_str, resolve_branch_id};

pub async fn create_appointment(
    ctx: &AppContext,
    state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let request = BookingRequest {
        user_id: required_str(input, "user_id")?.to_string(),
        branch_id: resolve_branch_id(state, input)?,
        service_name: required_str(input, "service_name")?.to_string(),
        resource_name: required_str(input, "resource_name")?.to_string(),
        date: parse_date(required_str(input, "appointment_date")?)?,
        start: parse_time(required_str(input, "appointment_time")?)?,
    };

    let outcome = ctx
        .booking_engine()
        .create(&request)
        .await
        .map_err(infra_error)?;

    match outcome {
        BookingOutcome::Confirmed(appointment) => {
            record_booking_in_profile(
                ctx,
                state,
                &appointment.service_name_snapshot,
                &appointment.resource_name_snapshot,
                &appointment.date.to_string(),
                appointment.start_time,
            )
            .await;

            let location = ctx
                .storage
                .get_branch(&appointment.branch_id)
                .await
                .ok()
                .flatten()
                .map(|b| format!("{} - {}", b.name, b.address));

            Ok(json!({
                "success": true,
                "appointment_id": appointment.id,
                "message": "¡Cita confirmada!",
                "details": {
                    "service": appointment.service_name_snapshot,
                    "employee": appointment.resource_name_snapshot,
                    "date": appointment.date.to_string(),
                    "time": appointment.start_time.format("%H:%M").to_string(),
                    "duration": format!("{} minutos", appointment.service_duration_snapshot),
                    "price": format!("${:.2}", appointment.service_price_snapshot),
                    "location": location,
                },
            }))
        }
        BookingOutcome::Rejected {
            message,
            alternatives,
        } => Err(with_alternatives(message, &alternatives)),
    }
}

pub async fn get_user_appointments(
    ctx: &AppContext,
    _state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let user_id = required_str(input, "user_id")?;
    let today = Local::now().date_naive();
    let upcoming = ctx
        .storage
        .upcoming_appointments(user_id, today)
        .await
        .map_err(infra_error)?;

    if upcoming.is_empty() {
        return Err("No tienes citas programadas.".into());
    }

    Ok(json!({
        "upcoming_appointments": upcoming
            .iter()
            .map(|a| {
                json!({
                    "appointment_id": a.id,
                    "service": a.service_name_snapshot,
                    "employee": a.resource_name_snapshot,
                    "date": a.date.to_string(),
                    "time": a.start_time.format("%H:%M").to_string(),
                    "status": a.status.to_string(),
                })
            })
            .collect::<Vec<_>>(),
        "count": upcoming.len(),
    }))
}

pub async fn cancel_appointment(
    ctx: &AppContext,
    state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let appointment_id = required_str(input, "appointment_id")?;
    let reason = required_str(input, "reason")?;

    let outcome = ctx
        .booking_engine()
        .cancel(appointment_id, reason, "user")
        .await
        .map_err(infra_error)?;

    match outcome {
        CancelOutcome::Cancelled(appointment) => {
            record_cancellation_in_profile(ctx, state).await;
            Ok(json!({
                "success": true,
                "message": "Cita cancelada correctamente.",
                "cancelled_appointment": {
                    "service": appointment.service_name_snapshot,
                    "date": appointment.date.to_string(),
                    "time": appointment.start_time.format("%H:%M").to_string(),
                    "reason": reason,
                },
            }))
        }
        CancelOutcome::AlreadyCancelled(_) => {
            Err("Esta cita ya fue cancelada anteriormente.".into())
        }
        CancelOutcome::NotFound => Err(format!("No se encontró la cita {appointment_id}.")),
    }
}

pub async fn reschedule_appointment(
    ctx: &AppContext,
    _state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let appointment_id = required_str(input, "appointment_id")?;
    let new_date = parse_date(required_str(input, "new_date")?)?;
    let new_time = parse_time(required_str(input, "new_time")?)?;

    let outcome = ctx
        .booking_engine()
        .reschedule(appointment_id, new_date, new_time)
        .await
        .map_err(infra_error)?;

    match outcome {
        RescheduleOutcome::Moved {
            appointment,
            previous_date,
            previous_start,
        } => Ok(json!({
            "success": true,
            "message": "Cita reagendada correctamente.",
            "new_appointment": {
                "service": appointment.service_name_snapshot,
                "employee": appointment.resource_name_snapshot,
                "date": appointment.date.to_string(),
                "time": appointment.start_time.format("%H:%M").to_string(),
            },
            "previous": {
                "date": previous_date.to_string(),
                "time": previous_start.format("%H:%M").to_string(),
            },
        })),
        RescheduleOutcome::Rejected {
            message,
            alternatives,
        } => Err(with_alternatives(message, &alternatives)),
        RescheduleOutcome::NotFound => Err(format!("No se encontró la cita {appointment_id}.")),
    }
}

fn with_alternatives(message: String, alternatives: &[NaiveTime]) -> String {
    if alternatives.is_empty() {
        return message;
    }
    let listed = alternatives
        .iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{message} Horarios disponibles: {listed}.")
}

async fn record_booking_in_profile(
    ctx: &AppContext,
    state: &TurnState,
    service: &str,
    resource: &str,
    date: &str,
    start: NaiveTime,
) {
    let result = async {
        let stored = ctx.storage.memory_profile(&state.session_id).await?;
        let mut profile = UserProfile::from_stored(stored.as_deref());
        note_booking(
            &mut profile,
            service,
            resource,
            date,
            &start.format("%H:%M").to_string(),
            ctx.config.memory.profile_list_cap,
        );
        let json = serde_json::to_string(&profile)
            .map_err(|e| agendo_core::AgendoError::Internal(e.to_string()))?;
        ctx.storage
            .update_memory_profile(&state.session_id, &json)
            .await
    }
    .await;
    if let Err(e) = result {
        warn!(error = %e, "profile bookkeeping after booking failed");
    }
}

async fn record_cancellation_in_profile(ctx: &AppContext, state: &TurnState) {
    let result = async {
        let stored = ctx.storage.memory_profile(&state.session_id).await?;
        let mut profile = UserProfile::from_stored(stored.as_deref());
        note_cancellation(&mut profile);
        let json = serde_json::to_string(&profile)
            .map_err(|e| agendo_core::AgendoError::Internal(e.to_string()))?;
        ctx.storage
            .update_memory_profile(&state.session_id, &json)
            .await
    }
    .await;
    if let Err(e) = result {
        warn!(error = %e, "profile bookkeeping after cancellation failed");
    }
}

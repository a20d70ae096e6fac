// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User identification tools.

use agendo_core::domain::{AppointmentStatus, User};
use chrono::Local;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::container::AppContext;
use crate::state::TurnState;
use crate::tools::{infra_error, optional_str, required_str};

pub async fn find_or_create_user(
    ctx: &AppContext,
    state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let identification = required_str(input, "identification_number")?;
    let full_name = required_str(input, "full_name")?;
    let phone = optional_str(input, "phone_number").unwrap_or(&state.user_phone);

    if let Some(existing) = ctx
        .storage
        .find_user_by_identification(&state.business.id, identification)
        .await
        .map_err(infra_error)?
    {
        ctx.storage
            .link_session_user(&state.session_id, &existing.id)
            .await
            .map_err(infra_error)?;
        return Ok(user_payload(&existing, false));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        business_id: state.business.id.clone(),
        phone_number: phone.to_string(),
        identification_number: identification.to_string(),
        full_name: full_name.to_string(),
        email: None,
    };
    ctx.storage.create_user(&user).await.map_err(infra_error)?;
    ctx.storage
        .link_session_user(&state.session_id, &user.id)
        .await
        .map_err(infra_error)?;

    Ok(user_payload(&user, true))
}

pub async fn get_user_info(
    ctx: &AppContext,
    state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let identification = required_str(input, "identification_number")?;

    let Some(user) = ctx
        .storage
        .find_user_by_identification(&state.business.id, identification)
        .await
        .map_err(infra_error)?
    else {
        return Err(format!(
            "No se encontró un usuario con cédula {identification}."
        ));
    };

    let today = Local::now().date_naive();
    let all = ctx
        .storage
        .list_appointments_by_user(&user.id)
        .await
        .map_err(infra_error)?;

    let mut upcoming = Vec::new();
    let mut past = Vec::new();
    for appointment in &all {
        let entry = json!({
            "appointment_id": appointment.id,
            "service": appointment.service_name_snapshot,
            "employee": appointment.resource_name_snapshot,
            "date": appointment.date.to_string(),
            "time": appointment.start_time.format("%H:%M").to_string(),
            "status": appointment.status.to_string(),
        });
        if appointment.date >= today && appointment.status == AppointmentStatus::Scheduled {
            upcoming.push(entry);
        } else {
            past.push(entry);
        }
    }
    past.truncate(5);

    Ok(json!({
        "user_id": user.id,
        "full_name": user.full_name,
        "identification_number": user.identification_number,
        "phone_number": user.phone_number,
        "upcoming_appointments": upcoming,
        "past_appointments": past,
        "total_appointments": all.len(),
    }))
}

fn user_payload(user: &User, is_new: bool) -> Value {
    let verb = if is_new { "registrado" } else { "encontrado" };
    json!({
        "user_id": user.id,
        "full_name": user.full_name,
        "identification_number": user.identification_number,
        "phone_number": user.phone_number,
        "is_new": is_new,
        "message": format!(
            "Usuario {verb}: {}. IMPORTANTE: usa user_id='{}' para create_appointment \
             (NO uses el business_id).",
            user.full_name, user.id
        ),
    })
}

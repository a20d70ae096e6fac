// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability query tool.

use chrono::Local;
use serde_json::{Value, json};

use crate::container::AppContext;
use crate::state::TurnState;
use crate::tools::{infra_error, optional_str, parse_date, required_str, resolve_branch_id};

pub async fn get_available_slots(
    ctx: &AppContext,
    state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let branch_id = resolve_branch_id(state, input)?;
    let service_name = required_str(input, "service_name")?;
    let date = parse_date(required_str(input, "target_date")?)?;

    let Some(service) = ctx
        .storage
        .find_service_by_name(&branch_id, service_name)
        .await
        .map_err(infra_error)?
    else {
        let names: Vec<String> = ctx
            .storage
            .list_services(&branch_id)
            .await
            .map_err(infra_error)?
            .into_iter()
            .map(|s| s.name)
            .collect();
        if names.is_empty() {
            return Err(format!("No encontré el servicio '{service_name}'."));
        }
        return Err(format!(
            "No encontré el servicio '{service_name}'. Disponibles: {}.",
            names.join(", ")
        ));
    };

    let today = Local::now().date_naive();
    if date < today {
        return Err(
            "No puedo agendar en fechas pasadas. Por favor elige una fecha futura.".into(),
        );
    }
    let window_days = state.business.booking_window_days;
    if (date - today).num_days() > i64::from(window_days) {
        return Err(format!(
            "Solo puedo agendar dentro de los próximos {window_days} días."
        ));
    }

    let mut resources = ctx
        .storage
        .list_resources_for_service(&service.id)
        .await
        .map_err(infra_error)?;
    if resources.is_empty() {
        return Err(format!(
            "No hay empleados asignados para '{}'.",
            service.name
        ));
    }

    if let Some(resource_name) = optional_str(input, "resource_name") {
        let needle = resource_name.to_lowercase();
        resources.retain(|r| r.name.to_lowercase().contains(&needle));
        if resources.is_empty() {
            return Err(format!(
                "No encontré un empleado con nombre '{resource_name}' para este servicio."
            ));
        }
    }

    let engine = ctx.availability_engine();
    let mut availability = Vec::new();
    for resource in &resources {
        let slots = engine
            .slots_for_resource(resource, date, service.duration_minutes)
            .await
            .map_err(infra_error)?;
        if !slots.is_empty() {
            availability.push(json!({
                "resource_id": resource.id,
                "resource_name": resource.name,
                "available_times": slots
                    .iter()
                    .map(|t| t.format("%H:%M").to_string())
                    .collect::<Vec<_>>(),
            }));
        }
    }

    if availability.is_empty() {
        return Err(format!(
            "No hay horarios disponibles para '{}' el {date}.",
            service.name
        ));
    }

    Ok(json!({
        "service": service.name,
        "date": date.to_string(),
        "duration_minutes": service.duration_minutes,
        "price": service.price,
        "availability": availability,
    }))
}

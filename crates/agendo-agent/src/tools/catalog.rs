// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog lookup tools: services, categories, and service details.

use serde_json::{Value, json};

use crate::container::AppContext;
use crate::state::TurnState;
use crate::tools::{infra_error, required_str, resolve_branch_id};

pub async fn get_services(
    ctx: &AppContext,
    state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let branch_id = resolve_branch_id(state, input)?;
    let services = ctx
        .storage
        .list_services(&branch_id)
        .await
        .map_err(infra_error)?;

    if services.is_empty() {
        return Err("No se encontraron servicios para esta sucursal.".into());
    }

    Ok(json!(
        services
            .iter()
            .map(|s| {
                json!({
                    "service_id": s.id,
                    "name": s.name,
                    "description": s.description,
                    "price": s.price,
                    "price_formatted": format!("${:.2}", s.price),
                    "duration_minutes": s.duration_minutes,
                    "duration_formatted": format!("{} min", s.duration_minutes),
                })
            })
            .collect::<Vec<_>>()
    ))
}

pub async fn get_categories(
    ctx: &AppContext,
    state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let branch_id = resolve_branch_id(state, input)?;
    let categories = ctx
        .storage
        .list_categories(&branch_id)
        .await
        .map_err(infra_error)?;

    if categories.is_empty() {
        return Err("No se encontraron categorías para esta sucursal.".into());
    }

    let mut result = Vec::new();
    for category in &categories {
        let services = ctx
            .storage
            .list_services_in_category(&category.id)
            .await
            .map_err(infra_error)?;
        result.push(json!({
            "category_id": category.id,
            "category_name": category.name,
            "description": category.description,
            "services_count": services.len(),
            "services": services
                .iter()
                .map(|s| {
                    json!({
                        "service_id": s.id,
                        "name": s.name,
                        "price": s.price,
                        "duration_minutes": s.duration_minutes,
                    })
                })
                .collect::<Vec<_>>(),
        }));
    }
    Ok(json!(result))
}

pub async fn get_service_details(
    ctx: &AppContext,
    state: &TurnState,
    input: &Value,
) -> Result<Value, String> {
    let branch_id = resolve_branch_id(state, input)?;
    let service_name = required_str(input, "service_name")?;

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
            "No encontré el servicio '{service_name}'. Servicios disponibles: {}.",
            names.join(", ")
        ));
    };

    let resources = ctx
        .storage
        .list_resources_for_service(&service.id)
        .await
        .map_err(infra_error)?;

    Ok(json!({
        "service_id": service.id,
        "name": service.name,
        "description": service.description,
        "price": service.price,
        "price_formatted": format!("${:.2}", service.price),
        "duration_minutes": service.duration_minutes,
        "duration_formatted": format!("{} min", service.duration_minutes),
        "available_with": resources
            .iter()
            .map(|r| json!({"resource_id": r.id, "name": r.name}))
            .collect::<Vec<_>>(),
    }))
}

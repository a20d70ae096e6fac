// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tool surface bound to the LLM.
//!
//! Every tool returns a string: JSON for structured results, plain
//! prose for anything the assistant should relay or act on
//! conversationally. No tool ever raises across the orchestrator
//! boundary; infrastructure failures become descriptive strings too.

pub mod appointments;
pub mod availability;
pub mod catalog;
pub mod users;

use agendo_core::AgendoError;
use agendo_core::types::{ToolInvocation, ToolSpec};
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use tracing::debug;

use crate::container::AppContext;
use crate::state::TurnState;

/// Executes one tool invocation, converting every failure into a
/// descriptive result string.
pub async fn execute_tool(
    ctx: &AppContext,
    state: &TurnState,
    invocation: &ToolInvocation,
) -> String {
    debug!(tool = %invocation.name, "executing tool");
    let input = &invocation.input;
    let result = match invocation.name.as_str() {
        "get_services" => catalog::get_services(ctx, state, input).await,
        "get_categories" => catalog::get_categories(ctx, state, input).await,
        "get_service_details" => catalog::get_service_details(ctx, state, input).await,
        "get_available_slots" => availability::get_available_slots(ctx, state, input).await,
        "find_or_create_user" => users::find_or_create_user(ctx, state, input).await,
        "get_user_info" => users::get_user_info(ctx, state, input).await,
        "create_appointment" => appointments::create_appointment(ctx, state, input).await,
        "get_user_appointments" => appointments::get_user_appointments(ctx, state, input).await,
        "cancel_appointment" => appointments::cancel_appointment(ctx, state, input).await,
        "reschedule_appointment" => appointments::reschedule_appointment(ctx, state, input).await,
        other => Err(format!("Herramienta desconocida: '{other}'.")),
    };

    match result {
        Ok(value) => value.to_string(),
        Err(message) => message,
    }
}

/// Tool definitions bound to every assistant request.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "get_services".into(),
            description: "Lista los servicios de una sucursal con precios y duración.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "branch_id": {"type": "string", "description": "ID de la sucursal"}
                }
            }),
        },
        ToolSpec {
            name: "get_categories".into(),
            description: "Lista las categorías de servicios de una sucursal.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "branch_id": {"type": "string", "description": "ID de la sucursal"}
                }
            }),
        },
        ToolSpec {
            name: "get_service_details".into(),
            description: "Detalles de un servicio por nombre (puede ser parcial).".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "branch_id": {"type": "string", "description": "ID de la sucursal"},
                    "service_name": {"type": "string", "description": "Nombre del servicio"}
                },
                "required": ["service_name"]
            }),
        },
        ToolSpec {
            name: "get_available_slots".into(),
            description: "Horarios disponibles para un servicio en una fecha, consultando el \
                          calendario real de cada empleado."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "branch_id": {"type": "string", "description": "ID de la sucursal"},
                    "service_name": {"type": "string", "description": "Nombre del servicio"},
                    "target_date": {"type": "string", "description": "Fecha YYYY-MM-DD"},
                    "resource_name": {
                        "type": "string",
                        "description": "Nombre del empleado (opcional)"
                    }
                },
                "required": ["service_name", "target_date"]
            }),
        },
        ToolSpec {
            name: "find_or_create_user".into(),
            description: "Busca un usuario por cédula y lo registra si no existe. Úsala cuando \
                          el cliente dé su nombre y cédula."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "identification_number": {"type": "string", "description": "Número de cédula"},
                    "full_name": {"type": "string", "description": "Nombre completo"},
                    "phone_number": {
                        "type": "string",
                        "description": "Teléfono (opcional, por defecto el del chat)"
                    }
                },
                "required": ["identification_number", "full_name"]
            }),
        },
        ToolSpec {
            name: "get_user_info".into(),
            description: "Información de un usuario por cédula, con su historial de citas.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "identification_number": {"type": "string", "description": "Número de cédula"}
                },
                "required": ["identification_number"]
            }),
        },
        ToolSpec {
            name: "create_appointment".into(),
            description: "Crea una cita verificando disponibilidad en tiempo real. Es la \
                          herramienta FINAL para confirmar. Usa el user_id devuelto por \
                          find_or_create_user, NUNCA el business_id."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string", "description": "ID del usuario"},
                    "branch_id": {"type": "string", "description": "ID de la sucursal"},
                    "service_name": {"type": "string", "description": "Nombre del servicio"},
                    "resource_name": {"type": "string", "description": "Nombre del empleado"},
                    "appointment_date": {"type": "string", "description": "Fecha YYYY-MM-DD"},
                    "appointment_time": {"type": "string", "description": "Hora HH:MM"}
                },
                "required": [
                    "user_id", "service_name", "resource_name",
                    "appointment_date", "appointment_time"
                ]
            }),
        },
        ToolSpec {
            name: "get_user_appointments".into(),
            description: "Citas programadas de un usuario.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string", "description": "ID del usuario"}
                },
                "required": ["user_id"]
            }),
        },
        ToolSpec {
            name: "cancel_appointment".into(),
            description: "Cancela una cita existente.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "appointment_id": {"type": "string", "description": "ID de la cita"},
                    "reason": {"type": "string", "description": "Motivo de la cancelación"}
                },
                "required": ["appointment_id", "reason"]
            }),
        },
        ToolSpec {
            name: "reschedule_appointment".into(),
            description: "Reagenda una cita existente a una nueva fecha y hora.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "appointment_id": {"type": "string", "description": "ID de la cita"},
                    "new_date": {"type": "string", "description": "Nueva fecha YYYY-MM-DD"},
                    "new_time": {"type": "string", "description": "Nueva hora HH:MM"}
                },
                "required": ["appointment_id", "new_date", "new_time"]
            }),
        },
    ]
}

// --- Argument helpers shared by the tool modules ---

pub(crate) fn required_str<'a>(
    input: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, String> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Falta el parámetro requerido '{key}'."))
}

pub(crate) fn optional_str<'a>(input: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// The branch a tool operates on: explicit argument, or the business's
/// single branch.
pub(crate) fn resolve_branch_id(
    state: &TurnState,
    input: &serde_json::Value,
) -> Result<String, String> {
    if let Some(branch_id) = optional_str(input, "branch_id") {
        return Ok(branch_id.to_string());
    }
    state
        .branch_id
        .clone()
        .ok_or_else(|| "Indica la sucursal (branch_id) para esta consulta.".to_string())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("Fecha inválida: '{raw}'. Usa el formato YYYY-MM-DD."))
}

pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("Hora inválida: '{raw}'. Usa el formato HH:MM."))
}

/// Infrastructure failures become conversational strings so the
/// assistant can react instead of the turn aborting.
pub(crate) fn infra_error(e: AgendoError) -> String {
    format!("Ocurrió un problema técnico al procesar la solicitud: {e}")
}

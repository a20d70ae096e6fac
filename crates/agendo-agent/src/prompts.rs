// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly for the assistant.

use agendo_core::domain::Branch;

use crate::state::TurnState;

/// Builds the system instruction for one assistant round.
///
/// Embeds the business profile, branch context, the tier-2 summary, and
/// the tier-3 user profile, plus the identifiers tools expect as
/// arguments.
pub fn build_system_prompt(state: &TurnState, branches: &[Branch]) -> String {
    let business = &state.business;
    let mut sections = Vec::new();

    sections.push(format!(
        "Eres {bot}, el asistente virtual de {name}. Ayudas a los clientes a consultar \
         servicios y a agendar, cancelar o reagendar citas por chat. Responde siempre en \
         el idioma del cliente, de forma breve y amable.",
        bot = business.bot_name,
        name = business.name,
    ));

    if let Some(greeting) = &business.greeting {
        sections.push(format!("Saludo preferido del negocio: {greeting}"));
    }

    if branches.len() > 1 {
        let listing = branches
            .iter()
            .map(|b| format!("- {} ({}): branch_id={}", b.name, b.address, b.id))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!(
            "El negocio tiene varias sucursales. Pregunta al cliente cuál prefiere antes \
             de consultar disponibilidad:\n{listing}"
        ));
    } else if let Some(branch) = branches.first() {
        sections.push(format!(
            "Sucursal: {} - {} (branch_id={})",
            branch.name, branch.address, branch.id
        ));
    }

    if let Some(summary) = &state.summary {
        sections.push(format!("Resumen de la conversación hasta ahora:\n{summary}"));
    }

    sections.push(format!(
        "Lo que sabemos del cliente:\n{}",
        state.profile.format_for_prompt()
    ));

    if let Some(user) = &state.user {
        sections.push(format!(
            "El cliente ya está registrado: {} (cédula {}, user_id={}). No vuelvas a \
             pedirle sus datos.",
            user.full_name, user.identification_number, user.id
        ));
    } else {
        sections.push(
            "El cliente aún no está identificado. Antes de crear una cita pide su nombre \
             completo y número de cédula y regístralo con find_or_create_user."
                .to_string(),
        );
    }

    sections.push(format!(
        "Datos para las herramientas: business_id={}, teléfono del cliente={}. Usa las \
         herramientas para consultar el catálogo y la disponibilidad real; nunca inventes \
         horarios ni precios. Para agendar usa siempre el user_id devuelto por \
         find_or_create_user, nunca el business_id.",
        business.id, state.user_phone
    ));

    sections.join("\n\n")
}

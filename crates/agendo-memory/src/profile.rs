// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier-3 memory: the cross-conversation user profile.
//!
//! A structured profile stored on the session as a JSON blob, updated
//! only at periodic checkpoints to bound LLM-call volume. Updates
//! extract only explicitly stated fields from the latest summary and
//! merge conservatively: list fields are unioned and capped, scalar
//! fields are overwritten only by non-empty values. A malformed
//! extraction is discarded whole; the prior profile always survives.

use agendo_core::types::{ChatMessage, LlmRequest};
use agendo_core::{AgendoError, LlmProvider, Storage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Prompt for extracting profile updates from a conversation summary.
const PROFILE_EXTRACTION_PROMPT: &str = "Analiza la siguiente conversación y extrae información \
relevante para el perfil del usuario.
Solo extrae información que fue explícitamente mencionada o demostrada.

Conversación:
{conversation}

Perfil actual del usuario:
{current_profile}

Responde en formato JSON con los campos que se deben actualizar:
- full_name: nombre si se mencionó
- identification_number: cédula si se mencionó
- preferred_services: servicios que solicitó o mostró interés
- preferred_resources: si mencionó preferencia por algún empleado
- preferred_time_slots: si mostró preferencia por horarios (ej: \"mañana\", \"tarde\")
- preferred_branch: si mencionó preferencia por alguna sucursal
- notes: cualquier información relevante (máximo 1 nota nueva)

Solo incluye campos que tengan información nueva. Responde SOLO el JSON, nada más.";

/// Persistent per-session user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub full_name: Option<String>,
    pub identification_number: Option<String>,
    pub phone_number: Option<String>,

    pub total_appointments: u32,
    pub cancelled_appointments: u32,
    pub last_appointment_date: Option<String>,
    pub last_appointment_service: Option<String>,

    pub preferred_services: Vec<String>,
    pub preferred_resources: Vec<String>,
    pub preferred_time_slots: Vec<String>,
    pub preferred_branch: Option<String>,

    pub notes: Vec<String>,

    pub first_interaction: Option<String>,
    pub last_interaction: Option<String>,
}

impl UserProfile {
    /// Parses a stored profile blob; a missing or malformed blob yields
    /// a fresh profile.
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default()
    }

    /// Renders the profile for the assistant's system prompt.
    pub fn format_for_prompt(&self) -> String {
        let mut parts = Vec::new();

        if let Some(name) = &self.full_name {
            parts.push(format!("Usuario conocido: {name}"));
            if let Some(identification) = &self.identification_number {
                parts.push(format!("Cédula: {identification}"));
            }
        }

        if self.total_appointments > 0 {
            parts.push(format!("Ha agendado {} citas", self.total_appointments));
            if self.cancelled_appointments > 0 {
                parts.push(format!("({} canceladas)", self.cancelled_appointments));
            }
        }

        if let Some(service) = &self.last_appointment_service {
            let date = self.last_appointment_date.as_deref().unwrap_or("fecha desconocida");
            parts.push(format!("Última cita: {service} ({date})"));
        }

        if !self.preferred_services.is_empty() {
            parts.push(format!(
                "Servicios frecuentes: {}",
                self.preferred_services.join(", ")
            ));
        }
        if !self.preferred_resources.is_empty() {
            parts.push(format!(
                "Empleados preferidos: {}",
                self.preferred_resources.join(", ")
            ));
        }
        if !self.preferred_time_slots.is_empty() {
            parts.push(format!(
                "Horarios preferidos: {}",
                self.preferred_time_slots.join(", ")
            ));
        }
        if !self.notes.is_empty() {
            let recent: Vec<&str> = self
                .notes
                .iter()
                .rev()
                .take(2)
                .rev()
                .map(String::as_str)
                .collect();
            parts.push(format!("Notas: {}", recent.join("; ")));
        }

        if parts.is_empty() {
            "Usuario nuevo (primera interacción)".to_string()
        } else {
            parts.join("\n")
        }
    }

    /// Merges extracted updates into the profile.
    ///
    /// Lists are unioned in arrival order and capped to the most recent
    /// `list_cap` entries; scalars are overwritten only by non-empty
    /// values.
    pub fn merge(&mut self, update: ProfileUpdate, list_cap: usize) {
        merge_scalar(&mut self.full_name, update.full_name);
        merge_scalar(&mut self.identification_number, update.identification_number);
        merge_scalar(&mut self.preferred_branch, update.preferred_branch);

        merge_list(&mut self.preferred_services, update.preferred_services, list_cap);
        merge_list(&mut self.preferred_resources, update.preferred_resources, list_cap);
        merge_list(&mut self.preferred_time_slots, update.preferred_time_slots, list_cap);
        merge_list(&mut self.notes, update.notes, list_cap);

        self.last_interaction = Some(chrono::Utc::now().to_rfc3339());
        if self.first_interaction.is_none() {
            self.first_interaction = self.last_interaction.clone();
        }
    }
}

/// Fields a profile extraction may update. All optional: absent fields
/// leave the profile untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub identification_number: Option<String>,
    pub preferred_services: Vec<String>,
    pub preferred_resources: Vec<String>,
    pub preferred_time_slots: Vec<String>,
    pub preferred_branch: Option<String>,
    pub notes: Vec<String>,
}

/// Profile maintenance settings.
#[derive(Debug, Clone)]
pub struct ProfileSettings {
    /// Model used for extraction calls.
    pub model: String,
    /// Message count at which checkpoints begin.
    pub checkpoint_start: u32,
    /// Messages between checkpoints past the start.
    pub checkpoint_every: u32,
    /// Maximum entries retained per list field.
    pub list_cap: usize,
}

/// Whether a tier-3 checkpoint is due at this message count.
pub fn profile_checkpoint_due(message_count: u32, settings: &ProfileSettings) -> bool {
    message_count >= settings.checkpoint_start
        && (message_count - settings.checkpoint_start) % settings.checkpoint_every == 0
}

/// Parses an extraction reply. Markdown fences and surrounding prose
/// are tolerated; anything unparseable is discarded whole.
pub fn parse_profile_update(response: &str) -> Option<ProfileUpdate> {
    let trimmed = response.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')? + 1;
    match serde_json::from_str::<ProfileUpdate>(&trimmed[start..end]) {
        Ok(update) => Some(update),
        Err(e) => {
            warn!("failed to parse profile extraction: {e}");
            debug!("raw extraction response: {response}");
            None
        }
    }
}

/// Runs the tier-3 maintenance step for a session.
///
/// Extracts explicitly stated fields from the latest conversation
/// context and merges them into the stored profile. Returns the merged
/// profile when an update happened. Errors and malformed extractions
/// leave the prior profile in place.
pub async fn maintain_profile(
    provider: &dyn LlmProvider,
    storage: &dyn Storage,
    session_id: &str,
    conversation_context: &str,
    settings: &ProfileSettings,
) -> Result<Option<UserProfile>, AgendoError> {
    let stored = storage.memory_profile(session_id).await?;
    let mut profile = UserProfile::from_stored(stored.as_deref());

    let prompt = PROFILE_EXTRACTION_PROMPT
        .replace("{conversation}", conversation_context)
        .replace(
            "{current_profile}",
            &serde_json::to_string_pretty(&profile).unwrap_or_else(|_| "{}".to_string()),
        );

    let reply = provider
        .complete(LlmRequest {
            model: settings.model.clone(),
            system: None,
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: 1024,
            tools: Vec::new(),
        })
        .await?;

    let Some(update) = parse_profile_update(&reply.text()) else {
        // Malformed extraction: discard whole, keep the prior profile.
        return Ok(None);
    };

    profile.merge(update, settings.list_cap);
    let json = serde_json::to_string(&profile).map_err(|e| AgendoError::Internal(format!(
        "profile serialization failed: {e}"
    )))?;
    storage.update_memory_profile(session_id, &json).await?;
    info!(session_id, "memory profile updated");
    Ok(Some(profile))
}

/// Records a confirmed booking in the profile: counters, last-visit
/// highlights, and detected preferences.
pub fn note_booking(
    profile: &mut UserProfile,
    service_name: &str,
    resource_name: &str,
    date: &str,
    start_time: &str,
    list_cap: usize,
) {
    profile.total_appointments += 1;
    profile.last_appointment_date = Some(date.to_string());
    profile.last_appointment_service = Some(service_name.to_string());

    merge_list(
        &mut profile.preferred_services,
        vec![service_name.to_string()],
        list_cap,
    );
    merge_list(
        &mut profile.preferred_resources,
        vec![resource_name.to_string()],
        list_cap,
    );

    let slot = start_time
        .split(':')
        .next()
        .and_then(|h| h.parse::<u32>().ok())
        .map(|hour| if hour < 12 { "mañana" } else { "tarde" });
    if let Some(slot) = slot {
        merge_list(
            &mut profile.preferred_time_slots,
            vec![slot.to_string()],
            list_cap,
        );
    }

    profile.last_interaction = Some(chrono::Utc::now().to_rfc3339());
}

/// Records a cancellation in the profile.
pub fn note_cancellation(profile: &mut UserProfile) {
    profile.cancelled_appointments += 1;
    profile.last_interaction = Some(chrono::Utc::now().to_rfc3339());
}

fn merge_scalar(current: &mut Option<String>, incoming: Option<String>) {
    if let Some(value) = incoming
        && !value.trim().is_empty()
    {
        *current = Some(value);
    }
}

fn merge_list(current: &mut Vec<String>, incoming: Vec<String>, cap: usize) {
    for value in incoming {
        if value.trim().is_empty() || current.contains(&value) {
            continue;
        }
        current.push(value);
    }
    if current.len() > cap {
        let drop = current.len() - cap;
        current.drain(..drop);
    }
}

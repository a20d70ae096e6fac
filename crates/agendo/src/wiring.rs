// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency wiring: builds the [`AppContext`] from configuration.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use agendo_agent::AppContext;
use agendo_anthropic::{AnthropicClient, AnthropicProvider};
use agendo_calendar::CalendarClient;
use agendo_config::AgendoConfig;
use agendo_core::types::{CalendarEvent, NewCalendarEvent};
use agendo_core::{AgendoError, CalendarPort};
use agendo_storage::SqliteStorage;

/// Builds the container: storage, LLM provider, and calendar port.
pub async fn build_context(config: AgendoConfig) -> Result<AppContext, AgendoError> {
    let storage = Arc::new(SqliteStorage::open(&config.storage).await?);

    let api_key = config
        .anthropic
        .api_key
        .clone()
        .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
        .ok_or_else(|| {
            AgendoError::Config(
                "no Anthropic API key: set anthropic.api_key or ANTHROPIC_API_KEY".into(),
            )
        })?;
    let provider = Arc::new(AnthropicProvider::new(AnthropicClient::new(
        api_key,
        config.anthropic.api_version.clone(),
        config.anthropic.default_model.clone(),
    )?));

    let calendar: Arc<dyn CalendarPort> = match &config.calendar.base_url {
        Some(base_url) => Arc::new(CalendarClient::new(
            base_url.clone(),
            config.calendar.api_key.as_deref(),
        )?),
        None => {
            info!("no calendar.base_url configured, availability runs on local fallback");
            Arc::new(DisabledCalendar)
        }
    };

    Ok(AppContext::new(storage, provider, calendar, config))
}

/// Calendar port used when no external calendar is configured.
///
/// Every call fails with a calendar error, which downstream code
/// already treats as an outage: availability uses the local fallback
/// and event writes stay best-effort no-ops.
struct DisabledCalendar;

#[async_trait]
impl CalendarPort for DisabledCalendar {
    async fn day_events(
        &self,
        _calendar_id: &str,
        _date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, AgendoError> {
        Err(disabled())
    }

    async fn create_event(
        &self,
        _calendar_id: &str,
        _event: NewCalendarEvent,
    ) -> Result<String, AgendoError> {
        Err(disabled())
    }

    async fn delete_event(
        &self,
        _calendar_id: &str,
        _event_id: &str,
    ) -> Result<(), AgendoError> {
        Err(disabled())
    }
}

fn disabled() -> AgendoError {
    AgendoError::Calendar {
        message: "external calendar is not configured".into(),
        source: None,
    }
}

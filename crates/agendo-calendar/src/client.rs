// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external calendar REST API, implementing the
//! core `CalendarPort` trait.
//!
//! Writes here are best effort from the caller's perspective: the
//! booking engine logs failures and keeps the local record
//! authoritative.

use std::time::Duration;

use agendo_core::types::{CalendarEvent, NewCalendarEvent};
use agendo_core::{AgendoError, CalendarPort};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiEvent, CreatedEvent, EventList, EventTime, NewEventBody};

/// HTTP client for calendar API communication.
///
/// Retries transient errors (429, 500, 503) once, like the LLM client.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl CalendarClient {
    /// Creates a new calendar API client.
    ///
    /// `api_key`, when present, is sent as a bearer token.
    pub fn new(base_url: String, api_key: Option<&str>) -> Result<Self, AgendoError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(
                "authorization",
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    AgendoError::Config(format!("invalid calendar API key header value: {e}"))
                })?,
            );
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AgendoError::Calendar {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.base_url, calendar_id)
    }

    async fn send_with_retry(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AgendoError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying calendar request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = build().send().await.map_err(|e| AgendoError::Calendar {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(status = %status, attempt, "calendar response received");

            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            let error = AgendoError::Calendar {
                message: format!("calendar API returned {status}: {body}"),
                source: None,
            };
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| AgendoError::Calendar {
            message: "calendar request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl CalendarPort for CalendarClient {
    async fn day_events(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, AgendoError> {
        let time_min = format!("{date}T00:00:00Z");
        let time_max = format!("{date}T23:59:59Z");
        let url = self.events_url(calendar_id);

        let response = self
            .send_with_retry(|| {
                self.client.get(&url).query(&[
                    ("timeMin", time_min.as_str()),
                    ("timeMax", time_max.as_str()),
                    ("singleEvents", "true"),
                    ("orderBy", "startTime"),
                ])
            })
            .await?;

        let list: EventList = response.json().await.map_err(|e| AgendoError::Calendar {
            message: format!("failed to parse event list: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(list.items.into_iter().map(to_core_event).collect())
    }

    async fn create_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> Result<String, AgendoError> {
        let body = NewEventBody {
            summary: event.title,
            description: event.description,
            start: EventTime {
                date_time: Some(event.start.format("%Y-%m-%dT%H:%M:%S").to_string()),
                date: None,
                time_zone: Some(event.time_zone.clone()),
            },
            end: EventTime {
                date_time: Some(event.end.format("%Y-%m-%dT%H:%M:%S").to_string()),
                date: None,
                time_zone: Some(event.time_zone),
            },
        };

        let url = self.events_url(calendar_id);
        let response = self
            .send_with_retry(|| self.client.post(&url).json(&body))
            .await?;

        let created: CreatedEvent = response.json().await.map_err(|e| AgendoError::Calendar {
            message: format!("failed to parse created event: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(created.id)
    }

    async fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), AgendoError> {
        let url = format!("{}/{}", self.events_url(calendar_id), event_id);
        self.send_with_retry(|| self.client.delete(&url)).await?;
        Ok(())
    }
}

fn to_core_event(event: ApiEvent) -> CalendarEvent {
    CalendarEvent {
        id: event.id,
        title: event.summary.unwrap_or_default(),
        start: event.start.local(),
        end: event.end.local(),
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

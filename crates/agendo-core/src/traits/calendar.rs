// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Port trait for the external calendar service.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AgendoError;
use crate::types::{CalendarEvent, NewCalendarEvent};

/// External calendar collaborator: an event source and sink.
///
/// The calendar is a best-effort mirror of local state. Callers must
/// treat write failures as non-fatal and keep the local record
/// authoritative.
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// Lists all events on a calendar for one day, chronologically.
    async fn day_events(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, AgendoError>;

    /// Creates an event and returns its external id.
    async fn create_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> Result<String, AgendoError>;

    /// Deletes an event by id.
    async fn delete_event(&self, calendar_id: &str, event_id: &str)
        -> Result<(), AgendoError>;
}

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the calendar REST API.
//!
//! The API follows the common events-resource shape: timed events carry
//! a `dateTime` with offset, all-day events carry a bare `date`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Start or end of an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    /// RFC 3339 instant for timed events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,

    /// Bare date for all-day events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// IANA time zone name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    /// The wall-clock instant of a timed event, if any.
    ///
    /// Offsets are accepted and dropped: availability windows are
    /// interpreted in the calendar's local wall-clock time.
    pub fn local(&self) -> Option<NaiveDateTime> {
        let raw = self.date_time.as_deref()?;
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok()
    }
}

/// An event resource returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
}

/// Response body of an event listing.
#[derive(Debug, Clone, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

/// Request body for event creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewEventBody {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

/// Response body of an event creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
}

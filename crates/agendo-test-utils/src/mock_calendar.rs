// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock calendar port for deterministic testing.
//!
//! Events are preloaded per (calendar, date). Created and deleted
//! events are recorded for assertions. The whole port can be switched
//! into a failing mode to exercise degraded paths.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tokio::sync::Mutex;

use agendo_core::types::{CalendarEvent, NewCalendarEvent};
use agendo_core::{AgendoError, CalendarPort};

/// A mock calendar with preloaded day events.
pub struct MockCalendar {
    events: Arc<Mutex<HashMap<(String, NaiveDate), Vec<CalendarEvent>>>>,
    created: Arc<Mutex<Vec<(String, NewCalendarEvent)>>>,
    deleted: Arc<Mutex<Vec<(String, String)>>>,
    fail: Arc<Mutex<bool>>,
    next_id: Arc<Mutex<u32>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(HashMap::new())),
            created: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(false)),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    /// Preload a timed event on a calendar day.
    pub async fn add_event(
        &self,
        calendar_id: &str,
        date: NaiveDate,
        title: &str,
        start: NaiveTime,
        end: NaiveTime,
    ) {
        let event = CalendarEvent {
            id: format!("seed-{}", title.to_lowercase().replace(' ', "-")),
            title: title.to_string(),
            start: Some(date.and_time(start)),
            end: Some(date.and_time(end)),
        };
        self.events
            .lock()
            .await
            .entry((calendar_id.to_string(), date))
            .or_default()
            .push(event);
    }

    /// Preload an all-day event (no time range).
    pub async fn add_all_day_event(&self, calendar_id: &str, date: NaiveDate, title: &str) {
        let event = CalendarEvent {
            id: format!("seed-allday-{title}"),
            title: title.to_string(),
            start: None,
            end: None,
        };
        self.events
            .lock()
            .await
            .entry((calendar_id.to_string(), date))
            .or_default()
            .push(event);
    }

    /// Make every subsequent call fail, simulating an outage.
    pub async fn set_failing(&self, failing: bool) {
        *self.fail.lock().await = failing;
    }

    /// Events created through the port, in order.
    pub async fn created_events(&self) -> Vec<(String, NewCalendarEvent)> {
        self.created.lock().await.clone()
    }

    /// (calendar, event id) pairs deleted through the port, in order.
    pub async fn deleted_events(&self) -> Vec<(String, String)> {
        self.deleted.lock().await.clone()
    }

    async fn check_failing(&self) -> Result<(), AgendoError> {
        if *self.fail.lock().await {
            return Err(AgendoError::Calendar {
                message: "mock calendar outage".into(),
                source: None,
            });
        }
        Ok(())
    }
}

impl Default for MockCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarPort for MockCalendar {
    async fn day_events(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, AgendoError> {
        self.check_failing().await?;
        Ok(self
            .events
            .lock()
            .await
            .get(&(calendar_id.to_string(), date))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> Result<String, AgendoError> {
        self.check_failing().await?;
        let mut next_id = self.next_id.lock().await;
        let id = format!("evt-{}", *next_id);
        *next_id += 1;

        // Mirror the created event into the day listing so a later
        // availability fetch sees it as booked.
        let calendar_event = CalendarEvent {
            id: id.clone(),
            title: event.title.clone(),
            start: Some(event.start),
            end: Some(event.end),
        };
        self.events
            .lock()
            .await
            .entry((calendar_id.to_string(), event.start.date()))
            .or_default()
            .push(calendar_event);

        self.created
            .lock()
            .await
            .push((calendar_id.to_string(), event));
        Ok(id)
    }

    async fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), AgendoError> {
        self.check_failing().await?;
        for events in self.events.lock().await.values_mut() {
            events.retain(|e| e.id != event_id);
        }
        self.deleted
            .lock()
            .await
            .push((calendar_id.to_string(), event_id.to_string()));
        Ok(())
    }
}

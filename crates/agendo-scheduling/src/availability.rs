// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability derivation for a resource on a date.
//!
//! Marker events on the resource's external calendar define the
//! availability windows; every other timed event is a booked block.
//! No marker events means the resource is simply not available that
//! day. Only when the calendar fetch itself fails does the engine fall
//! back to the resource's locally stored default schedule, with locally
//! recorded appointments as the only known bookings.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use agendo_core::domain::Resource;
use agendo_core::types::CalendarEvent;
use agendo_core::{AgendoError, CalendarPort, Storage};

use crate::slots::{TimeBlock, available_slots};

/// Derives bookable slots by intersecting marker blocks with booked
/// blocks from the external calendar.
pub struct AvailabilityEngine {
    calendar: Arc<dyn CalendarPort>,
    storage: Arc<dyn Storage>,
    marker: String,
}

impl AvailabilityEngine {
    pub fn new(calendar: Arc<dyn CalendarPort>, storage: Arc<dyn Storage>, marker: String) -> Self {
        Self {
            calendar,
            storage,
            marker,
        }
    }

    /// Bookable start times for `resource` on `date` for a service of
    /// `duration_minutes`.
    pub async fn slots_for_resource(
        &self,
        resource: &Resource,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Result<Vec<NaiveTime>, AgendoError> {
        match self
            .calendar
            .day_events(&resource.external_calendar_id, date)
            .await
        {
            Ok(events) => {
                let availability = marker_blocks(&events, &self.marker);
                if availability.is_empty() {
                    debug!(
                        resource = %resource.name,
                        %date,
                        "no availability marker events, resource not available"
                    );
                    return Ok(Vec::new());
                }
                let booked = booked_blocks(&events, &self.marker);
                Ok(available_slots(&availability, &booked, duration_minutes))
            }
            Err(e) => {
                warn!(
                    resource = %resource.name,
                    %date,
                    error = %e,
                    "calendar fetch failed, using local default schedule"
                );
                self.fallback_slots(resource, date, duration_minutes).await
            }
        }
    }

    /// Degraded path: default working hours minus locally recorded
    /// scheduled appointments.
    async fn fallback_slots(
        &self,
        resource: &Resource,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Result<Vec<NaiveTime>, AgendoError> {
        let (Some(start), Some(end)) = (resource.default_start, resource.default_end) else {
            return Ok(Vec::new());
        };

        let appointments = self
            .storage
            .scheduled_appointments_for_resource(&resource.id, date)
            .await?;
        let booked: Vec<TimeBlock> = appointments
            .iter()
            .map(|a| TimeBlock::new(a.start_time, a.end_time))
            .collect();

        Ok(available_slots(
            &[TimeBlock::new(start, end)],
            &booked,
            duration_minutes,
        ))
    }
}

/// Availability windows: timed events whose title contains the marker,
/// case-insensitively.
fn marker_blocks(events: &[CalendarEvent], marker: &str) -> Vec<TimeBlock> {
    let marker = marker.to_lowercase();
    events
        .iter()
        .filter(|e| !e.is_all_day() && e.title.to_lowercase().contains(&marker))
        .filter_map(event_block)
        .collect()
}

/// Booked windows: every other timed event. All-day events are not
/// bookings and are ignored.
fn booked_blocks(events: &[CalendarEvent], marker: &str) -> Vec<TimeBlock> {
    let marker = marker.to_lowercase();
    events
        .iter()
        .filter(|e| !e.is_all_day() && !e.title.to_lowercase().contains(&marker))
        .filter_map(event_block)
        .collect()
}

fn event_block(event: &CalendarEvent) -> Option<TimeBlock> {
    let start = event.start?;
    let end = event.end?;
    Some(TimeBlock::new(start.time(), end.time()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendo_config::model::StorageConfig;
    use agendo_core::domain::{Appointment, AppointmentStatus, Branch, Business, Category, Service};
    use agendo_storage::queries;
    use agendo_storage::{Database, SqliteStorage};
    use agendo_test_utils::MockCalendar;
    use chrono::Utc;

    fn t(s: &str) -> NaiveTime {
        format!("{s}:00").parse().unwrap()
    }

    fn date() -> NaiveDate {
        "2026-08-10".parse().unwrap()
    }

    fn resource() -> Resource {
        Resource {
            id: "res-1".into(),
            branch_id: "branch-1".into(),
            name: "Carlos".into(),
            external_calendar_id: "cal-1".into(),
            default_start: Some(t("09:00")),
            default_end: Some(t("13:00")),
            is_active: true,
        }
    }

    async fn open_storage() -> (Arc<SqliteStorage>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
            wal_mode: true,
        };
        (Arc::new(SqliteStorage::open(&config).await.unwrap()), dir)
    }

    async fn seed_catalog(db: &Database) {
        queries::businesses::create_business(
            db,
            &Business {
                id: "biz-1".into(),
                name: "Bella Salon".into(),
                bot_name: "agendo".into(),
                greeting: None,
                channel_address: Some("+593987654321".into()),
                booking_window_days: 30,
                is_active: true,
            },
        )
        .await
        .unwrap();
        queries::businesses::create_branch(
            db,
            &Branch {
                id: "branch-1".into(),
                business_id: "biz-1".into(),
                name: "Centro".into(),
                address: "Av. Principal 123".into(),
                city: None,
                is_active: true,
            },
        )
        .await
        .unwrap();
        queries::catalog::create_category(
            db,
            &Category {
                id: "cat-1".into(),
                branch_id: "branch-1".into(),
                name: "Cortes".into(),
                description: None,
                display_order: 0,
            },
        )
        .await
        .unwrap();
        queries::catalog::create_service(
            db,
            &Service {
                id: "svc-1".into(),
                branch_id: "branch-1".into(),
                category_id: "cat-1".into(),
                name: "Corte de cabello".into(),
                description: None,
                price: 25.0,
                duration_minutes: 40,
                is_active: true,
            },
        )
        .await
        .unwrap();
        queries::catalog::create_resource(db, &resource()).await.unwrap();
        queries::catalog::create_user(
            db,
            &agendo_core::domain::User {
                id: "user-1".into(),
                business_id: "biz-1".into(),
                phone_number: "+593990000001".into(),
                identification_number: "1712345678".into(),
                full_name: "Maria Lopez".into(),
                email: None,
            },
        )
        .await
        .unwrap();
    }

    fn engine(calendar: Arc<MockCalendar>, storage: Arc<SqliteStorage>) -> AvailabilityEngine {
        AvailabilityEngine::new(calendar, storage, "agendo".into())
    }

    #[tokio::test]
    async fn marker_window_produces_slots() {
        let (storage, _dir) = open_storage().await;
        let calendar = Arc::new(MockCalendar::new());
        calendar
            .add_event("cal-1", date(), "agendo", t("09:00"), t("17:00"))
            .await;

        let slots = engine(calendar, storage)
            .slots_for_resource(&resource(), date(), 40)
            .await
            .unwrap();
        assert_eq!(slots.len(), 12);
        assert_eq!(slots[0], t("09:00"));
        assert_eq!(slots[11], t("16:00"));
    }

    #[tokio::test]
    async fn marker_match_is_case_insensitive_substring() {
        let (storage, _dir) = open_storage().await;
        let calendar = Arc::new(MockCalendar::new());
        calendar
            .add_event("cal-1", date(), "AGENDO - turno tarde", t("14:00"), t("16:00"))
            .await;

        let slots = engine(calendar, storage)
            .slots_for_resource(&resource(), date(), 60)
            .await
            .unwrap();
        assert_eq!(slots, vec![t("14:00"), t("15:00")]);
    }

    #[tokio::test]
    async fn no_marker_means_empty_even_with_default_schedule() {
        let (storage, _dir) = open_storage().await;
        let calendar = Arc::new(MockCalendar::new());
        // Calendar reachable, has only a non-marker event.
        calendar
            .add_event("cal-1", date(), "Reunión", t("10:00"), t("11:00"))
            .await;

        let slots = engine(calendar, storage)
            .slots_for_resource(&resource(), date(), 40)
            .await
            .unwrap();
        assert!(slots.is_empty(), "default schedule must not apply when fetch succeeds");
    }

    #[tokio::test]
    async fn non_marker_events_block_candidates() {
        let (storage, _dir) = open_storage().await;
        let calendar = Arc::new(MockCalendar::new());
        calendar
            .add_event("cal-1", date(), "agendo", t("09:00"), t("17:00"))
            .await;
        calendar
            .add_event("cal-1", date(), "Cita existente", t("10:00"), t("10:40"))
            .await;

        let slots = engine(calendar, storage)
            .slots_for_resource(&resource(), date(), 40)
            .await
            .unwrap();
        assert!(!slots.contains(&t("10:00")));
        assert!(slots.contains(&t("09:00")));
        assert!(slots.contains(&t("10:40")));
    }

    #[tokio::test]
    async fn all_day_events_are_ignored() {
        let (storage, _dir) = open_storage().await;
        let calendar = Arc::new(MockCalendar::new());
        calendar
            .add_event("cal-1", date(), "agendo", t("09:00"), t("11:00"))
            .await;
        calendar.add_all_day_event("cal-1", date(), "Inventario").await;

        let slots = engine(calendar, storage)
            .slots_for_resource(&resource(), date(), 60)
            .await
            .unwrap();
        assert_eq!(slots, vec![t("09:00"), t("10:00")]);
    }

    #[tokio::test]
    async fn calendar_outage_falls_back_to_default_schedule() {
        let (storage, _dir) = open_storage().await;
        seed_catalog(storage.database()).await;

        // A locally recorded appointment blocks its slot in the fallback.
        let now = Utc::now().naive_utc();
        queries::appointments::create_appointment(
            storage.database(),
            &Appointment {
                id: "apt-1".into(),
                user_id: "user-1".into(),
                resource_id: "res-1".into(),
                service_id: "svc-1".into(),
                branch_id: "branch-1".into(),
                service_name_snapshot: "Corte de cabello".into(),
                service_price_snapshot: 25.0,
                service_duration_snapshot: 40,
                resource_name_snapshot: "Carlos".into(),
                date: date(),
                start_time: t("10:00"),
                end_time: t("11:00"),
                external_event_id: None,
                status: AppointmentStatus::Scheduled,
                cancellation_reason: None,
                cancelled_at: None,
                cancelled_by: None,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .unwrap();

        let calendar = Arc::new(MockCalendar::new());
        calendar.set_failing(true).await;

        // Default schedule 09:00-13:00, hour slots, 10:00 blocked locally.
        let slots = engine(calendar, storage)
            .slots_for_resource(&resource(), date(), 60)
            .await
            .unwrap();
        assert_eq!(slots, vec![t("09:00"), t("11:00"), t("12:00")]);
    }

    #[tokio::test]
    async fn outage_without_default_schedule_yields_empty() {
        let (storage, _dir) = open_storage().await;
        let calendar = Arc::new(MockCalendar::new());
        calendar.set_failing(true).await;

        let mut no_default = resource();
        no_default.default_start = None;
        no_default.default_end = None;

        let slots = engine(calendar, storage)
            .slots_for_resource(&no_default, date(), 40)
            .await
            .unwrap();
        assert!(slots.is_empty());
    }
}

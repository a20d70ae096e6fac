// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end booking engine tests over real SQLite storage and a mock
//! calendar.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, NaiveTime};

use agendo_config::model::StorageConfig;
use agendo_core::domain::{AppointmentStatus, Branch, Business, Category, Resource, Service, User};
use agendo_scheduling::availability::AvailabilityEngine;
use agendo_scheduling::booking::{
    BookingEngine, BookingOutcome, BookingRequest, BookingSettings, CancelOutcome,
    RescheduleOutcome,
};
use agendo_storage::{SqliteStorage, queries};
use agendo_test_utils::MockCalendar;

fn t(s: &str) -> NaiveTime {
    format!("{s}:00").parse().unwrap()
}

/// A near-future date, safely inside the booking window.
fn booking_day() -> NaiveDate {
    Local::now().date_naive() + Duration::days(7)
}

struct Harness {
    storage: Arc<SqliteStorage>,
    calendar: Arc<MockCalendar>,
    engine: BookingEngine,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("booking.db").to_string_lossy().into_owned(),
        wal_mode: true,
    };
    let storage = Arc::new(SqliteStorage::open(&config).await.unwrap());
    let db = storage.database();

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
    queries::catalog::create_resource(
        db,
        &Resource {
            id: "res-1".into(),
            branch_id: "branch-1".into(),
            name: "Carlos".into(),
            external_calendar_id: "cal-1".into(),
            default_start: Some(t("09:00")),
            default_end: Some(t("17:00")),
            is_active: true,
        },
    )
    .await
    .unwrap();
    queries::catalog::link_resource_service(db, "res-1", "svc-1")
        .await
        .unwrap();
    queries::catalog::create_user(
        db,
        &User {
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

    let calendar = Arc::new(MockCalendar::new());
    let availability = AvailabilityEngine::new(
        calendar.clone(),
        storage.clone(),
        "agendo".into(),
    );
    let engine = BookingEngine::new(
        storage.clone(),
        calendar.clone(),
        availability,
        BookingSettings {
            max_alternatives: 5,
            booking_window_days: 30,
            time_zone: "America/Guayaquil".into(),
        },
    );

    Harness {
        storage,
        calendar,
        engine,
        _dir: dir,
    }
}

fn request(date: NaiveDate, start: &str) -> BookingRequest {
    BookingRequest {
        user_id: "user-1".into(),
        branch_id: "branch-1".into(),
        service_name: "corte".into(),
        resource_name: "carlos".into(),
        date,
        start: t(start),
    }
}

async fn mark_available(h: &Harness, date: NaiveDate) {
    h.calendar
        .add_event("cal-1", date, "agendo", t("09:00"), t("17:00"))
        .await;
}

#[tokio::test]
async fn create_confirms_with_snapshots_and_external_event() {
    let h = harness().await;
    let day = booking_day();
    mark_available(&h, day).await;

    let outcome = h.engine.create(&request(day, "10:00")).await.unwrap();
    let appointment = match outcome {
        BookingOutcome::Confirmed(a) => a,
        other => panic!("expected confirmation, got {other:?}"),
    };

    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.service_name_snapshot, "Corte de cabello");
    assert_eq!(appointment.service_price_snapshot, 25.0);
    assert_eq!(appointment.service_duration_snapshot, 40);
    assert_eq!(appointment.resource_name_snapshot, "Carlos");
    assert_eq!(appointment.end_time, t("10:40"));
    assert!(appointment.external_event_id.is_some());

    let created = h.calendar.created_events().await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, "cal-1");
    assert!(created[0].1.title.contains("Maria Lopez"));

    // The record is queryable through storage.
    let stored = queries::appointments::get_appointment(h.storage.database(), &appointment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, appointment.id);
}

#[tokio::test]
async fn second_conflicting_create_is_rejected_with_alternatives() {
    let h = harness().await;
    let day = booking_day();
    mark_available(&h, day).await;

    let first = h.engine.create(&request(day, "10:00")).await.unwrap();
    assert!(matches!(first, BookingOutcome::Confirmed(_)));

    // The commit-time recheck sees the first booking and refuses.
    let second = h.engine.create(&request(day, "10:00")).await.unwrap();
    match second {
        BookingOutcome::Rejected {
            message,
            alternatives,
        } => {
            assert!(message.contains("10:00"));
            assert!(!alternatives.is_empty());
            assert!(alternatives.len() <= 5);
            assert!(!alternatives.contains(&t("10:00")));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn calendar_outage_still_guards_against_double_booking() {
    let h = harness().await;
    let day = booking_day();
    h.calendar.set_failing(true).await;

    // Fallback path: default schedule, local appointments as bookings.
    let first = h.engine.create(&request(day, "10:20")).await.unwrap();
    let appointment = match first {
        BookingOutcome::Confirmed(a) => a,
        other => panic!("expected confirmation, got {other:?}"),
    };
    // Calendar write failed; local record is still authoritative.
    assert!(appointment.external_event_id.is_none());

    let second = h.engine.create(&request(day, "10:20")).await.unwrap();
    assert!(matches!(second, BookingOutcome::Rejected { .. }));
}

#[tokio::test]
async fn unknown_service_lists_available_names() {
    let h = harness().await;
    let day = booking_day();
    mark_available(&h, day).await;

    let mut bad = request(day, "10:00");
    bad.service_name = "masaje".into();
    let outcome = h.engine.create(&bad).await.unwrap();
    match outcome {
        BookingOutcome::Rejected { message, .. } => {
            assert!(message.contains("masaje"));
            assert!(message.contains("Corte de cabello"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn business_id_in_place_of_user_id_gets_guidance() {
    let h = harness().await;
    let day = booking_day();
    mark_available(&h, day).await;

    let mut bad = request(day, "10:00");
    bad.user_id = "biz-1".into();
    let outcome = h.engine.create(&bad).await.unwrap();
    match outcome {
        BookingOutcome::Rejected { message, .. } => {
            assert!(message.contains("find_or_create_user"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn past_and_far_future_dates_are_rejected() {
    let h = harness().await;
    let yesterday = Local::now().date_naive() - Duration::days(1);
    let outcome = h.engine.create(&request(yesterday, "10:00")).await.unwrap();
    match outcome {
        BookingOutcome::Rejected { message, .. } => assert!(message.contains("pasadas")),
        other => panic!("expected rejection, got {other:?}"),
    }

    let far = Local::now().date_naive() + Duration::days(45);
    let outcome = h.engine.create(&request(far, "10:00")).await.unwrap();
    match outcome {
        BookingOutcome::Rejected { message, .. } => assert!(message.contains("30 días")),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn cancel_is_idempotent_and_records_metadata() {
    let h = harness().await;
    let day = booking_day();
    mark_available(&h, day).await;

    let appointment = match h.engine.create(&request(day, "11:00")).await.unwrap() {
        BookingOutcome::Confirmed(a) => a,
        other => panic!("expected confirmation, got {other:?}"),
    };

    let first = h
        .engine
        .cancel(&appointment.id, "no puedo asistir", "user")
        .await
        .unwrap();
    let cancelled = match first {
        CancelOutcome::Cancelled(a) => a,
        other => panic!("expected cancellation, got {other:?}"),
    };
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("no puedo asistir"));
    assert_eq!(cancelled.cancelled_by.as_deref(), Some("user"));
    assert!(cancelled.cancelled_at.is_some());

    // The external event was removed.
    assert_eq!(h.calendar.deleted_events().await.len(), 1);

    // Re-cancelling is a friendly no-op.
    let second = h.engine.cancel(&appointment.id, "otra vez", "user").await.unwrap();
    assert!(matches!(second, CancelOutcome::AlreadyCancelled(_)));
    assert_eq!(h.calendar.deleted_events().await.len(), 1);

    let missing = h.engine.cancel("apt-nope", "x", "user").await.unwrap();
    assert!(matches!(missing, CancelOutcome::NotFound));
}

#[tokio::test]
async fn cancelled_slot_becomes_bookable_again_locally() {
    let h = harness().await;
    let day = booking_day();
    h.calendar.set_failing(true).await;

    let appointment = match h.engine.create(&request(day, "10:20")).await.unwrap() {
        BookingOutcome::Confirmed(a) => a,
        other => panic!("expected confirmation, got {other:?}"),
    };
    h.engine
        .cancel(&appointment.id, "cambio de planes", "user")
        .await
        .unwrap();

    // The fallback recheck no longer counts the cancelled appointment.
    let again = h.engine.create(&request(day, "10:20")).await.unwrap();
    assert!(matches!(again, BookingOutcome::Confirmed(_)));
}

#[tokio::test]
async fn reschedule_moves_and_recreates_external_event() {
    let h = harness().await;
    let day = booking_day();
    mark_available(&h, day).await;

    let appointment = match h.engine.create(&request(day, "10:00")).await.unwrap() {
        BookingOutcome::Confirmed(a) => a,
        other => panic!("expected confirmation, got {other:?}"),
    };
    let original_event = appointment.external_event_id.clone().unwrap();

    let outcome = h
        .engine
        .reschedule(&appointment.id, day, t("15:00"))
        .await
        .unwrap();
    let (moved, previous_date, previous_start) = match outcome {
        RescheduleOutcome::Moved {
            appointment,
            previous_date,
            previous_start,
        } => (appointment, previous_date, previous_start),
        other => panic!("expected move, got {other:?}"),
    };

    assert_eq!(previous_date, day);
    assert_eq!(previous_start, t("10:00"));
    assert_eq!(moved.start_time, t("15:00"));
    assert_eq!(moved.end_time, t("15:40"));
    assert_eq!(moved.status, AppointmentStatus::Scheduled);
    let new_event = moved.external_event_id.clone().unwrap();
    assert_ne!(new_event, original_event);

    let deleted = h.calendar.deleted_events().await;
    assert_eq!(deleted, vec![("cal-1".to_string(), original_event)]);
    let created = h.calendar.created_events().await;
    assert!(created.last().unwrap().1.title.contains("[Reagendada]"));
}

#[tokio::test]
async fn reschedule_requires_scheduled_status() {
    let h = harness().await;
    let day = booking_day();
    mark_available(&h, day).await;

    let appointment = match h.engine.create(&request(day, "10:00")).await.unwrap() {
        BookingOutcome::Confirmed(a) => a,
        other => panic!("expected confirmation, got {other:?}"),
    };
    h.engine.cancel(&appointment.id, "cambio", "user").await.unwrap();

    let outcome = h
        .engine
        .reschedule(&appointment.id, day, t("15:00"))
        .await
        .unwrap();
    match outcome {
        RescheduleOutcome::Rejected { message, .. } => assert!(message.contains("activas")),
        other => panic!("expected rejection, got {other:?}"),
    }

    let missing = h.engine.reschedule("apt-nope", day, t("15:00")).await.unwrap();
    assert!(matches!(missing, RescheduleOutcome::NotFound));
}

#[tokio::test]
async fn reschedule_into_taken_slot_offers_alternatives() {
    let h = harness().await;
    let day = booking_day();
    mark_available(&h, day).await;

    let first = match h.engine.create(&request(day, "10:00")).await.unwrap() {
        BookingOutcome::Confirmed(a) => a,
        other => panic!("expected confirmation, got {other:?}"),
    };
    // A second appointment occupies the target slot.
    let second = h.engine.create(&request(day, "11:40")).await.unwrap();
    assert!(matches!(second, BookingOutcome::Confirmed(_)));

    let outcome = h
        .engine
        .reschedule(&first.id, day, t("11:40"))
        .await
        .unwrap();
    match outcome {
        RescheduleOutcome::Rejected {
            message,
            alternatives,
        } => {
            assert!(message.contains("11:40"));
            assert!(!alternatives.is_empty());
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entities persisted by the storage adapter.
//!
//! Appointments carry snapshot fields: catalog values copied at booking
//! time so later catalog edits never retroactively alter history.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::Role;

/// A multi-branch service business (the tenant).
#[derive(Debug, Clone, PartialEq)]
pub struct Business {
    pub id: String,
    pub name: String,
    /// Display name of the assistant; also the default availability
    /// marker matched against calendar event titles.
    pub bot_name: String,
    pub greeting: Option<String>,
    /// Inbound destination address (the business's channel phone number).
    pub channel_address: Option<String>,
    /// How far ahead appointments may be booked.
    pub booking_window_days: u32,
    pub is_active: bool,
}

/// A physical branch of a business.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub is_active: bool,
}

/// A service category within a branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
}

/// A bookable service offered by a branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: String,
    pub branch_id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_minutes: u32,
    pub is_active: bool,
}

/// A bookable resource (an employee with an external calendar).
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    /// Identifier of this resource's calendar in the external service.
    pub external_calendar_id: String,
    /// Default working hours, used only as a degraded fallback when the
    /// external calendar cannot be reached.
    pub default_start: Option<NaiveTime>,
    pub default_end: Option<NaiveTime>,
    pub is_active: bool,
}

/// An end user of a business, unique per (business, identification).
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub business_id: String,
    pub phone_number: String,
    pub identification_number: String,
    pub full_name: String,
    pub email: Option<String>,
}

/// Long-lived identity binding a phone number to a business.
///
/// Persists across many conversations and carries the tier-3 memory
/// profile as an opaque JSON blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub business_id: String,
    pub user_phone: String,
    pub user_id: Option<String>,
    pub memory_profile: Option<String>,
    pub memory_profile_updated_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub last_activity_at: NaiveDateTime,
}

/// Lifecycle status of a conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Expired,
    Escalated,
}

/// A bounded dialogue episode within a session.
///
/// Closed lazily by inactivity timeout: a stale conversation is never
/// updated in place, it is simply no longer selected as active.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub session_id: String,
    pub status: ConversationStatus,
    pub summary: Option<String>,
    pub summary_updated_at: Option<NaiveDateTime>,
    pub message_count: u32,
    pub created_at: NaiveDateTime,
    pub last_message_at: NaiveDateTime,
}

/// A persisted conversation message. Append-only and immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: NaiveDateTime,
}

/// Lifecycle status of an appointment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
    NoShow,
}

/// A booked appointment. Never deleted, only status-transitioned.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub resource_id: String,
    pub service_id: String,
    pub branch_id: String,
    pub service_name_snapshot: String,
    pub service_price_snapshot: f64,
    pub service_duration_snapshot: u32,
    pub resource_name_snapshot: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub external_event_id: Option<String>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub cancelled_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

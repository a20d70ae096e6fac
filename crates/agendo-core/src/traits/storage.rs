// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for persistence backends.
//!
//! CRUD per entity plus the two composite reads the orchestrator relies
//! on: "messages for a conversation, optionally capped to the last K,
//! chronological" and "active conversation for a session within
//! timeout".

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::{
    Appointment, Branch, Business, Category, Conversation, Resource, Service, Session,
    StoredMessage, User,
};
use crate::error::AgendoError;
use crate::types::Role;

/// Persistence collaborator for all Agendo entities.
///
/// Implementations must serialize writes so that appending a message
/// and bumping the conversation counters is atomic.
#[async_trait]
pub trait Storage: Send + Sync {
    // --- Businesses ---

    async fn get_business(&self, id: &str) -> Result<Option<Business>, AgendoError>;

    /// Resolves the business owning an inbound destination address.
    async fn find_business_by_channel(
        &self,
        channel_address: &str,
    ) -> Result<Option<Business>, AgendoError>;

    // --- Branches ---

    async fn get_branch(&self, id: &str) -> Result<Option<Branch>, AgendoError>;

    async fn list_branches(&self, business_id: &str) -> Result<Vec<Branch>, AgendoError>;

    // --- Catalog ---

    async fn list_categories(&self, branch_id: &str) -> Result<Vec<Category>, AgendoError>;

    async fn get_service(&self, id: &str) -> Result<Option<Service>, AgendoError>;

    async fn list_services(&self, branch_id: &str) -> Result<Vec<Service>, AgendoError>;

    async fn list_services_in_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<Service>, AgendoError>;

    /// Case-insensitive partial name match within a branch.
    async fn find_service_by_name(
        &self,
        branch_id: &str,
        name: &str,
    ) -> Result<Option<Service>, AgendoError>;

    // --- Resources ---

    async fn get_resource(&self, id: &str) -> Result<Option<Resource>, AgendoError>;

    async fn list_resources(&self, branch_id: &str) -> Result<Vec<Resource>, AgendoError>;

    async fn list_resources_for_service(
        &self,
        service_id: &str,
    ) -> Result<Vec<Resource>, AgendoError>;

    /// Case-insensitive partial name match within a branch.
    async fn find_resource_by_name(
        &self,
        branch_id: &str,
        name: &str,
    ) -> Result<Option<Resource>, AgendoError>;

    // --- Users ---

    async fn get_user(&self, id: &str) -> Result<Option<User>, AgendoError>;

    async fn find_user_by_phone(
        &self,
        business_id: &str,
        phone: &str,
    ) -> Result<Option<User>, AgendoError>;

    async fn find_user_by_identification(
        &self,
        business_id: &str,
        identification: &str,
    ) -> Result<Option<User>, AgendoError>;

    async fn create_user(&self, user: &User) -> Result<(), AgendoError>;

    // --- Sessions ---

    /// Fetches the session binding (business, phone), creating it on
    /// first contact. Bumps `last_activity_at` either way.
    async fn get_or_create_session(
        &self,
        business_id: &str,
        user_phone: &str,
    ) -> Result<Session, AgendoError>;

    async fn link_session_user(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<(), AgendoError>;

    async fn memory_profile(&self, session_id: &str) -> Result<Option<String>, AgendoError>;

    async fn update_memory_profile(
        &self,
        session_id: &str,
        profile_json: &str,
    ) -> Result<(), AgendoError>;

    // --- Conversations ---

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, AgendoError>;

    /// The active conversation for a session: status=active and last
    /// message within the timeout, most recently created first.
    async fn active_conversation(
        &self,
        session_id: &str,
        timeout_hours: i64,
    ) -> Result<Option<Conversation>, AgendoError>;

    async fn create_conversation(&self, session_id: &str) -> Result<Conversation, AgendoError>;

    async fn update_summary(
        &self,
        conversation_id: &str,
        summary: &str,
    ) -> Result<(), AgendoError>;

    // --- Messages ---

    /// Appends a message and atomically bumps the conversation's
    /// message_count and last_message_at.
    async fn append_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
    ) -> Result<StoredMessage, AgendoError>;

    /// Messages for a conversation in chronological order. With
    /// `last = Some(k)`, only the most recent k (still chronological).
    async fn conversation_messages(
        &self,
        conversation_id: &str,
        last: Option<u32>,
    ) -> Result<Vec<StoredMessage>, AgendoError>;

    // --- Appointments ---

    async fn create_appointment(&self, appointment: &Appointment) -> Result<(), AgendoError>;

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, AgendoError>;

    async fn list_appointments_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Appointment>, AgendoError>;

    /// Scheduled appointments for a user on or after the given date.
    async fn upcoming_appointments(
        &self,
        user_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<Appointment>, AgendoError>;

    /// Scheduled appointments for a resource on a date, by start time.
    async fn scheduled_appointments_for_resource(
        &self,
        resource_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AgendoError>;

    async fn cancel_appointment(
        &self,
        id: &str,
        reason: &str,
        actor: &str,
        at: NaiveDateTime,
    ) -> Result<(), AgendoError>;

    /// Moves an appointment in place: new date/time-range and external
    /// event id. Status is untouched.
    async fn reschedule_appointment(
        &self,
        id: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        external_event_id: Option<&str>,
    ) -> Result<(), AgendoError>;
}

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `Storage` trait.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use agendo_config::model::StorageConfig;
use agendo_core::domain::{
    Appointment, Branch, Business, Category, Conversation, Resource, Service, Session,
    StoredMessage, User,
};
use agendo_core::types::Role;
use agendo_core::{AgendoError, Storage};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to
/// the typed query modules.
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    /// Opens the database at the configured path and runs migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, AgendoError> {
        if let Some(parent) = std::path::Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| AgendoError::Storage {
                source: Box::new(e),
            })?;
        }
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite storage initialized");
        Ok(Self { db })
    }

    /// Wraps an already-open database (used by tests).
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    /// Checkpoints the WAL and releases the connection.
    pub async fn close(&self) -> Result<(), AgendoError> {
        self.db.close().await
    }

    /// The underlying database handle, for seeding tooling.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get_business(&self, id: &str) -> Result<Option<Business>, AgendoError> {
        queries::businesses::get_business(&self.db, id).await
    }

    async fn find_business_by_channel(
        &self,
        channel_address: &str,
    ) -> Result<Option<Business>, AgendoError> {
        queries::businesses::find_business_by_channel(&self.db, channel_address).await
    }

    async fn get_branch(&self, id: &str) -> Result<Option<Branch>, AgendoError> {
        queries::businesses::get_branch(&self.db, id).await
    }

    async fn list_branches(&self, business_id: &str) -> Result<Vec<Branch>, AgendoError> {
        queries::businesses::list_branches(&self.db, business_id).await
    }

    async fn list_categories(&self, branch_id: &str) -> Result<Vec<Category>, AgendoError> {
        queries::catalog::list_categories(&self.db, branch_id).await
    }

    async fn get_service(&self, id: &str) -> Result<Option<Service>, AgendoError> {
        queries::catalog::get_service(&self.db, id).await
    }

    async fn list_services(&self, branch_id: &str) -> Result<Vec<Service>, AgendoError> {
        queries::catalog::list_services(&self.db, branch_id).await
    }

    async fn list_services_in_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<Service>, AgendoError> {
        queries::catalog::list_services_in_category(&self.db, category_id).await
    }

    async fn find_service_by_name(
        &self,
        branch_id: &str,
        name: &str,
    ) -> Result<Option<Service>, AgendoError> {
        queries::catalog::find_service_by_name(&self.db, branch_id, name).await
    }

    async fn get_resource(&self, id: &str) -> Result<Option<Resource>, AgendoError> {
        queries::catalog::get_resource(&self.db, id).await
    }

    async fn list_resources(&self, branch_id: &str) -> Result<Vec<Resource>, AgendoError> {
        queries::catalog::list_resources(&self.db, branch_id).await
    }

    async fn list_resources_for_service(
        &self,
        service_id: &str,
    ) -> Result<Vec<Resource>, AgendoError> {
        queries::catalog::list_resources_for_service(&self.db, service_id).await
    }

    async fn find_resource_by_name(
        &self,
        branch_id: &str,
        name: &str,
    ) -> Result<Option<Resource>, AgendoError> {
        queries::catalog::find_resource_by_name(&self.db, branch_id, name).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AgendoError> {
        queries::catalog::get_user(&self.db, id).await
    }

    async fn find_user_by_phone(
        &self,
        business_id: &str,
        phone: &str,
    ) -> Result<Option<User>, AgendoError> {
        queries::catalog::find_user_by_phone(&self.db, business_id, phone).await
    }

    async fn find_user_by_identification(
        &self,
        business_id: &str,
        identification: &str,
    ) -> Result<Option<User>, AgendoError> {
        queries::catalog::find_user_by_identification(&self.db, business_id, identification).await
    }

    async fn create_user(&self, user: &User) -> Result<(), AgendoError> {
        queries::catalog::create_user(&self.db, user).await
    }

    async fn get_or_create_session(
        &self,
        business_id: &str,
        user_phone: &str,
    ) -> Result<Session, AgendoError> {
        queries::sessions::get_or_create_session(&self.db, business_id, user_phone).await
    }

    async fn link_session_user(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<(), AgendoError> {
        queries::sessions::link_session_user(&self.db, session_id, user_id).await
    }

    async fn memory_profile(&self, session_id: &str) -> Result<Option<String>, AgendoError> {
        queries::sessions::memory_profile(&self.db, session_id).await
    }

    async fn update_memory_profile(
        &self,
        session_id: &str,
        profile_json: &str,
    ) -> Result<(), AgendoError> {
        queries::sessions::update_memory_profile(&self.db, session_id, profile_json).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, AgendoError> {
        queries::conversations::get_conversation(&self.db, id).await
    }

    async fn active_conversation(
        &self,
        session_id: &str,
        timeout_hours: i64,
    ) -> Result<Option<Conversation>, AgendoError> {
        queries::conversations::active_conversation(&self.db, session_id, timeout_hours).await
    }

    async fn create_conversation(&self, session_id: &str) -> Result<Conversation, AgendoError> {
        queries::conversations::create_conversation(&self.db, session_id).await
    }

    async fn update_summary(
        &self,
        conversation_id: &str,
        summary: &str,
    ) -> Result<(), AgendoError> {
        queries::conversations::update_summary(&self.db, conversation_id, summary).await
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
    ) -> Result<StoredMessage, AgendoError> {
        queries::messages::append_message(&self.db, conversation_id, role, content).await
    }

    async fn conversation_messages(
        &self,
        conversation_id: &str,
        last: Option<u32>,
    ) -> Result<Vec<StoredMessage>, AgendoError> {
        queries::messages::messages_for_conversation(&self.db, conversation_id, last).await
    }

    async fn create_appointment(&self, appointment: &Appointment) -> Result<(), AgendoError> {
        queries::appointments::create_appointment(&self.db, appointment).await
    }

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, AgendoError> {
        queries::appointments::get_appointment(&self.db, id).await
    }

    async fn list_appointments_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Appointment>, AgendoError> {
        queries::appointments::list_appointments_by_user(&self.db, user_id).await
    }

    async fn upcoming_appointments(
        &self,
        user_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<Appointment>, AgendoError> {
        queries::appointments::upcoming_appointments(&self.db, user_id, from).await
    }

    async fn scheduled_appointments_for_resource(
        &self,
        resource_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AgendoError> {
        queries::appointments::scheduled_appointments_for_resource(&self.db, resource_id, date)
            .await
    }

    async fn cancel_appointment(
        &self,
        id: &str,
        reason: &str,
        actor: &str,
        at: NaiveDateTime,
    ) -> Result<(), AgendoError> {
        queries::appointments::cancel_appointment(&self.db, id, reason, actor, at).await
    }

    async fn reschedule_appointment(
        &self,
        id: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        external_event_id: Option<&str>,
    ) -> Result<(), AgendoError> {
        queries::appointments::reschedule_appointment(&self.db, id, date, start, end, external_event_id)
            .await
    }
}

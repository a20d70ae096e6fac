// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `agendo-core::domain` for use
//! across trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use agendo_core::domain::{
    Appointment, AppointmentStatus, Branch, Business, Category, Conversation,
    ConversationStatus, Resource, Service, Session, StoredMessage, User,
};

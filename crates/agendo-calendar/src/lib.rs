// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External calendar integration for Agendo.
//!
//! [`CalendarClient`] implements the core `CalendarPort` trait against
//! an events-resource REST API.

pub mod client;
pub mod types;

pub use client::CalendarClient;

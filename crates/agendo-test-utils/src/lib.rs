// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic mock collaborators for Agendo tests.
//!
//! `MockProvider` implements `LlmProvider` with scripted replies;
//! `MockCalendar` implements `CalendarPort` with preloaded events.
//! Both are fast and CI-runnable with no external services.

pub mod mock_calendar;
pub mod mock_provider;

pub use mock_calendar::MockCalendar;
pub use mock_provider::{MockProvider, text_reply, tool_reply};

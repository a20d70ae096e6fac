// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Agendo scheduling agent.
//!
//! Provides the domain entities, the shared error type, the neutral
//! message/tool/event types, and the trait definitions every adapter
//! crate implements. All other workspace crates depend on this one.

pub mod domain;
pub mod error;
pub mod traits;
pub mod types;

pub use error::AgendoError;
pub use traits::{CalendarPort, LlmProvider, Storage};
pub use types::{ChatMessage, ContentPart, LlmReply, LlmRequest, Role, ToolSpec};

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for the Agendo scheduling agent.
//!
//! A stateless per-turn state machine: context is rebuilt from storage
//! on every inbound message, the assistant loops with its tool surface
//! until a tool-free reply, the reply is persisted, and the memory
//! tiers are maintained. All collaborators arrive through [`AppContext`].

pub mod container;
pub mod context;
pub mod orchestrator;
pub mod prompts;
pub mod state;
pub mod tools;

pub use container::AppContext;
pub use context::{ContextOutcome, load_context};
pub use orchestrator::Orchestrator;
pub use state::{HistoryUpdate, InboundTurn, TurnState};

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API integration for Agendo.
//!
//! [`AnthropicClient`] speaks the wire protocol; [`AnthropicProvider`]
//! adapts it to the core `LlmProvider` trait.

pub mod client;
pub mod provider;
pub mod types;

pub use client::AnthropicClient;
pub use provider::AnthropicProvider;

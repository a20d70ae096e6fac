// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./agendo.toml` >
//! `~/.config/agendo/agendo.toml` > `/etc/agendo/agendo.toml`,
//! with environment variable overrides via the `AGENDO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AgendoConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/agendo/agendo.toml` (system-wide)
/// 3. `~/.config/agendo/agendo.toml` (user XDG config)
/// 4. `./agendo.toml` (local directory)
/// 5. `AGENDO_*` environment variables
pub fn load_config() -> Result<AgendoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AgendoConfig::default()))
        .merge(Toml::file("/etc/agendo/agendo.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("agendo/agendo.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("agendo.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<AgendoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AgendoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AgendoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AgendoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `AGENDO_ANTHROPIC_API_KEY` must map
/// to `anthropic.api_key`, not `anthropic.api.key`.
fn env_provider() -> Env {
    Env::prefixed("AGENDO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("calendar_", "calendar.", 1)
            .replacen("conversation_", "conversation.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("booking_", "booking.", 1);
        mapped.into()
    })
}

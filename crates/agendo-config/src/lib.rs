// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for the Agendo scheduling agent.
//!
//! TOML files merged across the XDG hierarchy with `AGENDO_*`
//! environment overrides, plus semantic validation.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::AgendoConfig;
pub use validation::{ConfigError, load_and_validate, validate_config};

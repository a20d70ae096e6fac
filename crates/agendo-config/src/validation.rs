// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes.

use thiserror::Error;

use crate::model::AgendoConfig;

/// A single configuration problem found during validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be parsed or merged.
    #[error("{0}")]
    Parse(#[from] Box<figment::Error>),

    /// A semantic constraint was violated.
    #[error("{message}")]
    Validation { message: String },
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors rather than failing fast.
pub fn validate_config(config: &AgendoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.calendar.availability_marker.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "calendar.availability_marker must not be empty".to_string(),
        });
    }

    if config.conversation.timeout_hours < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "conversation.timeout_hours must be at least 1, got {}",
                config.conversation.timeout_hours
            ),
        });
    }

    if config.conversation.recent_window == 0 {
        errors.push(ConfigError::Validation {
            message: "conversation.recent_window must be at least 1".to_string(),
        });
    }

    if config.conversation.max_tool_rounds == 0 {
        errors.push(ConfigError::Validation {
            message: "conversation.max_tool_rounds must be at least 1".to_string(),
        });
    }

    // The first summary excludes the last two messages; anything below
    // three would summarize an empty prefix.
    if config.memory.summary_threshold < 3 {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.summary_threshold must be at least 3, got {}",
                config.memory.summary_threshold
            ),
        });
    }

    if config.memory.profile_checkpoint_every == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.profile_checkpoint_every must be at least 1".to_string(),
        });
    }

    if config.booking.max_alternatives == 0 {
        errors.push(ConfigError::Validation {
            message: "booking.max_alternatives must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Load config from the XDG hierarchy and validate it in one step.
pub fn load_and_validate() -> Result<AgendoConfig, Vec<ConfigError>> {
    let config = crate::loader::load_config().map_err(|e| vec![ConfigError::Parse(Box::new(e))])?;
    validate_config(&config)?;
    Ok(config)
}

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Agendo scheduling agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject
//! unrecognized config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Agendo configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to
/// sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgendoConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// External calendar settings.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Conversation lifecycle and prompt-window settings.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Memory tiering settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Booking engine settings.
    #[serde(default)]
    pub booking: BookingConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "agendo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires an environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model to use for LLM requests.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("agendo").join("agendo.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("agendo.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// External calendar configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// Base URL of the calendar REST API. `None` disables the external
    /// calendar; availability then always uses the local fallback.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the calendar API.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Marker string matched (case-insensitively) against event titles
    /// to recognize availability blocks.
    #[serde(default = "default_availability_marker")]
    pub availability_marker: String,

    /// IANA time zone attached to created events.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            availability_marker: default_availability_marker(),
            time_zone: default_time_zone(),
        }
    }
}

fn default_availability_marker() -> String {
    "agendo".to_string()
}

fn default_time_zone() -> String {
    "America/Guayaquil".to_string()
}

/// Conversation lifecycle and prompt-window configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// Hours of inactivity after which a conversation stops being
    /// selected as active.
    #[serde(default = "default_timeout_hours")]
    pub timeout_hours: i64,

    /// Raw messages reloaded when a tier-2 summary exists.
    #[serde(default = "default_recent_window")]
    pub recent_window: u32,

    /// Hard cap on messages sent to the LLM per request.
    #[serde(default = "default_max_prompt_messages")]
    pub max_prompt_messages: usize,

    /// Maximum assistant/tool rounds within a single turn.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            timeout_hours: default_timeout_hours(),
            recent_window: default_recent_window(),
            max_prompt_messages: default_max_prompt_messages(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

fn default_timeout_hours() -> i64 {
    2
}

fn default_recent_window() -> u32 {
    6
}

fn default_max_prompt_messages() -> usize {
    20
}

fn default_max_tool_rounds() -> u32 {
    8
}

/// Memory tiering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Persisted message count above which tier-2 summarization runs.
    #[serde(default = "default_summary_threshold")]
    pub summary_threshold: u32,

    /// Most recent messages fed into a summary update.
    #[serde(default = "default_summary_update_tail")]
    pub summary_update_tail: u32,

    /// Message count at which tier-3 profile checkpoints begin.
    #[serde(default = "default_profile_checkpoint_start")]
    pub profile_checkpoint_start: u32,

    /// Messages between tier-3 profile checkpoints past the start.
    #[serde(default = "default_profile_checkpoint_every")]
    pub profile_checkpoint_every: u32,

    /// Maximum entries retained per profile list field.
    #[serde(default = "default_profile_list_cap")]
    pub profile_list_cap: usize,

    /// Model for summarization and profile extraction. `None` uses
    /// `anthropic.default_model`.
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            summary_threshold: default_summary_threshold(),
            summary_update_tail: default_summary_update_tail(),
            profile_checkpoint_start: default_profile_checkpoint_start(),
            profile_checkpoint_every: default_profile_checkpoint_every(),
            profile_list_cap: default_profile_list_cap(),
            model: None,
        }
    }
}

fn default_summary_threshold() -> u32 {
    6
}

fn default_summary_update_tail() -> u32 {
    4
}

fn default_profile_checkpoint_start() -> u32 {
    10
}

fn default_profile_checkpoint_every() -> u32 {
    5
}

fn default_profile_list_cap() -> usize {
    5
}

/// Booking engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BookingConfig {
    /// Alternatives offered when a requested time is unavailable.
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: usize,

    /// Fallback booking window when the business does not set one.
    #[serde(default = "default_booking_window_days")]
    pub booking_window_days: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_alternatives: default_max_alternatives(),
            booking_window_days: default_booking_window_days(),
        }
    }
}

fn default_max_alternatives() -> usize {
    5
}

fn default_booking_window_days() -> u32 {
    30
}

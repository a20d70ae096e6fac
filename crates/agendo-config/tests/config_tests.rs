// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for config loading, merging, and validation.

use agendo_config::{load_config_from_str, validate_config};

#[test]
fn defaults_load_without_any_file() {
    let config = load_config_from_str("").expect("empty config should load defaults");
    assert_eq!(config.agent.name, "agendo");
    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.anthropic.default_model, "claude-sonnet-4-20250514");
    assert_eq!(config.anthropic.max_tokens, 1024);
    assert_eq!(config.conversation.timeout_hours, 2);
    assert_eq!(config.conversation.recent_window, 6);
    assert_eq!(config.conversation.max_prompt_messages, 20);
    assert_eq!(config.memory.summary_threshold, 6);
    assert_eq!(config.memory.summary_update_tail, 4);
    assert_eq!(config.memory.profile_checkpoint_start, 10);
    assert_eq!(config.memory.profile_checkpoint_every, 5);
    assert_eq!(config.memory.profile_list_cap, 5);
    assert_eq!(config.booking.max_alternatives, 5);
    assert_eq!(config.booking.booking_window_days, 30);
    assert_eq!(config.calendar.availability_marker, "agendo");
    assert!(config.calendar.base_url.is_none());
}

#[test]
fn toml_overrides_defaults() {
    let toml = r#"
        [agent]
        name = "frontdesk"
        log_level = "debug"

        [conversation]
        timeout_hours = 4
        recent_window = 8

        [calendar]
        base_url = "https://calendar.example.com"
        availability_marker = "frontdesk"
    "#;
    let config = load_config_from_str(toml).unwrap();
    assert_eq!(config.agent.name, "frontdesk");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.conversation.timeout_hours, 4);
    assert_eq!(config.conversation.recent_window, 8);
    assert_eq!(
        config.calendar.base_url.as_deref(),
        Some("https://calendar.example.com")
    );
    assert_eq!(config.calendar.availability_marker, "frontdesk");
    // Untouched sections keep defaults.
    assert_eq!(config.memory.summary_threshold, 6);
}

#[test]
fn unknown_keys_are_rejected() {
    let toml = r#"
        [agent]
        name = "agendo"
        no_such_key = true
    "#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
        [telemetry]
        enabled = true
    "#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn valid_defaults_pass_validation() {
    let config = load_config_from_str("").unwrap();
    assert!(validate_config(&config).is_ok());
}

#[test]
fn empty_database_path_fails_validation() {
    let toml = r#"
        [storage]
        database_path = ""
    "#;
    let config = load_config_from_str(toml).unwrap();
    let errors = validate_config(&config).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| e.to_string().contains("database_path"))
    );
}

#[test]
fn low_summary_threshold_fails_validation() {
    let toml = r#"
        [memory]
        summary_threshold = 2
    "#;
    let config = load_config_from_str(toml).unwrap();
    let errors = validate_config(&config).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| e.to_string().contains("summary_threshold"))
    );
}

#[test]
fn zero_tool_rounds_fails_validation() {
    let toml = r#"
        [conversation]
        max_tool_rounds = 0
    "#;
    let config = load_config_from_str(toml).unwrap();
    let errors = validate_config(&config).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| e.to_string().contains("max_tool_rounds"))
    );
}

#[test]
fn validation_collects_multiple_errors() {
    let toml = r#"
        [storage]
        database_path = ""

        [booking]
        max_alternatives = 0
    "#;
    let config = load_config_from_str(toml).unwrap();
    let errors = validate_config(&config).unwrap_err();
    assert!(errors.len() >= 2);
}

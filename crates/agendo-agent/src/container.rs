// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency container for the orchestrator and its tools.
//!
//! Constructed once at startup and passed explicitly to every
//! component. Nothing in the workspace reaches collaborators through
//! global state.

use std::sync::Arc;

use agendo_config::AgendoConfig;
use agendo_core::{CalendarPort, LlmProvider, Storage};
use agendo_scheduling::{AvailabilityEngine, BookingEngine, BookingSettings};

/// Holds every collaborator the per-turn pipeline needs.
#[derive(Clone)]
pub struct AppContext {
    pub storage: Arc<dyn Storage>,
    pub provider: Arc<dyn LlmProvider>,
    pub calendar: Arc<dyn CalendarPort>,
    pub config: Arc<AgendoConfig>,
}

impl AppContext {
    pub fn new(
        storage: Arc<dyn Storage>,
        provider: Arc<dyn LlmProvider>,
        calendar: Arc<dyn CalendarPort>,
        config: AgendoConfig,
    ) -> Self {
        Self {
            storage,
            provider,
            calendar,
            config: Arc::new(config),
        }
    }

    /// A fresh availability engine over the shared collaborators.
    pub fn availability_engine(&self) -> AvailabilityEngine {
        AvailabilityEngine::new(
            self.calendar.clone(),
            self.storage.clone(),
            self.config.calendar.availability_marker.clone(),
        )
    }

    /// A fresh booking engine over the shared collaborators.
    pub fn booking_engine(&self) -> BookingEngine {
        BookingEngine::new(
            self.storage.clone(),
            self.calendar.clone(),
            self.availability_engine(),
            BookingSettings {
                max_alternatives: self.config.booking.max_alternatives,
                booking_window_days: self.config.booking.booking_window_days,
                time_zone: self.config.calendar.time_zone.clone(),
            },
        )
    }

    /// Model for memory maintenance calls, falling back to the main model.
    pub fn memory_model(&self) -> String {
        self.config
            .memory
            .model
            .clone()
            .unwrap_or_else(|| self.config.anthropic.default_model.clone())
    }
}

// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability and booking engines for the Agendo scheduling agent.
//!
//! `slots` is the pure candidate computation; `availability` derives
//! blocks from the external calendar (with a local degraded fallback);
//! `booking` commits appointments with a synchronous availability
//! recheck as the sole double-booking guard.

pub mod availability;
pub mod booking;
pub mod slots;

pub use availability::AvailabilityEngine;
pub use booking::{
    BookingEngine, BookingOutcome, BookingRequest, BookingSettings, CancelOutcome,
    RescheduleOutcome,
};
pub use slots::{TimeBlock, available_slots};

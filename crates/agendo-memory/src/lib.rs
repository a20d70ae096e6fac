// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory tiers for the Agendo scheduling agent.
//!
//! Tier 1 (the raw recent window) is a reload policy in the
//! orchestrator; this crate implements tier 2 (the per-conversation
//! rolling summary) and tier 3 (the cross-conversation user profile).

pub mod profile;
pub mod summary;

pub use profile::{
    ProfileSettings, ProfileUpdate, UserProfile, maintain_profile, note_booking,
    note_cancellation, parse_profile_update, profile_checkpoint_due,
};
pub use summary::{SummaryPlan, SummarySettings, format_transcript, maintain_summary, summary_plan};

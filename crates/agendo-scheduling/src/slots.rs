// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure slot computation over availability and booked blocks.
//!
//! Candidates step through each availability block by the requested
//! duration, so generated candidates never overlap each other. Two
//! services of different durations therefore see different candidate
//! start times for the same block; booking re-validates with the
//! service's own duration, so no conflicting booking can be committed.

use chrono::NaiveTime;

/// A contiguous window of time within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBlock {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeBlock {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

/// Computes bookable start times.
///
/// Per availability block, a cursor walks from block start in steps of
/// `duration_minutes`; a candidate [cursor, cursor+duration) is kept
/// iff it fits inside the block and overlaps no booked block. Blocks
/// are processed in chronological order and never merged; overlapping
/// availability blocks yield their candidates independently.
pub fn available_slots(
    availability: &[TimeBlock],
    booked: &[TimeBlock],
    duration_minutes: u32,
) -> Vec<NaiveTime> {
    if duration_minutes == 0 {
        return Vec::new();
    }

    let mut blocks: Vec<&TimeBlock> = availability.iter().collect();
    blocks.sort_by_key(|b| b.start);

    let mut slots = Vec::new();
    for block in blocks {
        let block_start = minutes_of(block.start);
        let block_end = minutes_of(block.end);

        let mut cursor = block_start;
        while cursor + duration_minutes <= block_end {
            let candidate_end = cursor + duration_minutes;
            let collides = booked.iter().any(|b| {
                let booked_start = minutes_of(b.start);
                let booked_end = minutes_of(b.end);
                // Overlap iff NOT (candidate ends before or starts after).
                !(candidate_end <= booked_start || cursor >= booked_end)
            });
            if !collides {
                slots.push(time_from_minutes(cursor));
            }
            cursor += duration_minutes;
        }
    }
    slots
}

fn minutes_of(t: NaiveTime) -> u32 {
    use chrono::Timelike;
    t.hour() * 60 + t.minute()
}

fn time_from_minutes(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .expect("minutes within a day")
}

/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Half-open time intervals and the overlap predicate.
//!
//! Free functions and a small value type so the predicate can be tested
//! independently of the engine.  There is no day-of-week or recurrence logic:
//! every interval is a pair of absolute instants.

use chrono::NaiveDateTime;

/// A `[start, end)` interval.
///
/// Construction does not validate `start < end`; an inverted or empty range
/// simply overlaps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// `true` when `start < end`.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Half-open overlap test, see [`overlaps`].
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// `true` if `other` lies entirely within this range.
    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// `a` and `b` overlap iff `a_start < b_end && a_end > b_start`.
///
/// Back-to-back intervals (`a_end == b_start`) do not overlap.  An empty or
/// inverted interval (`start >= end`) overlaps nothing, even where the raw
/// comparison would pass (e.g. `11:00–09:00` against `08:00–12:00`).
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    if a_start >= a_end || b_start >= b_end {
        return false;
    }
    a_start < b_end && a_end > b_start
}

// ── Tests ─────────────────────────────────────────────────────────────────────

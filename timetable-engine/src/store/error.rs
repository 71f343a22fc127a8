/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for timetable store mutations.
//!
//! Every variant names the record and the offending values so a caller can
//! log or surface them without parsing the message.  Rejected mutations leave
//! the store and its published snapshot untouched.

use chrono::NaiveDateTime;
use thiserror::Error;

// ── Record kind ───────────────────────────────────────────────────────────────

/// Which collection a store error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Course,
    Room,
    User,
    Event,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Course => "course",
            RecordKind::Room => "room",
            RecordKind::User => "user",
            RecordKind::Event => "event",
        };
        f.write_str(name)
    }
}

// ── Store errors ──────────────────────────────────────────────────────────────

/// Error returned by a [`TimetableStore`](super::TimetableStore) command.
///
/// | Variant | Raised by |
/// |---|---|
/// | `InvalidTimeRange` | `add_event`, `update_event` |
/// | `InvalidCapacity` | `add_room`, `update_room` |
/// | `DuplicateId` | every `add_*` |
/// | `NotFound` | every `update_*` / `remove_*` |
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Event interval is empty or inverted (`start >= end`).
    #[error("event '{event}' has start {start} not before end {end}")]
    InvalidTimeRange {
        event: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A room must seat at least one person.
    #[error("room '{room}' has invalid capacity {capacity} (must be > 0)")]
    InvalidCapacity { room: String, capacity: u32 },

    /// A record with this id already exists.
    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: RecordKind, id: String },

    /// No record with this id exists.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },
}

/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core timetable records consumed by the conflict engine.
//!
//! Three resource records and one event record model the timetable:
//!
//! ```text
//! Course ──(responsible_teacher_id)──► User (teacher)
//!   ▲
//!   │ course_id
//! ScheduleEvent ──(room_id)──► Room
//!   │
//!   └──(student_ids)──► User (student)
//! ```
//!
//! # Derived flags
//! `ScheduleEvent::has_conflict` and `ScheduleEvent::is_room_overloaded` are
//! private.  Only [`crate::engine`] writes them; everybody else reads them
//! through accessors.  A freshly built event always starts with both flags
//! cleared, so a stale value can never be smuggled in from outside.

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::engine::overlap::TimeRange;

// ── Session type ──────────────────────────────────────────────────────────────

/// Kind of teaching session.  Informational only; the engine ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionType {
    /// Cours magistral (lecture).
    #[default]
    Cm,
    /// Travaux dirigés (tutorial).
    Td,
    /// Travaux pratiques (lab).
    Tp,
}

impl SessionType {
    /// Short label as shown on a timetable grid.
    pub fn label(self) -> &'static str {
        match self {
            SessionType::Cm => "CM",
            SessionType::Td => "TD",
            SessionType::Tp => "TP",
        }
    }
}

// ── Users ─────────────────────────────────────────────────────────────────────

/// Role of a [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    #[default]
    Student,
}

/// A teacher, student or administrator.
///
/// Teacher workload fields are stored for display but never enforced by the
/// engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub weekly_hours: Option<u32>,
    pub max_weekly_hours: Option<u32>,
    pub available_days: Vec<String>,
}

impl User {
    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}

// ── Courses ───────────────────────────────────────────────────────────────────

/// A course owning zero or more scheduled sessions.
///
/// Only `responsible_teacher_id` takes part in teacher-collision detection.
/// `associated_teacher_ids` is informational.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub code: String,
    pub responsible_teacher_id: Option<String>,
    pub associated_teacher_ids: Vec<String>,

    // ── Program classification (informational) ────────────────────────────────
    pub filiere: Option<String>,
    pub niveau: Option<String>,
    pub campus: Option<String>,

    // ── Hour breakdown (informational) ────────────────────────────────────────
    pub cm_hours: u32,
    pub td_hours: u32,
    pub tp_hours: u32,
    pub total_hours: u32,
}

// ── Rooms ─────────────────────────────────────────────────────────────────────

/// Physical room category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomType {
    Amphi,
    Td,
    Tp,
    Meeting,
}

/// A room with a seating capacity.
///
/// Equipment fields are informational; only `capacity` is consumed by the
/// overload rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Number of seats.  The store rejects zero.
    pub capacity: u32,
    pub campus: Option<String>,
    pub room_type: Option<RoomType>,
    pub building: Option<String>,
    pub has_projector: bool,
    pub has_computers: bool,
}

impl Room {
    /// Minimal room with the given capacity and no equipment.
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
            campus: None,
            room_type: None,
            building: None,
            has_projector: false,
            has_computers: false,
        }
    }
}

// ── ScheduleEvent ─────────────────────────────────────────────────────────────

/// One scheduled session of a course, bound to a room and a time interval.
///
/// # Lifecycle
/// Built by the caller (store command or dataset loader) with both derived
/// flags cleared, handed to [`crate::engine::evaluate`], which returns a copy
/// with the flags set.  Re-evaluating an annotated event ignores the previous
/// flag values.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEvent {
    // ── Identity & references ─────────────────────────────────────────────────
    pub id: String,
    pub course_id: String,
    pub room_id: String,

    // ── Timing ────────────────────────────────────────────────────────────────
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,

    pub session_type: SessionType,

    /// Attending students.  Order is irrelevant; duplicates are tolerated.
    pub student_ids: Vec<String>,

    // ── Manual flags (no effect on conflicts) ─────────────────────────────────
    pub is_cancelled: bool,
    pub is_modified: bool,

    pub academic_year: Option<String>,
    pub semester: Option<String>,

    // ── Derived (written by the engine only) ──────────────────────────────────
    has_conflict: bool,
    is_room_overloaded: bool,
}

impl ScheduleEvent {
    /// Create a non-cancelled CM session with an empty roster.
    pub fn new(
        id: impl Into<String>,
        course_id: impl Into<String>,
        room_id: impl Into<String>,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            course_id: course_id.into(),
            room_id: room_id.into(),
            start_time,
            end_time,
            session_type: SessionType::default(),
            student_ids: Vec::new(),
            is_cancelled: false,
            is_modified: false,
            academic_year: None,
            semester: None,
            has_conflict: false,
            is_room_overloaded: false,
        }
    }

    /// Builder-style roster setter.
    pub fn with_students<I, S>(mut self, students: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.student_ids = students.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style session type setter.
    pub fn with_session_type(mut self, session_type: SessionType) -> Self {
        self.session_type = session_type;
        self
    }

    /// The event's `[start, end)` interval.
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    /// Number of students on the roster.
    pub fn attendee_count(&self) -> usize {
        self.student_ids.len()
    }

    /// `true` if `student_id` is on the roster.
    pub fn has_student(&self, student_id: &str) -> bool {
        self.student_ids.iter().any(|s| s == student_id)
    }

    /// `true` if this event overlaps another event with a shared room,
    /// responsible teacher or student, as of the last evaluation.
    pub fn has_conflict(&self) -> bool {
        self.has_conflict
    }

    /// `true` if the roster exceeds the assigned room's capacity, as of the
    /// last evaluation.
    pub fn is_room_overloaded(&self) -> bool {
        self.is_room_overloaded
    }

    pub(crate) fn set_derived_flags(&mut self, has_conflict: bool, is_room_overloaded: bool) {
        self.has_conflict = has_conflict;
        self.is_room_overloaded = is_room_overloaded;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

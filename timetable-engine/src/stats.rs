/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dashboard figures derived from an evaluated timetable.
//!
//! Everything here reads a [`TimetableStore`] and its current snapshot; no
//! function recomputes conflicts on its own, so the figures always agree with
//! the flags the store published.
//!
//! | Figure | Source |
//! |---|---|
//! | `detected_conflicts` | events with `has_conflict()` |
//! | `room_overloads` | events with `is_room_overloaded()` |
//! | `room_conflicts` / `teacher_conflicts` / `student_conflicts` | conflicting pairs by fired rule (a pair may count under several) |
//! | `planned_courses` | distinct course ids referenced by events |
//! | `occupied_rooms` | distinct room ids referenced by events |

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::engine::overlap::TimeRange;
use crate::engine::ConflictKind;
use crate::model::{Role, ScheduleEvent};
use crate::store::{TimetableSnapshot, TimetableStore};

// ── Admin dashboard ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_teachers: usize,
    pub total_courses: usize,
    pub planned_courses: usize,
    pub total_rooms: usize,
    pub occupied_rooms: usize,
    /// `occupied_rooms / total_rooms × 100`, `0.0` without rooms.
    pub room_occupancy_rate: f64,
    pub total_events: usize,
    pub cancelled_events: usize,
    pub detected_conflicts: usize,
    pub room_overloads: usize,
    pub room_conflicts: usize,
    pub teacher_conflicts: usize,
    pub student_conflicts: usize,
}

impl DashboardStats {
    /// Figures for the store's latest snapshot.
    pub fn from_store(store: &TimetableStore) -> Self {
        Self::from_snapshot(&store.snapshot(), store)
    }

    /// Event figures come from `snap`, which may be older than the store's
    /// current snapshot; resource totals always come from `store`.
    pub fn from_snapshot(snap: &TimetableSnapshot, store: &TimetableStore) -> Self {
        let planned: BTreeSet<&str> = snap.events.iter().map(|e| e.course_id.as_str()).collect();
        let occupied: BTreeSet<&str> = snap.events.iter().map(|e| e.room_id.as_str()).collect();
        let total_rooms = store.rooms().len();

        let stats = Self {
            total_students: count_role(store, Role::Student),
            total_teachers: count_role(store, Role::Teacher),
            total_courses: store.courses().len(),
            planned_courses: planned.len(),
            total_rooms,
            occupied_rooms: occupied.len(),
            room_occupancy_rate: if total_rooms > 0 {
                occupied.len() as f64 / total_rooms as f64 * 100.0
            } else {
                0.0
            },
            total_events: snap.events.len(),
            cancelled_events: snap.events.iter().filter(|e| e.is_cancelled).count(),
            detected_conflicts: snap.conflicted_events().count(),
            room_overloads: snap.overloaded_events().count(),
            room_conflicts: count_kind(snap, ConflictKind::Room),
            teacher_conflicts: count_kind(snap, ConflictKind::Teacher),
            student_conflicts: count_kind(snap, ConflictKind::Student),
        };

        debug!(revision = snap.revision, stats = ?stats, "dashboard stats computed");
        stats
    }
}

fn count_role(store: &TimetableStore, role: Role) -> usize {
    store.users().values().filter(|u| u.role == role).count()
}

fn count_kind(snap: &TimetableSnapshot, kind: ConflictKind) -> usize {
    snap.conflicts.iter().filter(|c| c.kinds.contains(kind)).count()
}

// ── Personal schedules ────────────────────────────────────────────────────────

/// A teacher's or student's view of the timetable.
#[derive(Debug, Clone, Default)]
pub struct PersonalSchedule {
    pub name: String,
    /// Sorted by start time.
    pub events: Vec<ScheduleEvent>,
    pub conflicts_detected: usize,
    /// One line per cancelled or modified session.
    pub alerts: Vec<String>,
    /// Teachers only.
    pub weekly_hours: Option<u32>,
    pub max_weekly_hours: Option<u32>,
}

impl PersonalSchedule {
    /// The next `limit` sessions starting strictly after `now`.
    pub fn upcoming(&self, now: NaiveDateTime, limit: usize) -> impl Iterator<Item = &ScheduleEvent> {
        self.events
            .iter()
            .filter(move |e| e.start_time > now)
            .take(limit)
    }
}

/// Sessions of courses for which `teacher_id` is the responsible teacher.
///
/// `window` restricts the result to events lying entirely inside it.  Returns
/// `None` if `teacher_id` is not a known teacher.
pub fn teacher_schedule(
    store: &TimetableStore,
    teacher_id: &str,
    window: Option<TimeRange>,
) -> Option<PersonalSchedule> {
    let teacher = store.user(teacher_id).filter(|u| u.is_teacher())?;
    let events = select(store, window, |e| {
        store
            .course(&e.course_id)
            .and_then(|c| c.responsible_teacher_id.as_deref())
            == Some(teacher_id)
    });

    Some(PersonalSchedule {
        name: teacher.name.clone(),
        conflicts_detected: events.iter().filter(|e| e.has_conflict()).count(),
        alerts: alerts(store, &events),
        weekly_hours: teacher.weekly_hours,
        max_weekly_hours: teacher.max_weekly_hours,
        events,
    })
}

/// Sessions listing `student_id` on their roster.
///
/// Same window semantics as [`teacher_schedule`].  Returns `None` if
/// `student_id` is not a known student.
pub fn student_schedule(
    store: &TimetableStore,
    student_id: &str,
    window: Option<TimeRange>,
) -> Option<PersonalSchedule> {
    let student = store.user(student_id).filter(|u| u.is_student())?;
    let events = select(store, window, |e| e.has_student(student_id));

    Some(PersonalSchedule {
        name: student.name.clone(),
        conflicts_detected: events.iter().filter(|e| e.has_conflict()).count(),
        alerts: alerts(store, &events),
        weekly_hours: None,
        max_weekly_hours: None,
        events,
    })
}

fn select<F>(store: &TimetableStore, window: Option<TimeRange>, pred: F) -> Vec<ScheduleEvent>
where
    F: Fn(&ScheduleEvent) -> bool,
{
    let snap = store.snapshot();
    let mut events: Vec<ScheduleEvent> = snap
        .events
        .iter()
        .filter(|e| window.map_or(true, |w| w.contains(&e.time_range())))
        .filter(|e| pred(*e))
        .cloned()
        .collect();
    events.sort_by_key(|e| e.start_time);
    events
}

fn alerts(store: &TimetableStore, events: &[ScheduleEvent]) -> Vec<String> {
    events
        .iter()
        .filter(|e| e.is_cancelled || e.is_modified)
        .map(|e| {
            let course = store
                .course(&e.course_id)
                .map_or(e.course_id.as_str(), |c| c.name.as_str());
            format!(
                "Course {} ({}) on {} was {}.",
                course,
                e.session_type.label(),
                e.start_time.date(),
                if e.is_cancelled { "cancelled" } else { "modified" }
            )
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

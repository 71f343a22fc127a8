/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedule conflict detection and room-overload engine.
//!
//! [`ConflictEngine`] takes a snapshot of [`ScheduleEvent`]s plus course and
//! room lookups and returns the same events, in the same order, with the two
//! derived flags recomputed:
//!
//! * `has_conflict`: the event overlaps in time with another event that
//!   shares its room, its course's responsible teacher, or at least one
//!   student.
//! * `is_room_overloaded`: the roster is larger than the assigned room's
//!   capacity.
//!
//! # Policy
//!
//! | Rule | Needs lookup | Missing reference |
//! |---|---|---|
//! | Room collision | no (raw `room_id` compare) | always applicable |
//! | Teacher collision | course → responsible teacher | rule skipped for that event |
//! | Student collision | no | always applicable |
//! | Room overload | room → capacity | `false` |
//!
//! Associated teachers never take part in teacher collision.  Cancelled and
//! modified events are evaluated like any other event.  Two entries sharing
//! the same `id` are the same event and never conflict with each other.
//!
//! # Strategies
//! [`Strategy::Pairwise`] is the O(n²) brute-force scan and the correctness
//! oracle.  [`Strategy::Sweep`] sorts by start time and only compares events
//! whose intervals are still open; it reports exactly the same conflict set.
//!
//! # Example
//! ```rust,ignore
//! let engine = ConflictEngine::new(Strategy::Sweep);
//! let annotated: Vec<ScheduleEvent> = engine.evaluate(&events, &courses, &rooms);
//! ```

pub mod error;
pub mod overlap;

pub use error::EngineError;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::BuildHasher;
use std::marker::PhantomData;

use tracing::{debug, info};

use crate::model::{Course, Room, ScheduleEvent};

use overlap::TimeRange;

// ── Lookups ───────────────────────────────────────────────────────────────────

/// Resolves a course id to its responsible teacher.
pub trait CourseLookup {
    /// Returns `None` when the course is unknown.
    fn course(&self, course_id: &str) -> Option<&Course>;

    /// Responsible teacher of `course_id`, or `None` if the course is unknown
    /// or has no responsible teacher.  An empty id counts as no teacher.
    fn responsible_teacher(&self, course_id: &str) -> Option<&str> {
        self.course(course_id)
            .and_then(|c| c.responsible_teacher_id.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// Resolves a room id to its seating capacity.
pub trait RoomLookup {
    /// Returns `None` when the room is unknown.
    fn room(&self, room_id: &str) -> Option<&Room>;

    fn capacity(&self, room_id: &str) -> Option<u32> {
        self.room(room_id).map(|r| r.capacity)
    }
}

impl<S: BuildHasher> CourseLookup for HashMap<String, Course, S> {
    fn course(&self, course_id: &str) -> Option<&Course> {
        self.get(course_id)
    }
}

impl CourseLookup for BTreeMap<String, Course> {
    fn course(&self, course_id: &str) -> Option<&Course> {
        self.get(course_id)
    }
}

impl<S: BuildHasher> RoomLookup for HashMap<String, Room, S> {
    fn room(&self, room_id: &str) -> Option<&Room> {
        self.get(room_id)
    }
}

impl RoomLookup for BTreeMap<String, Room> {
    fn room(&self, room_id: &str) -> Option<&Room> {
        self.get(room_id)
    }
}

/// Adapts a closure into a [`CourseLookup`] or [`RoomLookup`].
///
/// ```rust,ignore
/// let catalogue: Vec<Course> = load_courses();
/// let courses = FnLookup::new(|id: &str| catalogue.iter().find(|c| c.id == id));
/// let annotated = evaluate(&events, &courses, &rooms);
/// ```
pub struct FnLookup<'a, F> {
    f: F,
    _records: PhantomData<&'a ()>,
}

impl<'a, F> FnLookup<'a, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _records: PhantomData,
        }
    }
}

impl<'a, F> CourseLookup for FnLookup<'a, F>
where
    F: Fn(&str) -> Option<&'a Course>,
{
    fn course(&self, course_id: &str) -> Option<&Course> {
        (self.f)(course_id)
    }
}

impl<'a, F> RoomLookup for FnLookup<'a, F>
where
    F: Fn(&str) -> Option<&'a Room>,
{
    fn room(&self, room_id: &str) -> Option<&Room> {
        (self.f)(room_id)
    }
}

// ── Conflict classification ───────────────────────────────────────────────────

/// The resource two overlapping events compete for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictKind {
    Room,
    Teacher,
    Student,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConflictKind::Room => "room",
            ConflictKind::Teacher => "teacher",
            ConflictKind::Student => "student",
        };
        f.write_str(name)
    }
}

/// Set of rules that fired for one conflicting pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConflictKinds {
    pub room: bool,
    pub teacher: bool,
    pub student: bool,
}

impl ConflictKinds {
    pub fn is_empty(&self) -> bool {
        !(self.room || self.teacher || self.student)
    }

    pub fn contains(&self, kind: ConflictKind) -> bool {
        match kind {
            ConflictKind::Room => self.room,
            ConflictKind::Teacher => self.teacher,
            ConflictKind::Student => self.student,
        }
    }

    /// Fired kinds in `Room`, `Teacher`, `Student` order.
    pub fn iter(&self) -> impl Iterator<Item = ConflictKind> + '_ {
        [ConflictKind::Room, ConflictKind::Teacher, ConflictKind::Student]
            .into_iter()
            .filter(move |k| self.contains(*k))
    }
}

/// One conflicting pair of events.
///
/// `first < second` are positions in the evaluated input, so each pair is
/// reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub first: usize,
    pub second: usize,
    pub first_id: String,
    pub second_id: String,
    pub kinds: ConflictKinds,
}

// ── Strategy ──────────────────────────────────────────────────────────────────

/// How candidate pairs are enumerated.  Both produce identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Compare every pair.
    #[default]
    Pairwise,
    /// Sort by start time and compare only against still-open events.
    Sweep,
}

impl Strategy {
    /// Parse a strategy name as given on the command line.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "pairwise" => Ok(Strategy::Pairwise),
            "sweep" => Ok(Strategy::Sweep),
            other => Err(EngineError::UnknownStrategy(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Pairwise => "pairwise",
            Strategy::Sweep => "sweep",
        }
    }
}

// ── Evaluation result ─────────────────────────────────────────────────────────

/// Output of [`ConflictEngine::run`]: annotated events plus the pairs that
/// produced the `has_conflict` flags.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub events: Vec<ScheduleEvent>,
    pub conflicts: Vec<Conflict>,
}

// ── Per-event view used during the scan ───────────────────────────────────────

/// References resolved once per event so the pair test does no lookups.
struct Resolved<'a> {
    id: &'a str,
    room_id: &'a str,
    range: TimeRange,
    teacher: Option<&'a str>,
    students: HashSet<&'a str>,
}

impl<'a> Resolved<'a> {
    fn classify(&self, other: &Resolved<'_>) -> Option<ConflictKinds> {
        if self.id == other.id || !self.range.overlaps(&other.range) {
            return None;
        }
        let kinds = ConflictKinds {
            room: self.room_id == other.room_id,
            teacher: matches!((self.teacher, other.teacher), (Some(a), Some(b)) if a == b),
            student: !self.students.is_disjoint(&other.students),
        };
        (!kinds.is_empty()).then_some(kinds)
    }
}

// ── ConflictEngine ────────────────────────────────────────────────────────────

/// Stateless evaluator.  Holds only the chosen [`Strategy`], so it is `Copy`,
/// `Send` and `Sync`, and evaluation never touches its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictEngine {
    strategy: Strategy,
}

impl ConflictEngine {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Return a copy of `events` with `has_conflict` and `is_room_overloaded`
    /// recomputed.  Same length and order as the input; prior flag values are
    /// ignored.
    pub fn evaluate<C, R>(&self, events: &[ScheduleEvent], courses: &C, rooms: &R) -> Vec<ScheduleEvent>
    where
        C: CourseLookup + ?Sized,
        R: RoomLookup + ?Sized,
    {
        self.run(events, courses, rooms).events
    }

    /// Every conflicting pair in `events`, sorted by `(first, second)`.
    pub fn find_conflicts<C>(&self, events: &[ScheduleEvent], courses: &C) -> Vec<Conflict>
    where
        C: CourseLookup + ?Sized,
    {
        let resolved = Self::resolve(events, courses);
        let mut conflicts = match self.strategy {
            Strategy::Pairwise => Self::scan_pairwise(&resolved),
            Strategy::Sweep => Self::scan_sweep(&resolved),
        };
        conflicts.sort_unstable_by_key(|c| (c.first, c.second));

        for c in &conflicts {
            debug!(
                first  = %c.first_id,
                second = %c.second_id,
                kinds  = ?c.kinds.iter().collect::<Vec<_>>(),
                "conflict"
            );
        }
        conflicts
    }

    /// Evaluate and keep the conflict pairs alongside the annotated events.
    pub fn run<C, R>(&self, events: &[ScheduleEvent], courses: &C, rooms: &R) -> Evaluation
    where
        C: CourseLookup + ?Sized,
        R: RoomLookup + ?Sized,
    {
        info!(
            strategy = self.strategy.as_str(),
            event_count = events.len(),
            "evaluating timetable"
        );

        let conflicts = self.find_conflicts(events, courses);

        let mut conflicted = vec![false; events.len()];
        for c in &conflicts {
            conflicted[c.first] = true;
            conflicted[c.second] = true;
        }

        let annotated: Vec<ScheduleEvent> = events
            .iter()
            .zip(conflicted)
            .map(|(event, has_conflict)| {
                let mut out = event.clone();
                out.set_derived_flags(has_conflict, Self::is_overloaded(event, rooms));
                out
            })
            .collect();

        info!(
            conflict_pairs = conflicts.len(),
            conflicted_events = annotated.iter().filter(|e| e.has_conflict()).count(),
            overloaded_events = annotated.iter().filter(|e| e.is_room_overloaded()).count(),
            "evaluation complete"
        );

        Evaluation {
            events: annotated,
            conflicts,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rules
    // ─────────────────────────────────────────────────────────────────────────

    /// Roster size against room capacity.  Unknown rooms are never overloaded.
    fn is_overloaded<R: RoomLookup + ?Sized>(event: &ScheduleEvent, rooms: &R) -> bool {
        match rooms.capacity(&event.room_id) {
            Some(capacity) => {
                let overloaded = event.attendee_count() > capacity as usize;
                if overloaded {
                    debug!(
                        event    = %event.id,
                        room     = %event.room_id,
                        students = event.attendee_count(),
                        capacity = capacity,
                        "room overloaded"
                    );
                }
                overloaded
            }
            None => {
                debug!(
                    event = %event.id,
                    room  = %event.room_id,
                    "room not found, overload check skipped"
                );
                false
            }
        }
    }

    fn resolve<'a, C>(events: &'a [ScheduleEvent], courses: &'a C) -> Vec<Resolved<'a>>
    where
        C: CourseLookup + ?Sized,
    {
        events
            .iter()
            .map(|e| {
                if courses.course(&e.course_id).is_none() {
                    debug!(
                        event  = %e.id,
                        course = %e.course_id,
                        "course not found, teacher collision skipped"
                    );
                }
                Resolved {
                    id: &e.id,
                    room_id: &e.room_id,
                    range: e.time_range(),
                    teacher: courses.responsible_teacher(&e.course_id),
                    students: e.student_ids.iter().map(String::as_str).collect(),
                }
            })
            .collect()
    }

    fn conflict(resolved: &[Resolved<'_>], a: usize, b: usize, kinds: ConflictKinds) -> Conflict {
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Conflict {
            first,
            second,
            first_id: resolved[first].id.to_string(),
            second_id: resolved[second].id.to_string(),
            kinds,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Strategy 1: pairwise
    // ─────────────────────────────────────────────────────────────────────────

    fn scan_pairwise(resolved: &[Resolved<'_>]) -> Vec<Conflict> {
        let mut out = Vec::new();
        for (i, a) in resolved.iter().enumerate() {
            for (j, b) in resolved.iter().enumerate().skip(i + 1) {
                if let Some(kinds) = a.classify(b) {
                    out.push(Self::conflict(resolved, i, j, kinds));
                }
            }
        }
        out
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Strategy 2: sweep
    // ─────────────────────────────────────────────────────────────────────────

    /// Visit events by start time keeping an "open" set of events whose end is
    /// still after the current start.  Anything that ended at or before the
    /// current start cannot overlap this or any later event.  Empty and
    /// inverted ranges overlap nothing and are left out.
    fn scan_sweep(resolved: &[Resolved<'_>]) -> Vec<Conflict> {
        let mut order: Vec<usize> = (0..resolved.len())
            .filter(|&i| resolved[i].range.is_valid())
            .collect();
        order.sort_by_key(|&i| (resolved[i].range.start, i));

        let mut open: Vec<usize> = Vec::new();
        let mut out = Vec::new();

        for idx in order {
            let current = &resolved[idx];
            open.retain(|&o| resolved[o].range.end > current.range.start);

            for &o in &open {
                if let Some(kinds) = resolved[o].classify(current) {
                    out.push(Self::conflict(resolved, o, idx, kinds));
                }
            }
            open.push(idx);
        }
        out
    }
}

/// Evaluate with the default [`Strategy::Pairwise`].
pub fn evaluate<C, R>(events: &[ScheduleEvent], courses: &C, rooms: &R) -> Vec<ScheduleEvent>
where
    C: CourseLookup + ?Sized,
    R: RoomLookup + ?Sized,
{
    ConflictEngine::default().evaluate(events, courses, rooms)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    // ── Test helpers ──────────────────────────────────────────────────────────

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn course(id: &str, teacher: Option<&str>) -> Course {
        Course {
            id: id.to_string(),
            name: format!("Course {id}"),
            code: id.to_uppercase(),
            responsible_teacher_id: teacher.map(str::to_string),
            ..Default::default()
        }
    }

    /// Courses: c1 → T1, c2 → T2, c3 → T3, c4 → T1, c5 → (no teacher).
    fn courses() -> HashMap<String, Course> {
        [
            course("c1", Some("T1")),
            course("c2", Some("T2")),
            course("c3", Some("T3")),
            course("c4", Some("T1")),
            course("c5", None),
        ]
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect()
    }

    /// Rooms R1..R5 with capacity 30.
    fn rooms() -> HashMap<String, Room> {
        (1..=5)
            .map(|n| {
                let id = format!("R{n}");
                (id.clone(), Room::new(id, format!("Room {n}"), 30))
            })
            .collect()
    }

    fn event(
        id: &str,
        course: &str,
        room: &str,
        start: (u32, u32),
        end: (u32, u32),
        students: &[&str],
    ) -> ScheduleEvent {
        ScheduleEvent::new(id, course, room, at(15, start.0, start.1), at(15, end.0, end.1))
            .with_students(students.iter().copied())
    }

    fn flags(events: &[ScheduleEvent]) -> Vec<(bool, bool)> {
        events
            .iter()
            .map(|e| (e.has_conflict(), e.is_room_overloaded()))
            .collect()
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    #[test]
    fn room_collision_flags_both_events() {
        let events = vec![
            event("A", "c1", "R1", (9, 0), (10, 30), &["s1", "s2"]),
            event("B", "c2", "R1", (9, 30), (11, 0), &["s3"]),
        ];
        let out = evaluate(&events, &courses(), &rooms());
        assert!(out[0].has_conflict());
        assert!(out[1].has_conflict());

        let pairs = ConflictEngine::default().find_conflicts(&events, &courses());
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].kinds.room);
        assert!(!pairs[0].kinds.teacher);
        assert!(!pairs[0].kinds.student);
    }

    #[test]
    fn teacher_collision_flags_both_events() {
        // c1 and c4 share responsible teacher T1
        let events = vec![
            event("C", "c1", "R2", (9, 0), (10, 0), &["s1"]),
            event("D", "c4", "R3", (9, 30), (10, 30), &["s2"]),
        ];
        let out = evaluate(&events, &courses(), &rooms());
        assert!(out[0].has_conflict());
        assert!(out[1].has_conflict());

        let pairs = ConflictEngine::default().find_conflicts(&events, &courses());
        assert_eq!(pairs[0].kinds.iter().collect::<Vec<_>>(), vec![ConflictKind::Teacher]);
    }

    #[test]
    fn student_collision_flags_both_events() {
        let events = vec![
            event("E", "c1", "R4", (14, 0), (15, 0), &["s1", "s2"]),
            event("F", "c2", "R5", (14, 30), (15, 30), &["s2", "s3"]),
        ];
        let out = evaluate(&events, &courses(), &rooms());
        assert!(out[0].has_conflict());
        assert!(out[1].has_conflict());

        let pairs = ConflictEngine::default().find_conflicts(&events, &courses());
        assert_eq!(pairs[0].kinds.iter().collect::<Vec<_>>(), vec![ConflictKind::Student]);
    }

    #[test]
    fn overload_compares_roster_with_capacity() {
        let mut rooms = HashMap::new();
        rooms.insert("big".to_string(), Room::new("big", "Big", 30));
        rooms.insert("small".to_string(), Room::new("small", "Small", 6));
        let eight: Vec<String> = (1..=8).map(|n| format!("s{n}")).collect();

        let events = vec![
            ScheduleEvent::new("G", "c1", "big", at(15, 9, 0), at(15, 10, 0))
                .with_students(eight.clone()),
            ScheduleEvent::new("H", "c2", "small", at(16, 9, 0), at(16, 10, 0))
                .with_students(eight),
        ];
        let out = evaluate(&events, &courses(), &rooms);
        assert!(!out[0].is_room_overloaded());
        assert!(out[1].is_room_overloaded());
    }

    #[test]
    fn roster_equal_to_capacity_is_not_overloaded() {
        let mut rooms = HashMap::new();
        rooms.insert("r".to_string(), Room::new("r", "R", 2));
        let events = vec![ScheduleEvent::new("e", "c1", "r", at(15, 9, 0), at(15, 10, 0))
            .with_students(["s1", "s2"])];
        assert!(!evaluate(&events, &courses(), &rooms)[0].is_room_overloaded());
    }

    #[test]
    fn back_to_back_in_same_room_does_not_conflict() {
        let events = vec![
            event("I", "c1", "R1", (9, 0), (10, 0), &["s1"]),
            event("J", "c1", "R1", (10, 0), (11, 0), &["s1"]),
        ];
        let out = evaluate(&events, &courses(), &rooms());
        assert_eq!(flags(&out), vec![(false, false), (false, false)]);
    }

    // ── Properties ────────────────────────────────────────────────────────────

    #[test]
    fn lone_event_never_conflicts_with_itself() {
        let events = vec![event("solo", "c1", "R1", (9, 0), (10, 0), &["s1"])];
        assert!(!evaluate(&events, &courses(), &rooms())[0].has_conflict());
    }

    #[test]
    fn duplicated_entry_is_not_a_conflict() {
        let e = event("same", "c1", "R1", (9, 0), (10, 0), &["s1"]);
        let out = evaluate(&[e.clone(), e], &courses(), &rooms());
        assert!(!out[0].has_conflict());
        assert!(!out[1].has_conflict());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let events = vec![
            event("A", "c1", "R1", (9, 0), (10, 30), &["s1"]),
            event("B", "c2", "R1", (9, 30), (11, 0), &["s2"]),
            event("C", "c3", "R2", (13, 0), (14, 0), &["s3"]),
        ];
        let once = evaluate(&events, &courses(), &rooms());
        let twice = evaluate(&once, &courses(), &rooms());
        assert_eq!(once, twice);
    }

    #[test]
    fn stale_flags_are_recomputed_not_accumulated() {
        let events = vec![
            event("A", "c1", "R1", (9, 0), (10, 30), &["s1"]),
            event("B", "c2", "R1", (9, 30), (11, 0), &["s2"]),
        ];
        let mut annotated = evaluate(&events, &courses(), &rooms());
        assert!(annotated[0].has_conflict());

        // Move B out of the way; A must come back clean.
        annotated[1].start_time = at(15, 12, 0);
        annotated[1].end_time = at(15, 13, 0);
        let again = evaluate(&annotated, &courses(), &rooms());
        assert!(!again[0].has_conflict());
        assert!(!again[1].has_conflict());
    }

    #[test]
    fn input_is_not_mutated_and_order_is_preserved() {
        let events = vec![
            event("Z", "c1", "R1", (11, 0), (12, 0), &[]),
            event("A", "c2", "R1", (11, 30), (12, 30), &[]),
            event("M", "c3", "R2", (8, 0), (9, 0), &[]),
        ];
        let before = events.clone();
        let out = evaluate(&events, &courses(), &rooms());
        assert_eq!(events, before);
        let ids: Vec<&str> = out.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "A", "M"]);
    }

    #[test]
    fn conflicts_are_symmetric() {
        let events = vec![
            event("A", "c1", "R1", (9, 0), (10, 0), &["s1"]),
            event("B", "c2", "R2", (9, 30), (10, 30), &["s1"]),
            event("C", "c3", "R3", (12, 0), (13, 0), &["s9"]),
        ];
        let out = evaluate(&events, &courses(), &rooms());
        let reversed: Vec<ScheduleEvent> = events.iter().rev().cloned().collect();
        let out_rev = evaluate(&reversed, &courses(), &rooms());

        for e in &out {
            let twin = out_rev.iter().find(|r| r.id == e.id).unwrap();
            assert_eq!(e.has_conflict(), twin.has_conflict(), "event {}", e.id);
        }
        assert!(out[0].has_conflict() && out[1].has_conflict());
        assert!(!out[2].has_conflict());
    }

    #[test]
    fn overload_is_independent_of_other_events() {
        let mut rooms = rooms();
        rooms.insert("tiny".to_string(), Room::new("tiny", "Tiny", 1));
        let target = ScheduleEvent::new("T", "c1", "tiny", at(15, 9, 0), at(15, 10, 0))
            .with_students(["s1", "s2"]);

        let alone = evaluate(std::slice::from_ref(&target), &courses(), &rooms);
        let crowded = evaluate(
            &[
                target.clone(),
                event("X", "c2", "tiny", (9, 0), (10, 0), &[]),
                event("Y", "c3", "R1", (9, 0), (10, 0), &["s1", "s2", "s3"]),
            ],
            &courses(),
            &rooms,
        );
        assert!(alone[0].is_room_overloaded());
        assert_eq!(alone[0].is_room_overloaded(), crowded[0].is_room_overloaded());
    }

    // ── Policy boundaries ─────────────────────────────────────────────────────

    #[test]
    fn associated_teachers_are_not_checked() {
        let mut courses = courses();
        // c2 lists T1 as associated teacher only
        courses.get_mut("c2").unwrap().associated_teacher_ids = vec!["T1".to_string()];
        let events = vec![
            event("A", "c1", "R1", (9, 0), (10, 0), &["s1"]),
            event("B", "c2", "R2", (9, 0), (10, 0), &["s2"]),
        ];
        let out = evaluate(&events, &courses, &rooms());
        assert!(!out[0].has_conflict());
        assert!(!out[1].has_conflict());
    }

    #[test]
    fn courses_without_teacher_never_collide_on_teacher() {
        let events = vec![
            event("A", "c5", "R1", (9, 0), (10, 0), &["s1"]),
            event("B", "c5", "R2", (9, 0), (10, 0), &["s2"]),
        ];
        let out = evaluate(&events, &courses(), &rooms());
        assert!(!out[0].has_conflict());
        assert!(!out[1].has_conflict());
    }

    #[test]
    fn empty_teacher_id_is_treated_as_no_teacher() {
        let mut courses = courses();
        courses.insert("x1".into(), course("x1", Some("")));
        courses.insert("x2".into(), course("x2", Some("")));
        let events = vec![
            event("X", "x1", "R1", (9, 0), (10, 0), &[]),
            event("Y", "x2", "R2", (9, 0), (10, 0), &[]),
        ];
        let out = evaluate(&events, &courses, &rooms());
        assert_eq!(flags(&out), vec![(false, false), (false, false)]);
        assert!(ConflictEngine::new(Strategy::Sweep)
            .find_conflicts(&events, &courses)
            .is_empty());
    }

    #[test]
    fn cancelled_events_still_conflict() {
        let mut a = event("A", "c1", "R1", (9, 0), (10, 0), &[]);
        a.is_cancelled = true;
        let mut b = event("B", "c2", "R1", (9, 30), (10, 30), &[]);
        b.is_modified = true;
        let out = evaluate(&[a, b], &courses(), &rooms());
        assert!(out[0].has_conflict());
        assert!(out[1].has_conflict());
    }

    #[test]
    fn missing_course_skips_teacher_rule_only() {
        let events = vec![
            event("A", "ghost", "R1", (9, 0), (10, 0), &["s1"]),
            event("B", "c1", "R1", (9, 30), (10, 30), &["s2"]),
            event("C", "ghost", "R2", (13, 0), (14, 0), &["s3"]),
            event("D", "ghost", "R3", (13, 0), (14, 0), &["s4"]),
        ];
        let out = evaluate(&events, &courses(), &rooms());
        // room collision still applies through the raw room id
        assert!(out[0].has_conflict());
        assert!(out[1].has_conflict());
        // unknown course on both sides does not make them "same teacher"
        assert!(!out[2].has_conflict());
        assert!(!out[3].has_conflict());
    }

    #[test]
    fn missing_room_is_not_overloaded_but_still_collides() {
        let many: Vec<String> = (0..100).map(|n| format!("s{n}")).collect();
        let events = vec![
            ScheduleEvent::new("A", "c1", "nowhere", at(15, 9, 0), at(15, 10, 0))
                .with_students(many),
            ScheduleEvent::new("B", "c2", "nowhere", at(15, 9, 30), at(15, 10, 30)),
        ];
        let out = evaluate(&events, &courses(), &rooms());
        assert!(!out[0].is_room_overloaded());
        assert!(out[0].has_conflict());
        assert!(out[1].has_conflict());
    }

    #[test]
    fn inverted_interval_is_tolerated() {
        let events = vec![
            event("bad", "c1", "R1", (11, 0), (9, 0), &["s1"]),
            event("ok", "c1", "R1", (8, 0), (12, 0), &["s1"]),
        ];
        let out = evaluate(&events, &courses(), &rooms());
        assert!(!out[0].has_conflict());
        assert!(!out[1].has_conflict());
    }

    #[test]
    fn multiple_kinds_reported_on_one_pair() {
        let events = vec![
            event("A", "c1", "R1", (9, 0), (10, 0), &["s1"]),
            event("B", "c4", "R1", (9, 0), (10, 0), &["s1"]),
        ];
        let pairs = ConflictEngine::default().find_conflicts(&events, &courses());
        assert_eq!(pairs.len(), 1);
        assert_eq!(
            pairs[0].kinds.iter().collect::<Vec<_>>(),
            vec![ConflictKind::Room, ConflictKind::Teacher, ConflictKind::Student]
        );
        assert_eq!((pairs[0].first_id.as_str(), pairs[0].second_id.as_str()), ("A", "B"));
    }

    // ── Strategies ────────────────────────────────────────────────────────────

    #[test]
    fn strategy_from_name() {
        assert_eq!(Strategy::from_name("pairwise"), Ok(Strategy::Pairwise));
        assert_eq!(Strategy::from_name("sweep"), Ok(Strategy::Sweep));
        assert_eq!(
            Strategy::from_name("interval_tree"),
            Err(EngineError::UnknownStrategy("interval_tree".into()))
        );
    }

    /// Deterministic pseudo-random timetable: a week of quarter-hour slots,
    /// few rooms/courses/students so collisions are frequent.  Roughly one
    /// event in ten reuses an earlier id and one in eight has its bounds
    /// swapped.
    fn generated_timetable(n: usize) -> Vec<ScheduleEvent> {
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = move |bound: u64| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state % bound
        };
        (0..n)
            .map(|i| {
                let day = 15 + next(5) as u32;
                let start_q = 32 + next(40) as u32; // 08:00 .. 18:00
                let len_q = next(9) as u32; // 0 .. 2h, zero-length included
                let mut start = at(day, start_q / 4, (start_q % 4) * 15);
                let end_q = start_q + len_q;
                let mut end = at(day, end_q / 4, (end_q % 4) * 15);
                if next(8) == 0 {
                    std::mem::swap(&mut start, &mut end);
                }
                let id = if i > 0 && next(10) == 0 {
                    format!("e{}", next(i as u64))
                } else {
                    format!("e{i}")
                };
                let students: Vec<String> = (0..next(4)).map(|_| format!("s{}", next(12))).collect();
                ScheduleEvent::new(
                    id,
                    format!("c{}", 1 + next(6)),
                    format!("R{}", 1 + next(5)),
                    start,
                    end,
                )
                .with_students(students)
            })
            .collect()
    }

    #[test]
    fn sweep_matches_pairwise() {
        let events = generated_timetable(300);
        let pairwise = ConflictEngine::new(Strategy::Pairwise).run(&events, &courses(), &rooms());
        let sweep = ConflictEngine::new(Strategy::Sweep).run(&events, &courses(), &rooms());

        assert!(!pairwise.conflicts.is_empty(), "generator should produce conflicts");
        assert!(events.iter().any(|e| !e.time_range().is_valid() && e.start_time != e.end_time));
        let distinct: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert!(distinct.len() < events.len(), "generator should repeat some ids");

        assert_eq!(pairwise.conflicts, sweep.conflicts);
        assert!(pairwise.conflicts.iter().all(|c| c.first_id != c.second_id));
        assert_eq!(pairwise.events, sweep.events);
    }

    #[test]
    fn sweep_handles_back_to_back_chain() {
        let events = vec![
            event("a", "c1", "R1", (8, 0), (9, 0), &[]),
            event("b", "c1", "R1", (9, 0), (10, 0), &[]),
            event("c", "c1", "R1", (10, 0), (11, 0), &[]),
        ];
        let out = ConflictEngine::new(Strategy::Sweep).evaluate(&events, &courses(), &rooms());
        assert!(out.iter().all(|e| !e.has_conflict()));
    }

    #[test]
    fn closure_lookups_match_map_lookups() {
        let catalogue: Vec<Course> = courses().into_values().collect();
        let halls: Vec<Room> = vec![Room::new("R1", "Small", 1), Room::new("R2", "Big", 50)];
        let course_fn = FnLookup::new(|id: &str| catalogue.iter().find(|c| c.id == id));
        let room_fn = FnLookup::new(|id: &str| halls.iter().find(|r| r.id == id));

        let events = vec![
            event("A", "c1", "R1", (9, 0), (10, 0), &["s1", "s2"]),
            event("B", "c4", "R2", (9, 30), (10, 30), &[]),
            event("C", "c2", "R3", (9, 0), (10, 0), &["s3"]),
        ];
        let out = evaluate(&events, &course_fn, &room_fn);
        // A/B share teacher T1; A overloads R1; R3 is unknown to the closure
        assert_eq!(flags(&out), vec![(true, true), (true, false), (false, false)]);
        assert_eq!(course_fn.responsible_teacher("c4"), Some("T1"));
        assert_eq!(room_fn.capacity("R2"), Some(50));
        assert_eq!(room_fn.capacity("R3"), None);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let out = evaluate(&[], &courses(), &rooms());
        assert!(out.is_empty());
        assert!(ConflictEngine::new(Strategy::Sweep)
            .find_conflicts(&[], &courses())
            .is_empty());
    }
}

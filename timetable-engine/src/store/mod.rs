/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Resource and event store with an explicit re-evaluation step.
//!
//! Every command follows the same pipeline:
//!
//! ```text
//! command ──► validate ──► mutate collections (+ cascades) ──► ConflictEngine::run ──► publish Arc<TimetableSnapshot>
//! ```
//!
//! Recomputation always covers the whole event collection; there is no
//! incremental patching of flags.  Readers hold an `Arc<TimetableSnapshot>`
//! obtained from [`TimetableStore::snapshot`], so they observe either the
//! previous or the new evaluated state in full, never a mix.
//!
//! # Cascades
//!
//! | Removed | Effect |
//! |---|---|
//! | Course | every event of that course is removed |
//! | Room | every event in that room is removed |
//! | User | id dropped from every roster, every course's responsible and associated teacher fields |
//!
//! Collections are `BTreeMap`s so iteration (and therefore logging and
//! dataset export) is ordered by id.  Events keep their insertion order.

pub mod error;

pub use error::{RecordKind, StoreError};

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::{Conflict, ConflictEngine};
use crate::model::{Course, Room, ScheduleEvent, User};

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// One fully evaluated state of the store.
#[derive(Debug, Clone, Default)]
pub struct TimetableSnapshot {
    /// Incremented on every successful command.  `0` for an empty store.
    pub revision: u64,
    /// Events with derived flags, in insertion order.
    pub events: Vec<ScheduleEvent>,
    /// Conflicting pairs, indices refer to `events`.
    pub conflicts: Vec<Conflict>,
}

impl TimetableSnapshot {
    pub fn event(&self, id: &str) -> Option<&ScheduleEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Conflicting pairs involving `event_id`.
    pub fn conflicts_for<'a>(&'a self, event_id: &'a str) -> impl Iterator<Item = &'a Conflict> + 'a {
        self.conflicts
            .iter()
            .filter(move |c| c.first_id == event_id || c.second_id == event_id)
    }

    pub fn conflicted_events(&self) -> impl Iterator<Item = &ScheduleEvent> {
        self.events.iter().filter(|e| e.has_conflict())
    }

    pub fn overloaded_events(&self) -> impl Iterator<Item = &ScheduleEvent> {
        self.events.iter().filter(|e| e.is_room_overloaded())
    }
}

// ── TimetableStore ────────────────────────────────────────────────────────────

/// Owns courses, rooms, users and raw events, and the latest snapshot.
#[derive(Debug, Default)]
pub struct TimetableStore {
    engine: ConflictEngine,
    courses: BTreeMap<String, Course>,
    rooms: BTreeMap<String, Room>,
    users: BTreeMap<String, User>,
    events: Vec<ScheduleEvent>,
    snapshot: Arc<TimetableSnapshot>,
}

impl TimetableStore {
    /// Empty store evaluating with `engine`.
    pub fn new(engine: ConflictEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// Build a store from already-loaded records and evaluate once.
    ///
    /// Records go through the same validation as the individual `add_*`
    /// commands.  Events may reference unknown courses or rooms; the engine
    /// degrades the corresponding rule.
    ///
    /// # Errors
    /// The first [`StoreError`] encountered.
    pub fn from_records(
        engine: ConflictEngine,
        courses: impl IntoIterator<Item = Course>,
        rooms: impl IntoIterator<Item = Room>,
        users: impl IntoIterator<Item = User>,
        events: impl IntoIterator<Item = ScheduleEvent>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new(engine);
        for course in courses {
            store.insert_course(course)?;
        }
        for room in rooms {
            store.insert_room(room)?;
        }
        for user in users {
            store.insert_user(user)?;
        }
        for event in events {
            store.insert_event(event)?;
        }

        info!(
            courses = store.courses.len(),
            rooms = store.rooms.len(),
            users = store.users.len(),
            events = store.events.len(),
            "timetable store loaded"
        );
        store.publish();
        Ok(store)
    }

    // ── Read access ───────────────────────────────────────────────────────────

    /// Latest evaluated state.  Cheap to clone; never changes once handed out.
    pub fn snapshot(&self) -> Arc<TimetableSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn engine(&self) -> ConflictEngine {
        self.engine
    }

    pub fn courses(&self) -> &BTreeMap<String, Course> {
        &self.courses
    }

    pub fn rooms(&self) -> &BTreeMap<String, Room> {
        &self.rooms
    }

    pub fn users(&self) -> &BTreeMap<String, User> {
        &self.users
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.get(id)
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    // ── Courses ───────────────────────────────────────────────────────────────

    pub fn add_course(&mut self, course: Course) -> Result<(), StoreError> {
        info!(course = %course.id, "add course");
        self.insert_course(course)?;
        self.publish();
        Ok(())
    }

    /// Replace the course with the same id.  A changed responsible teacher can
    /// create or clear teacher collisions anywhere in the timetable.
    pub fn update_course(&mut self, course: Course) -> Result<(), StoreError> {
        info!(course = %course.id, "update course");
        let slot = self
            .courses
            .get_mut(&course.id)
            .ok_or_else(|| not_found(RecordKind::Course, &course.id))?;
        *slot = course;
        self.publish();
        Ok(())
    }

    /// Remove a course and every event of that course.
    pub fn remove_course(&mut self, id: &str) -> Result<Course, StoreError> {
        let course = self
            .courses
            .remove(id)
            .ok_or_else(|| not_found(RecordKind::Course, id))?;
        let removed = self.remove_events_where(|e| e.course_id == id);
        info!(course = %id, cascaded_events = removed, "remove course");
        self.publish();
        Ok(course)
    }

    // ── Rooms ─────────────────────────────────────────────────────────────────

    pub fn add_room(&mut self, room: Room) -> Result<(), StoreError> {
        info!(room = %room.id, capacity = room.capacity, "add room");
        self.insert_room(room)?;
        self.publish();
        Ok(())
    }

    /// Replace the room with the same id (e.g. a capacity change).
    pub fn update_room(&mut self, room: Room) -> Result<(), StoreError> {
        info!(room = %room.id, capacity = room.capacity, "update room");
        validate_room(&room)?;
        let slot = self
            .rooms
            .get_mut(&room.id)
            .ok_or_else(|| not_found(RecordKind::Room, &room.id))?;
        *slot = room;
        self.publish();
        Ok(())
    }

    /// Remove a room and every event held in it.
    pub fn remove_room(&mut self, id: &str) -> Result<Room, StoreError> {
        let room = self
            .rooms
            .remove(id)
            .ok_or_else(|| not_found(RecordKind::Room, id))?;
        let removed = self.remove_events_where(|e| e.room_id == id);
        info!(room = %id, cascaded_events = removed, "remove room");
        self.publish();
        Ok(room)
    }

    // ── Users ─────────────────────────────────────────────────────────────────

    pub fn add_user(&mut self, user: User) -> Result<(), StoreError> {
        info!(user = %user.id, role = ?user.role, "add user");
        self.insert_user(user)?;
        self.publish();
        Ok(())
    }

    pub fn update_user(&mut self, user: User) -> Result<(), StoreError> {
        info!(user = %user.id, role = ?user.role, "update user");
        let slot = self
            .users
            .get_mut(&user.id)
            .ok_or_else(|| not_found(RecordKind::User, &user.id))?;
        *slot = user;
        self.publish();
        Ok(())
    }

    /// Remove a user and every reference to them: roster entries and course
    /// teacher fields.
    pub fn remove_user(&mut self, id: &str) -> Result<User, StoreError> {
        let user = self
            .users
            .remove(id)
            .ok_or_else(|| not_found(RecordKind::User, id))?;

        let mut rosters = 0usize;
        for event in &mut self.events {
            let before = event.student_ids.len();
            event.student_ids.retain(|s| s != id);
            if event.student_ids.len() != before {
                rosters += 1;
            }
        }

        let mut courses = 0usize;
        for course in self.courses.values_mut() {
            let mut touched = false;
            if course.responsible_teacher_id.as_deref() == Some(id) {
                course.responsible_teacher_id = None;
                touched = true;
            }
            let before = course.associated_teacher_ids.len();
            course.associated_teacher_ids.retain(|t| t != id);
            touched |= course.associated_teacher_ids.len() != before;
            if touched {
                courses += 1;
            }
        }

        info!(
            user = %id,
            role = ?user.role,
            rosters_updated = rosters,
            courses_updated = courses,
            "remove user"
        );
        self.publish();
        Ok(user)
    }

    // ── Events ────────────────────────────────────────────────────────────────

    pub fn add_event(&mut self, event: ScheduleEvent) -> Result<(), StoreError> {
        info!(event = %event.id, course = %event.course_id, room = %event.room_id, "add event");
        self.insert_event(event)?;
        self.publish();
        Ok(())
    }

    /// Replace the event with the same id, keeping its position.
    pub fn update_event(&mut self, event: ScheduleEvent) -> Result<(), StoreError> {
        info!(event = %event.id, course = %event.course_id, room = %event.room_id, "update event");
        validate_event(&event)?;
        self.warn_dangling(&event);
        let slot = self
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| not_found(RecordKind::Event, &event.id))?;
        *slot = event;
        self.publish();
        Ok(())
    }

    pub fn remove_event(&mut self, id: &str) -> Result<ScheduleEvent, StoreError> {
        let pos = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| not_found(RecordKind::Event, id))?;
        let event = self.events.remove(pos);
        info!(event = %id, "remove event");
        self.publish();
        Ok(event)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn insert_course(&mut self, course: Course) -> Result<(), StoreError> {
        if self.courses.contains_key(&course.id) {
            return Err(duplicate(RecordKind::Course, &course.id));
        }
        self.courses.insert(course.id.clone(), course);
        Ok(())
    }

    fn insert_room(&mut self, room: Room) -> Result<(), StoreError> {
        validate_room(&room)?;
        if self.rooms.contains_key(&room.id) {
            return Err(duplicate(RecordKind::Room, &room.id));
        }
        self.rooms.insert(room.id.clone(), room);
        Ok(())
    }

    fn insert_user(&mut self, user: User) -> Result<(), StoreError> {
        if self.users.contains_key(&user.id) {
            return Err(duplicate(RecordKind::User, &user.id));
        }
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    fn insert_event(&mut self, event: ScheduleEvent) -> Result<(), StoreError> {
        validate_event(&event)?;
        if self.events.iter().any(|e| e.id == event.id) {
            return Err(duplicate(RecordKind::Event, &event.id));
        }
        self.warn_dangling(&event);
        self.events.push(event);
        Ok(())
    }

    /// Logged once when the reference enters the store, not on every
    /// re-evaluation.
    fn warn_dangling(&self, event: &ScheduleEvent) {
        if !self.courses.contains_key(&event.course_id) {
            warn!(
                event  = %event.id,
                course = %event.course_id,
                "course not found, teacher collision skipped"
            );
        }
        if !self.rooms.contains_key(&event.room_id) {
            warn!(
                event = %event.id,
                room  = %event.room_id,
                "room not found, overload check skipped"
            );
        }
    }

    fn remove_events_where<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&ScheduleEvent) -> bool,
    {
        let before = self.events.len();
        self.events.retain(|e| !pred(e));
        before - self.events.len()
    }

    /// Re-evaluate the whole collection and swap in the new snapshot.
    fn publish(&mut self) {
        let evaluation = self.engine.run(&self.events, &self.courses, &self.rooms);
        let revision = self.snapshot.revision + 1;
        debug!(
            revision = revision,
            events = evaluation.events.len(),
            conflicts = evaluation.conflicts.len(),
            "publishing snapshot"
        );
        self.snapshot = Arc::new(TimetableSnapshot {
            revision,
            events: evaluation.events,
            conflicts: evaluation.conflicts,
        });
    }
}

fn validate_event(event: &ScheduleEvent) -> Result<(), StoreError> {
    if event.start_time >= event.end_time {
        return Err(StoreError::InvalidTimeRange {
            event: event.id.clone(),
            start: event.start_time,
            end: event.end_time,
        });
    }
    Ok(())
}

fn validate_room(room: &Room) -> Result<(), StoreError> {
    if room.capacity == 0 {
        return Err(StoreError::InvalidCapacity {
            room: room.id.clone(),
            capacity: room.capacity,
        });
    }
    Ok(())
}

fn not_found(kind: RecordKind, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn duplicate(kind: RecordKind, id: &str) -> StoreError {
    StoreError::DuplicateId {
        kind,
        id: id.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Timetable dataset loading.
//!
//! A dataset is a YAML snapshot of the resource and event stores, used by the
//! command-line tool and by integration tests to seed a
//! [`TimetableStore`](crate::store::TimetableStore).
//!
//! The expected YAML structure is:
//! ```yaml
//! courses:
//!   c1:
//!     name: "Algorithms"
//!     code: "INF101"
//!     responsible_teacher_id: "t1"
//!     associated_teacher_ids: ["t2"]
//! rooms:
//!   r1:
//!     name: "Room 101"
//!     capacity: 30
//!     type: TD
//! users:
//!   t1: { name: "Dr. Alan Turing", role: teacher, max_weekly_hours: 20 }
//!   s1: { name: "Ada Lovelace", role: student }
//! events:
//!   - id: e1
//!     course_id: c1
//!     room_id: r1
//!     start_time: "2025-12-15T09:00:00"
//!     end_time: "2025-12-15T10:30:00"
//!     session_type: CM
//!     student_ids: [s1]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::engine::ConflictEngine;
use crate::model::{Course, Role, Room, RoomType, ScheduleEvent, SessionType, User};
use crate::store::TimetableStore;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Every section is optional so that partial datasets (e.g. rooms only) are
/// accepted.
#[derive(Debug, Default, Deserialize)]
struct DatasetFile {
    #[serde(default)]
    courses: BTreeMap<String, CourseEntry>,
    #[serde(default)]
    rooms: BTreeMap<String, RoomEntry>,
    #[serde(default)]
    users: BTreeMap<String, UserEntry>,
    #[serde(default)]
    events: Vec<EventEntry>,
}

#[derive(Debug, Deserialize)]
struct CourseEntry {
    name: Option<String>,
    code: Option<String>,
    responsible_teacher_id: Option<String>,
    #[serde(default)]
    associated_teacher_ids: Vec<String>,
    filiere: Option<String>,
    niveau: Option<String>,
    campus: Option<String>,
    #[serde(default)]
    cm_hours: u32,
    #[serde(default)]
    td_hours: u32,
    #[serde(default)]
    tp_hours: u32,
    #[serde(default)]
    total_hours: u32,
}

/// `capacity` is the only required room field.
#[derive(Debug, Deserialize)]
struct RoomEntry {
    name: Option<String>,
    capacity: u32,
    campus: Option<String>,
    #[serde(rename = "type")]
    room_type: Option<RoomType>,
    building: Option<String>,
    #[serde(default)]
    has_projector: bool,
    #[serde(default)]
    has_computers: bool,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    name: Option<String>,
    #[serde(default)]
    role: Role,
    weekly_hours: Option<u32>,
    max_weekly_hours: Option<u32>,
    #[serde(default)]
    available_days: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EventEntry {
    id: String,
    course_id: String,
    room_id: String,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    #[serde(default)]
    session_type: SessionType,
    #[serde(default)]
    student_ids: Vec<String>,
    #[serde(default)]
    is_cancelled: bool,
    #[serde(default)]
    is_modified: bool,
    academic_year: Option<String>,
    semester: Option<String>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Records parsed from one dataset file, ready to seed a store.
#[derive(Debug, Clone, Default)]
pub struct TimetableDataset {
    pub courses: Vec<Course>,
    pub rooms: Vec<Room>,
    pub users: Vec<User>,
    pub events: Vec<ScheduleEvent>,
}

impl TimetableDataset {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
            && self.rooms.is_empty()
            && self.users.is_empty()
            && self.events.is_empty()
    }

    fn from_file(file: DatasetFile) -> Self {
        let courses = file
            .courses
            .into_iter()
            .map(|(id, c)| Course {
                name: c.name.unwrap_or_else(|| id.clone()),
                code: c.code.unwrap_or_default(),
                responsible_teacher_id: c.responsible_teacher_id,
                associated_teacher_ids: c.associated_teacher_ids,
                filiere: c.filiere,
                niveau: c.niveau,
                campus: c.campus,
                cm_hours: c.cm_hours,
                td_hours: c.td_hours,
                tp_hours: c.tp_hours,
                total_hours: c.total_hours,
                id,
            })
            .collect();

        let rooms = file
            .rooms
            .into_iter()
            .map(|(id, r)| Room {
                name: r.name.unwrap_or_else(|| id.clone()),
                capacity: r.capacity,
                campus: r.campus,
                room_type: r.room_type,
                building: r.building,
                has_projector: r.has_projector,
                has_computers: r.has_computers,
                id,
            })
            .collect();

        let users = file
            .users
            .into_iter()
            .map(|(id, u)| User {
                name: u.name.unwrap_or_else(|| id.clone()),
                role: u.role,
                weekly_hours: u.weekly_hours,
                max_weekly_hours: u.max_weekly_hours,
                available_days: u.available_days,
                id,
            })
            .collect();

        let events = file
            .events
            .into_iter()
            .map(|e| {
                let mut event =
                    ScheduleEvent::new(e.id, e.course_id, e.room_id, e.start_time, e.end_time)
                        .with_session_type(e.session_type)
                        .with_students(e.student_ids);
                event.is_cancelled = e.is_cancelled;
                event.is_modified = e.is_modified;
                event.academic_year = e.academic_year;
                event.semester = e.semester;
                event
            })
            .collect();

        Self {
            courses,
            rooms,
            users,
            events,
        }
    }
}

// ── TimetableConfigManager ────────────────────────────────────────────────────

/// Loads and holds a timetable dataset from a YAML file.
#[derive(Debug, Default)]
pub struct TimetableConfigManager {
    dataset: TimetableDataset,

    /// Set to `true` after a successful load.
    loaded: bool,
}

impl TimetableConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and replaces any previously loaded dataset.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid.  The manager is left unloaded in that case.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading timetable dataset from: {}", path.display());

        self.dataset = TimetableDataset::default();
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open dataset file: {}", path.display()))?;

        self.load_from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    }

    /// Same as [`load_from_file`](Self::load_from_file) for in-memory YAML.
    pub fn load_from_str(&mut self, content: &str) -> Result<()> {
        self.dataset = TimetableDataset::default();
        self.loaded = false;

        let file: DatasetFile = if content.trim().is_empty() {
            DatasetFile::default()
        } else {
            serde_yaml::from_str(content).context("invalid timetable dataset")?
        };
        let dataset = TimetableDataset::from_file(file);

        if dataset.is_empty() {
            warn!("Dataset contains no courses, rooms, users or events");
        }

        for room in &dataset.rooms {
            debug!("  Room: {} | capacity: {}", room.id, room.capacity);
        }
        for event in &dataset.events {
            debug!(
                "  Event: {} | course: {} | room: {} | {} → {} | students: {}",
                event.id,
                event.course_id,
                event.room_id,
                event.start_time,
                event.end_time,
                event.attendee_count(),
            );
        }

        info!(
            "Successfully loaded dataset: {} course(s), {} room(s), {} user(s), {} event(s)",
            dataset.courses.len(),
            dataset.rooms.len(),
            dataset.users.len(),
            dataset.events.len(),
        );

        self.dataset = dataset;
        self.loaded = true;
        Ok(())
    }

    pub fn dataset(&self) -> &TimetableDataset {
        &self.dataset
    }

    /// Returns `true` after a successful load.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Seed a [`TimetableStore`] with the loaded records and evaluate once.
    ///
    /// # Errors
    /// Fails if nothing is loaded, or if a record violates a store invariant
    /// (duplicate id, inverted event interval, zero-capacity room).
    pub fn build_store(&self, engine: ConflictEngine) -> Result<TimetableStore> {
        if !self.loaded {
            anyhow::bail!("timetable dataset is not loaded");
        }
        let d = self.dataset.clone();
        TimetableStore::from_records(engine, d.courses, d.rooms, d.users, d.events)
            .context("dataset violates timetable invariants")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

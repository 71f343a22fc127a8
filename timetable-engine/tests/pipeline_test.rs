/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! End-to-end checks: dataset file → store → mutations → snapshot/stats.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use timetable_engine::config::TimetableConfigManager;
use timetable_engine::engine::{ConflictEngine, ConflictKind, Strategy};
use timetable_engine::model::{Room, ScheduleEvent};
use timetable_engine::stats::{self, DashboardStats};
use timetable_engine::store::TimetableStore;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample_timetable.yaml")
}

fn load(strategy: Strategy) -> TimetableStore {
    let mut mgr = TimetableConfigManager::new();
    mgr.load_from_file(&sample_path()).unwrap();
    mgr.build_store(ConflictEngine::new(strategy)).unwrap()
}

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 12, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn conflicted_ids(store: &TimetableStore) -> Vec<String> {
    store
        .snapshot()
        .conflicted_events()
        .map(|e| e.id.clone())
        .collect()
}

#[test]
fn sample_dataset_flags_expected_events() {
    let store = load(Strategy::Pairwise);
    assert_eq!(conflicted_ids(&store), vec!["e1", "e2", "e6", "e8"]);
    assert_eq!(store.snapshot().overloaded_events().count(), 0);

    let snap = store.snapshot();
    let pairs: Vec<(&str, &str)> = snap
        .conflicts
        .iter()
        .map(|c| (c.first_id.as_str(), c.second_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("e1", "e8"), ("e2", "e6")]);

    let e2_e6 = &snap.conflicts[1];
    assert_eq!(
        e2_e6.kinds.iter().collect::<Vec<_>>(),
        vec![ConflictKind::Room, ConflictKind::Teacher, ConflictKind::Student]
    );
}

#[test]
fn both_strategies_agree_on_sample() {
    let pairwise = load(Strategy::Pairwise).snapshot();
    let sweep = load(Strategy::Sweep).snapshot();
    assert_eq!(pairwise.events, sweep.events);
    assert_eq!(pairwise.conflicts, sweep.conflicts);
}

#[test]
fn shrinking_room_overloads_only_the_large_session() {
    let mut store = load(Strategy::Sweep);
    let mut r2 = store.room("r2").unwrap().clone();
    r2.capacity = 6;
    store.update_room(r2).unwrap();

    let snap = store.snapshot();
    assert!(snap.event("e7").unwrap().is_room_overloaded()); // 8 > 6
    assert!(!snap.event("e4").unwrap().is_room_overloaded()); // 2 <= 6
    // capacity does not affect conflicts
    assert_eq!(conflicted_ids(&store), vec!["e1", "e2", "e6", "e8"]);
}

#[test]
fn mutation_sequence_keeps_flags_consistent() {
    let mut store = load(Strategy::Sweep);

    // Pull e8 after e1 ends: back-to-back, so e1/e8 no longer conflict.
    let mut e8 = store.snapshot().event("e8").unwrap().clone();
    e8.start_time = at(15, 10, 30);
    e8.end_time = at(15, 12, 0);
    store.update_event(e8).unwrap();
    assert_eq!(conflicted_ids(&store), vec!["e2", "e6"]);

    // A new session overlapping e5 in Lab 203.
    store
        .add_event(
            ScheduleEvent::new("e9", "c3", "r4", at(18, 15, 0), at(18, 16, 0))
                .with_students(["s3"]),
        )
        .unwrap();
    assert_eq!(conflicted_ids(&store), vec!["e2", "e5", "e6", "e9"]);

    // Removing Lab 203 cascades to e5 and e9.
    store.remove_room("r4").unwrap();
    assert!(store.snapshot().event("e5").is_none());
    assert!(store.snapshot().event("e9").is_none());
    assert_eq!(conflicted_ids(&store), vec!["e2", "e6"]);

    // Dr. Turing leaves: c1/c2 lose their responsible teacher, but e2/e6
    // still share room r1 and students.
    store.remove_user("t2").unwrap();
    assert_eq!(conflicted_ids(&store), vec!["e2", "e6"]);

    // Move e6 to another room and drop its students: no collision left.
    let mut e6 = store.snapshot().event("e6").unwrap().clone();
    e6.room_id = "r2".into();
    e6.student_ids.clear();
    store.update_event(e6).unwrap();
    assert!(conflicted_ids(&store).is_empty());
}

#[test]
fn dashboard_and_personal_views() {
    let mut store = load(Strategy::Pairwise);
    store.add_room(Room::new("r5", "Seminar", 12)).unwrap();

    let stats = DashboardStats::from_store(&store);
    assert_eq!(stats.total_courses, 5);
    assert_eq!(stats.planned_courses, 5);
    assert_eq!(stats.total_rooms, 5);
    assert_eq!(stats.occupied_rooms, 4);
    assert!((stats.room_occupancy_rate - 80.0).abs() < 1e-9);
    assert_eq!(stats.total_students, 4);
    assert_eq!(stats.total_teachers, 3);
    assert_eq!(stats.detected_conflicts, 4);
    assert_eq!(stats.room_conflicts, 1);
    assert_eq!(stats.teacher_conflicts, 2);
    assert_eq!(stats.student_conflicts, 2);
    assert_eq!(stats.cancelled_events, 1);

    let turing = stats::teacher_schedule(&store, "t2", None).unwrap();
    let ids: Vec<&str> = turing.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e1", "e8", "e2", "e6"]);
    assert_eq!(turing.conflicts_detected, 4);
    assert_eq!(turing.alerts.len(), 1);
    assert!(turing.alerts[0].contains("modified"));

    let ada = stats::student_schedule(&store, "s3", None).unwrap();
    assert_eq!(ada.events.len(), 6);
    assert_eq!(ada.alerts.len(), 2); // e2 modified, e3 cancelled
}

/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetable conflict-detection and room-overload engine
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── model/          – courses, rooms, users, schedule events
//! ├── engine/         – conflict engine, overlap predicate, strategies
//! ├── store/          – resource + event store, cascades, snapshots
//! ├── stats/          – dashboard figures and personal schedules
//! └── config/         – YAML timetable dataset loading
//! ```

pub mod config;
pub mod engine;
pub mod model;
pub mod stats;
pub mod store;

/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use timetable_engine::config::TimetableConfigManager;
use timetable_engine::engine::{ConflictEngine, Strategy};
use timetable_engine::stats::DashboardStats;
use timetable_engine::store::TimetableStore;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Evaluate a timetable dataset for scheduling conflicts and room overloads.
///
/// Example:
///   timetable-engine -d timetable.yaml -s sweep --only-conflicts
#[derive(Debug, Parser)]
#[command(
    name = "timetable-engine",
    about = "Timetable conflict detection and room overload report",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML timetable dataset.
    #[arg(short = 'd', long = "dataset")]
    dataset: Option<PathBuf>,

    /// Evaluation strategy: pairwise or sweep.
    #[arg(short = 's', long = "strategy", default_value = "pairwise")]
    strategy: String,

    /// Only list events that conflict or overload their room.
    #[arg(long = "only-conflicts", default_value_t = false)]
    only_conflicts: bool,

    /// Exit with status 2 when any conflict or overload is found.
    #[arg(long = "fail-on-conflict", default_value_t = false)]
    fail_on_conflict: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        dataset          = ?cli.dataset,
        strategy         = %cli.strategy,
        only_conflicts   = cli.only_conflicts,
        fail_on_conflict = cli.fail_on_conflict,
        "Configuration"
    );

    let strategy = match Strategy::from_name(&cli.strategy) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };
    let engine = ConflictEngine::new(strategy);

    // ── Load dataset ──────────────────────────────────────────────────────────
    let store = match &cli.dataset {
        Some(path) => {
            let mut mgr = TimetableConfigManager::new();
            let built = mgr
                .load_from_file(path)
                .and_then(|()| mgr.build_store(engine));
            match built {
                Ok(store) => store,
                Err(e) => {
                    error!("Failed to load timetable dataset: {:#}", e);
                    process::exit(1);
                }
            }
        }
        None => {
            warn!("No dataset provided, evaluating an empty timetable");
            TimetableStore::new(engine)
        }
    };

    // ── Report ────────────────────────────────────────────────────────────────
    let snap = store.snapshot();
    for event in &snap.events {
        if cli.only_conflicts && !event.has_conflict() && !event.is_room_overloaded() {
            continue;
        }
        let room = store.room(&event.room_id).map_or("?", |r| r.name.as_str());
        let course = store.course(&event.course_id).map_or("?", |c| c.name.as_str());
        info!(
            "  [{id}]  {course} ({kind})  {start} → {end}  room={room}  students={n}  conflict={c}  overloaded={o}{cancelled}",
            id = event.id,
            kind = event.session_type.label(),
            start = event.start_time,
            end = event.end_time,
            n = event.attendee_count(),
            c = event.has_conflict(),
            o = event.is_room_overloaded(),
            cancelled = if event.is_cancelled { "  (cancelled)" } else { "" },
        );
        if event.is_room_overloaded() {
            warn!(
                event    = %event.id,
                room     = %event.room_id,
                students = event.attendee_count(),
                "room overloaded"
            );
        }
    }
    for conflict in &snap.conflicts {
        let kinds: Vec<String> = conflict.kinds.iter().map(|k| k.to_string()).collect();
        info!(
            "  conflict: {} ↔ {} [{}]",
            conflict.first_id,
            conflict.second_id,
            kinds.join(", ")
        );
    }

    let stats = DashboardStats::from_store(&store);
    info!(
        events            = stats.total_events,
        conflicted_events = stats.detected_conflicts,
        room_overloads    = stats.room_overloads,
        room_conflicts    = stats.room_conflicts,
        teacher_conflicts = stats.teacher_conflicts,
        student_conflicts = stats.student_conflicts,
        occupancy_pct     = stats.room_occupancy_rate,
        "Summary"
    );

    if cli.fail_on_conflict && (stats.detected_conflicts > 0 || stats.room_overloads > 0) {
        process::exit(2);
    }
}

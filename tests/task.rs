// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

mod common;

use std::sync::Arc;

use common::{config, ScriptedOracle};
use skyevents::store::{rows_are_consistent, Category, MemoryStore, ResultStore};
use skyevents::{
    Direction, Job, JulianMoment, Outcome, SearchRequest, TaskController, TaskEvent, Time,
    SLOT_COUNT,
};

fn search_job() -> Job {
    Job::Search(SearchRequest::solar(Time::new(9.0), Direction::Forward))
}

#[test]
fn events_arrive_in_order_and_finish_once() {
    let oracle = Arc::new(ScriptedOracle::evenly_spaced(SLOT_COUNT, 0.3));
    let mut controller = TaskController::new(oracle, config(), MemoryStore::new());
    let events: Vec<TaskEvent> = controller.start(search_job()).unwrap().into_iter().collect();

    assert_eq!(events.len(), SLOT_COUNT + 1);
    for (i, event) in events[..SLOT_COUNT].iter().enumerate() {
        match event {
            TaskEvent::Progress(p) => assert_eq!(p.step, i + 1),
            other => panic!("unexpected {other:?}"),
        }
    }
    match &events[SLOT_COUNT] {
        TaskEvent::Finished(Ok(outcome)) => assert!(outcome.is_completed()),
        other => panic!("unexpected {other:?}"),
    }

    let status = controller.join();
    assert!(status.is_finished());
    assert_eq!(status.step, SLOT_COUNT);
    assert_eq!(status.job, Some(search_job()));
}

#[test]
fn second_start_while_running_is_ignored() {
    let oracle = Arc::new(ScriptedOracle::evenly_spaced(SLOT_COUNT, 0.3));
    let gate = Arc::clone(&oracle.gate);
    let mut controller = TaskController::new(Arc::clone(&oracle), config(), MemoryStore::new());

    let held = gate.lock();
    let first = controller.start(search_job());
    assert!(first.is_some());
    assert!(controller.is_running());
    assert!(controller.start(search_job()).is_none());
    drop(held);

    let status = controller.join();
    assert!(matches!(status.outcome, Some(Outcome::Completed(Some(_)))));
    // One initial local lookup plus one re-seed per visible event.
    assert_eq!(oracle.calls().local.len(), SLOT_COUNT + 1);
    assert!(controller.start(search_job()).is_some());
    controller.join();
}

#[test]
fn cancel_stops_at_next_step() {
    let oracle = Arc::new(ScriptedOracle::evenly_spaced(SLOT_COUNT, 0.3));
    let gate = Arc::clone(&oracle.gate);
    let mut controller = TaskController::new(oracle, config(), MemoryStore::new());

    let held = gate.lock();
    let events = controller.start(search_job()).unwrap();
    controller.cancel();
    drop(held);

    let last = events.into_iter().last();
    assert!(matches!(last, Some(TaskEvent::Finished(Ok(Outcome::Cancelled)))));
    let status = controller.join();
    assert!(status.cancel_requested);
    assert_eq!(status.outcome, Some(Outcome::Cancelled));
    assert_eq!(controller.store().lock().write_count(), 0);
}

#[test]
fn detached_listener_does_not_stop_the_run() {
    let oracle = Arc::new(ScriptedOracle::evenly_spaced(SLOT_COUNT, 0.3));
    let mut controller = TaskController::new(oracle, config(), MemoryStore::new());
    drop(controller.start(search_job()));

    let status = controller.join();
    assert!(matches!(status.outcome, Some(Outcome::Completed(Some(_)))));
    let store = controller.store();
    let rows = store.lock().read_all(Category::SolarEclipse).unwrap();
    assert!(rows_are_consistent(&rows));
}

#[test]
fn snapshot_job_fills_catalog() {
    let oracle = Arc::new(ScriptedOracle::default());
    let mut controller = TaskController::new(oracle, config(), MemoryStore::new());
    let at = JulianMoment::from_ut1(Time::new(2_460_000.5));
    controller.start(Job::Snapshot(at)).unwrap();

    let status = controller.join();
    assert_eq!(status.outcome, Some(Outcome::Completed(None)));
    let rows = controller
        .store()
        .lock()
        .read_all(Category::PlanetSnapshot)
        .unwrap();
    assert!(rows_are_consistent(&rows));
    let moon = rows[1].as_ref().unwrap().as_snapshot().unwrap();
    assert_eq!(moon.right_ascension, 10.0);
    assert_eq!(moon.rise, 2_460_000.75);
}

#[test]
fn cancel_when_idle_is_a_no_op() {
    let oracle = Arc::new(ScriptedOracle::default());
    let controller = TaskController::new(oracle, config(), MemoryStore::new());
    controller.cancel();
    assert!(!controller.status().cancel_requested);
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Runs a forward solar-eclipse search against a toy oracle and prints the
//! listed events. `RUST_LOG=skyevents=debug` shows the per-step trace.

use std::sync::Arc;

use skyevents::civil::{current_time, julian_to_civil};
use skyevents::oracle::{Body, Direction, EphemerisOracle, EventKind, ObserverLocation};
use skyevents::store::{Category, MemoryStore, ResultStore};
use skyevents::{Job, SearchConfig, SearchRequest, TaskController, TaskEvent, Time};
use tracing_subscriber::EnvFilter;

/// Pretends an eclipse happens every 173.3 days, visible every third time.
struct ToySky;

const PERIOD: f64 = 173.3;

impl ToySky {
    fn next(jd: f64, direction: Direction) -> f64 {
        let n = match direction {
            Direction::Forward => (jd / PERIOD).floor() + 1.0,
            Direction::Backward => (jd / PERIOD).ceil() - 1.0,
        };
        n * PERIOD
    }
}

impl EphemerisOracle for ToySky {
    fn position(&self, _: f64, body: Body, _: &ObserverLocation) -> Option<Vec<f64>> {
        let i = f64::from(body.index());
        Some(vec![30.0 * i, 5.0 - i, 1.0, 36.0 * i, 40.0 - 10.0 * i, i - 1.0])
    }

    fn rise_time(&self, jd: f64, _: Body, _: &ObserverLocation) -> f64 {
        jd.floor() + 1.25
    }

    fn set_time(&self, jd: f64, _: Body, _: &ObserverLocation) -> f64 {
        jd.floor() + 1.75
    }

    fn global_event(&self, _: EventKind, jd: f64, direction: Direction) -> Option<Vec<f64>> {
        let max = Self::next(jd, direction);
        let flags = if (max / PERIOD).round() as i64 % 2 == 0 { 4.0 } else { 8.0 };
        Some(vec![flags, max, 0.0, max - 0.1, max + 0.1, max - 0.01, max + 0.01, 0.0, 0.0])
    }

    fn local_event(
        &self,
        _: EventKind,
        jd: f64,
        _: &ObserverLocation,
        direction: Direction,
    ) -> Option<Vec<f64>> {
        let mut n = (Self::next(jd, direction) / PERIOD).round() as i64;
        while n % 3 != 0 {
            n += direction.sign() as i64;
        }
        let mut raw = vec![0.0; 19];
        raw[0] = 16.0;
        raw[1] = n as f64 * PERIOD + 0.02;
        raw[14] = 0.42;
        Some(raw)
    }
}

fn main() -> skyevents::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = SearchConfig::from_toml_str(
        r#"
        utc-offset-minutes = 60

        [location]
        longitude = 2.17
        latitude = 41.39
        elevation = 12.0
        "#,
    )?;
    let oracle = Arc::new(ToySky);
    let now = current_time(&*oracle, config.utc_offset_minutes)?;
    println!("now: UT1 {} / TT {}", now.ut1, now.tt);

    let mut controller = TaskController::new(Arc::clone(&oracle), config, MemoryStore::new());
    let request = SearchRequest::solar(now.ut1, Direction::Forward);
    let Some(events) = controller.start(Job::Search(request)) else {
        return Ok(());
    };
    for event in events {
        match event {
            TaskEvent::Progress(p) => println!("  step {}/{}", p.step, p.total),
            TaskEvent::Finished(result) => println!("finished: {:?}", result?),
        }
    }

    let store = controller.store();
    let store = store.lock();
    for record in store.read_all(Category::SolarEclipse)?.into_iter().flatten() {
        let Some(row) = record.as_event() else { continue };
        let when = julian_to_civil(&*oracle, Time::new(row.event_time))?;
        println!("{:>2}  {:<16} {}", row.slot, row.label, when);
    }
    if let Some(range) = store.load_range(Category::SolarEclipse)? {
        println!("next search starts at {}", range.resume_from(Direction::Forward));
    }
    Ok(())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The stepping loops.

use qtty::Days;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::event::Event;
use super::path::{self, GroundPoint, PATH_SAMPLES};
use super::snapshot::Snapshot;
use super::{
    OracleFailure, Outcome, Progress, SearchRequest, SearchState, OCCULTATION_STEP, SLOT_COUNT,
};
use crate::civil::JulianMoment;
use crate::config::SearchConfig;
use crate::instant::Time;
use crate::oracle::{
    Body, Direction, EphemerisOracle, EventKind, GlobalCircumstance, LocalCircumstance, Position,
};
use crate::range::{SearchRange, StepBoundary};
use crate::riseset::RiseSetResolver;
use crate::scales::UT;
use crate::store::{self, Category, EventRow, Record, ResultStore};

/// Drives one oracle through a search, sweep or snapshot.
///
/// The engine holds no state between runs beyond [`SearchState`], which is
/// reset when a run starts.
pub struct SearchEngine<'a, O: ?Sized> {
    oracle: &'a O,
    config: &'a SearchConfig,
    state: SearchState,
}

impl<'a, O> SearchEngine<'a, O>
where
    O: EphemerisOracle + ?Sized,
{
    pub fn new(oracle: &'a O, config: &'a SearchConfig) -> Self {
        Self {
            oracle,
            config,
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn config(&self) -> &SearchConfig {
        self.config
    }

    fn resolver(&self) -> RiseSetResolver<'a, O> {
        RiseSetResolver::new(self.oracle, &self.config.location)
    }

    /// Hand the configured ephemeris directory to the oracle before a run.
    fn prepare(&self) {
        if let Some(path) = self.config.ephemeris_path.as_deref() {
            debug!(path = %path.display(), "ephemeris path set");
            self.oracle.set_ephemeris_path(path);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Entry points
    // ═══════════════════════════════════════════════════════════════════════

    /// Run a temporal search, or the all-planets sweep when the request
    /// targets the Sun or the Moon.
    ///
    /// Oracle failures and cancellation are outcomes; only store errors are
    /// returned as `Err`.
    pub fn search<S>(
        &mut self,
        request: &SearchRequest,
        store: &mut S,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(Progress),
    ) -> store::Result<Outcome>
    where
        S: ResultStore + ?Sized,
    {
        self.state = SearchState::Idle;
        self.prepare();
        info!(
            kind = %request.kind,
            direction = ?request.direction,
            start = request.start.value(),
            sweep = request.is_sweep(),
            "search started"
        );
        let outcome = if request.is_sweep() {
            self.run_sweep(request, store, cancel, progress)?
        } else {
            self.run_temporal(request, store, cancel, progress)?
        };
        self.finish(outcome);
        Ok(outcome)
    }

    /// Record position and rise/set of every catalog body at `at`.
    pub fn snapshot<S>(
        &mut self,
        at: JulianMoment,
        store: &mut S,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(Progress),
    ) -> store::Result<Outcome>
    where
        S: ResultStore + ?Sized,
    {
        self.state = SearchState::Idle;
        self.prepare();
        info!(ut1 = at.ut1.value(), "snapshot started");
        let generation = store.next_generation(Category::PlanetSnapshot)?;

        for (slot, body) in Body::ALL.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(self.finish(Outcome::Cancelled));
            }
            self.state = SearchState::Stepping(slot);
            let snapshot = match self.observe(body, at.ut1) {
                Ok(snapshot) => snapshot,
                Err(failure) => return Ok(self.finish(Outcome::Failed(failure))),
            };
            debug!(slot, %body, altitude = snapshot.position.altitude, "body observed");
            store.write(
                Category::PlanetSnapshot,
                slot,
                &Record::Snapshot(snapshot.to_row(slot, generation)),
            )?;
            progress(Progress {
                step: slot + 1,
                total: SLOT_COUNT,
            });
        }
        Ok(self.finish(Outcome::Completed(None)))
    }

    /// Position plus rise, set and transit of one body, without touching a store.
    pub fn live_position(&self, body: Body, at: JulianMoment) -> Result<Snapshot, OracleFailure> {
        self.prepare();
        self.observe(body, at.ut1)
    }

    /// Central-line ground track of a solar eclipse, [`PATH_SAMPLES`] points
    /// from the first to the last centre-line contact.
    ///
    /// Eclipses without a central phase span the whole global window. Other
    /// event kinds have no track and yield an empty path, as do instants the
    /// oracle cannot place.
    pub fn eclipse_path(&self, event: &Event) -> Vec<GroundPoint> {
        if event.kind != EventKind::SolarEclipse {
            return Vec::new();
        }
        self.prepare();
        let window = path::track_window(&event.global);
        let track: Vec<_> = path::sample_times(window, PATH_SAMPLES)
            .into_iter()
            .filter_map(|at| {
                let raw = self.oracle.central_path_position(at.value())?;
                Some(GroundPoint::decode(at, raw))
            })
            .collect();
        debug!(
            begin = window.begin.value(),
            end = window.end.value(),
            points = track.len(),
            "central path sampled"
        );
        track
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Regimes
    // ═══════════════════════════════════════════════════════════════════════

    fn run_temporal<S>(
        &mut self,
        request: &SearchRequest,
        store: &mut S,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(Progress),
    ) -> store::Result<Outcome>
    where
        S: ResultStore + ?Sized,
    {
        let SearchRequest {
            kind,
            start,
            direction,
        } = *request;
        let category = request.category();
        let generation = store.next_generation(category)?;
        let resolver = self.resolver();

        let Some(mut local) = self.local(kind, start, direction) else {
            return Ok(Outcome::Failed(OracleFailure::InitialLocal));
        };

        let mut cursor = start;
        let mut first_step = None;
        let mut last_step = None;

        for index in 0..SLOT_COUNT {
            if cancel.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }
            self.state = SearchState::Stepping(index);

            let Some(global) = self.global(kind, cursor, direction) else {
                return Ok(Outcome::Failed(OracleFailure::Global));
            };

            let boundary = StepBoundary {
                max_time: global.max_time,
                window: global.window,
            };
            if index == 0 {
                first_step = Some(boundary);
            }
            if index == SLOT_COUNT - 1 {
                last_step = Some(boundary);
            }

            let mut event = Event::reconcile(index, kind, direction, global, &local);
            cursor = next_cursor(kind, &global, direction);

            if event.visible_locally {
                let pair = resolver.bracket(global.window.begin, kind.context_body());
                event = event.with_context(pair);
                local = match self.local(kind, cursor, direction) {
                    Some(next) => next,
                    None => return Ok(Outcome::Failed(OracleFailure::ReseedLocal)),
                };
            }

            debug!(
                slot = index,
                max = global.max_time.value(),
                visible = event.visible_locally,
                label = %event.label(),
                "event resolved"
            );
            store.write(category, index, &Record::Event(event.to_row(generation)))?;
            progress(Progress {
                step: index + 1,
                total: SLOT_COUNT,
            });
        }

        let range = match (first_step, last_step) {
            (Some(first), Some(last)) => SearchRange::from_steps(direction, first, last),
            _ => return Ok(Outcome::Completed(None)),
        };
        store.save_range(category, &range)?;
        Ok(Outcome::Completed(Some(range)))
    }

    /// One local + global lookup per planet, from the same start time.
    fn run_sweep<S>(
        &mut self,
        request: &SearchRequest,
        store: &mut S,
        cancel: &CancellationToken,
        progress: &mut dyn FnMut(Progress),
    ) -> store::Result<Outcome>
    where
        S: ResultStore + ?Sized,
    {
        let category = Category::LunarOccultation;
        let generation = store.next_generation(category)?;
        let direction = request.direction;
        let mut written = 0;
        let mut outcome = Outcome::Completed(None);

        for body in Body::PLANETS {
            if cancel.is_cancelled() {
                outcome = Outcome::Cancelled;
                break;
            }
            let slot = body.index() as usize;
            self.state = SearchState::Stepping(slot);
            let kind = EventKind::Occultation(body);

            let Some(local) = self.local(kind, request.start, direction) else {
                outcome = Outcome::Failed(OracleFailure::SweepLocal { body });
                break;
            };
            let Some(global) = self.global(kind, request.start, direction) else {
                outcome = Outcome::Failed(OracleFailure::SweepGlobal { body });
                break;
            };

            let event = Event::reconcile(slot, kind, direction, global, &local);
            debug!(slot, %body, visible = event.visible_locally, "occultation resolved");
            store.write(category, slot, &Record::Event(event.to_row(generation)))?;
            written += 1;
            progress(Progress {
                step: written,
                total: SLOT_COUNT,
            });
        }

        // Sun and Moon cannot be occulted; their slots hold placeholders
        // whether or not every planet was reached.
        for slot in 0..SLOT_COUNT - Body::PLANETS.len() {
            let row = EventRow::sentinel(slot, generation, direction);
            store.write(category, slot, &Record::Event(row))?;
            written += 1;
            progress(Progress {
                step: written,
                total: SLOT_COUNT,
            });
        }
        Ok(outcome)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Oracle calls
    // ═══════════════════════════════════════════════════════════════════════

    fn local(
        &self,
        kind: EventKind,
        at: Time<UT>,
        direction: Direction,
    ) -> Option<LocalCircumstance> {
        let raw = self
            .oracle
            .local_event(kind, at.value(), &self.config.location, direction)?;
        LocalCircumstance::decode(kind, &raw)
    }

    fn global(
        &self,
        kind: EventKind,
        at: Time<UT>,
        direction: Direction,
    ) -> Option<GlobalCircumstance> {
        let raw = self.oracle.global_event(kind, at.value(), direction)?;
        GlobalCircumstance::decode(kind, &raw)
    }

    fn observe(&self, body: Body, at: Time<UT>) -> Result<Snapshot, OracleFailure> {
        let position = self
            .oracle
            .position(at.value(), body, &self.config.location)
            .and_then(|raw| Position::decode(&raw))
            .ok_or(OracleFailure::Position { body })?;
        let resolver = self.resolver();
        let set = resolver
            .set_after(at, body)
            .ok_or(OracleFailure::RiseSet { body })?;
        let rise = resolver
            .rise_after(at, body)
            .ok_or(OracleFailure::RiseSet { body })?;
        Ok(Snapshot {
            body,
            at,
            position,
            rise,
            set,
            transit: resolver.transit_after(at, body),
        })
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.state = match outcome {
            Outcome::Completed(_) => SearchState::Completed,
            Outcome::Cancelled => SearchState::Cancelled,
            Outcome::Failed(failure) => SearchState::Failed(failure),
        };
        match outcome {
            Outcome::Completed(range) => match range {
                Some(range) => info!(%range, "run completed"),
                None => info!("run completed"),
            },
            Outcome::Cancelled => warn!("run cancelled"),
            Outcome::Failed(failure) => {
                warn!(code = failure.code(), %failure, "oracle call failed")
            }
        }
        outcome
    }
}

/// Where the global cursor continues after an event.
fn next_cursor(kind: EventKind, global: &GlobalCircumstance, direction: Direction) -> Time<UT> {
    match kind {
        EventKind::Occultation(_) => {
            global.max_time + Days::new(OCCULTATION_STEP.value() * direction.sign())
        }
        _ => global.window.trailing_edge(direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ObserverLocation;
    use crate::store::MemoryStore;

    /// Events every 30 days; locally visible when `visible` says so.
    struct Monthly {
        visible: fn(i64) -> bool,
    }

    impl Monthly {
        fn nth(at: f64, direction: Direction) -> i64 {
            match direction {
                Direction::Forward => (at / 30.0).floor() as i64 + 1,
                Direction::Backward => (at / 30.0).ceil() as i64 - 1,
            }
        }
    }

    impl EphemerisOracle for Monthly {
        fn position(&self, _: f64, body: Body, _: &ObserverLocation) -> Option<Vec<f64>> {
            let i = f64::from(body.index());
            Some(vec![i, i, i, i, i, i])
        }
        fn rise_time(&self, jd: f64, _: Body, _: &ObserverLocation) -> f64 {
            jd + 0.25
        }
        fn set_time(&self, jd: f64, _: Body, _: &ObserverLocation) -> f64 {
            jd + 0.5
        }
        fn global_event(&self, _: EventKind, jd: f64, direction: Direction) -> Option<Vec<f64>> {
            let max = Monthly::nth(jd, direction) as f64 * 30.0;
            Some(vec![4.0, max, 0.0, max - 0.1, max + 0.1, 0.0, 0.0, max - 0.2, max + 0.2])
        }
        fn local_event(
            &self,
            _: EventKind,
            jd: f64,
            _: &ObserverLocation,
            direction: Direction,
        ) -> Option<Vec<f64>> {
            let mut n = Monthly::nth(jd, direction);
            while !(self.visible)(n) {
                n += match direction {
                    Direction::Forward => 1,
                    Direction::Backward => -1,
                };
            }
            let mut raw = vec![16.0; 22];
            raw[1] = n as f64 * 30.0 + 0.1;
            Some(raw)
        }
    }

    fn config() -> SearchConfig {
        SearchConfig::new(ObserverLocation::new(0.0, 0.0, 0.0), 0.0)
    }

    #[test]
    fn every_other_event_visible() {
        let oracle = Monthly {
            visible: |n| n % 2 == 0,
        };
        let config = config();
        let mut engine = SearchEngine::new(&oracle, &config);
        let mut store = MemoryStore::new();
        let mut ticks = Vec::new();
        let outcome = engine
            .search(
                &SearchRequest::solar(Time::new(15.0), Direction::Forward),
                &mut store,
                &CancellationToken::new(),
                &mut |p| ticks.push(p.step),
            )
            .unwrap();

        assert_eq!(engine.state(), SearchState::Completed);
        let range = outcome.range().unwrap();
        assert_eq!(range.first.value(), 30.0);
        assert_eq!(range.last.value(), 300.0);
        assert_eq!(ticks, (1..=SLOT_COUNT).collect::<Vec<_>>());

        let rows = store.read_all(Category::SolarEclipse).unwrap();
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref().unwrap().as_event().unwrap();
            let n = i as i64 + 1;
            assert_eq!(row.visible, n % 2 == 0, "slot {i}");
            if row.visible {
                assert_eq!(row.set, row.global_begin + 0.5);
                assert_eq!(row.rise, row.set - 1.0 + 0.25);
            } else {
                assert!(row.local_is_sentinel());
            }
        }
    }

    #[test]
    fn backward_search_walks_into_the_past() {
        let oracle = Monthly { visible: |_| true };
        let config = config();
        let mut engine = SearchEngine::new(&oracle, &config);
        let mut store = MemoryStore::new();
        let outcome = engine
            .search(
                &SearchRequest::lunar(Time::new(400.0), Direction::Backward),
                &mut store,
                &CancellationToken::new(),
                &mut |_| {},
            )
            .unwrap();
        let range = outcome.range().unwrap();
        assert_eq!(range.last.value(), 390.0);
        assert_eq!(range.first.value(), 120.0);
        assert_eq!(range.first_begin.value(), 119.8);
    }

    #[test]
    fn occultation_cursor_steps_two_days_from_maximum() {
        let global = GlobalCircumstance::decode(
            EventKind::Occultation(Body::Mars),
            &[0.0, 50.0, 0.0, 49.9, 50.1, 0.0, 0.0, 0.0, 0.0],
        )
        .unwrap();
        assert_eq!(
            next_cursor(EventKind::Occultation(Body::Mars), &global, Direction::Forward).value(),
            52.0
        );
        assert_eq!(
            next_cursor(EventKind::Occultation(Body::Mars), &global, Direction::Backward).value(),
            48.0
        );
        assert_eq!(
            next_cursor(EventKind::SolarEclipse, &global, Direction::Forward).value(),
            50.1
        );
    }

    #[test]
    fn snapshot_covers_catalog() {
        let oracle = Monthly { visible: |_| true };
        let config = config();
        let mut engine = SearchEngine::new(&oracle, &config);
        let mut store = MemoryStore::new();
        let at = JulianMoment::from_ut1(Time::new(2_460_000.0));
        let outcome = engine
            .snapshot(at, &mut store, &CancellationToken::new(), &mut |_| {})
            .unwrap();
        assert_eq!(outcome, Outcome::Completed(None));
        let rows = store.read_all(Category::PlanetSnapshot).unwrap();
        for (slot, row) in rows.iter().enumerate() {
            let row = row.as_ref().unwrap().as_snapshot().unwrap();
            assert_eq!(row.body as usize, slot);
            assert_eq!(row.right_ascension, slot as f64);
            assert_eq!(row.set, 2_460_000.5);
            assert_eq!(row.transit, -1.0);
        }
    }

    #[test]
    fn live_position_does_not_need_a_store() {
        let oracle = Monthly { visible: |_| true };
        let config = config();
        let engine = SearchEngine::new(&oracle, &config);
        let snap = engine
            .live_position(Body::Saturn, JulianMoment::from_ut1(Time::new(10.0)))
            .unwrap();
        assert_eq!(snap.rise.value(), 10.25);
        assert_eq!(snap.position.magnitude, 6.0);
    }
}

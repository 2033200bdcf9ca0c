// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use skyevents::oracle::{Body, Direction, EphemerisOracle, EventKind, ObserverLocation};
use skyevents::SearchConfig;
use tokio_util::sync::CancellationToken;

/// Replays scripted event maxima in call order.
///
/// The n-th global call answers `global_max[n]`, the n-th local call
/// `local_max[n]`. Past the end of a script the last value repeats.
#[derive(Default)]
pub struct ScriptedOracle {
    pub global_max: Vec<f64>,
    pub local_max: Vec<f64>,
    /// 0-based global call that answers `None`.
    pub fail_global_at: Option<usize>,
    /// 0-based local call that answers `None`.
    pub fail_local_at: Option<usize>,
    /// Cancel this token while answering the given global call.
    pub cancel_on_global: Option<(usize, CancellationToken)>,
    /// Body whose position lookup answers `None`.
    pub fail_position_for: Option<Body>,
    /// Body whose set lookup answers a negative day.
    pub fail_set_for: Option<Body>,
    /// Answer central-line lookups with `[-jd, 5.0]`.
    pub central_path: bool,
    /// Held by local calls; lock it from a test to stall the worker.
    pub gate: Arc<Mutex<()>>,
    calls: Mutex<Calls>,
}

#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub global: Vec<(EventKind, f64)>,
    pub local: Vec<(EventKind, f64)>,
    pub set: Vec<(f64, Body)>,
    pub rise: Vec<(f64, Body)>,
    pub central: Vec<f64>,
    pub ephemeris_paths: Vec<PathBuf>,
}

impl ScriptedOracle {
    pub fn new(global_max: Vec<f64>, local_max: Vec<f64>) -> Self {
        Self {
            global_max,
            local_max,
            ..Self::default()
        }
    }

    /// Global maxima `10.0, 11.0, ...` with local maxima `offset` later.
    pub fn evenly_spaced(steps: usize, offset: f64) -> Self {
        let global: Vec<f64> = (0..steps).map(|i| 10.0 + i as f64).collect();
        let local = global.iter().map(|m| m + offset).collect();
        Self::new(global, local)
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().clone()
    }

    fn scripted(script: &[f64], n: usize) -> Option<f64> {
        script.get(n).or(script.last()).copied()
    }
}

impl EphemerisOracle for ScriptedOracle {
    fn position(&self, _: f64, body: Body, _: &ObserverLocation) -> Option<Vec<f64>> {
        if self.fail_position_for == Some(body) {
            return None;
        }
        let i = f64::from(body.index());
        Some(vec![10.0 * i, i, 1.0 + i, 90.0, 15.0 - i, -1.0])
    }

    fn rise_time(&self, jd: f64, body: Body, _: &ObserverLocation) -> f64 {
        self.calls.lock().rise.push((jd, body));
        jd + 0.25
    }

    fn set_time(&self, jd: f64, body: Body, _: &ObserverLocation) -> f64 {
        self.calls.lock().set.push((jd, body));
        if self.fail_set_for == Some(body) {
            return -1.0;
        }
        jd + 0.5
    }

    fn global_event(&self, kind: EventKind, jd: f64, _: Direction) -> Option<Vec<f64>> {
        let n = {
            let mut calls = self.calls.lock();
            calls.global.push((kind, jd));
            calls.global.len() - 1
        };
        if let Some((at, token)) = &self.cancel_on_global {
            if *at == n {
                token.cancel();
            }
        }
        if self.fail_global_at == Some(n) {
            return None;
        }
        let max = Self::scripted(&self.global_max, n)?;
        Some(vec![4.0, max, 0.0, max - 0.1, max + 0.1, 0.0, 0.0, max - 0.2, max + 0.2])
    }

    fn local_event(
        &self,
        kind: EventKind,
        jd: f64,
        _: &ObserverLocation,
        _: Direction,
    ) -> Option<Vec<f64>> {
        let _held = self.gate.lock();
        let n = {
            let mut calls = self.calls.lock();
            calls.local.push((kind, jd));
            calls.local.len() - 1
        };
        if self.fail_local_at == Some(n) {
            return None;
        }
        let max = Self::scripted(&self.local_max, n)?;
        let mut raw: Vec<f64> = (0..22).map(f64::from).collect();
        raw[0] = 16.0;
        raw[1] = max;
        Some(raw)
    }

    fn central_path_position(&self, jd: f64) -> Option<[f64; 2]> {
        self.calls.lock().central.push(jd);
        self.central_path.then_some([-jd, 5.0])
    }

    fn set_ephemeris_path(&self, path: &Path) {
        self.calls.lock().ephemeris_paths.push(path.to_path_buf());
    }
}

pub fn config() -> SearchConfig {
    SearchConfig::new(ObserverLocation::new(2.17, 41.39, 12.0), 60.0)
}

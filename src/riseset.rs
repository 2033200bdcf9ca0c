// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Rise, set and transit lookups for one observer.
//!
//! The oracle signals a failed lookup with a negative Julian day. The
//! resolver turns that into `None` so callers cannot accidentally treat the
//! sentinel as a date.

use crate::instant::Time;
use crate::oracle::{Body, EphemerisOracle, ObserverLocation};
use crate::scales::UT;
use qtty::Days;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How far before a set the matching rise is searched for.
pub const RISE_LOOKBACK: Days = Days::new(1.0);

/// Rise and set bracketing an event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiseSetPair {
    pub rise: Option<Time<UT>>,
    pub set: Option<Time<UT>>,
}

/// Composes the oracle's rise/set/transit calls for a fixed location.
pub struct RiseSetResolver<'a, O: ?Sized> {
    oracle: &'a O,
    location: &'a ObserverLocation,
}

#[inline]
fn valid(raw: f64) -> Option<Time<UT>> {
    (raw.is_finite() && raw >= 0.0).then(|| Time::new(raw))
}

impl<'a, O> RiseSetResolver<'a, O>
where
    O: EphemerisOracle + ?Sized,
{
    pub fn new(oracle: &'a O, location: &'a ObserverLocation) -> Self {
        Self { oracle, location }
    }

    pub fn rise_after(&self, at: Time<UT>, body: Body) -> Option<Time<UT>> {
        valid(self.oracle.rise_time(at.value(), body, self.location))
    }

    pub fn set_after(&self, at: Time<UT>, body: Body) -> Option<Time<UT>> {
        valid(self.oracle.set_time(at.value(), body, self.location))
    }

    pub fn transit_after(&self, at: Time<UT>, body: Body) -> Option<Time<UT>> {
        valid(self.oracle.transit_time(at.value(), body, self.location))
    }

    /// The set following `anchor` and the rise in the day before it.
    ///
    /// When the set lookup fails the rise is not attempted.
    pub fn bracket(&self, anchor: Time<UT>, body: Body) -> RiseSetPair {
        let Some(set) = self.set_after(anchor, body) else {
            warn!(%body, anchor = anchor.value(), "set lookup failed");
            return RiseSetPair::default();
        };
        let rise = self.rise_after(set - RISE_LOOKBACK, body);
        if rise.is_none() {
            warn!(%body, set = set.value(), "rise lookup failed");
        }
        RiseSetPair {
            rise,
            set: Some(set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{Direction, EventKind};
    use std::sync::Mutex;

    /// Rises 0.25 d and sets 0.75 d into each day; records every query.
    #[derive(Default)]
    struct Diurnal {
        calls: Mutex<Vec<(&'static str, f64)>>,
        fail_set: bool,
    }

    impl EphemerisOracle for Diurnal {
        fn position(&self, _: f64, _: Body, _: &ObserverLocation) -> Option<Vec<f64>> {
            None
        }
        fn rise_time(&self, jd: f64, _: Body, _: &ObserverLocation) -> f64 {
            self.calls.lock().unwrap().push(("rise", jd));
            next_phase(jd, 0.25)
        }
        fn set_time(&self, jd: f64, _: Body, _: &ObserverLocation) -> f64 {
            self.calls.lock().unwrap().push(("set", jd));
            if self.fail_set {
                -1.0
            } else {
                next_phase(jd, 0.75)
            }
        }
        fn global_event(&self, _: EventKind, _: f64, _: Direction) -> Option<Vec<f64>> {
            None
        }
        fn local_event(
            &self,
            _: EventKind,
            _: f64,
            _: &ObserverLocation,
            _: Direction,
        ) -> Option<Vec<f64>> {
            None
        }
    }

    fn next_phase(jd: f64, phase: f64) -> f64 {
        let candidate = jd.floor() + phase;
        if candidate > jd {
            candidate
        } else {
            candidate + 1.0
        }
    }

    const HERE: ObserverLocation = ObserverLocation::new(0.0, 45.0, 0.0);

    #[test]
    fn bracket_finds_set_then_prior_rise() {
        let oracle = Diurnal::default();
        let resolver = RiseSetResolver::new(&oracle, &HERE);
        let pair = resolver.bracket(Time::new(100.5), Body::Moon);
        assert_eq!(pair.set.map(|t| t.value()), Some(100.75));
        assert_eq!(pair.rise.map(|t| t.value()), Some(100.25));
        let calls = oracle.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("set", 100.5), ("rise", 99.75)]);
    }

    #[test]
    fn failed_set_skips_rise() {
        let oracle = Diurnal {
            fail_set: true,
            ..Default::default()
        };
        let resolver = RiseSetResolver::new(&oracle, &HERE);
        assert_eq!(resolver.bracket(Time::new(100.5), Body::Sun), RiseSetPair::default());
        assert_eq!(oracle.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn transit_defaults_to_unavailable() {
        let oracle = Diurnal::default();
        let resolver = RiseSetResolver::new(&oracle, &HERE);
        assert!(resolver.transit_after(Time::new(100.0), Body::Mars).is_none());
    }
}

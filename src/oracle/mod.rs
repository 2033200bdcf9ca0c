// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The ephemeris oracle contract.
//!
//! All astronomical computation (positions, rise/set, eclipse and
//! occultation circumstances) lives behind [`EphemerisOracle`]. The engine
//! never second-guesses the numbers it returns; it only decodes them
//! ([`GlobalCircumstance`], [`LocalCircumstance`], [`Position`]) and decides
//! what to do next.
//!
//! Failure conventions follow the native backends this trait wraps:
//!
//! | Call | Failure signal |
//! |------|----------------|
//! | [`position`](EphemerisOracle::position) | `None` |
//! | [`rise_time`](EphemerisOracle::rise_time) / [`set_time`](EphemerisOracle::set_time) / [`transit_time`](EphemerisOracle::transit_time) | negative Julian day |
//! | [`global_event`](EphemerisOracle::global_event) / [`local_event`](EphemerisOracle::local_event) | `None` |
//! | [`calendar_to_julian`](EphemerisOracle::calendar_to_julian) / [`julian_to_calendar_string`](EphemerisOracle::julian_to_calendar_string) | `None` |
//! | [`central_path_position`](EphemerisOracle::central_path_position) | `None` |
//!
//! Every method takes `&self`; implementations must be callable from the
//! background worker thread (`Send + Sync`), though the engine never calls
//! one oracle from two threads at once.

mod circumstance;
mod types;

pub use circumstance::{
    EclipseKind, EventFlags, EventWindow, GlobalCircumstance, Horizontal, LocalCircumstance,
    LocalDetail, Saros, GLOBAL_LEN,
};
pub use types::{Body, Direction, EventKind, ObserverLocation};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source of astronomical truth.
pub trait EphemerisOracle: Send + Sync {
    /// Apparent position of `body` at `jd_ut`:
    /// `[ra, dec, distance_au, azimuth, altitude, magnitude]`.
    fn position(&self, jd_ut: f64, body: Body, location: &ObserverLocation) -> Option<Vec<f64>>;

    /// Next rise of `body` after `jd_ut`, negative on failure.
    fn rise_time(&self, jd_ut: f64, body: Body, location: &ObserverLocation) -> f64;

    /// Next set of `body` after `jd_ut`, negative on failure.
    fn set_time(&self, jd_ut: f64, body: Body, location: &ObserverLocation) -> f64;

    /// Next upper meridian transit after `jd_ut`, negative on failure.
    ///
    /// Backends without a transit routine keep the default, which reports
    /// "unavailable".
    fn transit_time(&self, _jd_ut: f64, _body: Body, _location: &ObserverLocation) -> f64 {
        -1.0
    }

    /// Next (or previous) event of `kind` anywhere on Earth, starting at `jd_ut`.
    fn global_event(&self, kind: EventKind, jd_ut: f64, direction: Direction) -> Option<Vec<f64>>;

    /// Next (or previous) event of `kind` visible from `location`, starting at `jd_ut`.
    fn local_event(
        &self,
        kind: EventKind,
        jd_ut: f64,
        location: &ObserverLocation,
        direction: Direction,
    ) -> Option<Vec<f64>>;

    /// UTC calendar date to `[jd_tt, jd_ut1]`, `None` for an invalid date.
    ///
    /// The default is a proleptic Gregorian conversion that takes UT1 equal
    /// to UTC and applies the built-in ΔT model for TT.
    fn calendar_to_julian(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: f64,
    ) -> Option<[f64; 2]> {
        crate::civil::gregorian_to_julian(year, month, day, hour, minute, second)
    }

    /// UT1 Julian day to a `_year_month_day_hour_minute_second_` string.
    fn julian_to_calendar_string(&self, jd_ut: f64) -> Option<String> {
        crate::civil::julian_to_gregorian_string(jd_ut)
    }

    /// `[longitude, latitude]` of the solar eclipse central line at `jd_ut`.
    fn central_path_position(&self, _jd_ut: f64) -> Option<[f64; 2]> {
        None
    }

    /// Directory holding the backend's ephemeris files.
    ///
    /// Called before every run when the configuration names one. Backends
    /// with built-in data ignore it.
    fn set_ephemeris_path(&self, _path: &Path) {}
}

/// Decoded [`EphemerisOracle::position`] result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub right_ascension: f64,
    pub declination: f64,
    /// Distance in astronomical units.
    pub distance: f64,
    pub azimuth: f64,
    pub altitude: f64,
    pub magnitude: f64,
}

impl Position {
    pub const LEN: usize = 6;

    pub fn decode(raw: &[f64]) -> Option<Self> {
        match *raw {
            [right_ascension, declination, distance, azimuth, altitude, magnitude, ..] => {
                Some(Self {
                    right_ascension,
                    declination,
                    distance,
                    azimuth,
                    altitude,
                    magnitude,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_decode() {
        let p = Position::decode(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(p.right_ascension, 1.0);
        assert_eq!(p.magnitude, 6.0);
        assert!(Position::decode(&[1.0, 2.0]).is_none());
    }
}

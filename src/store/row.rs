// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The row contract shared by every store backend.
//!
//! Rows are flat: absent values are written as [`SENTINEL`] (`-1`) rather
//! than `NULL`, so a row read back from any backend has the same shape the
//! display layer has always consumed.
//!
//! # Event columns per category
//!
//! | Column | Solar eclipse | Lunar eclipse | Occultation |
//! |--------|---------------|---------------|-------------|
//! | `azimuth` / `altitude` | Sun at maximum | Moon at maximum | Moon at disappearance |
//! | `magnitude` | eclipse magnitude | umbral magnitude | – |
//! | `magnitude_secondary` | fraction covered | penumbral magnitude | – |
//! | `ratio` | Moon/Sun diameter ratio | – | – |
//! | `aux_azimuth` / `aux_altitude` | Moon at maximum | – | Moon at reappearance |
//! | `saros_series` / `saros_member` | Saros | Saros | – |

use crate::oracle::Direction;
use serde::{Deserialize, Serialize};

/// Stored in place of any value that does not apply.
pub const SENTINEL: f64 = -1.0;

/// Integer form of [`SENTINEL`].
pub const SENTINEL_INT: i64 = -1;

/// One eclipse or occultation slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub slot: usize,
    pub generation: u64,
    /// Occulted body index, `-1` for eclipses and placeholder rows.
    pub body: i32,
    pub direction: Direction,
    pub visible: bool,
    /// `"Global"` or `"Global|Local"` classification label.
    pub label: String,
    /// Local maximum when the event is visible, global maximum otherwise.
    pub event_time: f64,

    pub global_flags: i64,
    pub global_max: f64,
    pub global_begin: f64,
    pub global_end: f64,
    pub global_total_begin: f64,
    pub global_total_end: f64,
    pub global_outer_begin: f64,
    pub global_outer_end: f64,

    pub local_flags: i64,
    pub local_max: f64,
    pub local_first: f64,
    pub local_second: f64,
    pub local_third: f64,
    pub local_fourth: f64,

    pub rise: f64,
    pub set: f64,
    pub azimuth: f64,
    pub altitude: f64,
    pub magnitude: f64,
    pub magnitude_secondary: f64,
    pub ratio: f64,
    pub aux_azimuth: f64,
    pub aux_altitude: f64,
    pub saros_series: i64,
    pub saros_member: i64,
}

impl EventRow {
    /// A row with every value at the sentinel.
    pub fn sentinel(slot: usize, generation: u64, direction: Direction) -> Self {
        Self {
            slot,
            generation,
            body: -1,
            direction,
            visible: false,
            label: String::new(),
            event_time: SENTINEL,
            global_flags: SENTINEL_INT,
            global_max: SENTINEL,
            global_begin: SENTINEL,
            global_end: SENTINEL,
            global_total_begin: SENTINEL,
            global_total_end: SENTINEL,
            global_outer_begin: SENTINEL,
            global_outer_end: SENTINEL,
            local_flags: SENTINEL_INT,
            local_max: SENTINEL,
            local_first: SENTINEL,
            local_second: SENTINEL,
            local_third: SENTINEL,
            local_fourth: SENTINEL,
            rise: SENTINEL,
            set: SENTINEL,
            azimuth: SENTINEL,
            altitude: SENTINEL,
            magnitude: SENTINEL,
            magnitude_secondary: SENTINEL,
            ratio: SENTINEL,
            aux_azimuth: SENTINEL,
            aux_altitude: SENTINEL,
            saros_series: SENTINEL_INT,
            saros_member: SENTINEL_INT,
        }
    }

    /// Whether every local column holds the sentinel.
    pub fn local_is_sentinel(&self) -> bool {
        self.local_flags == SENTINEL_INT
            && [
                self.local_max,
                self.local_first,
                self.local_second,
                self.local_third,
                self.local_fourth,
                self.rise,
                self.set,
                self.azimuth,
                self.altitude,
                self.magnitude,
                self.magnitude_secondary,
                self.ratio,
                self.aux_azimuth,
                self.aux_altitude,
            ]
            .iter()
            .all(|&v| v == SENTINEL)
            && self.saros_series == SENTINEL_INT
            && self.saros_member == SENTINEL_INT
    }
}

/// One catalog body of a "what's up" snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub slot: usize,
    pub generation: u64,
    pub body: i32,
    pub right_ascension: f64,
    pub declination: f64,
    pub distance: f64,
    pub azimuth: f64,
    pub altitude: f64,
    pub magnitude: f64,
    pub rise: f64,
    pub set: f64,
    pub transit: f64,
}

/// Anything a store slot can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Record {
    Event(EventRow),
    Snapshot(SnapshotRow),
}

impl Record {
    pub fn slot(&self) -> usize {
        match self {
            Record::Event(row) => row.slot,
            Record::Snapshot(row) => row.slot,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Record::Event(row) => row.generation,
            Record::Snapshot(row) => row.generation,
        }
    }

    pub fn as_event(&self) -> Option<&EventRow> {
        match self {
            Record::Event(row) => Some(row),
            Record::Snapshot(_) => None,
        }
    }

    pub fn as_snapshot(&self) -> Option<&SnapshotRow> {
        match self {
            Record::Snapshot(row) => Some(row),
            Record::Event(_) => None,
        }
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            Record::Event(_) => "event",
            Record::Snapshot(_) => "snapshot",
        }
    }
}

/// The single stored observer location and display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub temperature: f64,
    pub utc_offset_minutes: f64,
    #[serde(default)]
    pub name: Option<String>,
}

impl LocationRecord {
    /// Latitude the location table is seeded with before the user picks a
    /// place; it marks "no location yet".
    pub const UNSET_LATITUDE: f64 = -91.0;

    pub fn is_unset(&self) -> bool {
        self.latitude == Self::UNSET_LATITUDE
    }
}

/// Whether `rows` is one complete run: every slot written, one generation.
///
/// A cancelled, failed or interrupted run leaves a mix of generations (or
/// empty slots) that this detects.
pub fn rows_are_consistent(rows: &[Option<Record>]) -> bool {
    let mut generation = None;
    for row in rows {
        let Some(row) = row else {
            return false;
        };
        match generation {
            None => generation = Some(row.generation()),
            Some(g) if g != row.generation() => return false,
            Some(_) => {}
        }
    }
    generation.is_some()
}

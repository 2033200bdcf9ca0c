// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! "What's up" records: one body at one instant.

use crate::civil::{julian_to_local_millis, TimeError};
use crate::instant::Time;
use crate::oracle::{Body, Position};
use crate::scales::UT;
use crate::store::{SnapshotRow, SENTINEL};
use serde::{Deserialize, Serialize};

/// Position and surrounding horizon crossings of one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub body: Body,
    /// UT1 instant the position refers to.
    pub at: Time<UT>,
    pub position: Position,
    pub rise: Time<UT>,
    pub set: Time<UT>,
    /// `None` when the oracle has no transit routine.
    pub transit: Option<Time<UT>>,
}

impl Snapshot {
    /// Whether the body is above the horizon.
    pub fn is_up(&self) -> bool {
        self.position.altitude > 0.0
    }

    pub fn rise_millis(&self, utc_offset_minutes: f64) -> Result<i64, TimeError> {
        julian_to_local_millis(self.rise, utc_offset_minutes)
    }

    pub fn set_millis(&self, utc_offset_minutes: f64) -> Result<i64, TimeError> {
        julian_to_local_millis(self.set, utc_offset_minutes)
    }

    pub fn transit_millis(&self, utc_offset_minutes: f64) -> Result<Option<i64>, TimeError> {
        self.transit
            .map(|t| julian_to_local_millis(t, utc_offset_minutes))
            .transpose()
    }

    pub fn to_row(&self, slot: usize, generation: u64) -> SnapshotRow {
        SnapshotRow {
            slot,
            generation,
            body: self.body.index(),
            right_ascension: self.position.right_ascension,
            declination: self.position.declination,
            distance: self.position.distance,
            azimuth: self.position.azimuth,
            altitude: self.position.altitude,
            magnitude: self.position.magnitude,
            rise: self.rise.value(),
            set: self.set.value(),
            transit: self.transit.map_or(SENTINEL, |t| t.value()),
        }
    }
}

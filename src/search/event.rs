// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Reconciled eclipse and occultation records.

use super::VISIBILITY_WINDOW;
use crate::civil::{julian_to_local_millis, TimeError};
use crate::instant::Time;
use crate::oracle::{
    Direction, EclipseKind, EventKind, GlobalCircumstance, LocalCircumstance, LocalDetail,
};
use crate::riseset::RiseSetPair;
use crate::scales::UT;
use crate::store::{EventRow, SENTINEL};
use serde::{Deserialize, Serialize};

/// One global event, reconciled against what the observer sees.
///
/// `visible_locally` is decided once, when the event is assembled, and is
/// never recomputed from stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store slot.
    pub index: usize,
    pub kind: EventKind,
    pub direction: Direction,
    pub global: GlobalCircumstance,
    /// Present only when the event is visible locally.
    pub local: Option<LocalCircumstance>,
    pub visible_locally: bool,
    /// Rise of the context body (Sun or Moon) before the event.
    pub rise: Option<Time<UT>>,
    /// Set of the context body after the event window opens.
    pub set: Option<Time<UT>>,
}

/// The proximity rule: maxima at most [`VISIBILITY_WINDOW`] apart.
#[inline]
pub(crate) fn is_visible(local: &LocalCircumstance, global: &GlobalCircumstance) -> bool {
    local.max_time.separation(global.max_time) <= VISIBILITY_WINDOW
}

impl Event {
    /// Pair `global` with the pending local circumstance.
    ///
    /// The local side is kept only if it passes the proximity rule.
    pub fn reconcile(
        index: usize,
        kind: EventKind,
        direction: Direction,
        global: GlobalCircumstance,
        local: &LocalCircumstance,
    ) -> Self {
        let visible_locally = is_visible(local, &global);
        Self {
            index,
            kind,
            direction,
            global,
            local: visible_locally.then_some(*local),
            visible_locally,
            rise: None,
            set: None,
        }
    }

    /// Attach the surrounding rise/set of the context body.
    pub fn with_context(mut self, pair: RiseSetPair) -> Self {
        self.rise = pair.rise;
        self.set = pair.set;
        self
    }

    pub fn global_kind(&self) -> EclipseKind {
        self.global.kind()
    }

    pub fn local_kind(&self) -> Option<EclipseKind> {
        self.local.as_ref().map(LocalCircumstance::kind)
    }

    /// `"Total"` for a global-only event, `"Total|Partial"` when visible.
    pub fn label(&self) -> String {
        match self.local_kind() {
            Some(local) => format!("{}|{}", self.global_kind(), local),
            None => self.global_kind().to_string(),
        }
    }

    /// The instant listed for this event.
    ///
    /// Visible solar eclipses and occultations use the local maximum;
    /// lunar eclipses are simultaneous everywhere and use the global one.
    pub fn event_time(&self) -> Time<UT> {
        match (self.kind, self.local.as_ref()) {
            (EventKind::LunarEclipse, _) | (_, None) => self.global.max_time,
            (_, Some(local)) => local.max_time,
        }
    }

    /// [`Event::event_time`] as epoch milliseconds in the given zone.
    pub fn local_millis(&self, utc_offset_minutes: f64) -> Result<i64, TimeError> {
        julian_to_local_millis(self.event_time(), utc_offset_minutes)
    }

    /// Flatten into the stored row shape.
    pub fn to_row(&self, generation: u64) -> EventRow {
        let g = &self.global;
        let opt = |t: Option<Time<UT>>| t.map_or(SENTINEL, |t| t.value());
        let mut row = EventRow {
            body: self.kind.target().map_or(-1, |b| b.index()),
            visible: self.visible_locally,
            label: self.label(),
            event_time: self.event_time().value(),
            global_flags: i64::from(g.flags.bits()),
            global_max: g.max_time.value(),
            global_begin: g.begin.value(),
            global_end: g.end.value(),
            global_total_begin: opt(g.total_begin),
            global_total_end: opt(g.total_end),
            global_outer_begin: opt(g.outer_begin),
            global_outer_end: opt(g.outer_end),
            ..EventRow::sentinel(self.index, generation, self.direction)
        };

        let Some(local) = &self.local else {
            return row;
        };
        row.local_flags = i64::from(local.flags.bits());
        row.local_max = local.max_time.value();
        row.local_first = local.contacts[0].value();
        row.local_second = local.contacts[1].value();
        row.local_third = local.contacts[2].value();
        row.local_fourth = local.contacts[3].value();
        row.rise = opt(self.rise);
        row.set = opt(self.set);
        row.azimuth = local.horizon.azimuth;
        row.altitude = local.horizon.altitude;
        match local.detail {
            LocalDetail::Solar {
                ratio,
                fraction_covered,
                magnitude,
                saros,
                moon,
            } => {
                row.magnitude = magnitude;
                row.magnitude_secondary = fraction_covered;
                row.ratio = ratio;
                row.aux_azimuth = moon.azimuth;
                row.aux_altitude = moon.altitude;
                row.saros_series = i64::from(saros.series);
                row.saros_member = i64::from(saros.member);
            }
            LocalDetail::Lunar {
                umbral_magnitude,
                penumbral_magnitude,
                saros,
            } => {
                row.magnitude = umbral_magnitude;
                row.magnitude_secondary = penumbral_magnitude;
                row.saros_series = i64::from(saros.series);
                row.saros_member = i64::from(saros.member);
            }
            LocalDetail::Occultation { moon_at_end } => {
                row.aux_azimuth = moon_at_end.azimuth;
                row.aux_altitude = moon_at_end.altitude;
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{Body, EventFlags};

    fn global(max: f64, flags: u32) -> GlobalCircumstance {
        let mut raw = vec![0.0; 9];
        raw[0] = f64::from(flags);
        raw[1] = max;
        raw[3] = max - 0.1;
        raw[4] = max + 0.1;
        GlobalCircumstance::decode(EventKind::SolarEclipse, &raw).unwrap()
    }

    fn solar_local(max: f64, flags: u32) -> LocalCircumstance {
        let mut raw: Vec<f64> = (0..19).map(|i| f64::from(i) + 0.5).collect();
        raw[0] = f64::from(flags);
        raw[1] = max;
        LocalCircumstance::decode(EventKind::SolarEclipse, &raw).unwrap()
    }

    #[test]
    fn boundary_separation_is_visible() {
        let e = Event::reconcile(
            0,
            EventKind::SolarEclipse,
            Direction::Forward,
            global(10.0, EventFlags::TOTAL),
            &solar_local(11.0, EventFlags::PARTIAL),
        );
        assert!(e.visible_locally);
        assert_eq!(e.label(), "Total|Partial");
        assert_eq!(e.event_time().value(), 11.0);
    }

    #[test]
    fn beyond_window_drops_local() {
        let e = Event::reconcile(
            1,
            EventKind::SolarEclipse,
            Direction::Forward,
            global(10.0, EventFlags::ANNULAR),
            &solar_local(11.25, EventFlags::PARTIAL),
        );
        assert!(!e.visible_locally);
        assert!(e.local.is_none());
        assert_eq!(e.label(), "Annular");
        assert_eq!(e.event_time().value(), 10.0);

        let row = e.to_row(4);
        assert!(row.local_is_sentinel());
        assert_eq!(row.global_max, 10.0);
        assert_eq!(row.global_flags, i64::from(EventFlags::ANNULAR));
        assert_eq!(row.generation, 4);
        assert_eq!(row.slot, 1);
    }

    #[test]
    fn solar_row_columns() {
        let e = Event::reconcile(
            2,
            EventKind::SolarEclipse,
            Direction::Backward,
            global(20.0, EventFlags::TOTAL),
            &solar_local(20.25, EventFlags::TOTAL),
        )
        .with_context(RiseSetPair {
            rise: Some(Time::new(19.3)),
            set: Some(Time::new(19.8)),
        });
        let row = e.to_row(1);
        assert!(row.visible);
        assert_eq!(row.rise, 19.3);
        assert_eq!(row.set, 19.8);
        assert_eq!(row.ratio, 7.5);
        assert_eq!(row.magnitude_secondary, 8.5);
        assert_eq!(row.azimuth, 10.5);
        assert_eq!(row.magnitude, 14.5);
        assert_eq!(row.saros_series, 15);
        assert_eq!(row.aux_altitude, 18.5);
        assert_eq!(row.body, -1);
        assert_eq!(row.direction, Direction::Backward);
    }

    #[test]
    fn lunar_event_time_is_global() {
        let mut raw = vec![0.0; 9];
        raw[0] = f64::from(EventFlags::PENUMBRAL);
        raw[1] = 30.0;
        let global = GlobalCircumstance::decode(EventKind::LunarEclipse, &raw).unwrap();
        let mut raw_local = vec![0.0; 22];
        raw_local[1] = 30.4;
        let local = LocalCircumstance::decode(EventKind::LunarEclipse, &raw_local).unwrap();
        let e = Event::reconcile(0, EventKind::LunarEclipse, Direction::Forward, global, &local);
        assert!(e.visible_locally);
        assert_eq!(e.event_time().value(), 30.0);
        assert_eq!(e.label(), "Penumbral|Other");
    }

    #[test]
    fn occultation_row_records_target() {
        let kind = EventKind::Occultation(Body::Venus);
        let mut raw = vec![0.0; 9];
        raw[1] = 40.0;
        let global = GlobalCircumstance::decode(kind, &raw).unwrap();
        let mut raw_local: Vec<f64> = (0..15).map(f64::from).collect();
        raw_local[1] = 40.1;
        let local = LocalCircumstance::decode(kind, &raw_local).unwrap();
        let row = Event::reconcile(5, kind, Direction::Forward, global, &local).to_row(2);
        assert_eq!(row.body, Body::Venus.index());
        assert_eq!(row.azimuth, 11.0);
        assert_eq!(row.aux_azimuth, 13.0);
        assert_eq!(row.aux_altitude, 14.0);
        assert_eq!(row.saros_series, -1);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time-scale markers used by the search engine.
//!
//! | Marker | Axis | Relation to JD(TT) |
//! |--------|------|--------------------|
//! | [`TT`] | Terrestrial Time | identity |
//! | [`UT`] | Universal Time (UT1) | `TT = UT + ΔT(UT)` |
//!
//! Every oracle routine except the calendar conversion works in UT1, so
//! `Time<UT>` is the type that flows through search cursors, ranges and
//! stored rows. `Time<TT>` only appears in [`JulianMoment`](crate::JulianMoment).

use crate::delta_t::delta_t_at;
use crate::instant::{Time, TimeScale};
use chrono::{DateTime, Utc};
use qtty::{Day, Days};

/// JD of the Unix epoch (1970-01-01T00:00:00Z).
pub(crate) const UNIX_EPOCH_JD: f64 = 2_440_587.5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Terrestrial Time, the uniform axis all conversions route through.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct TT;

impl TimeScale for TT {
    const LABEL: &'static str = "TT";

    #[inline(always)]
    fn to_jd_tt(value: Days) -> Days {
        value
    }

    #[inline(always)]
    fn from_jd_tt(jd_tt: Days) -> Days {
        jd_tt
    }
}

/// Universal Time (UT1), tied to Earth's rotation.
///
/// Leap seconds are not modelled: civil UTC and UT1 are treated as the same
/// axis, which keeps the error below one second.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct UT;

impl TimeScale for UT {
    const LABEL: &'static str = "UT1";

    #[inline]
    fn to_jd_tt(ut: Days) -> Days {
        ut + delta_t_at(ut).to::<Day>()
    }

    #[inline]
    fn from_jd_tt(jd_tt: Days) -> Days {
        // ut + ΔT(ut) = tt; dΔT/dJD is ~3e-8 so three passes converge.
        let mut ut = jd_tt;
        for _ in 0..3 {
            ut = jd_tt - delta_t_at(ut).to::<Day>();
        }
        ut
    }
}

impl From<Time<UT>> for Time<TT> {
    #[inline]
    fn from(t: Time<UT>) -> Self {
        t.to::<TT>()
    }
}

impl From<Time<TT>> for Time<UT> {
    #[inline]
    fn from(t: Time<TT>) -> Self {
        t.to::<UT>()
    }
}

// ── Civil clock bridge ───────────────────────────────────────────────────

impl Time<UT> {
    /// Build from a UTC timestamp.
    pub fn from_utc(datetime: DateTime<Utc>) -> Self {
        Self::from_unix_millis(datetime.timestamp_millis())
    }

    /// Build from milliseconds since the Unix epoch.
    #[inline]
    pub fn from_unix_millis(millis: i64) -> Self {
        Self::new(UNIX_EPOCH_JD + millis as f64 / MILLIS_PER_DAY)
    }

    /// Milliseconds since the Unix epoch, rounded to the nearest millisecond.
    #[inline]
    pub fn unix_millis(&self) -> i64 {
        ((self.value() - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round() as i64
    }

    /// Convert to a UTC timestamp; `None` outside chrono's representable range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.unix_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qtty::{Second, Seconds};

    #[test]
    fn ut_to_tt_offset_near_j2000() {
        let ut = Time::<UT>::new(2_451_545.0);
        let tt: Time<TT> = ut.into();
        let offset = (tt.quantity() - ut.quantity()).to::<Second>();
        assert!(
            (offset - Seconds::new(63.83)).abs() < Seconds::new(1.0),
            "UT→TT offset = {offset}"
        );
    }

    #[test]
    fn tt_ut_roundtrip() {
        let tt = Time::<TT>::new(2_460_000.5);
        let back: Time<TT> = tt.to::<UT>().to::<TT>();
        assert!((back.quantity() - tt.quantity()).abs() < Days::new(1e-12));
    }

    #[test]
    fn unix_epoch_is_fixed_jd() {
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Time::<UT>::from_utc(epoch).value(), UNIX_EPOCH_JD);
        assert_eq!(Time::<UT>::new(UNIX_EPOCH_JD).unix_millis(), 0);
    }

    #[test]
    fn utc_bridge_keeps_milliseconds() {
        let dt = Utc.with_ymd_and_hms(2024, 4, 8, 18, 17, 16).unwrap()
            + chrono::Duration::milliseconds(250);
        let ut = Time::<UT>::from_utc(dt);
        assert_eq!(ut.to_utc(), Some(dt));
    }
}

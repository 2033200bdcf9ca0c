// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Civil calendar time and its mapping to the oracle's Julian scales.
//!
//! A [`CivilInstant`] is what a person reads off a clock: calendar fields
//! plus the UTC offset of the zone they are in. A [`JulianMoment`] is the same
//! instant on both astronomical axes the oracle needs. The two never mix
//! implicitly; every crossing goes through one of the functions below.
//!
//! ```rust
//! use skyevents::civil::{civil_to_julian, julian_to_civil, CivilInstant};
//! # use skyevents::oracle::*;
//! # struct NoSky;
//! # impl EphemerisOracle for NoSky {
//! #     fn position(&self, _: f64, _: Body, _: &ObserverLocation) -> Option<Vec<f64>> { None }
//! #     fn rise_time(&self, _: f64, _: Body, _: &ObserverLocation) -> f64 { -1.0 }
//! #     fn set_time(&self, _: f64, _: Body, _: &ObserverLocation) -> f64 { -1.0 }
//! #     fn global_event(&self, _: EventKind, _: f64, _: Direction) -> Option<Vec<f64>> { None }
//! #     fn local_event(&self, _: EventKind, _: f64, _: &ObserverLocation, _: Direction) -> Option<Vec<f64>> { None }
//! # }
//! # let oracle = NoSky;
//! // 2024-04-08 14:17:00 in UTC−05:00
//! let local = CivilInstant::new(2024, 4, 8, 14, 17, 0.0).with_offset(-300.0);
//! let moment = civil_to_julian(&oracle, &local).unwrap();
//! let utc = julian_to_civil(&oracle, moment.ut1).unwrap();
//! assert_eq!((utc.hour, utc.minute), (19, 17));
//! ```

use crate::instant::Time;
use crate::oracle::EphemerisOracle;
use crate::scales::{TT, UT};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Errors crossing between civil and Julian time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeError {
    #[error("invalid calendar date: {0}")]
    InvalidCalendarDate(CivilInstant),

    #[error("malformed calendar string from oracle: {0:?}")]
    MalformedCalendarString(String),

    #[error("Julian day {0} is outside the representable civil range")]
    OutOfRange(f64),

    #[error("UTC offset of {0} minutes is not representable")]
    InvalidOffset(f64),
}

// ═══════════════════════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════════════════════

/// Calendar fields in a zone `utc_offset_minutes` east of Greenwich.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CivilInstant {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
    pub utc_offset_minutes: f64,
}

impl CivilInstant {
    /// A UTC instant.
    pub const fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            utc_offset_minutes: 0.0,
        }
    }

    /// Same wall-clock fields, interpreted in another zone.
    pub const fn with_offset(mut self, utc_offset_minutes: f64) -> Self {
        self.utc_offset_minutes = utc_offset_minutes;
        self
    }

    /// Build from a wall-clock reading (milliseconds kept).
    pub fn from_naive(naive: NaiveDateTime, utc_offset_minutes: f64) -> Self {
        Self {
            year: naive.year(),
            month: naive.month(),
            day: naive.day(),
            hour: naive.hour(),
            minute: naive.minute(),
            second: f64::from(naive.second())
                + f64::from(naive.and_utc().timestamp_subsec_millis()) / 1_000.0,
            utc_offset_minutes,
        }
    }

    /// Wall-clock fields as a chrono value, rounded to the millisecond.
    /// `None` when a field is out of range.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        naive_datetime(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
    }

    /// The same instant expressed in UTC.
    /// `None` when a field or the offset is out of range.
    pub fn to_utc(&self) -> Option<Self> {
        let shift = offset_shift(self.utc_offset_minutes)?;
        let utc = self.to_naive()?.checked_sub_signed(shift)?;
        Some(Self::from_naive(utc, 0.0))
    }
}

impl fmt::Display for CivilInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:06.3} UTC{:+}min",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.utc_offset_minutes
        )
    }
}

/// One physical instant on both oracle scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JulianMoment {
    pub tt: Time<TT>,
    pub ut1: Time<UT>,
}

impl JulianMoment {
    pub const fn new(tt: Time<TT>, ut1: Time<UT>) -> Self {
        Self { tt, ut1 }
    }

    /// Derive the TT half from a UT1 value with the built-in ΔT model.
    pub fn from_ut1(ut1: Time<UT>) -> Self {
        Self {
            tt: ut1.to::<TT>(),
            ut1,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════

/// Convert a civil reading to both Julian scales through the oracle's
/// calendar routine.
pub fn civil_to_julian<O>(oracle: &O, civil: &CivilInstant) -> Result<JulianMoment, TimeError>
where
    O: EphemerisOracle + ?Sized,
{
    let utc = civil
        .to_utc()
        .ok_or(TimeError::InvalidCalendarDate(*civil))?;
    let [tt, ut1] = oracle
        .calendar_to_julian(utc.year, utc.month, utc.day, utc.hour, utc.minute, utc.second)
        .ok_or(TimeError::InvalidCalendarDate(*civil))?;
    Ok(JulianMoment::new(Time::new(tt), Time::new(ut1)))
}

/// Convert a UT1 Julian day to UTC calendar fields.
pub fn julian_to_civil<O>(oracle: &O, ut1: Time<UT>) -> Result<CivilInstant, TimeError>
where
    O: EphemerisOracle + ?Sized,
{
    let raw = oracle
        .julian_to_calendar_string(ut1.value())
        .ok_or(TimeError::OutOfRange(ut1.value()))?;
    parse_calendar_string(&raw)
}

/// Epoch milliseconds of a UT1 Julian day, shifted into the given zone.
pub fn julian_to_local_millis(ut1: Time<UT>, utc_offset_minutes: f64) -> Result<i64, TimeError> {
    let shift = offset_shift(utc_offset_minutes)
        .ok_or(TimeError::InvalidOffset(utc_offset_minutes))?;
    ut1.unix_millis()
        .checked_add(shift.num_milliseconds())
        .ok_or(TimeError::OutOfRange(ut1.value()))
}

/// The wall clock, right now, as a [`JulianMoment`].
pub fn current_time<O>(oracle: &O, utc_offset_minutes: f64) -> Result<JulianMoment, TimeError>
where
    O: EphemerisOracle + ?Sized,
{
    current_time_at(oracle, Utc::now(), utc_offset_minutes)
}

/// [`current_time`] with an injected clock reading.
pub fn current_time_at<O>(
    oracle: &O,
    now: DateTime<Utc>,
    utc_offset_minutes: f64,
) -> Result<JulianMoment, TimeError>
where
    O: EphemerisOracle + ?Sized,
{
    let local = offset_shift(utc_offset_minutes)
        .and_then(|shift| now.naive_utc().checked_add_signed(shift))
        .ok_or(TimeError::InvalidOffset(utc_offset_minutes))?;
    civil_to_julian(oracle, &CivilInstant::from_naive(local, utc_offset_minutes))
}

/// A UTC offset as a whole-millisecond chrono duration.
fn offset_shift(utc_offset_minutes: f64) -> Option<Duration> {
    let millis = (utc_offset_minutes * MILLIS_PER_MINUTE).round();
    if !millis.is_finite() {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

// ── Calendar routine used by the oracle trait defaults ───────────────────

fn naive_datetime(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
) -> Option<NaiveDateTime> {
    if hour > 23 || minute > 59 || !(0.0..60.0).contains(&second) {
        return None;
    }
    let millis = i64::from(hour) * 3_600_000
        + i64::from(minute) * 60_000
        + (second * 1_000.0).round() as i64;
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::milliseconds(millis))
}

pub(crate) fn gregorian_to_julian(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
) -> Option<[f64; 2]> {
    let naive = naive_datetime(year, month, day, hour, minute, second)?;
    let ut1 = Time::<UT>::from_utc(naive.and_utc());
    Some([ut1.to::<TT>().value(), ut1.value()])
}

pub(crate) fn julian_to_gregorian_string(jd_ut: f64) -> Option<String> {
    if !jd_ut.is_finite() {
        return None;
    }
    let dt = Time::<UT>::new(jd_ut).to_utc()?;
    let second = f64::from(dt.second()) + f64::from(dt.timestamp_subsec_millis()) / 1_000.0;
    Some(format!(
        "_{}_{}_{}_{}_{}_{:.3}_",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        second
    ))
}

fn parse_calendar_string(raw: &str) -> Result<CivilInstant, TimeError> {
    let malformed = || TimeError::MalformedCalendarString(raw.to_string());
    let fields: Vec<&str> = raw.trim_matches('_').split('_').collect();
    let [year, month, day, hour, minute, second] = fields.as_slice() else {
        return Err(malformed());
    };
    Ok(CivilInstant::new(
        year.trim().parse().map_err(|_| malformed())?,
        month.trim().parse().map_err(|_| malformed())?,
        day.trim().parse().map_err(|_| malformed())?,
        hour.trim().parse().map_err(|_| malformed())?,
        minute.trim().parse().map_err(|_| malformed())?,
        second.trim().parse().map_err(|_| malformed())?,
    ))
}

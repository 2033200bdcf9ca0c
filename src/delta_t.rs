// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! ΔT = TT − UT, the offset between the two Julian scales an event search
//! carries for every instant.
//!
//! Piecewise model from Chapter 9 of Meeus, *Astronomical Algorithms*
//! (2nd ed. 1998):
//!
//! | UT epoch | Model |
//! |----------|-------|
//! | before 948 CE | Stephenson & Houlden quadratic around 948 |
//! | 948 – 1600 | Stephenson & Houlden quadratic around 1850 |
//! | 1620 – 1992 | bicubic interpolation in the biennial table |
//! | 1992 – 2010 | interpolation through the 1990/2000/2010 estimates |
//! | after 2010 | Meeus eq. 9.1 extrapolation |
//!
//! [`UT`](crate::UT) applies the correction when a `Time<UT>` is converted to
//! `Time<TT>`. The default oracle calendar routine relies on it to produce
//! the TT half of a [`JulianMoment`](crate::JulianMoment) when the ephemeris
//! backend does not supply its own.

use crate::instant::Time;
use crate::scales::UT;
use qtty::{Days, Seconds, Simplify};

/// Days per Julian century.
const JULIAN_CENTURY: Days = Days::new(36_525.0);

/// Tabulated entries (biennial 1620–1992).
const TERMS: usize = 187;

/// Biennial ΔT values from 1620 to 1992, compiled by J. Meeus.
#[rustfmt::skip]
const DELTA_T: [Seconds; TERMS] = qtty::qtty_vec!(
    Seconds;
    124.0,115.0,106.0, 98.0, 91.0, 85.0, 79.0, 74.0, 70.0, 65.0,
     62.0, 58.0, 55.0, 53.0, 50.0, 48.0, 46.0, 44.0, 42.0, 40.0,
     37.0, 35.0, 33.0, 31.0, 28.0, 26.0, 24.0, 22.0, 20.0, 18.0,
     16.0, 14.0, 13.0, 12.0, 11.0, 10.0,  9.0,  9.0,  9.0,  9.0,
      9.0,  9.0,  9.0,  9.0, 10.0, 10.0, 10.0, 10.0, 10.0, 11.0,
     11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 12.0, 12.0, 12.0, 12.0,
     12.0, 12.0, 13.0, 13.0, 13.0, 13.0, 14.0, 14.0, 14.0, 15.0,
     15.0, 15.0, 15.0, 16.0, 16.0, 16.0, 16.0, 16.0, 17.0, 17.0,
     17.0, 17.0, 17.0, 17.0, 17.0, 17.0, 16.0, 16.0, 15.0, 14.0,
     13.7, 13.1, 12.7, 12.5, 12.5, 12.5, 12.5, 12.5, 12.5, 12.3,
     12.0, 11.4, 10.6,  9.6,  8.6,  7.5,  6.6,  6.0,  5.7,  5.6,
      5.7,  5.9,  6.2,  6.5,  6.8,  7.1,  7.3,  7.5,  7.7,  7.8,
      7.9,  7.5,  6.4,  5.4,  2.9,  1.6, -1.0, -2.7, -3.6, -4.7,
     -5.4, -5.2, -5.5, -5.6, -5.8, -5.9, -6.2, -6.4, -6.1, -4.7,
     -2.7,  0.0,  2.6,  5.4,  7.7, 10.5, 13.4, 16.0, 18.2, 20.2,
     21.2, 22.4, 23.5, 23.9, 24.3, 24.0, 23.9, 23.9, 23.7, 24.0,
     24.3, 25.3, 26.2, 27.3, 28.2, 29.1, 30.0, 30.7, 31.4, 32.2,
     33.1, 34.0, 35.0, 36.5, 38.3, 40.2, 42.2, 44.5, 46.5, 48.5,
     50.5, 52.2, 53.8, 54.9, 55.8, 56.9, 58.3,
);

// ── Section boundaries (JD on the UT axis) ───────────────────────────────

const JD_948: Days = Days::new(2_067_314.5);
const JD_1600: Days = Days::new(2_305_447.5);
const JD_1992: Days = Days::new(2_448_622.5);
const JD_2010: Days = Days::new(2_455_197.5);

// ── Sections ─────────────────────────────────────────────────────────────

#[inline]
fn ancient(jd: Days) -> Seconds {
    const A0: Seconds = Seconds::new(1_830.0);
    const A1: Seconds = Seconds::new(-405.0);
    const A2: Seconds = Seconds::new(46.5);
    let c = ratio(jd - JD_948, JULIAN_CENTURY);
    A0 + A1 * c + A2 * c * c
}

#[inline]
fn medieval(jd: Days) -> Seconds {
    const JD_1850: Days = Days::new(2_396_758.5);
    const A2: Seconds = Seconds::new(22.5);
    let c = ratio(jd - JD_1850, JULIAN_CENTURY);
    A2 * c * c
}

/// Bicubic interpolation; the index clips to the last usable triple.
#[inline]
fn tabulated(jd: Days) -> Seconds {
    const JD_1620: Days = Days::new(2_312_752.5);
    const STEP: Days = Days::new(730.5);

    let i = (ratio(jd - JD_1620, STEP) as usize).min(TERMS - 3);
    let a = DELTA_T[i + 1] - DELTA_T[i];
    let b = DELTA_T[i + 2] - DELTA_T[i + 1];
    let c = a - b;
    let n = ratio(jd - (JD_1620 + STEP * i as f64), STEP);
    DELTA_T[i + 1] + n / 2.0 * (a + b + n * c)
}

#[inline]
fn recent(jd: Days) -> Seconds {
    const ESTIMATES: [Seconds; 3] = [Seconds::new(56.86), Seconds::new(63.83), Seconds::new(70.0)];
    const JD_2000: Days = Days::new(2_451_544.5);
    const DECADE: Days = Days::new(3_652.5);

    let a = ESTIMATES[1] - ESTIMATES[0];
    let b = ESTIMATES[2] - ESTIMATES[1];
    let c = b - a;
    let n = ratio(jd - JD_2000, DECADE);
    ESTIMATES[1] + n / 2.0 * (a + b + n * c)
}

#[inline]
fn extrapolated(jd: Days) -> Seconds {
    const JD_1810: Days = Days::new(2_382_148.0);
    const OFFSET: Seconds = Seconds::new(-15.0);
    const DIVISOR: f64 = 41_048_480.0;
    let t = ratio(jd - JD_1810, Days::new(1.0));
    OFFSET + Seconds::new(t * t / DIVISOR)
}

#[inline]
fn ratio(num: Days, den: Days) -> f64 {
    (num / den).simplify().value()
}

/// ΔT for a Julian day on the UT axis.
pub(crate) fn delta_t_at(jd_ut: Days) -> Seconds {
    match jd_ut {
        jd if jd < JD_948 => ancient(jd),
        jd if jd < JD_1600 => medieval(jd),
        jd if jd < JD_1992 => tabulated(jd),
        jd if jd <= JD_2010 => recent(jd),
        jd => extrapolated(jd),
    }
}

impl Time<UT> {
    /// ΔT = TT − UT at this epoch.
    #[inline]
    pub fn delta_t(&self) -> Seconds {
        delta_t_at(self.quantity())
    }
}

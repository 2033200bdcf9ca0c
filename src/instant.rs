// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Scale-tagged Julian instants.
//!
//! [`Time<S>`] stores a Julian day count in [`Days`] whose *meaning* is fixed
//! by the compile-time marker `S: TimeScale`.  The ephemeris oracle consumes
//! and produces two scales for the same physical instant (Terrestrial Time
//! and Universal Time). Keeping them in distinct types means a TT value can
//! never be handed to a routine expecting UT1 without an explicit
//! [`Time::to`] conversion.
//!
//! Oracle calls still exchange bare `f64` Julian days; [`Time::value`] and
//! [`Time::new`] are the crossing points.

use qtty::Days;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// ═══════════════════════════════════════════════════════════════════════════
// TimeScale trait
// ═══════════════════════════════════════════════════════════════════════════

/// Marker trait for time scales.
///
/// A scale defines a display label and the mapping between its native Julian
/// day count and **JD(TT)**, the canonical axis every conversion routes
/// through.
pub trait TimeScale: Copy + Clone + std::fmt::Debug + PartialEq + PartialOrd + 'static {
    /// Display label used by [`Time`] formatting.
    const LABEL: &'static str;

    /// Convert a Julian day count on this scale to JD(TT).
    fn to_jd_tt(value: Days) -> Days;

    /// Convert a JD(TT) back to this scale's Julian day count.
    fn from_jd_tt(jd_tt: Days) -> Days;
}

// ═══════════════════════════════════════════════════════════════════════════
// Time<S>
// ═══════════════════════════════════════════════════════════════════════════

/// A Julian instant on time scale `S`.
///
/// Layout-identical to a single `f64`; `PhantomData` is zero-sized.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Time<S: TimeScale> {
    quantity: Days,
    _scale: PhantomData<S>,
}

impl<S: TimeScale> Time<S> {
    /// Create from a raw Julian day count on scale `S`.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self {
            quantity: Days::new(value),
            _scale: PhantomData,
        }
    }

    /// Create from a [`Days`] quantity.
    #[inline]
    pub const fn from_days(days: Days) -> Self {
        Self {
            quantity: days,
            _scale: PhantomData,
        }
    }

    /// The underlying quantity in days.
    #[inline]
    pub const fn quantity(&self) -> Days {
        self.quantity
    }

    /// The underlying Julian day count, as handed to the oracle.
    #[inline]
    pub fn value(&self) -> f64 {
        self.quantity.value()
    }

    /// Convert to another time scale through JD(TT).
    #[inline]
    pub fn to<T: TimeScale>(&self) -> Time<T> {
        Time::<T>::from_days(T::from_jd_tt(S::to_jd_tt(self.quantity)))
    }

    /// The earlier of two instants.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    /// The later of two instants.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// Absolute separation between two instants on the same scale.
    #[inline]
    pub fn separation(self, other: Self) -> Days {
        Days::new((self.value() - other.value()).abs())
    }
}

// ── Display ───────────────────────────────────────────────────────────────

impl<S: TimeScale> std::fmt::Display for Time<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JD({}) {:.6}", S::LABEL, self.value())
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

impl<S: TimeScale> Serialize for Time<S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.serialize_f64(self.value())
    }
}

impl<'de, S: TimeScale> Deserialize<'de> for Time<S> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = f64::deserialize(deserializer)?;
        Ok(Self::new(v))
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────

impl<S: TimeScale> Add<Days> for Time<S> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Days) -> Self::Output {
        Self::from_days(self.quantity + rhs)
    }
}

impl<S: TimeScale> AddAssign<Days> for Time<S> {
    #[inline]
    fn add_assign(&mut self, rhs: Days) {
        self.quantity = self.quantity + rhs;
    }
}

impl<S: TimeScale> Sub<Days> for Time<S> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Days) -> Self::Output {
        Self::from_days(self.quantity - rhs)
    }
}

impl<S: TimeScale> SubAssign<Days> for Time<S> {
    #[inline]
    fn sub_assign(&mut self, rhs: Days) {
        self.quantity = self.quantity - rhs;
    }
}

impl<S: TimeScale> Sub for Time<S> {
    type Output = Days;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.quantity - rhs.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scales::{TT, UT};

    #[test]
    fn test_new_and_value() {
        let t = Time::<TT>::new(2_451_545.0);
        assert_eq!(t.value(), 2_451_545.0);
        assert_eq!(t.quantity(), Days::new(2_451_545.0));
    }

    #[test]
    fn test_add_sub_days() {
        let mut t = Time::<UT>::new(2_460_000.0);
        t += Days::new(2.0);
        assert_eq!(t.value(), 2_460_002.0);
        t -= Days::new(0.5);
        assert_eq!(t.value(), 2_460_001.5);
        assert_eq!((t + Days::new(1.0)).value(), 2_460_002.5);
        assert_eq!((t - Days::new(1.0)).value(), 2_460_000.5);
    }

    #[test]
    fn test_difference_is_days() {
        let a = Time::<UT>::new(2_460_010.0);
        let b = Time::<UT>::new(2_460_000.0);
        assert_eq!(a - b, Days::new(10.0));
        assert_eq!(a.separation(b), Days::new(10.0));
        assert_eq!(b.separation(a), Days::new(10.0));
    }

    #[test]
    fn test_min_max() {
        let earlier = Time::<TT>::new(10.0);
        let later = Time::<TT>::new(14.0);
        assert_eq!(earlier.min(later), earlier);
        assert_eq!(later.min(earlier), earlier);
        assert_eq!(earlier.max(later), later);
    }

    #[test]
    fn test_display_carries_scale_label() {
        let s = format!("{}", Time::<UT>::new(2_451_545.0));
        assert!(s.starts_with("JD(UT1)"), "{s}");
        let s = format!("{}", Time::<TT>::new(2_451_545.0));
        assert!(s.starts_with("JD(TT)"), "{s}");
    }

    #[test]
    fn test_serde_as_bare_number() {
        let t = Time::<UT>::new(2_460_000.25);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "2460000.25");
        let back: Time<UT> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Typed decoding of the oracle's raw circumstance vectors.
//!
//! The oracle answers eclipse and occultation queries with flat `f64`
//! vectors whose layout is fixed per function. Decoding happens exactly once,
//! right after the call; the engine never indexes a raw vector itself.
//!
//! # Global vector
//!
//! | Index | Solar eclipse | Lunar eclipse | Occultation |
//! |-------|---------------|---------------|-------------|
//! | 0 | type flags | type flags | type flags |
//! | 1 | maximum | maximum | maximum |
//! | 3 / 4 | begin / end | partial begin / end | begin / end |
//! | 5 / 6 | totality begin / end | totality begin / end | totality begin / end |
//! | 7 / 8 | centre line begin / end | penumbral begin / end | centre line begin / end |
//!
//! The event *window* used to step the search cursor is `3/4` except for
//! lunar eclipses, which use the penumbral contacts `7/8`.
//!
//! # Local vector
//!
//! | Index | Solar eclipse | Lunar eclipse | Occultation |
//! |-------|---------------|---------------|-------------|
//! | 0 | type flags | type flags | type flags |
//! | 1 | local maximum | local maximum | local maximum |
//! | 2..=5 | 1st–4th contact | 1st–4th contact | 1st–4th contact |
//! | 7 / 8 | diameter ratio / fraction covered | | |
//! | 10 / 11 | Sun azimuth / altitude | | |
//! | 11 / 12 | | umbral / penumbral magnitude | Moon az / alt at disappearance |
//! | 13 / 14 | | | Moon az / alt at reappearance |
//! | 14 | magnitude | | |
//! | 15 / 16 | Saros series / member | | |
//! | 15 / 17 | | Moon azimuth / altitude | |
//! | 17 / 18 | Moon azimuth / altitude | | |
//! | 20 / 21 | | Saros series / member | |
//!
//! A vector shorter than its layout requires is rejected as if the oracle had
//! returned nothing.

use super::types::EventKind;
use crate::instant::Time;
use crate::scales::UT;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Type flags
// ═══════════════════════════════════════════════════════════════════════════

/// Raw event-type bitmask as produced by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventFlags(pub u32);

impl EventFlags {
    pub const CENTRAL: u32 = 1;
    pub const NONCENTRAL: u32 = 2;
    pub const TOTAL: u32 = 4;
    pub const ANNULAR: u32 = 8;
    pub const PARTIAL: u32 = 16;
    pub const HYBRID: u32 = 32;
    pub const PENUMBRAL: u32 = 64;

    /// Interpret the leading element of an oracle vector.
    ///
    /// Negative or non-finite values carry no flags.
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_finite() && raw >= 0.0 {
            Self(raw as u32)
        } else {
            Self(0)
        }
    }

    #[inline]
    pub const fn contains(self, bit: u32) -> bool {
        self.0 & bit == bit
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Decode into the single most significant classification.
    pub fn kind(self) -> EclipseKind {
        EclipseKind::classify(self)
    }
}

/// Typed event classification.
///
/// Decoded from [`EventFlags`] through a fixed priority table: when several
/// bits are set the more complete phase wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EclipseKind {
    Total,
    Annular,
    Hybrid,
    Partial,
    Penumbral,
    Other,
}

/// Highest priority first.
const PRIORITY: [(u32, EclipseKind); 5] = [
    (EventFlags::TOTAL, EclipseKind::Total),
    (EventFlags::ANNULAR, EclipseKind::Annular),
    (EventFlags::HYBRID, EclipseKind::Hybrid),
    (EventFlags::PARTIAL, EclipseKind::Partial),
    (EventFlags::PENUMBRAL, EclipseKind::Penumbral),
];

impl EclipseKind {
    pub fn classify(flags: EventFlags) -> Self {
        PRIORITY
            .iter()
            .find(|(bit, _)| flags.contains(*bit))
            .map_or(EclipseKind::Other, |&(_, kind)| kind)
    }

    pub const fn label(self) -> &'static str {
        match self {
            EclipseKind::Total => "Total",
            EclipseKind::Annular => "Annular",
            EclipseKind::Hybrid => "Hybrid",
            EclipseKind::Partial => "Partial",
            EclipseKind::Penumbral => "Penumbral",
            EclipseKind::Other => "Other",
        }
    }
}

impl fmt::Display for EclipseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Shared pieces
// ═══════════════════════════════════════════════════════════════════════════

/// Begin/end pair used to step the search cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventWindow {
    pub begin: Time<UT>,
    pub end: Time<UT>,
}

impl EventWindow {
    /// The edge a search moving in `direction` continues from.
    pub fn trailing_edge(&self, direction: super::Direction) -> Time<UT> {
        match direction {
            super::Direction::Forward => self.end,
            super::Direction::Backward => self.begin,
        }
    }
}

/// Azimuth/altitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizontal {
    pub azimuth: f64,
    pub altitude: f64,
}

/// Saros series and member number of an eclipse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saros {
    pub series: i32,
    pub member: i32,
}

/// A phase boundary the oracle reports as zero (or negative) when absent.
#[inline]
fn phase(raw: f64) -> Option<Time<UT>> {
    (raw > 0.0).then(|| Time::new(raw))
}

// ═══════════════════════════════════════════════════════════════════════════
// GlobalCircumstance
// ═══════════════════════════════════════════════════════════════════════════

/// Minimum global vector length for every event kind.
pub const GLOBAL_LEN: usize = 9;

/// An event as seen from anywhere on Earth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalCircumstance {
    pub flags: EventFlags,
    pub max_time: Time<UT>,
    pub begin: Time<UT>,
    pub end: Time<UT>,
    pub total_begin: Option<Time<UT>>,
    pub total_end: Option<Time<UT>>,
    /// Centre-line contacts (solar, occultation) or penumbral contacts (lunar).
    pub outer_begin: Option<Time<UT>>,
    pub outer_end: Option<Time<UT>>,
    pub window: EventWindow,
}

impl GlobalCircumstance {
    /// Decode a raw global vector; `None` when it is too short.
    pub fn decode(kind: EventKind, raw: &[f64]) -> Option<Self> {
        if raw.len() < GLOBAL_LEN {
            return None;
        }
        let begin = Time::new(raw[3]);
        let end = Time::new(raw[4]);
        let window = match kind {
            EventKind::LunarEclipse => EventWindow {
                begin: Time::new(raw[7]),
                end: Time::new(raw[8]),
            },
            EventKind::SolarEclipse | EventKind::Occultation(_) => EventWindow { begin, end },
        };
        Some(Self {
            flags: EventFlags::from_raw(raw[0]),
            max_time: Time::new(raw[1]),
            begin,
            end,
            total_begin: phase(raw[5]),
            total_end: phase(raw[6]),
            outer_begin: phase(raw[7]),
            outer_end: phase(raw[8]),
            window,
        })
    }

    #[inline]
    pub fn kind(&self) -> EclipseKind {
        self.flags.kind()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LocalCircumstance
// ═══════════════════════════════════════════════════════════════════════════

/// Category-specific local fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "kebab-case")]
pub enum LocalDetail {
    Solar {
        /// Apparent Moon/Sun diameter ratio.
        ratio: f64,
        fraction_covered: f64,
        magnitude: f64,
        saros: Saros,
        moon: Horizontal,
    },
    Lunar {
        umbral_magnitude: f64,
        penumbral_magnitude: f64,
        saros: Saros,
    },
    Occultation {
        moon_at_end: Horizontal,
    },
}

/// The same event as seen from the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalCircumstance {
    pub flags: EventFlags,
    pub max_time: Time<UT>,
    /// First to fourth contact.
    pub contacts: [Time<UT>; 4],
    /// Sun (solar) or Moon position at maximum, or Moon at disappearance
    /// for an occultation.
    pub horizon: Horizontal,
    pub detail: LocalDetail,
}

impl LocalCircumstance {
    /// Minimum local vector length for `kind`.
    pub const fn min_len(kind: EventKind) -> usize {
        match kind {
            EventKind::SolarEclipse => 19,
            EventKind::LunarEclipse => 22,
            EventKind::Occultation(_) => 15,
        }
    }

    /// Decode a raw local vector; `None` when it is too short.
    pub fn decode(kind: EventKind, raw: &[f64]) -> Option<Self> {
        if raw.len() < Self::min_len(kind) {
            return None;
        }
        let (horizon, detail) = match kind {
            EventKind::SolarEclipse => (
                Horizontal {
                    azimuth: raw[10],
                    altitude: raw[11],
                },
                LocalDetail::Solar {
                    ratio: raw[7],
                    fraction_covered: raw[8],
                    magnitude: raw[14],
                    saros: Saros {
                        series: raw[15] as i32,
                        member: raw[16] as i32,
                    },
                    moon: Horizontal {
                        azimuth: raw[17],
                        altitude: raw[18],
                    },
                },
            ),
            EventKind::LunarEclipse => (
                Horizontal {
                    azimuth: raw[15],
                    altitude: raw[17],
                },
                LocalDetail::Lunar {
                    umbral_magnitude: raw[11],
                    penumbral_magnitude: raw[12],
                    saros: Saros {
                        series: raw[20] as i32,
                        member: raw[21] as i32,
                    },
                },
            ),
            EventKind::Occultation(_) => (
                Horizontal {
                    azimuth: raw[11],
                    altitude: raw[12],
                },
                LocalDetail::Occultation {
                    moon_at_end: Horizontal {
                        azimuth: raw[13],
                        altitude: raw[14],
                    },
                },
            ),
        };
        Some(Self {
            flags: EventFlags::from_raw(raw[0]),
            max_time: Time::new(raw[1]),
            contacts: [
                Time::new(raw[2]),
                Time::new(raw[3]),
                Time::new(raw[4]),
                Time::new(raw[5]),
            ],
            horizon,
            detail,
        })
    }

    #[inline]
    pub fn kind(&self) -> EclipseKind {
        self.flags.kind()
    }
}

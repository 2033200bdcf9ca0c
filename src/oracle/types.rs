// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Value types shared by every oracle call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The ten catalog bodies, in oracle index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    /// Every body, ordered by [`Body::index`].
    pub const ALL: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Bodies the Moon can occult in an all-planets sweep.
    pub const PLANETS: [Body; 8] = [
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Oracle body index (0 = Sun, 1 = Moon, 2..=9 = Mercury..Pluto).
    #[inline]
    pub const fn index(self) -> i32 {
        self as i32
    }

    /// Inverse of [`Body::index`].
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Whether a lunar occultation of this body is meaningful.
    #[inline]
    pub const fn is_occultable(self) -> bool {
        !matches!(self, Body::Sun | Body::Moon)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geographic observer position plus the refraction inputs the oracle takes.
///
/// Longitude and latitude are in degrees (east and north positive),
/// elevation in metres. Pressure (hPa) and temperature (°C) default to `0.0`,
/// which lets the oracle pick its own standard atmosphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObserverLocation {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub temperature: f64,
}

impl ObserverLocation {
    pub const fn new(longitude: f64, latitude: f64, elevation: f64) -> Self {
        Self {
            longitude,
            latitude,
            elevation,
            pressure: 0.0,
            temperature: 0.0,
        }
    }

    /// Override the atmosphere used for refraction.
    pub const fn with_atmosphere(mut self, pressure: f64, temperature: f64) -> Self {
        self.pressure = pressure;
        self.temperature = temperature;
        self
    }
}

/// Search direction along the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// `+1.0` forward, `-1.0` backward.
    #[inline]
    pub const fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    /// The integer flag native ephemeris backends take (`0` forward, `1` backward).
    #[inline]
    pub const fn backward_flag(self) -> i32 {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }
}

/// The discrete event families the oracle can locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    SolarEclipse,
    LunarEclipse,
    /// Occultation of the given body by the Moon.
    Occultation(Body),
}

impl EventKind {
    /// Body whose rise/set brackets a locally visible event.
    pub const fn context_body(self) -> Body {
        match self {
            EventKind::SolarEclipse => Body::Sun,
            EventKind::LunarEclipse | EventKind::Occultation(_) => Body::Moon,
        }
    }

    /// Occulted body, if any.
    pub const fn target(self) -> Option<Body> {
        match self {
            EventKind::Occultation(body) => Some(body),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::SolarEclipse => f.write_str("solar eclipse"),
            EventKind::LunarEclipse => f.write_str("lunar eclipse"),
            EventKind::Occultation(body) => write!(f, "occultation of {body}"),
        }
    }
}

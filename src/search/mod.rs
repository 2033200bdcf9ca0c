// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The event search engine.
//!
//! Three stepping regimes share one engine:
//!
//! | Request | Steps | Slots written | Range |
//! |---------|-------|---------------|-------|
//! | solar / lunar eclipse, single-planet occultation | [`SLOT_COUNT`] events along the time axis | `0..10` in step order | yes |
//! | all-planets occultation sweep | one per planet, Mercury..Pluto | `2..10`, then placeholder rows in `0`, `1` | no |
//! | catalog snapshot | one per [`Body`](crate::oracle::Body) | `0..10` | no |
//!
//! A temporal search keeps one [`LocalCircumstance`](crate::oracle::LocalCircumstance)
//! ahead of the global cursor. A global event is *visible locally* when the
//! two maxima are at most [`VISIBILITY_WINDOW`] apart; only then is the local
//! circumstance consumed and a new one requested from the event's trailing
//! edge. Non-visible events leave the pending local circumstance in place
//! for the next step.
//!
//! Cancellation is checked once per step, before any oracle call. Oracle
//! failures end the run with [`Outcome::Failed`]; rows already written stay.
//! A sweep that stops early still writes its two placeholder rows.

mod engine;
mod event;
mod path;
mod snapshot;

pub use engine::SearchEngine;
pub use event::Event;
pub use path::{GroundPoint, PATH_SAMPLES};
pub use snapshot::Snapshot;

pub use crate::store::SLOT_COUNT;

use crate::instant::Time;
use crate::oracle::{Body, Direction, EventKind};
use crate::range::SearchRange;
use crate::scales::UT;
use crate::store::Category;
use qtty::Days;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum separation between local and global maxima for a locally visible event.
pub const VISIBILITY_WINDOW: Days = Days::new(1.0);

/// Occultation searches step this far past the global maximum instead of
/// using the event window.
pub const OCCULTATION_STEP: Days = Days::new(2.0);

/// A temporal search over one event family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub kind: EventKind,
    pub start: Time<UT>,
    pub direction: Direction,
}

impl SearchRequest {
    pub const fn new(kind: EventKind, start: Time<UT>, direction: Direction) -> Self {
        Self {
            kind,
            start,
            direction,
        }
    }

    pub const fn solar(start: Time<UT>, direction: Direction) -> Self {
        Self::new(EventKind::SolarEclipse, start, direction)
    }

    pub const fn lunar(start: Time<UT>, direction: Direction) -> Self {
        Self::new(EventKind::LunarEclipse, start, direction)
    }

    /// Occultations of `body`; the Sun or the Moon selects the all-planets sweep.
    pub const fn occultation(body: Body, start: Time<UT>, direction: Direction) -> Self {
        Self::new(EventKind::Occultation(body), start, direction)
    }

    /// Whether this request runs the all-planets sweep.
    pub const fn is_sweep(&self) -> bool {
        match self.kind {
            EventKind::Occultation(body) => !body.is_occultable(),
            _ => false,
        }
    }

    pub const fn category(&self) -> Category {
        match self.kind {
            EventKind::SolarEclipse => Category::SolarEclipse,
            EventKind::LunarEclipse => Category::LunarEclipse,
            EventKind::Occultation(_) => Category::LunarOccultation,
        }
    }
}

/// Which oracle call ended a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OracleFailure {
    /// Local circumstance at the start time.
    InitialLocal,
    /// Global circumstance at the cursor.
    Global,
    /// Local circumstance after a visible event.
    ReseedLocal,
    /// Local circumstance for one planet of the sweep.
    SweepLocal { body: Body },
    /// Global circumstance for one planet of the sweep.
    SweepGlobal { body: Body },
    /// Position lookup of a snapshot body.
    Position { body: Body },
    /// Rise/set lookup of a snapshot body.
    RiseSet { body: Body },
}

impl OracleFailure {
    /// Stable numeric code reported to callers.
    pub const fn code(self) -> u16 {
        match self {
            OracleFailure::InitialLocal | OracleFailure::Position { .. } => 100,
            OracleFailure::Global | OracleFailure::RiseSet { .. } => 200,
            OracleFailure::ReseedLocal => 300,
            OracleFailure::SweepLocal { .. } => 400,
            OracleFailure::SweepGlobal { .. } => 500,
        }
    }
}

impl fmt::Display for OracleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleFailure::InitialLocal => write!(f, "initial local lookup failed"),
            OracleFailure::Global => write!(f, "global lookup failed"),
            OracleFailure::ReseedLocal => write!(f, "local re-seed lookup failed"),
            OracleFailure::SweepLocal { body } => write!(f, "local lookup for {body} failed"),
            OracleFailure::SweepGlobal { body } => write!(f, "global lookup for {body} failed"),
            OracleFailure::Position { body } => write!(f, "position of {body} failed"),
            OracleFailure::RiseSet { body } => write!(f, "rise/set of {body} failed"),
        }?;
        write!(f, " (code {})", self.code())
    }
}

/// Terminal result of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Every slot written. Temporal searches carry the covered range.
    Completed(Option<SearchRange>),
    Cancelled,
    Failed(OracleFailure),
}

impl Outcome {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub const fn range(&self) -> Option<SearchRange> {
        match self {
            Outcome::Completed(range) => *range,
            _ => None,
        }
    }

    pub const fn failure_code(&self) -> Option<u16> {
        match self {
            Outcome::Failed(failure) => Some(failure.code()),
            _ => None,
        }
    }
}

/// One progress tick: `step` of `total` slots written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub step: usize,
    pub total: usize,
}

/// Engine state, observable between and during runs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    /// Working on the given slot.
    Stepping(usize),
    Completed,
    Cancelled,
    Failed(OracleFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_codes() {
        assert_eq!(OracleFailure::InitialLocal.code(), 100);
        assert_eq!(OracleFailure::Global.code(), 200);
        assert_eq!(OracleFailure::ReseedLocal.code(), 300);
        assert_eq!(OracleFailure::SweepLocal { body: Body::Mars }.code(), 400);
        assert_eq!(OracleFailure::SweepGlobal { body: Body::Mars }.code(), 500);
        assert_eq!(OracleFailure::Position { body: Body::Sun }.code(), 100);
        assert_eq!(OracleFailure::RiseSet { body: Body::Sun }.code(), 200);
    }

    #[test]
    fn luminary_occultation_is_sweep() {
        let t = Time::new(2_460_000.0);
        assert!(SearchRequest::occultation(Body::Sun, t, Direction::Forward).is_sweep());
        assert!(SearchRequest::occultation(Body::Moon, t, Direction::Forward).is_sweep());
        assert!(!SearchRequest::occultation(Body::Venus, t, Direction::Forward).is_sweep());
        assert!(!SearchRequest::solar(t, Direction::Forward).is_sweep());
    }

    #[test]
    fn request_categories() {
        let t = Time::new(2_460_000.0);
        assert_eq!(SearchRequest::solar(t, Direction::Forward).category(), Category::SolarEclipse);
        assert_eq!(SearchRequest::lunar(t, Direction::Backward).category(), Category::LunarEclipse);
        assert_eq!(
            SearchRequest::occultation(Body::Saturn, t, Direction::Forward).category(),
            Category::LunarOccultation
        );
    }

    #[test]
    fn failure_display_carries_code() {
        let text = OracleFailure::SweepGlobal { body: Body::Jupiter }.to_string();
        assert!(text.contains("Jupiter"));
        assert!(text.ends_with("(code 500)"));
    }
}

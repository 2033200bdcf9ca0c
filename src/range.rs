// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The span covered by the most recent completed search.
//!
//! A [`SearchRange`] is persisted per category so that "next" and
//! "previous" actions resume from where the last run stopped instead of
//! restarting from the wall clock.

use crate::instant::Time;
use crate::oracle::{Direction, EventWindow};
use crate::scales::UT;
use qtty::Days;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Boundaries of a completed search.
///
/// `first`/`last` are the maximum times of the chronologically earliest and
/// latest events. The window edges next to them are kept so a resumed search
/// starts past the events already listed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchRange {
    pub first: Time<UT>,
    pub last: Time<UT>,
    pub first_begin: Time<UT>,
    pub last_end: Time<UT>,
}

/// The maximum time and window of one search step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StepBoundary {
    pub max_time: Time<UT>,
    pub window: EventWindow,
}

impl SearchRange {
    /// A range whose window edges coincide with the maxima.
    pub fn new(first: Time<UT>, last: Time<UT>) -> Self {
        Self {
            first,
            last,
            first_begin: first,
            last_end: last,
        }
    }

    /// Assemble from the first and last step of a run in `direction`.
    ///
    /// Step 0 is the chronologically earliest event of a forward run and the
    /// latest of a backward one.
    pub(crate) fn from_steps(
        direction: Direction,
        step_first: StepBoundary,
        step_last: StepBoundary,
    ) -> Self {
        let (earliest, latest) = match direction {
            Direction::Forward => (step_first, step_last),
            Direction::Backward => (step_last, step_first),
        };
        Self {
            first: earliest.max_time,
            last: latest.max_time,
            first_begin: earliest.window.begin,
            last_end: latest.window.end,
        }
    }

    /// Start time for a follow-up search in `direction`.
    ///
    /// Forward continues after the latest event, backward before the
    /// earliest one.
    pub fn resume_from(&self, direction: Direction) -> Time<UT> {
        match direction {
            Direction::Forward => self.last_end,
            Direction::Backward => self.first_begin,
        }
    }

    /// Whether `t` lies between the first and last event maxima.
    pub fn contains(&self, t: Time<UT>) -> bool {
        self.first <= t && t <= self.last
    }

    /// Time between the first and last event maxima.
    pub fn span(&self) -> Days {
        self.last - self.first
    }
}

impl fmt::Display for SearchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} → {}]", self.first, self.last)
    }
}

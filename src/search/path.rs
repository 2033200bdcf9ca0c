// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Ground track of a solar eclipse's central line.

use crate::instant::Time;
use crate::oracle::{EventWindow, GlobalCircumstance};
use crate::scales::UT;
use qtty::Days;
use serde::{Deserialize, Serialize};

/// Samples along a central path, both window edges included.
pub const PATH_SAMPLES: usize = 81;

/// Where the shadow axis meets the ground at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPoint {
    pub at: Time<UT>,
    pub longitude: f64,
    pub latitude: f64,
}

impl GroundPoint {
    /// Decode a `[longitude, latitude]` answer.
    pub fn decode(at: Time<UT>, raw: [f64; 2]) -> Self {
        let [longitude, latitude] = raw;
        Self {
            at,
            longitude,
            latitude,
        }
    }
}

/// The window the track spans: the centre-line contacts when the eclipse
/// has them, the whole global event otherwise.
pub(crate) fn track_window(global: &GlobalCircumstance) -> EventWindow {
    match (global.outer_begin, global.outer_end) {
        (Some(begin), Some(end)) => EventWindow { begin, end },
        _ => EventWindow {
            begin: global.begin,
            end: global.end,
        },
    }
}

/// `samples` evenly spaced instants from `window.begin` to `window.end`.
pub(crate) fn sample_times(window: EventWindow, samples: usize) -> Vec<Time<UT>> {
    match samples {
        0 => Vec::new(),
        1 => vec![window.begin],
        n => {
            let interval = (window.end - window.begin).value() / (n - 1) as f64;
            (0..n)
                .map(|k| window.begin + Days::new(interval * k as f64))
                .collect()
        }
    }
}

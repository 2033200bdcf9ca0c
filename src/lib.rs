// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Eclipse and occultation search over a pluggable ephemeris.
//!
//! The crate does no astronomy of its own. An [`EphemerisOracle`] answers
//! position, rise/set and eclipse/occultation queries; this crate steps
//! through time asking it questions, reconciles what happens on Earth with
//! what one observer sees, and writes the results into a bounded
//! [`ResultStore`].
//!
//! # Core types
//!
//! - [`Time<S>`]: Julian instant parameterised by a [`TimeScale`] marker.
//! - [`JulianMoment`]: one instant on both the [`TT`] and [`UT`] axes.
//! - [`CivilInstant`]: calendar fields plus a UTC offset.
//! - [`SearchEngine`]: temporal searches, the all-planets occultation
//!   sweep and catalog snapshots.
//! - [`TaskController`]: runs one engine job at a time on a worker thread.
//!
//! # Searches
//!
//! | Request | Context body | Cursor advance |
//! |---------|--------------|----------------|
//! | [`SearchRequest::solar`] | Sun | event window edge |
//! | [`SearchRequest::lunar`] | Moon | penumbral window edge |
//! | [`SearchRequest::occultation`] | Moon | ±2 days from maximum |
//!
//! Every temporal search writes exactly [`SLOT_COUNT`] rows on completion
//! and reports the [`SearchRange`] it covered.
//!
//! # ΔT
//!
//! **ΔT = TT − UT** comes from the Meeus piecewise model and is applied when
//! a `Time<UT>` is converted to `Time<TT>`. The raw value in seconds is
//! available via [`Time::<UT>::delta_t()`](Time::delta_t).

mod delta_t;
mod error;
pub(crate) mod instant;
pub(crate) mod scales;

pub mod civil;
pub mod config;
pub mod oracle;
pub mod range;
pub mod riseset;
pub mod search;
pub mod store;
pub mod task;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use civil::{CivilInstant, JulianMoment, TimeError};
pub use config::{ConfigError, SearchConfig};
pub use error::{Error, Result};
pub use instant::{Time, TimeScale};
pub use oracle::{Body, Direction, EphemerisOracle, EventKind, ObserverLocation};
pub use range::SearchRange;
pub use search::{GroundPoint, Outcome, SearchEngine, SearchRequest, PATH_SAMPLES, SLOT_COUNT};
pub use store::{Category, MemoryStore, ResultStore, StoreError};
pub use scales::{TT, UT};
pub use task::{Job, TaskController, TaskEvent, TaskStatus};

#[cfg(feature = "sqlite")]
pub use store::SqliteStore;

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Bounded, slot-addressed result tables.
//!
//! Each [`Category`] owns exactly [`SLOT_COUNT`] slots. A run writes slots
//! `0..SLOT_COUNT` in order, overwriting whatever was there; nothing is ever
//! appended or merged. Writes are independent, so an interrupted run leaves
//! a mix of old and new rows. Every row carries the generation of the run
//! that wrote it and [`rows_are_consistent`] tells the two apart.
//!
//! Two backends are provided:
//!
//! | Backend | Persistence | Feature |
//! |---------|-------------|---------|
//! | [`MemoryStore`] | process lifetime | always |
//! | [`SqliteStore`] | SQLite file | `sqlite` |

mod memory;
mod row;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryStore;
pub use row::{
    rows_are_consistent, EventRow, LocationRecord, Record, SnapshotRow, SENTINEL, SENTINEL_INT,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::range::SearchRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slots per category.
pub const SLOT_COUNT: usize = 10;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("slot {slot} out of range (capacity {capacity})")]
    SlotOutOfRange { slot: usize, capacity: usize },

    #[error("{record} record cannot be stored in {category}")]
    CategoryMismatch {
        category: Category,
        record: &'static str,
    },

    #[error("corrupt store data: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = core::result::Result<T, StoreError>;

/// One rolling table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    SolarEclipse,
    LunarEclipse,
    LunarOccultation,
    PlanetSnapshot,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::SolarEclipse,
        Category::LunarEclipse,
        Category::LunarOccultation,
        Category::PlanetSnapshot,
    ];

    /// Stable identifier used as table key by persistent backends.
    pub const fn key(self) -> &'static str {
        match self {
            Category::SolarEclipse => "solar_eclipse",
            Category::LunarEclipse => "lunar_eclipse",
            Category::LunarOccultation => "lunar_occultation",
            Category::PlanetSnapshot => "planet_snapshot",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Whether `record` has the shape this table holds.
    pub fn accepts(self, record: &Record) -> bool {
        match self {
            Category::PlanetSnapshot => matches!(record, Record::Snapshot(_)),
            _ => matches!(record, Record::Event(_)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Validate a write before it reaches a backend.
pub(crate) fn check_write(category: Category, slot: usize, record: &Record) -> Result<()> {
    if slot >= SLOT_COUNT {
        return Err(StoreError::SlotOutOfRange {
            slot,
            capacity: SLOT_COUNT,
        });
    }
    if !category.accepts(record) {
        return Err(StoreError::CategoryMismatch {
            category,
            record: record.variant_name(),
        });
    }
    if record.slot() != slot {
        return Err(StoreError::Corrupt(format!(
            "record for slot {} written to slot {slot}",
            record.slot()
        )));
    }
    Ok(())
}

pub(crate) fn check_slot(slot: usize) -> Result<()> {
    if slot >= SLOT_COUNT {
        return Err(StoreError::SlotOutOfRange {
            slot,
            capacity: SLOT_COUNT,
        });
    }
    Ok(())
}

/// Persistence collaborator for search results.
///
/// Implementations are owned by one run at a time; the task controller
/// serialises access.
pub trait ResultStore: Send {
    /// Overwrite `slot` of `category`.
    fn write(&mut self, category: Category, slot: usize, record: &Record) -> Result<()>;

    /// Read one slot; `None` if it was never written.
    fn read_one(&self, category: Category, slot: usize) -> Result<Option<Record>>;

    /// Read every slot in order.
    fn read_all(&self, category: Category) -> Result<Vec<Option<Record>>> {
        (0..SLOT_COUNT)
            .map(|slot| self.read_one(category, slot))
            .collect()
    }

    /// Reserve a fresh generation number for a run over `category`.
    fn next_generation(&mut self, category: Category) -> Result<u64>;

    /// Remember the range of the latest completed run.
    fn save_range(&mut self, category: Category, range: &SearchRange) -> Result<()>;

    fn load_range(&self, category: Category) -> Result<Option<SearchRange>>;

    fn save_location(&mut self, record: &LocationRecord) -> Result<()>;

    fn load_location(&self) -> Result<Option<LocationRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Direction;

    #[test]
    fn category_keys_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::from_key(c.key()), Some(c));
        }
        assert_eq!(Category::from_key("nope"), None);
    }

    #[test]
    fn write_checks() {
        let event = Record::Event(EventRow::sentinel(2, 0, Direction::Forward));
        assert!(check_write(Category::SolarEclipse, 2, &event).is_ok());
        assert!(matches!(
            check_write(Category::SolarEclipse, SLOT_COUNT, &event),
            Err(StoreError::SlotOutOfRange { slot: 10, capacity: 10 })
        ));
        assert!(matches!(
            check_write(Category::PlanetSnapshot, 2, &event),
            Err(StoreError::CategoryMismatch { .. })
        ));
        assert!(matches!(
            check_write(Category::LunarEclipse, 3, &event),
            Err(StoreError::Corrupt(_))
        ));
    }
}

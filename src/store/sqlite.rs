// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! SQLite-backed store: one file, one table per row shape.
//!
//! ```text
//! event_rows     (category, slot) → EventRow columns
//! snapshot_rows  slot             → SnapshotRow columns
//! generations    category         → last issued generation
//! ranges         category         → SearchRange of the last completed run
//! location       single row       → LocationRecord
//! ```

use std::fs;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row};

use super::{
    check_slot, check_write, Category, EventRow, LocationRecord, Record, Result, ResultStore,
    SnapshotRow, StoreError,
};
use crate::instant::Time;
use crate::oracle::Direction;
use crate::range::SearchRange;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS event_rows (
        category            TEXT    NOT NULL,
        slot                INTEGER NOT NULL,
        generation          INTEGER NOT NULL,
        body                INTEGER NOT NULL,
        backward            INTEGER NOT NULL,
        visible             INTEGER NOT NULL,
        label               TEXT    NOT NULL,
        event_time          REAL    NOT NULL,
        global_flags        INTEGER NOT NULL,
        global_max          REAL    NOT NULL,
        global_begin        REAL    NOT NULL,
        global_end          REAL    NOT NULL,
        global_total_begin  REAL    NOT NULL,
        global_total_end    REAL    NOT NULL,
        global_outer_begin  REAL    NOT NULL,
        global_outer_end    REAL    NOT NULL,
        local_flags         INTEGER NOT NULL,
        local_max           REAL    NOT NULL,
        local_first         REAL    NOT NULL,
        local_second        REAL    NOT NULL,
        local_third         REAL    NOT NULL,
        local_fourth        REAL    NOT NULL,
        rise_time           REAL    NOT NULL,
        set_time            REAL    NOT NULL,
        azimuth             REAL    NOT NULL,
        altitude            REAL    NOT NULL,
        magnitude           REAL    NOT NULL,
        magnitude_secondary REAL    NOT NULL,
        ratio               REAL    NOT NULL,
        aux_azimuth         REAL    NOT NULL,
        aux_altitude        REAL    NOT NULL,
        saros_series        INTEGER NOT NULL,
        saros_member        INTEGER NOT NULL,
        PRIMARY KEY (category, slot)
    );
    CREATE TABLE IF NOT EXISTS snapshot_rows (
        slot            INTEGER PRIMARY KEY,
        generation      INTEGER NOT NULL,
        body            INTEGER NOT NULL,
        right_ascension REAL    NOT NULL,
        declination     REAL    NOT NULL,
        distance        REAL    NOT NULL,
        azimuth         REAL    NOT NULL,
        altitude        REAL    NOT NULL,
        magnitude       REAL    NOT NULL,
        rise_time       REAL    NOT NULL,
        set_time        REAL    NOT NULL,
        transit_time    REAL    NOT NULL
    );
    CREATE TABLE IF NOT EXISTS generations (
        category TEXT    PRIMARY KEY,
        value    INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS ranges (
        category    TEXT PRIMARY KEY,
        first_max   REAL NOT NULL,
        last_max    REAL NOT NULL,
        first_begin REAL NOT NULL,
        last_end    REAL NOT NULL
    );
    CREATE TABLE IF NOT EXISTS location (
        id                 INTEGER PRIMARY KEY CHECK (id = 0),
        latitude           REAL NOT NULL,
        longitude          REAL NOT NULL,
        elevation          REAL NOT NULL,
        pressure           REAL NOT NULL,
        temperature        REAL NOT NULL,
        utc_offset_minutes REAL NOT NULL,
        name               TEXT
    );
";

/// Result store persisted in a single SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// A throwaway database that lives as long as the store.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl ResultStore for SqliteStore {
    fn write(&mut self, category: Category, slot: usize, record: &Record) -> Result<()> {
        check_write(category, slot, record)?;
        match record {
            Record::Event(row) => write_event(&self.conn, category, row),
            Record::Snapshot(row) => write_snapshot(&self.conn, row),
        }
    }

    fn read_one(&self, category: Category, slot: usize) -> Result<Option<Record>> {
        check_slot(slot)?;
        match category {
            Category::PlanetSnapshot => Ok(self
                .conn
                .query_row(
                    "SELECT * FROM snapshot_rows WHERE slot = ?1",
                    rusqlite::params![slot as i64],
                    snapshot_from_row,
                )
                .optional()?
                .map(Record::Snapshot)),
            _ => {
                let row = self
                    .conn
                    .query_row(
                        "SELECT * FROM event_rows WHERE category = ?1 AND slot = ?2",
                        rusqlite::params![category.key(), slot as i64],
                        event_from_row,
                    )
                    .optional()?;
                row.map(|r| r.map(Record::Event)).transpose()
            }
        }
    }

    fn next_generation(&mut self, category: Category) -> Result<u64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO generations (category, value) VALUES (?1, 1)
             ON CONFLICT(category) DO UPDATE SET value = value + 1",
            rusqlite::params![category.key()],
        )?;
        let value: i64 = tx.query_row(
            "SELECT value FROM generations WHERE category = ?1",
            rusqlite::params![category.key()],
            |row| row.get(0),
        )?;
        tx.commit()?;
        u64::try_from(value)
            .map_err(|_| StoreError::Corrupt(format!("negative generation {value}")))
    }

    fn save_range(&mut self, category: Category, range: &SearchRange) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO ranges (category, first_max, last_max, first_begin, last_end)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                category.key(),
                range.first.value(),
                range.last.value(),
                range.first_begin.value(),
                range.last_end.value(),
            ],
        )?;
        Ok(())
    }

    fn load_range(&self, category: Category) -> Result<Option<SearchRange>> {
        Ok(self
            .conn
            .query_row(
                "SELECT first_max, last_max, first_begin, last_end FROM ranges WHERE category = ?1",
                rusqlite::params![category.key()],
                |row| {
                    Ok(SearchRange {
                        first: Time::new(row.get(0)?),
                        last: Time::new(row.get(1)?),
                        first_begin: Time::new(row.get(2)?),
                        last_end: Time::new(row.get(3)?),
                    })
                },
            )
            .optional()?)
    }

    fn save_location(&mut self, record: &LocationRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO location
                (id, latitude, longitude, elevation, pressure, temperature, utc_offset_minutes, name)
             VALUES (0, ?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                record.latitude,
                record.longitude,
                record.elevation,
                record.pressure,
                record.temperature,
                record.utc_offset_minutes,
                record.name,
            ],
        )?;
        Ok(())
    }

    fn load_location(&self) -> Result<Option<LocationRecord>> {
        Ok(self
            .conn
            .query_row(
                "SELECT latitude, longitude, elevation, pressure, temperature, utc_offset_minutes, name
                 FROM location WHERE id = 0",
                [],
                |row| {
                    Ok(LocationRecord {
                        latitude: row.get(0)?,
                        longitude: row.get(1)?,
                        elevation: row.get(2)?,
                        pressure: row.get(3)?,
                        temperature: row.get(4)?,
                        utc_offset_minutes: row.get(5)?,
                        name: row.get(6)?,
                    })
                },
            )
            .optional()?)
    }
}

// ── Row mapping ──────────────────────────────────────────────────────────

fn write_event(conn: &Connection, category: Category, row: &EventRow) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO event_rows (
            category, slot, generation, body, backward, visible, label, event_time,
            global_flags, global_max, global_begin, global_end,
            global_total_begin, global_total_end, global_outer_begin, global_outer_end,
            local_flags, local_max, local_first, local_second, local_third, local_fourth,
            rise_time, set_time, azimuth, altitude, magnitude, magnitude_secondary, ratio,
            aux_azimuth, aux_altitude, saros_series, saros_member
         ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
            ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16,
            ?17, ?18, ?19, ?20, ?21, ?22,
            ?23, ?24, ?25, ?26, ?27, ?28, ?29,
            ?30, ?31, ?32, ?33
         )",
        rusqlite::params![
            category.key(),
            row.slot as i64,
            row.generation as i64,
            row.body,
            row.direction.backward_flag(),
            row.visible,
            &row.label,
            row.event_time,
            row.global_flags,
            row.global_max,
            row.global_begin,
            row.global_end,
            row.global_total_begin,
            row.global_total_end,
            row.global_outer_begin,
            row.global_outer_end,
            row.local_flags,
            row.local_max,
            row.local_first,
            row.local_second,
            row.local_third,
            row.local_fourth,
            row.rise,
            row.set,
            row.azimuth,
            row.altitude,
            row.magnitude,
            row.magnitude_secondary,
            row.ratio,
            row.aux_azimuth,
            row.aux_altitude,
            row.saros_series,
            row.saros_member,
        ],
    )?;
    Ok(())
}

fn write_snapshot(conn: &Connection, row: &SnapshotRow) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO snapshot_rows (
            slot, generation, body, right_ascension, declination, distance,
            azimuth, altitude, magnitude, rise_time, set_time, transit_time
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        rusqlite::params![
            row.slot as i64,
            row.generation as i64,
            row.body,
            row.right_ascension,
            row.declination,
            row.distance,
            row.azimuth,
            row.altitude,
            row.magnitude,
            row.rise,
            row.set,
            row.transit,
        ],
    )?;
    Ok(())
}

/// Direction is decoded after the query so a bad value surfaces as `Corrupt`.
fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Result<EventRow>> {
    let backward: i64 = row.get("backward")?;
    let direction = match backward {
        0 => Direction::Forward,
        1 => Direction::Backward,
        other => {
            return Ok(Err(StoreError::Corrupt(format!(
                "invalid direction flag: {other}"
            ))))
        }
    };
    let slot: i64 = row.get("slot")?;
    let generation: i64 = row.get("generation")?;
    Ok(Ok(EventRow {
        slot: slot as usize,
        generation: generation as u64,
        body: row.get("body")?,
        direction,
        visible: row.get("visible")?,
        label: row.get("label")?,
        event_time: row.get("event_time")?,
        global_flags: row.get("global_flags")?,
        global_max: row.get("global_max")?,
        global_begin: row.get("global_begin")?,
        global_end: row.get("global_end")?,
        global_total_begin: row.get("global_total_begin")?,
        global_total_end: row.get("global_total_end")?,
        global_outer_begin: row.get("global_outer_begin")?,
        global_outer_end: row.get("global_outer_end")?,
        local_flags: row.get("local_flags")?,
        local_max: row.get("local_max")?,
        local_first: row.get("local_first")?,
        local_second: row.get("local_second")?,
        local_third: row.get("local_third")?,
        local_fourth: row.get("local_fourth")?,
        rise: row.get("rise_time")?,
        set: row.get("set_time")?,
        azimuth: row.get("azimuth")?,
        altitude: row.get("altitude")?,
        magnitude: row.get("magnitude")?,
        magnitude_secondary: row.get("magnitude_secondary")?,
        ratio: row.get("ratio")?,
        aux_azimuth: row.get("aux_azimuth")?,
        aux_altitude: row.get("aux_altitude")?,
        saros_series: row.get("saros_series")?,
        saros_member: row.get("saros_member")?,
    }))
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<SnapshotRow> {
    let slot: i64 = row.get("slot")?;
    let generation: i64 = row.get("generation")?;
    Ok(SnapshotRow {
        slot: slot as usize,
        generation: generation as u64,
        body: row.get("body")?,
        right_ascension: row.get("right_ascension")?,
        declination: row.get("declination")?,
        distance: row.get("distance")?,
        azimuth: row.get("azimuth")?,
        altitude: row.get("altitude")?,
        magnitude: row.get("magnitude")?,
        rise: row.get("rise_time")?,
        set: row.get("set_time")?,
        transit: row.get("transit_time")?,
    })
}

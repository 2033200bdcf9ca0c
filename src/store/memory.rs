// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! In-process store.

use super::{
    check_slot, check_write, Category, LocationRecord, Record, Result, ResultStore, SLOT_COUNT,
};
use crate::range::SearchRange;
use std::collections::HashMap;

/// Keeps every table in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<Category, Vec<Option<Record>>>,
    generations: HashMap<Category, u64>,
    ranges: HashMap<Category, SearchRange>,
    location: Option<LocationRecord>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total slot writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl ResultStore for MemoryStore {
    fn write(&mut self, category: Category, slot: usize, record: &Record) -> Result<()> {
        check_write(category, slot, record)?;
        let table = self
            .tables
            .entry(category)
            .or_insert_with(|| vec![None; SLOT_COUNT]);
        table[slot] = Some(record.clone());
        self.writes += 1;
        Ok(())
    }

    fn read_one(&self, category: Category, slot: usize) -> Result<Option<Record>> {
        check_slot(slot)?;
        Ok(self
            .tables
            .get(&category)
            .and_then(|table| table[slot].clone()))
    }

    fn next_generation(&mut self, category: Category) -> Result<u64> {
        let counter = self.generations.entry(category).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    fn save_range(&mut self, category: Category, range: &SearchRange) -> Result<()> {
        self.ranges.insert(category, *range);
        Ok(())
    }

    fn load_range(&self, category: Category) -> Result<Option<SearchRange>> {
        Ok(self.ranges.get(&category).copied())
    }

    fn save_location(&mut self, record: &LocationRecord) -> Result<()> {
        self.location = Some(record.clone());
        Ok(())
    }

    fn load_location(&self) -> Result<Option<LocationRecord>> {
        Ok(self.location.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instant::Time;
    use crate::oracle::Direction;
    use crate::store::{EventRow, StoreError};

    fn row(slot: usize, generation: u64) -> Record {
        Record::Event(EventRow::sentinel(slot, generation, Direction::Forward))
    }

    #[test]
    fn write_overwrites_in_place() {
        let mut store = MemoryStore::new();
        store.write(Category::SolarEclipse, 4, &row(4, 1)).unwrap();
        store.write(Category::SolarEclipse, 4, &row(4, 2)).unwrap();
        let got = store.read_one(Category::SolarEclipse, 4).unwrap().unwrap();
        assert_eq!(got.generation(), 2);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn unwritten_slots_read_as_none() {
        let store = MemoryStore::new();
        let all = store.read_all(Category::LunarEclipse).unwrap();
        assert_eq!(all.len(), SLOT_COUNT);
        assert!(all.iter().all(Option::is_none));
        assert!(matches!(
            store.read_one(Category::LunarEclipse, SLOT_COUNT),
            Err(StoreError::SlotOutOfRange { .. })
        ));
    }

    #[test]
    fn categories_are_independent() {
        let mut store = MemoryStore::new();
        store.write(Category::SolarEclipse, 0, &row(0, 1)).unwrap();
        assert!(store.read_one(Category::LunarEclipse, 0).unwrap().is_none());
    }

    #[test]
    fn generations_increase_per_category() {
        let mut store = MemoryStore::new();
        assert_eq!(store.next_generation(Category::SolarEclipse).unwrap(), 1);
        assert_eq!(store.next_generation(Category::SolarEclipse).unwrap(), 2);
        assert_eq!(store.next_generation(Category::LunarEclipse).unwrap(), 1);
    }

    #[test]
    fn range_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.load_range(Category::SolarEclipse).unwrap().is_none());
        let range = SearchRange::new(Time::new(10.0), Time::new(19.0));
        store.save_range(Category::SolarEclipse, &range).unwrap();
        assert_eq!(store.load_range(Category::SolarEclipse).unwrap(), Some(range));
    }
}

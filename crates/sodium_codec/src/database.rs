//! The in-memory image of a full dataset.

use crate::collection::Collection;
use crate::record::Record;
use std::collections::BTreeMap;

/// All ten canonical collections of a Sodium install.
///
/// A collection that has never been written to is indistinguishable from an
/// empty one; absent collections read as empty sequences, and equality
/// treats them the same.
#[derive(Debug, Clone, Default)]
pub struct Database {
    collections: BTreeMap<Collection, Vec<Record>>,
}

impl PartialEq for Database {
    fn eq(&self, other: &Self) -> bool {
        Collection::ALL
            .iter()
            .all(|&c| self.records(c) == other.records(c))
    }
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records of a collection (empty slice if never populated).
    #[must_use]
    pub fn records(&self, collection: Collection) -> &[Record] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns a mutable handle to a collection's record list.
    pub fn records_mut(&mut self, collection: Collection) -> &mut Vec<Record> {
        self.collections.entry(collection).or_default()
    }

    /// Replaces a collection's records wholesale.
    pub fn set_records(&mut self, collection: Collection, records: Vec<Record>) {
        self.collections.insert(collection, records);
    }

    /// Total number of records across all collections.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Iterates `(collection, record count)` pairs in numeric-ID order,
    /// including empty collections.
    pub fn counts(&self) -> impl Iterator<Item = (Collection, usize)> + '_ {
        Collection::ALL
            .iter()
            .map(move |&c| (c, self.records(c).len()))
    }
}

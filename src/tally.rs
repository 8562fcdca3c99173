//! Insertion-ordered count maps.
//!
//! [OrderedMap] pairs an `FxHashMap` index with a `Vec` of entries, so lookups
//! stay hashed while iteration follows first-insertion order. [AggregateMap]
//! nests two of them: path -> (date -> count).

use std::{borrow::Borrow, hash::Hash};

use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::record::{Date, LineFormat};

/// A hash map that remembers the order keys were first inserted in
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    index: FxHashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            index: FxHashMap::default(),
            entries: Vec::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    /// Returns the value for `key`, inserting `V::default()` at the back if absent.
    /// Only allocates an owned key on first sight.
    #[inline]
    pub fn get_or_insert_default<Q>(&mut self, key: &Q) -> &mut V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        V: Default,
    {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                let owned = key.to_owned();
                self.index.insert(owned.clone(), idx);
                self.entries.push((owned, V::default()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&idx| &mut self.entries[idx].1)
    }

    /// Inserts `value` under `key`, returning the previous value if there was one.
    /// A new key goes to the back; an existing key keeps its position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Reorders entries by key. The index is rebuilt to match.
    pub fn sort_keys(&mut self)
    where
        K: Ord,
    {
        self.entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        for (idx, (key, _)) in self.entries.iter().enumerate() {
            if let Some(slot) = self.index.get_mut(key) {
                *slot = idx;
            }
        }
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Requests per date for one path
pub type DateCounts = OrderedMap<Date, u64>;

/// Requests per path per date.
/// Paths iterate in first-seen order; dates iterate in first-seen order until
/// [AggregateMap::sort_dates] is called.
#[derive(Debug, Clone, Default)]
pub struct AggregateMap {
    paths: OrderedMap<Vec<u8>, DateCounts>,
}

impl AggregateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of distinct paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Counts one line if it holds a record, silently skips it otherwise.
    #[inline]
    pub fn record_line(&mut self, line: &[u8], format: &LineFormat) {
        if let Some((path, date)) = format.fields(line) {
            self.add(path, date, 1);
        }
    }

    #[inline]
    pub fn add(&mut self, path: &[u8], date: Date, count: u64) {
        *self
            .paths
            .get_or_insert_default(path)
            .get_or_insert_default(&date) += count;
    }

    /// Count for `(path, date)`, 0 if never seen
    pub fn count(&self, path: &str, date: &str) -> u64 {
        let Ok(date) = date.parse::<Date>() else {
            return 0;
        };
        self.paths
            .get(path.as_bytes())
            .and_then(|dates| dates.get(&date))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.paths
            .iter()
            .flat_map(|(_, dates)| dates.iter().map(|(_, n)| *n))
            .sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &[u8]> {
        self.paths.keys().map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &DateCounts)> {
        self.paths.iter().map(|(path, dates)| (path.as_slice(), dates))
    }

    /// Adds every count of `other` into `self`, walking `other` in its own
    /// insertion order so its new paths land at the back in that order.
    pub fn absorb(&mut self, other: AggregateMap) {
        for (path, dates) in other.paths {
            match self.paths.get_mut(&path) {
                Some(existing) => {
                    for (date, count) in dates {
                        *existing.get_or_insert_default(&date) += count;
                    }
                }
                None => {
                    self.paths.insert(path, dates);
                }
            }
        }
    }

    pub fn sort_dates(&mut self) {
        for (_, dates) in self.paths.entries.iter_mut() {
            dates.sort_keys();
        }
    }
}

/// Keys must be UTF-8. A lossy rendering could fold two distinct byte
/// strings into one key, and a reader would drop one of the duplicates.
fn utf8_key<'a, E: serde::ser::Error>(what: &str, key: &'a [u8]) -> Result<&'a str, E> {
    std::str::from_utf8(key).map_err(|_| {
        E::custom(format!(
            "{what} {:?} is not valid UTF-8",
            String::from_utf8_lossy(key)
        ))
    })
}

impl Serialize for AggregateMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.paths.len()))?;
        for (path, dates) in self.paths.iter() {
            map.serialize_entry(utf8_key::<S::Error>("path", path)?, &SerializeDates(dates))?;
        }
        map.end()
    }
}

struct SerializeDates<'a>(&'a DateCounts);

impl Serialize for SerializeDates<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (date, count) in self.0.iter() {
            map.serialize_entry(utf8_key::<S::Error>("date", date.as_bytes())?, count)?;
        }
        map.end()
    }
}

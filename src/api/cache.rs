//! Bounded lookup cache for entity display names.
//!
//! Flow and dataset names are looked up once per id and reused across views.
//! The cache is an owned value handed to whoever orchestrates fetching, with
//! a fixed capacity and least-recently-used eviction.

use std::fmt;

use indexmap::IndexMap;

/// Kind of catalog entity whose name is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// A flow (pipeline or model implementation).
    Flow,
    /// A dataset.
    Dataset,
}

impl EntityKind {
    /// REST path segment for this entity.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Dataset => "data",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Flow => "flow",
            Self::Dataset => "dataset",
        };
        write!(f, "{s}")
    }
}

/// Least-recently-used name cache with a fixed capacity.
///
/// Entries are kept in recency order: the front is evicted first.
#[derive(Debug, Clone)]
pub struct NameCache {
    capacity: usize,
    entries: IndexMap<(EntityKind, u64), String>,
}

impl NameCache {
    /// Create a cache holding at most `capacity` names.
    ///
    /// A capacity of zero disables caching.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: IndexMap::with_capacity(capacity) }
    }

    /// Look up a name, marking it as recently used.
    pub fn get(&mut self, kind: EntityKind, id: u64) -> Option<&str> {
        let index = self.entries.get_index_of(&(kind, id))?;
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get_index(last).map(|(_, name)| name.as_str())
    }

    /// Store a name, evicting the least recently used entry when full.
    pub fn insert(&mut self, kind: EntityKind, id: u64, name: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.shift_remove(&(kind, id));
        while self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert((kind, id), name.into());
    }

    /// Drop one entry. Returns the removed name.
    pub fn invalidate(&mut self, kind: EntityKind, id: u64) -> Option<String> {
        self.entries.shift_remove(&(kind, id))
    }

    /// Drop every entry of one kind.
    pub fn invalidate_kind(&mut self, kind: EntityKind) {
        self.entries.retain(|(k, _), _| *k != kind);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached names.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// The cache never holds more than its capacity.
        #[test]
        fn prop_never_exceeds_capacity(
            capacity in 0usize..16,
            ids in prop::collection::vec(0u64..64, 0..300)
        ) {
            let mut cache = NameCache::new(capacity);
            for id in ids {
                cache.insert(EntityKind::Flow, id, id.to_string());
                prop_assert!(cache.len() <= capacity);
            }
        }

        /// The most recently inserted name is always retrievable.
        #[test]
        fn prop_latest_insert_is_cached(
            capacity in 1usize..16,
            ids in prop::collection::vec(0u64..64, 1..300)
        ) {
            let mut cache = NameCache::new(capacity);
            for &id in &ids {
                cache.insert(EntityKind::Dataset, id, id.to_string());
            }
            let last = *ids.last().unwrap();
            let expected = last.to_string();
            prop_assert_eq!(cache.get(EntityKind::Dataset, last), Some(expected.as_str()));
        }
    }
}

//! IntMap: `u64`-keyed storage with stable slots and an optional entry limit.

use crate::error::MapError;
use crate::reentrancy::AccessGuard;
use core::hash::BuildHasher;
use hashbrown::HashTable;
use rustc_hash::FxBuildHasher;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Entry<V> {
    key: u64,
    value: V,
    hash: u64,
}

/// Map from canonical `u64` keys to values.
///
/// Entries live in a `SlotMap`; a `HashTable` indexes them by the hash of
/// their key. Each entry stores its hash so the index never rehashes keys.
/// When a limit is set, inserting a new key into a full map fails with
/// [`MapError::Full`]; overwriting an existing key always succeeds.
pub struct IntMap<V, S = FxBuildHasher> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<V>>,
    limit: Option<usize>,
    access: AccessGuard,
}

impl<V> IntMap<V> {
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_limit(capacity, None)
    }

    /// Preallocate `capacity` entries and refuse new keys beyond `limit`.
    pub fn with_capacity_and_limit(capacity: usize, limit: Option<usize>) -> Self {
        let capacity = limit.map_or(capacity, |l| capacity.min(l));
        Self {
            hasher: FxBuildHasher,
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
            limit,
            access: AccessGuard::new(),
        }
    }
}

impl<V> Default for IntMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(key, &value)` pairs of an `IntMap`.
pub struct Iter<'a, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<V, S> IntMap<V, S>
where
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
            limit: None,
            access: AccessGuard::new(),
        }
    }

    fn make_hash(&self, key: u64) -> u64 {
        self.hasher.hash_one(key)
    }

    fn find_slot(&self, key: u64) -> Option<DefaultKey> {
        let hash = self.make_hash(key);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| e.key == key)
                    .unwrap_or(false)
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of entries, if bounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn contains_key(&self, key: u64) -> bool {
        let _g = self.access.enter("contains_key");
        self.find_slot(key).is_some()
    }

    pub fn get(&self, key: u64) -> Option<&V> {
        let _g = self.access.enter("get");
        let k = self.find_slot(key)?;
        self.slots.get(k).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        let _g = self.access.enter("get_mut");
        let k = self.find_slot(key)?;
        self.slots.get_mut(k).map(|e| &mut e.value)
    }

    /// Insert or overwrite `key`. Returns the previous value on overwrite.
    pub fn insert(&mut self, key: u64, value: V) -> Result<Option<V>, MapError> {
        let _g = self.access.enter("insert");
        let hash = self.make_hash(key);
        match self.index.entry(
            hash,
            |&k| {
                self.slots
                    .get(k)
                    .map(|e| e.key == key)
                    .unwrap_or(false)
            },
            |&k| self.slots.get(k).map(|e| e.hash).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(o) => {
                let entry = self
                    .slots
                    .get_mut(*o.get())
                    .expect("indexed slot must be live");
                Ok(Some(core::mem::replace(&mut entry.value, value)))
            }
            hashbrown::hash_table::Entry::Vacant(v) => {
                if let Some(limit) = self.limit {
                    if self.slots.len() >= limit {
                        return Err(MapError::Full { limit });
                    }
                }
                let k = self.slots.insert(Entry { key, value, hash });
                let _ = v.insert(k);
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, key: u64) -> Option<V> {
        let _g = self.access.enter("remove");
        let hash = self.make_hash(key);
        let slots = &self.slots;
        let occupied = self
            .index
            .find_entry(hash, |&k| {
                slots.get(k).map(|e| e.key == key).unwrap_or(false)
            })
            .ok()?;
        let (k, _) = occupied.remove();
        self.slots.remove(k).map(|e| e.value)
    }

    /// Remove every entry, dropping the values.
    pub fn clear(&mut self) {
        let _g = self.access.enter("clear");
        self.index.clear();
        self.slots.clear();
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.slots.iter(),
        }
    }
}

//! The canonical map contract: the `u64`-keyed collaborator every table
//! stores its entries in.

use crate::error::MapError;
use crate::int_map::{self, IntMap};
use core::hash::BuildHasher;

/// A map from canonical `u64` keys to values.
///
/// `has`, `get`, `get_mut`, `set` and `del` are expected O(1). `set`
/// overwrites an existing key and may only fail when inserting a new one.
pub trait CanonicalMap {
    type Value;

    /// Iterator over `(key, &value)` pairs, in no particular order.
    type Iter<'a>: Iterator<Item = (u64, &'a Self::Value)>
    where
        Self: 'a;

    fn has(&self, key: u64) -> bool;

    fn get(&self, key: u64) -> Option<&Self::Value>;

    fn get_mut(&mut self, key: u64) -> Option<&mut Self::Value>;

    /// Write `value` under `key`, returning the value it replaced.
    fn set(&mut self, key: u64, value: Self::Value) -> Result<Option<Self::Value>, MapError>;

    fn del(&mut self, key: u64) -> Option<Self::Value>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    fn iter(&self) -> Self::Iter<'_>;
}

impl<V, S> CanonicalMap for IntMap<V, S>
where
    S: BuildHasher + Clone + Default,
{
    type Value = V;
    type Iter<'a>
        = int_map::Iter<'a, V>
    where
        Self: 'a;

    #[inline]
    fn has(&self, key: u64) -> bool {
        self.contains_key(key)
    }

    #[inline]
    fn get(&self, key: u64) -> Option<&V> {
        IntMap::get(self, key)
    }

    #[inline]
    fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        IntMap::get_mut(self, key)
    }

    #[inline]
    fn set(&mut self, key: u64, value: V) -> Result<Option<V>, MapError> {
        self.insert(key, value)
    }

    #[inline]
    fn del(&mut self, key: u64) -> Option<V> {
        self.remove(key)
    }

    fn len(&self) -> usize {
        IntMap::len(self)
    }

    fn clear(&mut self) {
        IntMap::clear(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        IntMap::iter(self)
    }
}

//! TypedTable: a table whose key and value types are fixed at compile time.

use crate::config::TableConfig;
use crate::error::TableError;
use crate::key::{FxKeyHasher, KeyHasher, TableKey};
use crate::table::Table;
use crate::value::TableValue;
use core::marker::PhantomData;

/// A [`Table`] restricted to one key type `K` and one value type `V`.
///
/// ```
/// use canon_table::TypedTable;
///
/// let mut scores: TypedTable<str, i16> = TypedTable::new();
/// scores.set("ann", -3).unwrap();
/// assert_eq!(scores.get("ann"), Some(-3));
/// ```
pub struct TypedTable<K: ?Sized, V, H = FxKeyHasher> {
    table: Table<H>,
    _types: PhantomData<fn(&K) -> V>,
}

impl<K, V> TypedTable<K, V>
where
    K: TableKey + ?Sized,
    V: TableValue,
{
    pub fn new() -> Self {
        Self::from_table(Table::new())
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self::from_table(Table::with_config(config))
    }
}

impl<K, V> Default for TypedTable<K, V>
where
    K: TableKey + ?Sized,
    V: TableValue,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> TypedTable<K, V, H>
where
    K: TableKey + ?Sized,
    V: TableValue,
    H: KeyHasher,
{
    /// Wrap an existing table. Entries written through other types stay
    /// visible and are reinterpreted as `V` on read.
    pub fn from_table(table: Table<H>) -> Self {
        Self {
            table,
            _types: PhantomData,
        }
    }

    pub fn set(&mut self, key: &K, value: V) -> Result<(), TableError> {
        self.table.set(key, value)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.table.get(key)
    }

    pub fn get_into(&self, key: &K, out: Option<&mut V>) -> bool {
        self.table.get_into(key, out)
    }

    pub fn has(&self, key: &K) -> bool {
        self.table.has(key)
    }

    pub fn del(&mut self, key: &K) -> Result<(), TableError> {
        self.table.del(key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) -> usize {
        self.table.clear()
    }

    pub fn as_table(&self) -> &Table<H> {
        &self.table
    }

    pub fn into_inner(self) -> Table<H> {
        self.table
    }
}

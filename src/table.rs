//! Table: typed facade over a single canonical map.
//!
//! Each canonical key maps to one [`Slot`] holding the packed value and,
//! for entries first inserted under a string key, the table's own copy of
//! that string. Value and owned key live and die together, so removing an
//! entry always releases its copy and the two can never disagree.

use crate::canonical_map::CanonicalMap;
use crate::config::TableConfig;
use crate::error::TableError;
use crate::int_map::IntMap;
use crate::key::{canonicalize, FxKeyHasher, KeyForm, KeyHasher, OwnedKey, TableKey};
use crate::reentrancy::AccessGuard;
use crate::value::TableValue;
use core::fmt;
use tracing::{debug, trace, warn};

/// One canonical entry: a packed value and the owned string key, if any.
#[derive(Debug)]
pub struct Slot {
    value: u64,
    owned: Option<OwnedKey>,
}

impl Slot {
    /// The packed 64-bit value.
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn owned_key(&self) -> Option<&OwnedKey> {
        self.owned.as_ref()
    }
}

/// A table addressable with any [`TableKey`] and storing any [`TableValue`].
///
/// ```
/// use canon_table::Table;
///
/// let mut t = Table::new();
/// t.set("alpha", 42i32).unwrap();
/// assert_eq!(t.get::<_, i32>("alpha"), Some(42));
/// t.del("alpha").unwrap();
/// assert!(!t.has("alpha"));
/// ```
pub struct Table<H = FxKeyHasher, M = IntMap<Slot>> {
    hasher: H,
    seed: u64,
    slots: M,
    access: AccessGuard,
}

impl Table {
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self::with_hasher(FxKeyHasher, config)
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: KeyHasher> Table<H> {
    pub fn with_hasher(hasher: H, config: TableConfig) -> Self {
        let slots = IntMap::with_capacity_and_limit(config.capacity, config.max_entries);
        Self::with_map(hasher, config.seed, slots)
    }
}

impl<H, M> Table<H, M>
where
    H: KeyHasher,
    M: CanonicalMap<Value = Slot>,
{
    /// Build a table over an existing (normally empty) canonical map.
    pub fn with_map(hasher: H, seed: u64, slots: M) -> Self {
        Self {
            hasher,
            seed,
            slots,
            access: AccessGuard::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The canonical `u64` a key resolves to in this table.
    pub fn canonical_key<K: TableKey>(&self, key: K) -> u64 {
        self.canonical(&key)
    }

    fn canonical<K: TableKey + ?Sized>(&self, key: &K) -> u64 {
        canonicalize(&key.key_form(), &self.hasher, self.seed)
    }

    /// Store `value` under `key`, overwriting any previous value.
    ///
    /// A string key that inserts a new canonical key is copied into the
    /// table. Later writes to the same canonical key keep that first copy.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Map` if the canonical map refuses a new entry.
    pub fn set<K, V>(&mut self, key: K, value: V) -> Result<(), TableError>
    where
        K: TableKey,
        V: TableValue,
    {
        let _g = self.access.enter("set");
        let form = key.key_form();
        let k = canonicalize(&form, &self.hasher, self.seed);
        let packed = value.pack();

        if let Some(slot) = self.slots.get_mut(k) {
            slot.value = packed;
            return Ok(());
        }

        let owned = match form {
            KeyForm::Bytes(bytes) => Some(OwnedKey::duplicate(bytes)),
            KeyForm::Integer(_) => None,
        };
        let owned_len = owned.as_ref().map(OwnedKey::len);
        if let Err(e) = self.slots.set(k, Slot { value: packed, owned }) {
            warn!(key = k, error = %e, "canonical map rejected insert");
            return Err(e.into());
        }
        if let Some(len) = owned_len {
            trace!(key = k, len, "took ownership of string key");
        }
        Ok(())
    }

    /// Look up `key` and unpack its slot as `V`.
    pub fn get<K, V>(&self, key: K) -> Option<V>
    where
        K: TableKey,
        V: TableValue,
    {
        let _g = self.access.enter("get");
        let k = self.canonical(&key);
        self.slots.get(k).map(|slot| V::unpack(slot.value))
    }

    /// Look up `key`, writing the result into `out` when given.
    ///
    /// On a miss `out` receives `V::DEFAULT` and `false` is returned.
    pub fn get_into<K, V>(&self, key: K, out: Option<&mut V>) -> bool
    where
        K: TableKey,
        V: TableValue,
    {
        let found = self.get::<K, V>(key);
        if let Some(out) = out {
            *out = found.unwrap_or(V::DEFAULT);
        }
        found.is_some()
    }

    pub fn has<K: TableKey>(&self, key: K) -> bool {
        let _g = self.access.enter("has");
        let k = self.canonical(&key);
        self.slots.has(k)
    }

    /// Remove `key` and release the string copy its entry owns.
    ///
    /// # Errors
    ///
    /// Returns `TableError::KeyNotFound` if the key is absent.
    pub fn del<K: TableKey>(&mut self, key: K) -> Result<(), TableError> {
        let _g = self.access.enter("del");
        let k = self.canonical(&key);
        let slot = self.slots.del(k).ok_or(TableError::KeyNotFound)?;
        if let Some(owned) = slot.owned {
            trace!(key = k, len = owned.len(), "released string key");
        }
        Ok(())
    }

    /// Remove every entry. Returns the number of string copies released.
    pub fn clear(&mut self) -> usize {
        let _g = self.access.enter("clear");
        let released = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.owned.is_some())
            .count();
        let entries = self.slots.len();
        self.slots.clear();
        debug!(entries, released, "cleared table");
        released
    }

    /// Number of entries that own a string copy.
    pub fn registry_len(&self) -> usize {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.owned.is_some())
            .count()
    }

    /// The table's copy of the string that first inserted `key`'s entry.
    pub fn owned_key<K: TableKey>(&self, key: K) -> Option<&[u8]> {
        let k = self.canonical(&key);
        self.slots
            .get(k)
            .and_then(|slot| slot.owned.as_ref())
            .map(OwnedKey::as_bytes)
    }

    /// `(canonical key, owned string)` for every entry that owns a copy.
    pub fn owned_keys(&self) -> impl Iterator<Item = (u64, &[u8])> + '_ {
        self.slots
            .iter()
            .filter_map(|(k, slot)| slot.owned.as_ref().map(|o| (k, o.as_bytes())))
    }

    /// `(canonical key, packed value)` for every entry.
    pub fn iter_raw(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.slots.iter().map(|(k, slot)| (k, slot.value))
    }
}

impl<H, M> fmt::Debug for Table<H, M>
where
    H: KeyHasher,
    M: CanonicalMap<Value = Slot>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("len", &self.len())
            .field("owned_keys", &self.registry_len())
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::value::Handle;
    use std::cell::Cell;
    use std::ffi::CString;

    /// Invariant: set then get returns the value with success; del removes it
    /// and a second del fails.
    #[test]
    fn alpha_scenario() {
        let mut t = Table::new();
        t.set("alpha", 42i32).unwrap();
        assert_eq!(t.get::<_, i32>("alpha"), Some(42));
        assert_eq!(t.del("alpha"), Ok(()));
        assert_eq!(t.get::<_, i32>("alpha"), None);
        assert_eq!(t.del("alpha"), Err(TableError::KeyNotFound));
    }

    /// Invariant: a miss writes the default into `out` and reports failure;
    /// `None` for `out` is accepted.
    #[test]
    fn get_into_writes_default_on_miss() {
        let mut t = Table::new();
        let mut out = 99u16;
        assert!(!t.get_into(7u32, Some(&mut out)));
        assert_eq!(out, 0);
        assert!(!t.get_into::<_, u16>(7u32, None));

        let mut h = Handle::from_addr(0x40);
        assert!(!t.get_into("missing", Some(&mut h)));
        assert!(h.is_null());

        t.set(7u32, 1234u16).unwrap();
        assert!(t.get_into(7u32, Some(&mut out)));
        assert_eq!(out, 1234);
        assert!(t.get_into::<_, u16>(7u32, None));
    }

    /// Invariant: overwriting a string key keeps the first owned copy.
    #[test]
    fn overwrite_keeps_first_owned_copy() {
        let mut t = Table::new();
        let first = String::from("gamma");
        t.set(&first, 1u8).unwrap();
        let ptr = t.owned_key("gamma").map(<[u8]>::as_ptr);
        assert!(ptr.is_some());

        let second = CString::new("gamma").unwrap();
        t.set(second.as_c_str(), 2u8).unwrap();
        assert_eq!(t.get::<_, u8>(&first), Some(2));
        assert_eq!(t.owned_key("gamma").map(<[u8]>::as_ptr), ptr);
        assert_eq!(t.registry_len(), 1);
    }

    /// Invariant: integer keys never create owned copies; a string key hitting
    /// an entry created by an integer key does not add one either.
    #[test]
    fn integer_entries_own_nothing() {
        let mut t = Table::new();
        let k = t.canonical_key("delta");
        t.set(k, 5i64).unwrap();
        assert_eq!(t.registry_len(), 0);

        t.set("delta", 6i64).unwrap();
        assert_eq!(t.get::<_, i64>(k), Some(6));
        assert_eq!(t.owned_key("delta"), None);
        assert_eq!(t.registry_len(), 0);

        // Deleting through the string key removes the shared entry.
        t.del("delta").unwrap();
        assert!(!t.has(k));
    }

    /// Invariant: deleting via an integer key releases a string entry's copy.
    #[test]
    fn delete_through_integer_key_releases_copy() {
        let mut t = Table::new();
        t.set("epsilon", 1u32).unwrap();
        let k = t.canonical_key("epsilon");
        assert_eq!(t.registry_len(), 1);
        t.del(k).unwrap();
        assert_eq!(t.registry_len(), 0);
        assert!(!t.has("epsilon"));
    }

    /// Invariant: a full map rejects a new key and leaves no partial state.
    #[test]
    fn full_map_rejects_insert_cleanly() {
        let mut t = Table::with_config(TableConfig::new().with_max_entries(1));
        t.set("one", 1u8).unwrap();
        assert_eq!(
            t.set("two", 2u8),
            Err(TableError::Map(MapError::Full { limit: 1 }))
        );
        assert!(!t.has("two"));
        assert_eq!(t.registry_len(), 1);
        assert_eq!(t.len(), 1);
        // Overwrite still succeeds.
        t.set("one", 3u8).unwrap();
        assert_eq!(t.get::<_, u8>("one"), Some(3));
    }

    /// Invariant: clear releases every owned copy and reports how many.
    #[test]
    fn clear_releases_owned_copies() {
        let mut t = Table::new();
        t.set("a", 1u8).unwrap();
        t.set("b", 2u8).unwrap();
        t.set(3u64, 3u8).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.registry_len(), 2);
        assert_eq!(t.clear(), 2);
        assert!(t.is_empty());
        assert_eq!(t.owned_keys().count(), 0);
        assert_eq!(t.clear(), 0);
    }

    /// Invariant: iter_raw exposes packed slots; owned_keys lists string copies.
    #[test]
    fn raw_iteration_and_registry_view() {
        let mut t = Table::new();
        t.set(-1i8, -1i8).unwrap();
        t.set("zeta", 7u64).unwrap();
        let mut raw: Vec<(u64, u64)> = t.iter_raw().collect();
        raw.sort_unstable();
        let zeta = t.canonical_key("zeta");
        let mut expected = vec![(u64::MAX, 0xff), (zeta, 7)];
        expected.sort_unstable();
        assert_eq!(raw, expected);

        let owned: Vec<(u64, &[u8])> = t.owned_keys().collect();
        assert_eq!(owned, vec![(zeta, &b"zeta"[..])]);
    }

    /// Invariant: the configured seed and hasher decide string placement.
    #[test]
    fn custom_hasher_and_seed() {
        let calls = Cell::new(0u32);
        let hasher = |bytes: &[u8], seed: u64| {
            calls.set(calls.get() + 1);
            bytes.iter().fold(seed, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u64))
        };
        let mut t = Table::with_hasher(hasher, TableConfig::new().with_seed(11));
        assert_eq!(t.seed(), 11);
        t.set("ab", 1u8).unwrap();
        assert!(t.has("ab"));
        assert_eq!(t.canonical_key("ab"), (11 * 31 + 97) * 31 + 98);
        assert!(calls.get() >= 3);
        // Integer keys never reach the hasher.
        let before = calls.get();
        t.set(1u8, 1u8).unwrap();
        assert_eq!(calls.get(), before);
    }

    /// Invariant (debug-only): a hasher that re-enters its own table panics.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrant_hasher_panics() {
        struct Reenter {
            table: Cell<*const Table<Reenter>>,
        }
        impl KeyHasher for Reenter {
            fn hash(&self, bytes: &[u8], _seed: u64) -> u64 {
                let t = self.table.get();
                if !t.is_null() {
                    // SAFETY: the table outlives every call made through it.
                    let _ = unsafe { (*t).has(0u64) };
                }
                bytes.len() as u64
            }
        }

        let t = Table::with_hasher(
            Reenter {
                table: Cell::new(core::ptr::null()),
            },
            TableConfig::default(),
        );
        t.hasher().table.set(&t as *const _);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| t.has("x")));
        assert!(res.is_err(), "expected nested access to panic in debug builds");
        // The table is usable again after the panic unwound.
        assert!(!t.has(1u8));
    }

    #[test]
    fn debug_output_summarizes() {
        let mut t = Table::with_config(TableConfig::new().with_seed(3));
        t.set("k", 1u8).unwrap();
        let s = format!("{t:?}");
        assert!(s.contains("len: 1"));
        assert!(s.contains("owned_keys: 1"));
        assert!(s.contains("seed: 3"));
    }
}

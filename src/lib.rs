//! canon-table: a single-threaded table addressable with many native key
//! and value types, stored in one `u64`-keyed map.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let integers, handles, pointers and strings of several flavors
//!   share one table without losing information on the way in or out.
//! - Layers:
//!   - IntMap<V, S>: `u64`-keyed storage (`hashbrown::HashTable` index over
//!     a `SlotMap`), optionally bounded; includes a debug-only access guard.
//!   - CanonicalMap: the trait a table talks to. `IntMap` implements it; a
//!     table can run on any other implementation.
//!   - Table<H, M>: public facade. Canonicalizes keys (`TableKey`), packs
//!     values (`TableValue`) and owns copies of string keys.
//!   - TypedTable<K, V, H>: a `Table` pinned to one key and value type.
//!
//! Keys
//! - Integer, handle and pointer keys widen to `u64` like an `as` cast.
//! - String keys (`str`, `[u8]`, `[i8]`, `CStr`, their owned forms, byte
//!   arrays) hash by content with the table's `KeyHasher` and seed. Equal
//!   bytes always meet on the same entry. Hash collisions between
//!   different strings are not detected.
//!
//! Values
//! - Packed into 64 bits at their declared width; unpacking truncates and,
//!   for signed types, sign-extends. Reading a slot as a different width is
//!   a bit reinterpretation (`-1i8` reads back as `255u8`).
//!
//! Ownership of string keys
//! - The first write of a canonical key through a string copies the string
//!   into the entry. Later writes keep that copy. The copy is dropped with
//!   its entry: on `del`, `clear`, or when the table is dropped.
//! - Value and copy share one slot, so a removal can never leave one behind.
//!
//! Notes and non-goals
//! - Single-threaded: `Table` is `!Send`/`!Sync`. Re-entering a table from
//!   its own hasher panics in debug builds.
//! - Values are limited to 64 bits; this is not a serialization layer.
//! - Nothing is persisted.

mod canonical_map;
mod config;
mod error;
pub mod int_map;
mod int_map_proptest;
mod key;
mod reentrancy;
mod table;
mod typed;
mod value;

// Public surface
pub use canonical_map::CanonicalMap;
pub use config::TableConfig;
pub use error::{MapError, TableError};
pub use int_map::IntMap;
pub use key::{canonicalize, FxKeyHasher, KeyForm, KeyHasher, OwnedKey, TableKey, DEFAULT_SEED};
pub use table::{Slot, Table};
pub use typed::TypedTable;
pub use value::{Handle, TableValue};

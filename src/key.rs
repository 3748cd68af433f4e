//! Key canonicalization.
//!
//! Every key is reduced to a `u64` before it reaches the map. Integer and
//! handle keys are widened (`as u64`, so signed keys sign-extend). String
//! keys are hashed by content with the table's [`KeyHasher`] and seed, so
//! equal bytes always land on the same canonical key no matter which string
//! type carried them.

use crate::value::Handle;
use core::fmt;
use core::hash::Hasher;
use rustc_hash::FxHasher;
use std::ffi::{CStr, CString};

/// Seed used by tables built without an explicit one.
pub const DEFAULT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// The shape a key takes before canonicalization.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyForm<'a> {
    /// Already a 64-bit value; used as is.
    Integer(u64),
    /// String content, hashed. Never includes a C terminator.
    Bytes(&'a [u8]),
}

impl KeyForm<'_> {
    pub fn is_string(&self) -> bool {
        matches!(self, KeyForm::Bytes(_))
    }
}

/// A type that can address a table.
pub trait TableKey {
    fn key_form(&self) -> KeyForm<'_>;
}

impl<K: TableKey + ?Sized> TableKey for &K {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        (**self).key_form()
    }
}

macro_rules! integer_key {
    ($($t:ty),* $(,)?) => {$(
        impl TableKey for $t {
            #[inline]
            fn key_form(&self) -> KeyForm<'_> {
                KeyForm::Integer(*self as u64)
            }
        }
    )*};
}

integer_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl TableKey for Handle {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        KeyForm::Integer(self.addr() as u64)
    }
}

impl<T: ?Sized> TableKey for *const T {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        KeyForm::Integer(self.cast::<()>() as usize as u64)
    }
}

impl<T: ?Sized> TableKey for *mut T {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        KeyForm::Integer(self.cast::<()>() as usize as u64)
    }
}

impl TableKey for str {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        KeyForm::Bytes(self.as_bytes())
    }
}

impl TableKey for [u8] {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        KeyForm::Bytes(self)
    }
}

impl TableKey for [i8] {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        // SAFETY: i8 and u8 share size, alignment and validity.
        let bytes = unsafe { core::slice::from_raw_parts(self.as_ptr().cast::<u8>(), self.len()) };
        KeyForm::Bytes(bytes)
    }
}

impl<const N: usize> TableKey for [u8; N] {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        KeyForm::Bytes(self.as_slice())
    }
}

impl TableKey for CStr {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        KeyForm::Bytes(self.to_bytes())
    }
}

impl TableKey for String {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        self.as_str().key_form()
    }
}

impl TableKey for Vec<u8> {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        self.as_slice().key_form()
    }
}

impl TableKey for CString {
    #[inline]
    fn key_form(&self) -> KeyForm<'_> {
        self.as_c_str().key_form()
    }
}

/// Content hash for string keys: `(bytes, seed) -> u64`.
///
/// Must be deterministic for equal inputs. Any `Fn(&[u8], u64) -> u64`
/// qualifies.
pub trait KeyHasher {
    fn hash(&self, bytes: &[u8], seed: u64) -> u64;
}

impl<F> KeyHasher for F
where
    F: Fn(&[u8], u64) -> u64,
{
    #[inline]
    fn hash(&self, bytes: &[u8], seed: u64) -> u64 {
        self(bytes, seed)
    }
}

/// Default string hasher: `FxHasher` seeded with the table seed.
#[derive(Copy, Clone, Debug, Default)]
pub struct FxKeyHasher;

impl KeyHasher for FxKeyHasher {
    #[inline]
    fn hash(&self, bytes: &[u8], seed: u64) -> u64 {
        let mut h = FxHasher::with_seed(seed as usize);
        h.write(bytes);
        h.write_usize(bytes.len());
        h.finish()
    }
}

/// Reduce a key form to its canonical `u64`.
#[inline]
pub fn canonicalize<H>(form: &KeyForm<'_>, hasher: &H, seed: u64) -> u64
where
    H: KeyHasher + ?Sized,
{
    match *form {
        KeyForm::Integer(k) => k,
        KeyForm::Bytes(bytes) => hasher.hash(bytes, seed),
    }
}

/// A table-owned copy of a string key.
///
/// Created when a string key first inserts its canonical key and dropped
/// exactly once, together with the entry that holds it.
#[derive(PartialEq, Eq, Hash)]
pub struct OwnedKey(Box<[u8]>);

impl OwnedKey {
    pub(crate) fn duplicate(bytes: &[u8]) -> Self {
        OwnedKey(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for OwnedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedKey")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

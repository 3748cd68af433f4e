//! Value codec: packing typed values into a 64-bit slot and back.

/// An opaque pointer-sized handle.
///
/// The table never dereferences a handle; it only stores its address.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Handle(usize);

impl Handle {
    pub const NULL: Handle = Handle(0);

    pub const fn from_addr(addr: usize) -> Self {
        Handle(addr)
    }

    pub fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
        Handle(ptr.cast::<()>() as usize)
    }

    pub const fn addr(self) -> usize {
        self.0
    }

    pub fn as_ptr<T>(self) -> *const T {
        self.0 as *const T
    }

    pub fn as_mut_ptr<T>(self) -> *mut T {
        self.0 as *mut T
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A value type that fits in a 64-bit slot.
///
/// `unpack(pack(v)) == v` for every `v`. Unpacking a slot written by a
/// wider type truncates to `Self`'s width.
pub trait TableValue: Copy {
    /// Returned by lookups that miss: zero, or null for handles.
    const DEFAULT: Self;

    fn pack(self) -> u64;

    fn unpack(slot: u64) -> Self;
}

macro_rules! unsigned_value {
    ($($t:ty),* $(,)?) => {$(
        impl TableValue for $t {
            const DEFAULT: Self = 0;

            #[inline]
            fn pack(self) -> u64 {
                self as u64
            }

            #[inline]
            fn unpack(slot: u64) -> Self {
                slot as $t
            }
        }
    )*};
}

// Signed values are stored as their two's-complement bit pattern at the
// declared width, zero-extended. Unpacking truncates then reinterprets, so
// bit W-1 acts as the sign bit.
macro_rules! signed_value {
    ($($t:ty => $u:ty),* $(,)?) => {$(
        impl TableValue for $t {
            const DEFAULT: Self = 0;

            #[inline]
            fn pack(self) -> u64 {
                self as $u as u64
            }

            #[inline]
            fn unpack(slot: u64) -> Self {
                slot as $u as $t
            }
        }
    )*};
}

unsigned_value!(u8, u16, u32, u64, usize);
signed_value!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, isize => usize);

impl TableValue for Handle {
    const DEFAULT: Self = Handle::NULL;

    #[inline]
    fn pack(self) -> u64 {
        self.0 as u64
    }

    #[inline]
    fn unpack(slot: u64) -> Self {
        Handle(slot as usize)
    }
}

impl<T> TableValue for *const T {
    const DEFAULT: Self = core::ptr::null();

    #[inline]
    fn pack(self) -> u64 {
        self as usize as u64
    }

    #[inline]
    fn unpack(slot: u64) -> Self {
        slot as usize as *const T
    }
}

impl<T> TableValue for *mut T {
    const DEFAULT: Self = core::ptr::null_mut();

    #[inline]
    fn pack(self) -> u64 {
        self as usize as u64
    }

    #[inline]
    fn unpack(slot: u64) -> Self {
        slot as usize as *mut T
    }
}

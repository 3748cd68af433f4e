//! Debug-only guard against nested access.
//!
//! Tables call into user code (`KeyHasher`, `BuildHasher`) in the middle of
//! an operation. If that code reaches back into the same structure, the
//! guard panics in debug builds. Release builds carry no state.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Per-instance access tracker. Public entry points start with
/// `let _g = self.access.enter("op");`.
#[derive(Debug)]
pub(crate) struct AccessGuard {
    #[cfg(debug_assertions)]
    busy: Cell<Option<&'static str>>,
    // Single-threaded: keeps owners !Send + !Sync.
    _single_thread: PhantomData<*mut ()>,
}

impl AccessGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(None),
            _single_thread: PhantomData,
        }
    }

    /// Mark the owner busy for the lifetime of the returned token.
    ///
    /// Panics in debug builds if another operation is still in flight.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> Access<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.busy.get() {
                panic!("nested access: `{op}` called while `{outer}` is in progress");
            }
            self.busy.set(Some(op));
            Access { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            Access { _owner: PhantomData }
        }
    }
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII token returned by [`AccessGuard::enter`].
pub(crate) struct Access<'a> {
    #[cfg(debug_assertions)]
    owner: &'a AccessGuard,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for Access<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(None);
    }
}

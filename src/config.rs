//! Construction-time settings for a [`Table`](crate::Table).

use crate::key::DEFAULT_SEED;

/// Seed, capacity hint and optional entry limit for a table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TableConfig {
    /// Seed passed to the key hasher for every string key.
    pub seed: u64,
    /// Number of entries to preallocate.
    pub capacity: usize,
    /// Refuse new keys once this many entries are live. `None` is unbounded.
    pub max_entries: Option<usize>,
}

impl TableConfig {
    pub const fn new() -> Self {
        Self {
            seed: DEFAULT_SEED,
            capacity: 0,
            max_entries: None,
        }
    }

    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}

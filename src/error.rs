//! Error types for the canonical map and the table facade.

/// Failure reported by a [`CanonicalMap`](crate::CanonicalMap) write.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum MapError {
    /// The map holds `limit` entries and cannot accept a new key.
    #[error("canonical map is full ({limit} entries)")]
    Full { limit: usize },
}

/// Failure reported by a [`Table`](crate::Table) operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TableError {
    /// The key's canonical form is not present.
    #[error("key not found")]
    KeyNotFound,

    /// The underlying canonical map rejected the operation.
    #[error(transparent)]
    Map(#[from] MapError),
}

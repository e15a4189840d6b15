use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported by the fallible map and set operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The node store could not grow. The map is left unmodified.
    #[error("failed to allocate a tree node: {0}")]
    Alloc(#[from] TryReserveError),

    /// The key is not present in the map.
    #[error("key not found")]
    KeyNotFound,
}

pub type Result<T> = std::result::Result<T, Error>;

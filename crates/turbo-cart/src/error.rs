//! Cart error types.

use thiserror::Error;
use turbo_cache::CacheError;

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// The persistence backend could not be reached.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Persisted bytes don't describe a valid cart.
    #[error("Malformed cart snapshot: {0}")]
    MalformedSnapshot(String),

    /// The store has not finished loading its snapshot.
    #[error("Cart store is not ready: load has not completed")]
    NotReady,

    /// The store was used in a way it does not support.
    #[error("Usage error: {0}")]
    UsageError(String),

    /// Price is negative or not a finite number.
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),
}

impl From<CacheError> for CartError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::SerializeError(e) => CartError::MalformedSnapshot(e.to_string()),
            other => CartError::StorageUnavailable(other.to_string()),
        }
    }
}

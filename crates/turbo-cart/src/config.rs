//! Store configuration.

use crate::retry::RetryPolicy;

/// Key under which the cart snapshot is stored when none is configured.
pub const DEFAULT_SNAPSHOT_KEY: &str = "@GoMarketplace:products";

/// Configuration for a [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key holding the serialized cart in the Key-Value store.
    pub snapshot_key: String,
    /// Retry policy for snapshot writes.
    pub retry: RetryPolicy,
}

impl CartConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snapshot key.
    pub fn with_snapshot_key(mut self, key: impl Into<String>) -> Self {
        self.snapshot_key = key.into();
        self
    }

    /// Set the retry policy for snapshot writes.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

//! Async Key-Value persistence layer for TurboCart.
//!
//! Provides a small byte-oriented [`KvStore`] trait, two backends
//! (in-memory and local files), and a typed [`Cache`] wrapper with
//! automatic JSON serialization.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cache::{Cache, FileStore};
//!
//! let cache = Cache::new(FileStore::open(".cart").await?);
//!
//! // Store a value
//! cache.set("cart:user123", &items).await?;
//!
//! // Retrieve a value
//! let items: Option<Vec<Item>> = cache.get("cart:user123").await?;
//!
//! // Delete a value
//! cache.delete("cart:user123").await?;
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::CacheError;
pub use file::FileStore;
pub use kv::{Cache, KvStore};
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore};
}

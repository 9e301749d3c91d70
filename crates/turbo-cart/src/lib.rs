//! Persisted shopping cart store for TurboCart.
//!
//! This crate keeps a cart of line items in memory and mirrors every
//! change into a Key-Value store so the cart survives restarts:
//!
//! - **Cart**: ordered line items with merge-on-add and removal at zero
//! - **Store**: serialized mutations, change notifications, and a
//!   background writer that persists full snapshots
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use turbo_cache::MemoryStore;
//! use turbo_cart::prelude::*;
//!
//! let store = CartStore::open(Arc::new(MemoryStore::new()), CartConfig::default()).await?;
//!
//! let shirt = NewItem::new("a", "Shirt", "shirt.png", Price::new(10.0)?);
//! store.add_to_cart(shirt.clone())?;
//! store.add_to_cart(shirt)?;
//! assert_eq!(store.products()?.items()[0].quantity(), 2);
//!
//! store.decrement(&ProductId::new("a"))?;
//! store.flush().await?;
//! ```

pub mod cart;
pub mod config;
pub mod error;
pub mod ids;
pub mod price;
pub mod retry;
pub mod store;

pub use cart::{Cart, Item, NewItem};
pub use config::{CartConfig, DEFAULT_SNAPSHOT_KEY};
pub use error::CartError;
pub use ids::ProductId;
pub use price::Price;
pub use retry::{BackoffStrategy, RetryPolicy};
pub use store::{CartStore, LoadOutcome};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, Item, NewItem};
    pub use crate::config::CartConfig;
    pub use crate::error::CartError;
    pub use crate::ids::ProductId;
    pub use crate::price::Price;
    pub use crate::retry::{BackoffStrategy, RetryPolicy};
    pub use crate::store::{CartStore, LoadOutcome};
}

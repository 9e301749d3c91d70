//! The persisted cart store.
//!
//! [`CartStore`] owns the authoritative in-memory [`Cart`]. Every mutation
//! runs in three steps: compute the next cart from the current one,
//! publish it to subscribers, and queue it for the background writer.
//! The first two steps and the enqueue happen under the lock held by the
//! observer channel, so back-to-back mutations never see stale state and
//! snapshots reach the writer in mutation order.
//!
//! Persistence is a best-effort mirror: a failed write is logged and
//! dropped, and the in-memory cart stays authoritative.

mod writer;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use turbo_cache::{Cache, CacheError, KvStore};

use crate::cart::{Cart, NewItem};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::ids::ProductId;

use writer::{Snapshot, WriterMessage};

/// How [`CartStore::load`] obtained the starting cart.
#[derive(Debug)]
pub enum LoadOutcome {
    /// No snapshot was stored; the cart starts empty.
    Empty,
    /// The cart was rehydrated from a stored snapshot.
    Restored {
        /// Number of distinct products restored.
        items: usize,
    },
    /// The snapshot could not be used; the cart starts empty.
    ///
    /// Holds [`CartError::MalformedSnapshot`] or
    /// [`CartError::StorageUnavailable`].
    Recovered(CartError),
}

/// A shopping cart mirrored into a Key-Value store.
///
/// # Example
///
/// ```rust,ignore
/// let store = CartStore::open(Arc::new(FileStore::open(".cart").await?), CartConfig::default()).await?;
///
/// store.add_to_cart(NewItem::new("sku-1", "Shirt", "shirt.png", Price::new(10.0)?))?;
/// store.decrement(&ProductId::new("sku-1"))?;
///
/// store.flush().await?;
/// ```
pub struct CartStore {
    cache: Cache<Arc<dyn KvStore>>,
    config: CartConfig,
    state: watch::Sender<Cart>,
    ready: watch::Sender<bool>,
    seq: AtomicU64,
    closed: AtomicBool,
    tx: mpsc::UnboundedSender<WriterMessage>,
    pending_rx: Mutex<Option<mpsc::UnboundedReceiver<WriterMessage>>>,
    writer: Mutex<Option<JoinHandle<u64>>>,
}

impl CartStore {
    /// Create a store that has not loaded its snapshot yet.
    ///
    /// Mutations and reads fail with [`CartError::NotReady`] until
    /// [`load`](Self::load) completes.
    pub fn new(backend: Arc<dyn KvStore>, config: CartConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            cache: Cache::new(backend),
            config,
            state: watch::Sender::new(Cart::new()),
            ready: watch::Sender::new(false),
            seq: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            tx,
            pending_rx: Mutex::new(Some(rx)),
            writer: Mutex::new(None),
        }
    }

    /// Create a store and load its snapshot.
    pub async fn open(backend: Arc<dyn KvStore>, config: CartConfig) -> Result<Self, CartError> {
        let store = Self::new(backend, config);
        store.load().await?;
        Ok(store)
    }

    /// Read the persisted snapshot and start accepting mutations.
    ///
    /// A missing, unreadable or malformed snapshot is not an error: the
    /// cart starts empty and the returned [`LoadOutcome`] says why.
    /// Must be called from within a Tokio runtime; it spawns the
    /// snapshot writer.
    ///
    /// Returns [`CartError::UsageError`] if the store was already loaded.
    pub async fn load(&self) -> Result<LoadOutcome, CartError> {
        let rx = self
            .pending_rx
            .lock()
            .map_err(|_| CartError::UsageError("cart store lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| CartError::UsageError("cart store already loaded".to_string()))?;

        let key = &self.config.snapshot_key;
        let (cart, outcome) = match self.cache.get::<Cart>(key).await {
            Ok(None) => (Cart::new(), LoadOutcome::Empty),
            Ok(Some(cart)) => {
                let items = cart.len();
                (cart, LoadOutcome::Restored { items })
            }
            Err(CacheError::SerializeError(e)) => {
                tracing::warn!(key = %key, error = %e, "discarding malformed cart snapshot");
                (
                    Cart::new(),
                    LoadOutcome::Recovered(CartError::MalformedSnapshot(e.to_string())),
                )
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cart snapshot unreadable, starting empty");
                (Cart::new(), LoadOutcome::Recovered(e.into()))
            }
        };

        tracing::info!(key = %key, items = cart.len(), "cart loaded");
        self.state.send_replace(cart);

        let handle = tokio::spawn(writer::run(
            self.cache.clone(),
            key.clone(),
            self.config.retry.clone(),
            rx,
        ));
        if let Ok(mut slot) = self.writer.lock() {
            *slot = Some(handle);
        }

        self.ready.send_replace(true);
        Ok(outcome)
    }

    /// Check if [`load`](Self::load) has completed.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Wait until [`load`](Self::load) has completed.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// The current cart.
    pub fn products(&self) -> Result<Cart, CartError> {
        self.ensure_ready()?;
        Ok(self.state.borrow().clone())
    }

    /// Subscribe to cart changes.
    ///
    /// The receiver sees the current cart immediately and is notified
    /// after every mutation, including ones that left the cart unchanged.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    /// Add one unit of a product, merging with an existing entry.
    ///
    /// Returns [`CartError::UsageError`] if the product id is empty.
    pub fn add_to_cart(&self, candidate: NewItem) -> Result<(), CartError> {
        self.ensure_ready()?;
        if candidate.id.is_empty() {
            return Err(CartError::UsageError(
                "cannot add a product with an empty id".to_string(),
            ));
        }
        tracing::debug!(id = %candidate.id, "add to cart");
        self.apply(|cart| cart.with_added(candidate))
    }

    /// Add one unit to a product already in the cart.
    ///
    /// Unknown ids leave the cart unchanged.
    pub fn increment(&self, id: &ProductId) -> Result<(), CartError> {
        tracing::debug!(id = %id, "increment");
        self.apply(|cart| cart.with_incremented(id))
    }

    /// Remove one unit of a product, dropping it at zero.
    ///
    /// Unknown ids leave the cart unchanged.
    pub fn decrement(&self, id: &ProductId) -> Result<(), CartError> {
        tracing::debug!(id = %id, "decrement");
        self.apply(|cart| cart.with_decremented(id))
    }

    /// Wait until every mutation issued so far has been offered to the
    /// backend, either written or dropped after retries.
    pub async fn flush(&self) -> Result<(), CartError> {
        self.ensure_ready()?;
        let (reply, done) = oneshot::channel();
        self.tx
            .send(WriterMessage::Flush(reply))
            .map_err(|_| writer_stopped())?;
        done.await.map_err(|_| writer_stopped())
    }

    /// Flush pending snapshots and stop the writer.
    ///
    /// Later mutations fail with [`CartError::UsageError`]. Calling this
    /// more than once is harmless.
    pub async fn shutdown(&self) -> Result<(), CartError> {
        self.ensure_ready()?;
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // A send error means the writer is already gone.
        let _ = self.tx.send(WriterMessage::Shutdown);

        let handle = self.writer.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            let last_written = handle
                .await
                .map_err(|e| CartError::UsageError(format!("snapshot writer failed: {}", e)))?;
            let issued = self.seq.load(Ordering::Relaxed);
            if last_written < issued {
                tracing::warn!(last_written, issued, "cart store shut down with unsaved changes");
            }
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), CartError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(CartError::NotReady)
        }
    }

    fn apply<F>(&self, transition: F) -> Result<(), CartError>
    where
        F: FnOnce(&Cart) -> Cart,
    {
        self.ensure_ready()?;
        if self.closed.load(Ordering::SeqCst) {
            return Err(writer_stopped());
        }

        let mut result = Ok(());
        self.state.send_if_modified(|cart| {
            let next = transition(cart);
            let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
            let snapshot = Snapshot {
                seq,
                cart: next.clone(),
            };
            if self.tx.send(WriterMessage::Persist(snapshot)).is_err() {
                result = Err(writer_stopped());
                return false;
            }
            *cart = next;
            true
        });
        result
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("config", &self.config)
            .field("ready", &self.is_ready())
            .field("items", &self.state.borrow().len())
            .finish()
    }
}

fn writer_stopped() -> CartError {
    CartError::UsageError("cart store has been shut down".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::Price;
    use turbo_cache::MemoryStore;

    const DEFAULT_KEY: &str = crate::config::DEFAULT_SNAPSHOT_KEY;

    fn shirt() -> NewItem {
        NewItem::new("a", "Shirt", "u", Price::new(10.0).unwrap())
    }

    async fn loaded(store: &MemoryStore) -> CartStore {
        CartStore::open(Arc::new(store.clone()), CartConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_mutations_before_load_fail() {
        let store = CartStore::new(Arc::new(MemoryStore::new()), CartConfig::default());

        assert!(matches!(store.add_to_cart(shirt()), Err(CartError::NotReady)));
        assert!(matches!(store.increment(&ProductId::new("a")), Err(CartError::NotReady)));
        assert!(matches!(store.decrement(&ProductId::new("a")), Err(CartError::NotReady)));
        assert!(matches!(store.products(), Err(CartError::NotReady)));
        assert!(!store.is_ready());
    }

    #[tokio::test]
    async fn test_empty_id_before_load_is_not_ready() {
        let store = CartStore::new(Arc::new(MemoryStore::new()), CartConfig::default());
        let candidate = NewItem::new("", "t", "u", Price::zero());

        assert!(matches!(store.add_to_cart(candidate), Err(CartError::NotReady)));
    }

    #[tokio::test]
    async fn test_load_twice_is_usage_error() {
        let store = loaded(&MemoryStore::new()).await;
        assert!(matches!(store.load().await, Err(CartError::UsageError(_))));
    }

    #[tokio::test]
    async fn test_empty_id_rejected() {
        let store = loaded(&MemoryStore::new()).await;
        let candidate = NewItem::new("", "t", "u", Price::zero());

        assert!(matches!(store.add_to_cart(candidate), Err(CartError::UsageError(_))));
        assert!(store.products().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flush_persists_post_mutation_cart() {
        let backend = MemoryStore::new();
        let store = loaded(&backend).await;

        store.add_to_cart(shirt()).unwrap();
        store.add_to_cart(shirt()).unwrap();
        store.flush().await.unwrap();

        let stored: Cart = Cache::new(backend)
            .get(DEFAULT_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, store.products().unwrap());
        assert_eq!(stored.items()[0].quantity(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_mutation() {
        let store = loaded(&MemoryStore::new()).await;
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.add_to_cart(shirt()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.increment(&ProductId::new("missing")).unwrap();
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_shutdown_rejects_later_mutations() {
        let backend = MemoryStore::new();
        let store = loaded(&backend).await;

        store.add_to_cart(shirt()).unwrap();
        store.shutdown().await.unwrap();
        assert!(backend.exists(DEFAULT_KEY).await.unwrap());

        assert!(matches!(store.add_to_cart(shirt()), Err(CartError::UsageError(_))));
        assert_eq!(store.products().unwrap().items()[0].quantity(), 1);
        store.shutdown().await.unwrap();
    }
}

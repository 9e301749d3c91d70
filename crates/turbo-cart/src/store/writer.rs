//! Background task that owns every snapshot write for one store.
//!
//! Snapshots arrive over an unbounded channel in the same order the
//! store applied its mutations, and are written one at a time. When
//! several snapshots are queued only the newest is written: each one
//! holds the whole cart, so older ones carry nothing the newest lacks.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use turbo_cache::{Cache, KvStore};

use crate::cart::Cart;
use crate::retry::RetryPolicy;

/// A full copy of the cart taken right after a mutation.
#[derive(Debug)]
pub(crate) struct Snapshot {
    /// Position of the mutation in the store's history, starting at 1.
    pub seq: u64,
    pub cart: Cart,
}

/// Messages sent from the store to the writer.
#[derive(Debug)]
pub(crate) enum WriterMessage {
    /// Persist this snapshot.
    Persist(Snapshot),
    /// Reply once every snapshot queued before this message was handled.
    Flush(oneshot::Sender<()>),
    /// Handle everything still queued, then exit.
    Shutdown,
}

/// Everything pulled off the channel in one batch.
#[derive(Default)]
struct Batch {
    latest: Option<Snapshot>,
    flushes: Vec<oneshot::Sender<()>>,
    shutdown: bool,
}

impl Batch {
    fn absorb(&mut self, msg: WriterMessage) {
        match msg {
            WriterMessage::Persist(snapshot) => {
                let newer = self
                    .latest
                    .as_ref()
                    .map_or(true, |current| snapshot.seq > current.seq);
                if newer {
                    self.latest = Some(snapshot);
                }
            }
            WriterMessage::Flush(reply) => self.flushes.push(reply),
            WriterMessage::Shutdown => self.shutdown = true,
        }
    }
}

/// Runs the writer loop until shutdown or until the store is dropped.
///
/// Returns the sequence number of the last snapshot that reached the
/// backend, or 0 if none did.
pub(crate) async fn run(
    cache: Cache<Arc<dyn KvStore>>,
    key: String,
    retry: RetryPolicy,
    mut rx: mpsc::UnboundedReceiver<WriterMessage>,
) -> u64 {
    let mut last_written = 0u64;

    while let Some(msg) = rx.recv().await {
        let mut batch = Batch::default();
        batch.absorb(msg);
        while let Ok(next) = rx.try_recv() {
            batch.absorb(next);
        }

        if batch.shutdown {
            // Refuse new work, but keep what already made it into the queue.
            rx.close();
            while let Some(next) = rx.recv().await {
                batch.absorb(next);
            }
        }

        if let Some(snapshot) = batch.latest {
            if snapshot.seq > last_written && persist(&cache, &key, &retry, &snapshot).await {
                last_written = snapshot.seq;
            }
        }

        for reply in batch.flushes {
            // The caller may have stopped waiting.
            let _ = reply.send(());
        }

        if batch.shutdown {
            break;
        }
    }

    tracing::debug!(key = %key, last_written, "snapshot writer stopped");
    last_written
}

/// Write one snapshot, retrying per `retry`. Returns whether it landed.
async fn persist(
    cache: &Cache<Arc<dyn KvStore>>,
    key: &str,
    retry: &RetryPolicy,
    snapshot: &Snapshot,
) -> bool {
    let mut attempt = 0;
    loop {
        match cache.set(key, &snapshot.cart).await {
            Ok(()) => {
                tracing::debug!(
                    seq = snapshot.seq,
                    items = snapshot.cart.len(),
                    "cart snapshot persisted"
                );
                return true;
            }
            Err(e) if retry.should_retry(&e, attempt) => {
                let delay = retry.backoff.delay_for_attempt(attempt);
                tracing::debug!(
                    seq = snapshot.seq,
                    attempt,
                    error = %e,
                    "cart snapshot write failed, retrying"
                );
                attempt += 1;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                tracing::warn!(
                    seq = snapshot.seq,
                    attempts = attempt + 1,
                    error = %e,
                    "dropping cart snapshot write"
                );
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::NewItem;
    use crate::price::Price;
    use async_trait::async_trait;
    use turbo_cache::{CacheError, MemoryStore};

    /// Backend whose writes always fail.
    struct DownStore;

    #[async_trait]
    impl KvStore for DownStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &[u8]) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Ok(())
        }
    }

    fn snapshot(seq: u64, ids: &[&str]) -> Snapshot {
        let cart = ids.iter().fold(Cart::new(), |cart, id| {
            cart.with_added(NewItem::new(*id, "t", "u", Price::zero()))
        });
        Snapshot { seq, cart }
    }

    #[test]
    fn test_batch_keeps_newest_snapshot() {
        let mut batch = Batch::default();
        batch.absorb(WriterMessage::Persist(snapshot(2, &["a", "b"])));
        batch.absorb(WriterMessage::Persist(snapshot(1, &["a"])));

        assert_eq!(batch.latest.unwrap().seq, 2);
    }

    #[tokio::test]
    async fn test_queued_snapshots_coalesce_to_latest() {
        let store = MemoryStore::new();
        let backend: Arc<dyn KvStore> = Arc::new(store.clone());
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(WriterMessage::Persist(snapshot(1, &["a"]))).unwrap();
        tx.send(WriterMessage::Persist(snapshot(2, &["a", "b"]))).unwrap();
        tx.send(WriterMessage::Shutdown).unwrap();

        let last = run(Cache::new(backend), "k".to_string(), RetryPolicy::none(), rx).await;
        assert_eq!(last, 2);

        let cache = Cache::new(store);
        let stored: Cart = cache.get("k").await.unwrap().unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_flush_acknowledged_after_write() {
        let store = MemoryStore::new();
        let backend: Arc<dyn KvStore> = Arc::new(store.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(Cache::new(backend), "k".into(), RetryPolicy::none(), rx));

        tx.send(WriterMessage::Persist(snapshot(1, &["a"]))).unwrap();
        let (reply, done) = oneshot::channel();
        tx.send(WriterMessage::Flush(reply)).unwrap();
        done.await.unwrap();

        assert!(store.exists("k").await.unwrap());

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_write_not_counted_as_written() {
        let backend: Arc<dyn KvStore> = Arc::new(DownStore);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(WriterMessage::Persist(snapshot(1, &["a"]))).unwrap();
        tx.send(WriterMessage::Shutdown).unwrap();

        let last = run(Cache::new(backend), "k".to_string(), RetryPolicy::none(), rx).await;
        assert_eq!(last, 0);
    }
}

//! Bounded per-client session store.
//!
//! Keeps the most recent [`SessionRecord`] per client, keyed by an opaque
//! client id resolved by the request layer. Capacity is fixed at startup;
//! when full, the least recently touched client is evicted.
//!
//! Records are swapped whole under one lock guard, so a reader never sees
//! a feature vector paired with a label from a different prediction.
//! Same-key races resolve last-writer-wins; a caller that disconnects
//! drops its future before the write applies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use cropsage_core::SessionRecord;

struct Entry {
    record: SessionRecord,
    /// Recency stamp, bumped on both reads and writes.
    touched: AtomicU64,
}

/// Process-wide mapping from client id to latest prediction state.
pub struct SessionStore {
    entries: RwLock<HashMap<String, Entry>>,
    clock: AtomicU64,
    capacity: usize,
}

impl SessionStore {
    /// Create a store that holds at most `capacity` clients.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "session store capacity must be at least 1");
        Self {
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            capacity,
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Overwrite the client's record atomically. The previous record, if
    /// any, is replaced whole — never merged.
    pub async fn put(&self, client_id: &str, record: SessionRecord) {
        let mut entries = self.entries.write().await;
        let stamp = self.tick();
        entries.insert(
            client_id.to_string(),
            Entry {
                record,
                touched: AtomicU64::new(stamp),
            },
        );

        // Evict the least recently touched clients while over capacity.
        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.touched.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                    debug!(client_id = %key, "Evicted least recently used session");
                }
                None => break,
            }
        }
    }

    /// Fetch the client's latest record, refreshing its recency.
    /// Returns `None` when no prediction has been made for this client.
    pub async fn get(&self, client_id: &str) -> Option<SessionRecord> {
        let entries = self.entries.read().await;
        entries.get(client_id).map(|e| {
            e.touched.store(self.tick(), Ordering::Relaxed);
            e.record.clone()
        })
    }

    /// Record the client's most recent free-text question alongside the
    /// prediction. A no-op for clients with no record; the question is
    /// only meaningful next to the prediction it annotates.
    pub async fn set_last_query(&self, client_id: &str, query: &str) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(client_id) {
            entry.record.last_query = Some(query.to_string());
            entry.touched.store(self.tick(), Ordering::Relaxed);
        }
    }

    /// Number of clients currently tracked.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop all sessions. Used by tests and the status surface.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

//! Bookmarked trend records, persisted as one JSON array.
//!
//! Records are snapshots taken at bookmark time and keep insertion order.
//! Storage is authoritative: every mutation writes the full new set first,
//! then swaps the in-memory copy and publishes it to subscribers.

use metrics::counter;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

use crate::store::KvStore;
use crate::trend::TrendRecord;

pub const FAVORITES_KEY: &str = "trendpulse-favorites";

pub struct FavoritesStore {
    store: Arc<dyn KvStore>,
    inner: Mutex<Vec<TrendRecord>>,
    published: watch::Sender<Vec<TrendRecord>>,
}

impl FavoritesStore {
    /// Load once from storage. Missing, unreadable or corrupt data all mean "empty".
    pub fn load(store: Arc<dyn KvStore>) -> Self {
        let initial = read_persisted(store.as_ref());
        tracing::info!(target: "favorites", count = initial.len(), "favorites loaded");
        let (published, _) = watch::channel(initial.clone());
        Self {
            store,
            inner: Mutex::new(initial),
            published,
        }
    }

    /// Returns `true` if the record was not yet a favorite.
    pub fn add(&self, record: TrendRecord) -> bool {
        let mut guard = self.inner.lock();
        if guard.iter().any(|f| f.id == record.id) {
            return false;
        }
        let mut next = guard.clone();
        next.push(record);
        self.commit(&mut guard, next);
        true
    }

    /// Returns `true` if something was removed. Unknown ids do not touch storage.
    pub fn remove(&self, id: &str) -> bool {
        let mut guard = self.inner.lock();
        if !guard.iter().any(|f| f.id == id) {
            return false;
        }
        let next: Vec<TrendRecord> = guard.iter().filter(|f| f.id != id).cloned().collect();
        self.commit(&mut guard, next);
        true
    }

    /// Flip membership; returns the new state (`true` = now a favorite).
    pub fn toggle(&self, record: TrendRecord) -> bool {
        let mut guard = self.inner.lock();
        let next: Vec<TrendRecord> = if guard.iter().any(|f| f.id == record.id) {
            guard.iter().filter(|f| f.id != record.id).cloned().collect()
        } else {
            let mut v = guard.clone();
            v.push(record);
            v
        };
        let now_favorite = next.len() > guard.len();
        self.commit(&mut guard, next);
        now_favorite
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.inner.lock().iter().any(|f| f.id == id)
    }

    pub fn get(&self, id: &str) -> Option<TrendRecord> {
        self.inner.lock().iter().find(|f| f.id == id).cloned()
    }

    pub fn list(&self) -> Vec<TrendRecord> {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<TrendRecord>> {
        self.published.subscribe()
    }

    /// Persist, then swap and publish. A failed write still updates memory.
    fn commit(&self, current: &mut Vec<TrendRecord>, next: Vec<TrendRecord>) {
        if let Err(e) = self.persist(&next) {
            tracing::warn!(target: "favorites", error = ?e, "persisting favorites failed");
            counter!("favorites_persist_errors_total").increment(1);
        }
        *current = next;
        self.published.send_replace(current.clone());
    }

    fn persist(&self, set: &[TrendRecord]) -> anyhow::Result<()> {
        let json = serde_json::to_string(set)?;
        self.store.set(FAVORITES_KEY, &json)
    }
}

fn read_persisted(store: &dyn KvStore) -> Vec<TrendRecord> {
    match store.get(FAVORITES_KEY) {
        Ok(None) => Vec::new(),
        Ok(Some(raw)) => match serde_json::from_str::<Vec<TrendRecord>>(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "favorites", error = ?e, "corrupt favorites data; starting empty");
                Vec::new()
            }
        },
        Err(e) => {
            tracing::warn!(target: "favorites", error = ?e, "reading favorites failed; starting empty");
            Vec::new()
        }
    }
}

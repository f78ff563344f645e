//! state.rs — explicitly owned core state with a defined lifecycle.
//!
//! Built once at process start, shared behind an `Arc`, torn down with the
//! scheduler. The poll cycle is the only writer; the HTTP layer and push
//! subscribers are readers.

use std::sync::RwLock;

use tokio::sync::broadcast;

use crate::ingest::types::NewsItem;
use crate::stats::AggregateStats;
use crate::store::NewsStore;
use crate::subscribe::{EventBus, NewsEvent};

/// Cache capacity used when none is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 300;

#[derive(Debug)]
pub struct NewsState {
    store: NewsStore,
    stats: RwLock<AggregateStats>,
    events: EventBus,
}

impl NewsState {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            store: NewsStore::with_capacity(cache_capacity),
            stats: RwLock::new(AggregateStats::empty()),
            events: EventBus::new(),
        }
    }

    pub fn store(&self) -> &NewsStore {
        &self.store
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Pull interface: current cache sorted by `published` descending,
    /// undated items last.
    pub fn current_items(&self) -> Vec<NewsItem> {
        self.store.snapshot_sorted()
    }

    /// Pull interface: the last computed stats (an empty default before the
    /// first cycle completes).
    pub fn current_stats(&self) -> AggregateStats {
        self.stats.read().expect("stats rwlock poisoned").clone()
    }

    /// Push interface: a live feed of poll-cycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<NewsEvent> {
        self.events.subscribe()
    }

    /// Atomically replace the stats from the readers' perspective.
    pub(crate) fn replace_stats(&self, stats: AggregateStats) {
        *self.stats.write().expect("stats rwlock poisoned") = stats;
    }
}

impl Default for NewsState {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

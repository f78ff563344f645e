//! subscribe.rs — publish/subscribe fan-out of poll-cycle results.
//!
//! Transport layers attach with [`EventBus::subscribe`] and detach by
//! dropping the receiver; the core never tracks individual listeners.
//! Delivery is best-effort: a lagging receiver loses the oldest events and
//! is expected to fall back to the pull interface.

use tokio::sync::broadcast;

use crate::ingest::types::NewsItem;
use crate::stats::AggregateStats;

/// Default backlog per subscriber before lag kicks in.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// One poll-cycle notification.
#[derive(Debug, Clone)]
pub enum NewsEvent {
    /// Items newly admitted to the cache this cycle. Never empty.
    Items(Vec<NewsItem>),
    /// The full recomputed stats, published every cycle.
    Stats(AggregateStats),
}

#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<NewsEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NewsEvent> {
        self.tx.subscribe()
    }

    /// Notify subscribers of newly admitted items. Empty batches are skipped
    /// so collaborators never see a no-op notification.
    pub fn publish_items(&self, items: Vec<NewsItem>) {
        if items.is_empty() {
            return;
        }
        // A send error only means there are no subscribers right now.
        let _ = self.tx.send(NewsEvent::Items(items));
    }

    /// Notify subscribers of the refreshed stats, unconditionally.
    pub fn publish_stats(&self, stats: AggregateStats) {
        let _ = self.tx.send(NewsEvent::Stats(stats));
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//! store.rs — bounded in-memory news cache with id-based deduplication.
//!
//! Insertion order is the eviction order: once the capacity is exceeded the
//! earliest-inserted entries are dropped, regardless of publish date. Read
//! access sorts by `published` descending with missing dates last.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::ingest::types::NewsItem;

#[derive(Debug)]
pub struct NewsStore {
    inner: Mutex<Inner>,
    cap: usize,
}

#[derive(Debug)]
struct Inner {
    /// Items in insertion order.
    items: Vec<NewsItem>,
    /// Every id ever admitted. Not pruned on eviction: an evicted id stays
    /// known so the same article cannot re-enter from a feed that still
    /// publishes it.
    seen: HashSet<String>,
}

impl NewsStore {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: Vec::with_capacity(cap.min(10_000)),
                seen: HashSet::new(),
            }),
            cap: cap.max(1),
        }
    }

    /// Merge a batch into the cache. Items whose id is already known are
    /// silently dropped (no update-in-place, no field merge); the rest are
    /// appended in batch order. Returns the admitted items for this cycle.
    pub fn admit(&self, batch: Vec<NewsItem>) -> Vec<NewsItem> {
        let mut inner = self.inner.lock().expect("news store mutex poisoned");

        let mut admitted = Vec::new();
        for item in batch {
            if inner.seen.insert(item.id.clone()) {
                inner.items.push(item.clone());
                admitted.push(item);
            }
        }

        if inner.items.len() > self.cap {
            let excess = inner.items.len() - self.cap;
            inner.items.drain(0..excess);
        }

        admitted
    }

    /// Snapshot in insertion order (the aggregation input).
    pub fn snapshot(&self) -> Vec<NewsItem> {
        self.inner
            .lock()
            .expect("news store mutex poisoned")
            .items
            .clone()
    }

    /// Snapshot sorted by `published` descending; undated items sort last.
    pub fn snapshot_sorted(&self) -> Vec<NewsItem> {
        let mut items = self.snapshot();
        items.sort_by(|a, b| b.published.cmp(&a.published));
        items
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("news store mutex poisoned")
            .items
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::Sentiment;
    use chrono::{TimeZone, Utc};

    fn item(id: &str, published: Option<i64>) -> NewsItem {
        NewsItem {
            id: id.to_string(),
            title: format!("title {id}"),
            link: format!("https://example.com/{id}"),
            source: "Test".into(),
            published: published.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            summary: String::new(),
            sentiment: Sentiment::Neutral,
            categories: Vec::new(),
        }
    }

    #[test]
    fn duplicate_ids_are_admitted_once() {
        let store = NewsStore::with_capacity(10);
        let first = store.admit(vec![item("a", None), item("a", None)]);
        assert_eq!(first.len(), 1);

        // Same id again on a later cycle: silently dropped.
        let second = store.admit(vec![item("a", None)]);
        assert!(second.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn eviction_is_oldest_by_insertion_not_by_publish_date() {
        let store = NewsStore::with_capacity(2);
        // "old" was inserted first but has the newest publish date.
        store.admit(vec![item("old", Some(3_000)), item("mid", Some(1_000))]);
        store.admit(vec![item("new", Some(2_000))]);

        let ids: Vec<String> = store.snapshot().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["mid", "new"]);
    }

    #[test]
    fn evicted_id_cannot_reenter() {
        let store = NewsStore::with_capacity(1);
        store.admit(vec![item("a", None)]);
        store.admit(vec![item("b", None)]); // evicts "a"
        let readmitted = store.admit(vec![item("a", None)]);
        assert!(readmitted.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sorted_snapshot_puts_undated_items_last() {
        let store = NewsStore::with_capacity(10);
        store.admit(vec![
            item("undated", None),
            item("older", Some(1_000)),
            item("newer", Some(2_000)),
        ]);

        let ids: Vec<String> = store
            .snapshot_sorted()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["newer", "older", "undated"]);
    }
}
